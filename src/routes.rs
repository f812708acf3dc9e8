pub use errors::RouteError;
pub use health_check::health_check;

mod errors;
mod health_check;
pub mod subscriber_entries;
pub mod subscriber_lists;
pub mod subscribers;
pub mod users;
