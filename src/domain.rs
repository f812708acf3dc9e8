pub use email::Email;
pub use errors::MalformedInput;
pub use gender::Gender;
pub use list_name::ListName;
pub use password::Password;
pub use person_name::{
    parse_optional_name,
    PersonName,
};
pub use principal::Principal;
pub use role::Role;
pub use subscriber::{
    NewSubscriber,
    Subscriber,
};
pub use subscriber_list::{
    SubscriberList,
    SubscriberListDetails,
};
pub use subscriber_list_entry::{
    EntryDetails,
    NewEntry,
    SubscriberListEntry,
};
pub use user::{
    NewUser,
    User,
};

mod email;
mod errors;
mod gender;
mod list_name;
mod password;
mod person_name;
mod principal;
mod role;
mod subscriber;
mod subscriber_list;
mod subscriber_list_entry;
mod user;
