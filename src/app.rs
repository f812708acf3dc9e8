pub use configuration::*;
pub use seed::seed_admin;
pub use startup::NewsletterApp;
pub use telemetry::{
    setup_tracing,
    spawn_blocking_with_tracing,
};

mod configuration;
mod seed;
mod startup;
mod telemetry;
