//! Newsletter subscription management: users own subscriber lists, lists hold
//! entries, entries point at subscribers.
//!
//! Administrators manage everything through the admin endpoints; regular
//! users only see and change the lists they own through the `/my` endpoints.

pub mod app;
pub mod authentication;
pub mod domain;
pub mod routes;
pub mod services;
pub mod store;

/// Format an error followed by its chain of causes.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
