//! HTTP adapter: handlers, extractors, and error rendering over the domain
//! services.

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod payments;
pub mod state;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;
