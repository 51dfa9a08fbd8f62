//! Outbound adapters: PostgreSQL persistence, the payment gateway client, the
//! mail API client, and the CSV report writer.

pub mod gateway;
pub mod mail;
pub mod persistence;
pub mod report;
