//! PostgreSQL persistence adapters: pool, schema, row models, and the Diesel
//! repositories.

pub mod bootstrap;
mod diesel_intent_repository;
mod diesel_payment_repository;
mod diesel_user_repository;
mod error_map;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_intent_repository::DieselIntentRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
