//! Hostel fee management backend.
//!
//! A thin orchestration service over three external collaborators: a
//! PostgreSQL store, a payment gateway, and a mail API. The domain layer owns
//! the payment reconciliation flow (begin → gateway order → signed callback →
//! durable payment record) behind ports; inbound and outbound adapters stay
//! free of business rules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Request tracing middleware attaching a `trace-id` header.
pub use middleware::trace::Trace;
