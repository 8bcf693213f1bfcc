//! Service plumbing shared across Tessera services.
//!
//! Health handlers, tracing setup, and common middleware. No domain
//! knowledge belongs here.

pub mod health;
pub mod middleware;
pub mod tracing;
