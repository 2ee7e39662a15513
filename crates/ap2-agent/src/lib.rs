//! # AP2 Agent
//!
//! Agent-facing tools over the AP2 mandate registry: create, inspect,
//! revoke, and execute mandates, with every failure expressed as an RFC
//! 7807 problem detail ready to relay to the counterparty agent.

pub mod tools;

pub use tools::{failure_response, MandateTools, PaymentOutcome};
