//! # AP2 State
//!
//! Mandate registry for the AP2 protocol: the storage contract consumed by
//! the mandate layer, plus an in-memory implementation whose lifecycle
//! operations are atomic per mandate.

pub mod store;

pub use store::{InMemoryMandateStore, MandateStore};
