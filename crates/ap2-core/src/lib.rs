//! # AP2 Core
//!
//! Core primitives and types for the AP2 (Agent Payments Protocol) mandate
//! layer.
//!
//! This crate provides the fundamental building blocks:
//! - [`Mandate`] - A user's delegated authorization with a lifecycle status
//! - [`MandateStatus`] - The closed set of lifecycle states
//! - [`Ap2Error`] - RFC 7807 problem details for every protocol failure
//! - [`ErrorKind`] - The closed catalog of error kinds

pub mod error;
pub mod mandate;
pub mod payment;
pub mod types;

// Re-exports for convenience
pub use error::{Ap2Error, ErrorKind, Result, ERROR_URI_PREFIX};
pub use mandate::{CartPayload, IntentPayload, Mandate, MandatePayload, PaymentPayload};
pub use payment::{CartContents, PaymentCurrencyAmount, PaymentItem, PaymentMethod};
pub use types::MandateStatus;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Ap2Error, ErrorKind, Result};
    pub use crate::mandate::{Mandate, MandatePayload};
    pub use crate::payment::{CartContents, PaymentCurrencyAmount, PaymentItem, PaymentMethod};
    pub use crate::types::MandateStatus;
}
