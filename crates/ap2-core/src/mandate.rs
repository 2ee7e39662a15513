//! Mandate types and the lifecycle state machine.
//!
//! A mandate is a record of delegated authorization: the user tells their
//! agent "do X under these conditions" and the mandate carries that grant
//! through its lifecycle. The three variants (Intent, Cart, Payment) share
//! one lifecycle contract; the status field is private to this module so
//! every state change goes through the guarded operations below.
//!
//! States: `DRAFT -> ACTIVE -> {REVOKED, EXPIRED, COMPLETED, FAILED}`.
//! `ACTIVE` is the sole executable state, and no operation ever returns a
//! terminal mandate to `ACTIVE`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Ap2Error, Result};
use crate::payment::{CartContents, PaymentCurrencyAmount, PaymentMethod};
use crate::types::MandateStatus;

/// Variant-specific payload of an Intent mandate: "do X if condition Y
/// holds before expiry".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPayload {
    /// What the user asked for, in their own words.
    pub natural_language_description: String,

    /// When the delegated intent lapses. The mandate layer never
    /// auto-transitions on this; an external sweep calls
    /// [`Mandate::mark_expired`].
    pub intent_expiry: DateTime<Utc>,

    /// Merchants the user limited the intent to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchants: Option<Vec<String>>,

    /// Whether the user required the purchase to be refundable.
    #[serde(default)]
    pub requires_refundability: bool,
}

impl IntentPayload {
    /// Create an intent payload with no merchant restriction.
    pub fn new(description: impl Into<String>, intent_expiry: DateTime<Utc>) -> Self {
        Self {
            natural_language_description: description.into(),
            intent_expiry,
            merchants: None,
            requires_refundability: false,
        }
    }
}

/// Variant-specific payload of a Cart mandate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPayload {
    /// The cart the user authorized.
    pub contents: CartContents,
}

/// Variant-specific payload of a Payment mandate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// The instrument to charge.
    pub method: PaymentMethod,

    /// The amount the user authorized.
    pub amount: PaymentCurrencyAmount,

    /// Reference of the cart mandate this payment settles, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_reference: Option<String>,
}

/// The variant payload of a mandate.
///
/// All variants share the lifecycle fields on [`Mandate`]; only the domain
/// payload differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MandatePayload {
    /// A delegated intent ("buy shoes if the price drops below $80").
    Intent(IntentPayload),
    /// An authorized cart.
    Cart(CartPayload),
    /// An authorized payment.
    Payment(PaymentPayload),
}

impl MandatePayload {
    /// Short name of the variant, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MandatePayload::Intent(_) => "intent",
            MandatePayload::Cart(_) => "cart",
            MandatePayload::Payment(_) => "payment",
        }
    }
}

/// A mandate: delegated authorization with a lifecycle status.
///
/// The lifecycle fields are private; callers inspect them through accessors
/// and change them only through the guarded operations, which either
/// transition the mandate and refresh `updated_at`, or fail with the
/// catalog [`Ap2Error`] for the current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mandate {
    /// Opaque reference correlating errors to this mandate. Unique among
    /// live mandates and stable for the mandate's lifetime.
    reference: String,

    /// Current lifecycle status.
    status: MandateStatus,

    /// Set once at construction.
    created_at: DateTime<Utc>,

    /// Refreshed on every state-affecting mutation. Never decreases and is
    /// never earlier than `created_at`.
    updated_at: DateTime<Utc>,

    /// The variant payload.
    payload: MandatePayload,
}

impl Mandate {
    fn create(reference: String, status: MandateStatus, payload: MandatePayload) -> Self {
        let now = Utc::now();
        Self {
            reference,
            status,
            created_at: now,
            updated_at: now,
            payload,
        }
    }

    /// Create an `ACTIVE` mandate with a generated reference.
    pub fn new(payload: MandatePayload) -> Self {
        Self::create(
            Uuid::new_v4().to_string(),
            MandateStatus::Active,
            payload,
        )
    }

    /// Create an `ACTIVE` mandate under a caller-chosen reference.
    pub fn with_reference(reference: impl Into<String>, payload: MandatePayload) -> Self {
        Self::create(reference.into(), MandateStatus::Active, payload)
    }

    /// Create a `DRAFT` mandate; it must be [`Mandate::activate`]d before it
    /// can be executed.
    pub fn draft(payload: MandatePayload) -> Self {
        Self::create(Uuid::new_v4().to_string(), MandateStatus::Draft, payload)
    }

    /// Create an active Intent mandate.
    pub fn intent(description: impl Into<String>, intent_expiry: DateTime<Utc>) -> Self {
        Self::new(MandatePayload::Intent(IntentPayload::new(
            description,
            intent_expiry,
        )))
    }

    /// Create an active Cart mandate.
    pub fn cart(contents: CartContents) -> Self {
        Self::new(MandatePayload::Cart(CartPayload { contents }))
    }

    /// Create an active Payment mandate.
    pub fn payment(method: PaymentMethod, amount: PaymentCurrencyAmount) -> Self {
        Self::new(MandatePayload::Payment(PaymentPayload {
            method,
            amount,
            cart_reference: None,
        }))
    }

    /// The mandate's opaque reference.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Current lifecycle status.
    pub fn status(&self) -> MandateStatus {
        self.status
    }

    /// When the mandate was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the mandate last changed state.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The variant payload.
    pub fn payload(&self) -> &MandatePayload {
        &self.payload
    }

    /// Returns true iff the mandate may be executed right now.
    ///
    /// Pure predicate over the status; never fails and has no side effect.
    pub fn is_executable(&self) -> bool {
        self.status.is_executable()
    }

    /// Refresh `updated_at`. Monotonic: a coarse clock can yield an equal
    /// timestamp but never an earlier one.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Check that the mandate is executable, or report why not.
    ///
    /// The error kind is selected by the current status: `REVOKED` maps to
    /// `MANDATE_ALREADY_REVOKED`, `EXPIRED` to `MANDATE_EXPIRED`, and every
    /// other non-active status to `MANDATE_INVALID_STATUS`.
    pub fn ensure_executable(&self) -> Result<()> {
        match self.status {
            MandateStatus::Active => Ok(()),
            MandateStatus::Revoked => Err(Ap2Error::mandate_already_revoked(&self.reference)),
            MandateStatus::Expired => Err(Ap2Error::mandate_expired(&self.reference)),
            status => Err(Ap2Error::invalid_status(&self.reference, status)),
        }
    }

    /// Revoke the mandate.
    ///
    /// Only an `ACTIVE` mandate can be revoked. Revoking twice fails with
    /// `MANDATE_ALREADY_REVOKED`; revoking from any other status fails with
    /// `MANDATE_INVALID_STATUS`.
    pub fn revoke(&mut self) -> Result<()> {
        match self.status {
            MandateStatus::Active => {
                self.status = MandateStatus::Revoked;
                self.touch();
                Ok(())
            }
            MandateStatus::Revoked => Err(Ap2Error::mandate_already_revoked(&self.reference)),
            status => Err(Ap2Error::invalid_status(&self.reference, status)),
        }
    }

    /// Activate a `DRAFT` mandate.
    ///
    /// Terminal statuses never return to `ACTIVE`.
    pub fn activate(&mut self) -> Result<()> {
        match self.status {
            MandateStatus::Draft => {
                self.status = MandateStatus::Active;
                self.touch();
                Ok(())
            }
            status => Err(Ap2Error::invalid_status(&self.reference, status)),
        }
    }

    /// Mark an `ACTIVE` mandate expired.
    ///
    /// Called by whatever sweeps `intent_expiry`; the mandate layer never
    /// expires a mandate on its own.
    pub fn mark_expired(&mut self) -> Result<()> {
        self.transition_from_active(MandateStatus::Expired)
    }

    /// Mark an `ACTIVE` mandate completed after a successful execution.
    pub fn mark_completed(&mut self) -> Result<()> {
        self.transition_from_active(MandateStatus::Completed)
    }

    /// Mark an `ACTIVE` mandate failed after a downstream failure.
    pub fn mark_failed(&mut self) -> Result<()> {
        self.transition_from_active(MandateStatus::Failed)
    }

    fn transition_from_active(&mut self, target: MandateStatus) -> Result<()> {
        match self.status {
            MandateStatus::Active => {
                self.status = target;
                self.touch();
                Ok(())
            }
            MandateStatus::Revoked => Err(Ap2Error::mandate_already_revoked(&self.reference)),
            status => Err(Ap2Error::invalid_status(&self.reference, status)),
        }
    }
}
