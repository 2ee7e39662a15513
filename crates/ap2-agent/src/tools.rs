//! Mandate tools exposed to agents.
//!
//! These wrap the registry's guarded operations with the logging and
//! response shaping an agent needs. The tools never execute a payment
//! themselves; the downstream outcome is reported by the caller and the
//! tools translate it into the mandate's terminal status.

use std::sync::Arc;

use ap2_core::{
    Ap2Error, CartContents, Mandate, MandateStatus, PaymentCurrencyAmount, PaymentMethod, Result,
};
use ap2_state::{InMemoryMandateStore, MandateStore};
use chrono::{DateTime, Utc};
use tracing::info;

/// Outcome of the downstream payment attempt, reported by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// The processor accepted the payment.
    Success,
    /// The processor declined, with its reason.
    Declined(String),
}

/// Render an error the way the transport layer relays it: the embedded
/// status code plus the problem-detail JSON body, verbatim.
pub fn failure_response(error: &Ap2Error) -> (u16, serde_json::Value) {
    (
        error.status,
        serde_json::to_value(error).expect("problem details always serialize"),
    )
}

/// Agent-facing mandate operations over a shared registry.
#[derive(Clone)]
pub struct MandateTools {
    store: Arc<InMemoryMandateStore>,
}

impl MandateTools {
    /// Create tools over an existing registry.
    pub fn new(store: Arc<InMemoryMandateStore>) -> Self {
        Self { store }
    }

    /// The underlying registry.
    pub fn store(&self) -> &Arc<InMemoryMandateStore> {
        &self.store
    }

    /// Create and register an Intent mandate.
    pub async fn create_intent_mandate(
        &self,
        description: impl Into<String>,
        intent_expiry: DateTime<Utc>,
    ) -> Result<Mandate> {
        self.store
            .create(Mandate::intent(description, intent_expiry))
            .await
    }

    /// Create and register a Cart mandate.
    pub async fn create_cart_mandate(&self, contents: CartContents) -> Result<Mandate> {
        self.store.create(Mandate::cart(contents)).await
    }

    /// Create and register a Payment mandate.
    pub async fn create_payment_mandate(
        &self,
        method: PaymentMethod,
        amount: PaymentCurrencyAmount,
    ) -> Result<Mandate> {
        self.store.create(Mandate::payment(method, amount)).await
    }

    /// Look up a mandate by reference.
    pub async fn get_mandate(&self, reference: &str) -> Result<Mandate> {
        self.store.get(reference).await
    }

    /// Current lifecycle status of a mandate.
    pub async fn get_mandate_status(&self, reference: &str) -> Result<MandateStatus> {
        Ok(self.store.get(reference).await?.status())
    }

    /// Revoke a mandate on the user's behalf.
    pub async fn revoke_mandate(&self, reference: &str) -> Result<Mandate> {
        self.store.revoke(reference).await
    }

    /// Execute a mandate.
    ///
    /// Checks the execution guard, then records the downstream outcome:
    /// `COMPLETED` on success, `FAILED` plus a `PAYMENT_DECLINED` error on
    /// a decline. Non-executable mandates fail before any side effect.
    pub async fn execute_mandate(
        &self,
        reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<Mandate> {
        self.store.begin_execution(reference).await?;

        match outcome {
            PaymentOutcome::Success => {
                let mandate = self.store.complete(reference).await?;
                info!(reference, "mandate executed");
                Ok(mandate)
            }
            PaymentOutcome::Declined(detail) => {
                self.store.fail(reference).await?;
                info!(reference, "mandate execution declined");
                Err(Ap2Error::payment_declined(detail).with_mandate_reference(reference))
            }
        }
    }
}

impl Default for MandateTools {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryMandateStore::new()))
    }
}
