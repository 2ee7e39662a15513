//! Mandate store implementations.

use std::collections::HashMap;
use std::sync::Arc;

use ap2_core::{Ap2Error, ErrorKind, Mandate, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Trait for mandate stores.
///
/// A store must preserve a mandate's full field set across a `put`/`get`
/// cycle. Lookups of unknown references fail with `MANDATE_NOT_FOUND`.
#[async_trait]
pub trait MandateStore: Send + Sync {
    /// Get the mandate stored under a reference.
    async fn get(&self, reference: &str) -> Result<Mandate>;

    /// Store a mandate under its reference, replacing any previous value.
    async fn put(&self, mandate: Mandate) -> Result<()>;

    /// Whether a mandate exists under the reference.
    async fn contains(&self, reference: &str) -> bool;

    /// References of all stored mandates.
    async fn references(&self) -> Vec<String>;
}

/// In-memory mandate registry.
///
/// Beyond the plain [`MandateStore`] contract, the registry exposes the
/// guarded lifecycle operations. Each one holds the write lock across the
/// whole read-check-update sequence, so racing callers on the same mandate
/// are serialized: at most one transition out of `ACTIVE` succeeds, and
/// every loser observes the post-transition status and gets the
/// corresponding already-terminal error.
pub struct InMemoryMandateStore {
    mandates: Arc<RwLock<HashMap<String, Mandate>>>,
}

impl InMemoryMandateStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            mandates: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a newly created mandate.
    ///
    /// References must be unique among live mandates; reusing one fails
    /// with `INVALID_MANDATE_FORMAT`.
    pub async fn create(&self, mandate: Mandate) -> Result<Mandate> {
        let mut mandates = self.mandates.write().await;

        if mandates.contains_key(mandate.reference()) {
            return Err(Ap2Error::from_kind(
                ErrorKind::InvalidMandateFormat,
                format!(
                    "A mandate with reference {} already exists.",
                    mandate.reference()
                ),
            )
            .with_mandate_reference(mandate.reference()));
        }

        info!(
            reference = mandate.reference(),
            kind = mandate.payload().kind_name(),
            status = %mandate.status(),
            "mandate created"
        );

        mandates.insert(mandate.reference().to_string(), mandate.clone());
        Ok(mandate)
    }

    /// Revoke the mandate stored under a reference.
    ///
    /// Returns the post-revocation mandate on success.
    pub async fn revoke(&self, reference: &str) -> Result<Mandate> {
        let mut mandates = self.mandates.write().await;

        let mandate = mandates
            .get_mut(reference)
            .ok_or_else(|| Ap2Error::mandate_not_found(reference))?;

        match mandate.revoke() {
            Ok(()) => {
                info!(reference, "mandate revoked");
                Ok(mandate.clone())
            }
            Err(error) => {
                warn!(reference, status = %mandate.status(), "revocation rejected");
                Err(error)
            }
        }
    }

    /// Check that the mandate under a reference is executable and return a
    /// snapshot of it for the executor.
    ///
    /// The registry never performs the payment side-effect; the caller
    /// reports the downstream outcome via [`InMemoryMandateStore::complete`]
    /// or [`InMemoryMandateStore::fail`].
    pub async fn begin_execution(&self, reference: &str) -> Result<Mandate> {
        let mandates = self.mandates.read().await;

        let mandate = mandates
            .get(reference)
            .ok_or_else(|| Ap2Error::mandate_not_found(reference))?;

        mandate.ensure_executable()?;
        Ok(mandate.clone())
    }

    /// Mark an executed mandate completed.
    pub async fn complete(&self, reference: &str) -> Result<Mandate> {
        self.transition(reference, "mandate completed", Mandate::mark_completed)
            .await
    }

    /// Mark an executed mandate failed.
    pub async fn fail(&self, reference: &str) -> Result<Mandate> {
        self.transition(reference, "mandate failed", Mandate::mark_failed)
            .await
    }

    /// Mark a mandate expired. Called by the expiry sweep, which owns
    /// the decision of when a mandate's expiry has passed.
    pub async fn expire(&self, reference: &str) -> Result<Mandate> {
        self.transition(reference, "mandate expired", Mandate::mark_expired)
            .await
    }

    async fn transition(
        &self,
        reference: &str,
        message: &'static str,
        op: fn(&mut Mandate) -> Result<()>,
    ) -> Result<Mandate> {
        let mut mandates = self.mandates.write().await;

        let mandate = mandates
            .get_mut(reference)
            .ok_or_else(|| Ap2Error::mandate_not_found(reference))?;

        op(mandate)?;
        info!(reference, status = %mandate.status(), "{}", message);
        Ok(mandate.clone())
    }
}

impl Default for InMemoryMandateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MandateStore for InMemoryMandateStore {
    async fn get(&self, reference: &str) -> Result<Mandate> {
        let mandates = self.mandates.read().await;
        mandates
            .get(reference)
            .cloned()
            .ok_or_else(|| Ap2Error::mandate_not_found(reference))
    }

    async fn put(&self, mandate: Mandate) -> Result<()> {
        let mut mandates = self.mandates.write().await;
        mandates.insert(mandate.reference().to_string(), mandate);
        Ok(())
    }

    async fn contains(&self, reference: &str) -> bool {
        let mandates = self.mandates.read().await;
        mandates.contains_key(reference)
    }

    async fn references(&self) -> Vec<String> {
        let mandates = self.mandates.read().await;
        mandates.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap2_core::MandateStatus;
    use chrono::{TimeZone, Utc};

    fn intent_mandate(description: &str) -> Mandate {
        Mandate::intent(
            description,
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryMandateStore::new();
        let mandate = store.create(intent_mandate("Buy shoes")).await.unwrap();

        let fetched = store.get(mandate.reference()).await.unwrap();
        assert_eq!(fetched, mandate);
    }

    #[tokio::test]
    async fn test_put_preserves_full_field_set() {
        let store = InMemoryMandateStore::new();
        let mut mandate = intent_mandate("Buy shoes");
        mandate.revoke().unwrap();

        store.put(mandate.clone()).await.unwrap();
        let fetched = store.get(mandate.reference()).await.unwrap();

        assert_eq!(fetched.status(), MandateStatus::Revoked);
        assert_eq!(fetched.created_at(), mandate.created_at());
        assert_eq!(fetched.updated_at(), mandate.updated_at());
        assert_eq!(fetched.payload(), mandate.payload());
    }

    #[tokio::test]
    async fn test_lookup_unknown_reference() {
        let store = InMemoryMandateStore::new();
        let error = store.get("nonexistent-123").await.unwrap_err();

        assert_eq!(error.status, 404);
        assert!(error.error_type.ends_with("mandate-not-found"));
        assert_eq!(error.mandate_reference.as_deref(), Some("nonexistent-123"));
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let store = InMemoryMandateStore::new();
        let mandate = store.create(intent_mandate("first")).await.unwrap();

        let duplicate = Mandate::with_reference(
            mandate.reference(),
            mandate.payload().clone(),
        );
        let error = store.create(duplicate).await.unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::InvalidMandateFormat));
    }

    #[tokio::test]
    async fn test_revoke_then_execute() {
        let store = InMemoryMandateStore::new();
        let mandate = store.create(intent_mandate("Buy shoes")).await.unwrap();

        let revoked = store.revoke(mandate.reference()).await.unwrap();
        assert_eq!(revoked.status(), MandateStatus::Revoked);

        let error = store.begin_execution(mandate.reference()).await.unwrap_err();
        assert_eq!(error.status, 409);
        assert!(error.error_type.ends_with("mandate-already-revoked"));
    }

    #[tokio::test]
    async fn test_execute_unknown_reference() {
        let store = InMemoryMandateStore::new();
        let error = store.begin_execution("ghost").await.unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::MandateNotFound));
    }

    #[tokio::test]
    async fn test_complete_after_execution() {
        let store = InMemoryMandateStore::new();
        let mandate = store.create(intent_mandate("Buy shoes")).await.unwrap();

        store.begin_execution(mandate.reference()).await.unwrap();
        let completed = store.complete(mandate.reference()).await.unwrap();
        assert_eq!(completed.status(), MandateStatus::Completed);

        // A consumed mandate is not executable.
        let error = store.begin_execution(mandate.reference()).await.unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::MandateInvalidStatus));
    }

    #[tokio::test]
    async fn test_expire_then_execute() {
        let store = InMemoryMandateStore::new();
        let mandate = store.create(intent_mandate("Buy shoes")).await.unwrap();

        store.expire(mandate.reference()).await.unwrap();
        let error = store.begin_execution(mandate.reference()).await.unwrap_err();
        assert_eq!(error.status, 410);
        assert!(error.error_type.ends_with("mandate-expired"));
    }

    #[tokio::test]
    async fn test_concurrent_revocations_single_winner() {
        let store = Arc::new(InMemoryMandateStore::new());
        let mandate = store.create(intent_mandate("Buy shoes")).await.unwrap();
        let reference = mandate.reference().to_string();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let reference = reference.clone();
                tokio::spawn(async move { store.revoke(&reference).await })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;

        let mut successes = 0;
        let mut already_revoked = 0;
        for result in results {
            match result.unwrap() {
                Ok(mandate) => {
                    assert_eq!(mandate.status(), MandateStatus::Revoked);
                    successes += 1;
                }
                Err(error) => {
                    assert_eq!(error.kind(), Some(ErrorKind::MandateAlreadyRevoked));
                    assert_eq!(error.status, 409);
                    already_revoked += 1;
                }
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(already_revoked, 15);

        let stored = store.get(&reference).await.unwrap();
        assert_eq!(stored.status(), MandateStatus::Revoked);
    }
}
