//! Common types used across the AP2 mandate layer.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a mandate.
///
/// Serializes to its upper-case wire name (e.g. `"ACTIVE"`), matching the
/// protocol's string-valued status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MandateStatus {
    /// Mandate has been drafted but not yet activated.
    Draft,
    /// Mandate is live and may be acted upon.
    Active,
    /// Mandate was revoked by the user or their agent.
    Revoked,
    /// Mandate passed its expiry and was marked expired.
    Expired,
    /// Mandate was consumed by a successful execution.
    Completed,
    /// Execution was attempted and failed downstream.
    Failed,
}

impl MandateStatus {
    /// All status values, for exhaustive table tests.
    pub const ALL: [MandateStatus; 6] = [
        MandateStatus::Draft,
        MandateStatus::Active,
        MandateStatus::Revoked,
        MandateStatus::Expired,
        MandateStatus::Completed,
        MandateStatus::Failed,
    ];

    /// Returns true if a mandate in this status may be executed.
    ///
    /// `Active` is the sole executable state. `Draft` is not yet activated
    /// and `Completed` is already consumed; neither is executable.
    pub fn is_executable(&self) -> bool {
        matches!(self, MandateStatus::Active)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MandateStatus::Revoked
                | MandateStatus::Expired
                | MandateStatus::Completed
                | MandateStatus::Failed
        )
    }

    /// The wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MandateStatus::Draft => "DRAFT",
            MandateStatus::Active => "ACTIVE",
            MandateStatus::Revoked => "REVOKED",
            MandateStatus::Expired => "EXPIRED",
            MandateStatus::Completed => "COMPLETED",
            MandateStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for MandateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_is_executable() {
        for status in MandateStatus::ALL {
            assert_eq!(
                status.is_executable(),
                status == MandateStatus::Active,
                "executability wrong for {status}"
            );
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(MandateStatus::Revoked.is_terminal());
        assert!(MandateStatus::Expired.is_terminal());
        assert!(MandateStatus::Completed.is_terminal());
        assert!(MandateStatus::Failed.is_terminal());
        assert!(!MandateStatus::Draft.is_terminal());
        assert!(!MandateStatus::Active.is_terminal());
    }

    #[test]
    fn test_status_serializes_to_wire_name() {
        for status in MandateStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));

            let back: MandateStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
