//! Error taxonomy and RFC 7807 problem details for the AP2 protocol.
//!
//! Every anticipated failure in the mandate layer is expressed as an
//! [`Ap2Error`] value built from the closed [`ErrorKind`] catalog, so agents
//! always receive the same machine-readable shape: a `type` URI, a short
//! `title`, an HTTP-style `status`, an instance-specific `detail`, and the
//! `mandate_reference` involved when one applies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheme + host prefix shared by every error `type` URI.
pub const ERROR_URI_PREFIX: &str = "https://ap2-protocol.org/errors/";

/// Convenience Result type for AP2 mandate operations.
pub type Result<T> = std::result::Result<T, Ap2Error>;

/// The closed catalog of AP2 error kinds.
///
/// Each kind carries a stable URI suffix and a conventional HTTP status
/// code. The catalog is immutable: kinds are never added or changed at
/// runtime, and the exhaustive matches below keep it closed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Mandate lifecycle
    MandateNotFound,
    MandateAlreadyRevoked,
    MandateExpired,
    MandateInvalidStatus,
    MandateRevocationFailed,

    // Payment processing
    PaymentMethodNotSupported,
    PaymentDeclined,
    PaymentAmountExceeded,
    PaymentInsufficientFunds,
    PaymentProcessorError,

    // Authentication and authorization
    UnauthorizedAgent,
    InvalidSignature,
    MissingAuthorization,

    // Validation
    InvalidMandateFormat,
    MissingRequiredField,
    InvalidPaymentRequest,

    // System
    InternalServerError,
    ServiceUnavailable,
    Timeout,
}

impl ErrorKind {
    /// All catalog members, for completeness tests.
    pub const ALL: [ErrorKind; 19] = [
        ErrorKind::MandateNotFound,
        ErrorKind::MandateAlreadyRevoked,
        ErrorKind::MandateExpired,
        ErrorKind::MandateInvalidStatus,
        ErrorKind::MandateRevocationFailed,
        ErrorKind::PaymentMethodNotSupported,
        ErrorKind::PaymentDeclined,
        ErrorKind::PaymentAmountExceeded,
        ErrorKind::PaymentInsufficientFunds,
        ErrorKind::PaymentProcessorError,
        ErrorKind::UnauthorizedAgent,
        ErrorKind::InvalidSignature,
        ErrorKind::MissingAuthorization,
        ErrorKind::InvalidMandateFormat,
        ErrorKind::MissingRequiredField,
        ErrorKind::InvalidPaymentRequest,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
        ErrorKind::Timeout,
    ];

    /// The kebab-case URI suffix identifying this kind.
    pub fn slug(&self) -> &'static str {
        match self {
            ErrorKind::MandateNotFound => "mandate-not-found",
            ErrorKind::MandateAlreadyRevoked => "mandate-already-revoked",
            ErrorKind::MandateExpired => "mandate-expired",
            ErrorKind::MandateInvalidStatus => "mandate-invalid-status",
            ErrorKind::MandateRevocationFailed => "mandate-revocation-failed",
            ErrorKind::PaymentMethodNotSupported => "payment-method-not-supported",
            ErrorKind::PaymentDeclined => "payment-declined",
            ErrorKind::PaymentAmountExceeded => "payment-amount-exceeded",
            ErrorKind::PaymentInsufficientFunds => "payment-insufficient-funds",
            ErrorKind::PaymentProcessorError => "payment-processor-error",
            ErrorKind::UnauthorizedAgent => "unauthorized-agent",
            ErrorKind::InvalidSignature => "invalid-signature",
            ErrorKind::MissingAuthorization => "missing-authorization",
            ErrorKind::InvalidMandateFormat => "invalid-mandate-format",
            ErrorKind::MissingRequiredField => "missing-required-field",
            ErrorKind::InvalidPaymentRequest => "invalid-payment-request",
            ErrorKind::InternalServerError => "internal-server-error",
            ErrorKind::ServiceUnavailable => "service-unavailable",
            ErrorKind::Timeout => "timeout",
        }
    }

    /// The full, dereferenceable `type` URI for this kind.
    pub fn uri(&self) -> String {
        format!("{}{}", ERROR_URI_PREFIX, self.slug())
    }

    /// Canonical short human-readable summary.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::MandateNotFound => "Mandate Not Found",
            ErrorKind::MandateAlreadyRevoked => "Mandate Already Revoked",
            ErrorKind::MandateExpired => "Mandate Expired",
            ErrorKind::MandateInvalidStatus => "Invalid Mandate Status",
            ErrorKind::MandateRevocationFailed => "Mandate Revocation Failed",
            ErrorKind::PaymentMethodNotSupported => "Payment Method Not Supported",
            ErrorKind::PaymentDeclined => "Payment Declined",
            ErrorKind::PaymentAmountExceeded => "Payment Amount Exceeded",
            ErrorKind::PaymentInsufficientFunds => "Insufficient Funds",
            ErrorKind::PaymentProcessorError => "Payment Processor Error",
            ErrorKind::UnauthorizedAgent => "Unauthorized Agent",
            ErrorKind::InvalidSignature => "Invalid Signature",
            ErrorKind::MissingAuthorization => "Missing Authorization",
            ErrorKind::InvalidMandateFormat => "Invalid Mandate Format",
            ErrorKind::MissingRequiredField => "Missing Required Field",
            ErrorKind::InvalidPaymentRequest => "Invalid Payment Request",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
            ErrorKind::Timeout => "Request Timeout",
        }
    }

    /// The HTTP status code conventionally associated with this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::MandateNotFound => 404,
            ErrorKind::MandateAlreadyRevoked => 409,
            ErrorKind::MandateExpired => 410,
            ErrorKind::MandateInvalidStatus => 409,
            ErrorKind::MandateRevocationFailed => 500,
            ErrorKind::PaymentMethodNotSupported => 400,
            ErrorKind::PaymentDeclined => 402,
            ErrorKind::PaymentAmountExceeded => 403,
            ErrorKind::PaymentInsufficientFunds => 402,
            ErrorKind::PaymentProcessorError => 502,
            ErrorKind::UnauthorizedAgent => 401,
            ErrorKind::InvalidSignature => 401,
            ErrorKind::MissingAuthorization => 401,
            ErrorKind::InvalidMandateFormat => 400,
            ErrorKind::MissingRequiredField => 400,
            ErrorKind::InvalidPaymentRequest => 400,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Timeout => 504,
        }
    }

    /// Look a kind up by its `type` URI. Returns `None` for URIs outside
    /// the catalog.
    pub fn from_uri(uri: &str) -> Option<ErrorKind> {
        let slug = uri.strip_prefix(ERROR_URI_PREFIX)?;
        ErrorKind::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// An RFC 7807 problem detail for an AP2 failure.
///
/// This is both the protocol's error value and its wire format: serializing
/// with `serde_json` yields exactly the body an agent relays, with the
/// embedded `status` used as the transport status code. Values are immutable
/// once constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{title}: {detail}")]
pub struct Ap2Error {
    /// Stable URI identifying the error kind.
    #[serde(rename = "type")]
    pub error_type: String,

    /// Short human-readable summary of the kind.
    pub title: String,

    /// HTTP-style status code associated with the kind.
    pub status: u16,

    /// Instance-specific explanation.
    pub detail: String,

    /// The mandate involved, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandate_reference: Option<String>,
}

impl Ap2Error {
    /// Build a problem detail for the given kind.
    ///
    /// The `type` URI is always derived from the kind; `title` and `status`
    /// are caller-supplied so transports can override the conventional
    /// values where a deployment requires it.
    pub fn new(
        kind: ErrorKind,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
        mandate_reference: Option<String>,
    ) -> Self {
        Self {
            error_type: kind.uri(),
            title: title.into(),
            status,
            detail: detail.into(),
            mandate_reference,
        }
    }

    /// Build a problem detail with the kind's canonical title and status.
    pub fn from_kind(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::new(kind, kind.title(), kind.http_status(), detail, None)
    }

    /// Attach the mandate reference this error correlates to.
    pub fn with_mandate_reference(mut self, reference: impl Into<String>) -> Self {
        self.mandate_reference = Some(reference.into());
        self
    }

    /// The catalog kind this error was built from, if its `type` URI is
    /// still in the catalog.
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_uri(&self.error_type)
    }

    // ---- Helper constructors for the common scenarios ----

    /// 404: no mandate exists under the given reference.
    pub fn mandate_not_found(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self::from_kind(
            ErrorKind::MandateNotFound,
            format!("Mandate {reference} could not be found."),
        )
        .with_mandate_reference(reference)
    }

    /// 409: the mandate has already been revoked.
    pub fn mandate_already_revoked(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self::from_kind(
            ErrorKind::MandateAlreadyRevoked,
            format!("Mandate {reference} has already been revoked and cannot be used."),
        )
        .with_mandate_reference(reference)
    }

    /// 410: the mandate has expired.
    pub fn mandate_expired(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self::from_kind(
            ErrorKind::MandateExpired,
            format!("Mandate {reference} has expired and can no longer be used."),
        )
        .with_mandate_reference(reference)
    }

    /// 409: the mandate is in a status that does not permit the operation.
    pub fn invalid_status(reference: impl Into<String>, status: impl std::fmt::Display) -> Self {
        let reference = reference.into();
        Self::from_kind(
            ErrorKind::MandateInvalidStatus,
            format!("Mandate {reference} is in status {status}, which does not permit this operation."),
        )
        .with_mandate_reference(reference)
    }

    /// 500: revocation could not be carried out.
    pub fn revocation_failed(reference: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::MandateRevocationFailed, detail)
            .with_mandate_reference(reference)
    }

    /// 402: the payment was declined downstream.
    pub fn payment_declined(detail: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::PaymentDeclined, detail)
    }

    /// 401: the calling agent is not authorized.
    pub fn unauthorized_agent(agent_id: impl std::fmt::Display) -> Self {
        Self::from_kind(
            ErrorKind::UnauthorizedAgent,
            format!("Agent {agent_id} is not authorized to perform this operation."),
        )
    }

    /// 500: an unexpected internal fault.
    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::InternalServerError, detail)
    }

    /// 503: a collaborator the operation depends on is unavailable.
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::ServiceUnavailable, detail)
    }

    /// 504: the operation did not complete in time.
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Timeout, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete() {
        assert_eq!(ErrorKind::ALL.len(), 19);
        for kind in ErrorKind::ALL {
            assert!(kind.uri().starts_with(ERROR_URI_PREFIX));
            let slug = kind.slug();
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "slug '{slug}' is not kebab-case"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    #[test]
    fn test_uri_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_uri(&kind.uri()), Some(kind));
        }
        assert_eq!(ErrorKind::from_uri("https://example.com/errors/nope"), None);
        assert_eq!(
            ErrorKind::from_uri("https://ap2-protocol.org/errors/unknown-kind"),
            None
        );
    }

    #[test]
    fn test_fixed_status_codes() {
        assert_eq!(ErrorKind::MandateNotFound.http_status(), 404);
        assert_eq!(ErrorKind::MandateAlreadyRevoked.http_status(), 409);
        assert_eq!(ErrorKind::MandateExpired.http_status(), 410);
        assert_eq!(ErrorKind::PaymentDeclined.http_status(), 402);
        assert_eq!(ErrorKind::UnauthorizedAgent.http_status(), 401);
        assert_eq!(ErrorKind::InternalServerError.http_status(), 500);
    }

    #[test]
    fn test_create_error_populates_type_from_kind() {
        let error = Ap2Error::new(
            ErrorKind::MandateNotFound,
            "Mandate Not Found",
            404,
            "The mandate could not be found",
            Some("test-123".to_string()),
        );

        assert_eq!(error.error_type, ErrorKind::MandateNotFound.uri());
        assert_eq!(error.title, "Mandate Not Found");
        assert_eq!(error.status, 404);
        assert_eq!(error.detail, "The mandate could not be found");
        assert_eq!(error.mandate_reference.as_deref(), Some("test-123"));
        assert_eq!(error.kind(), Some(ErrorKind::MandateNotFound));
    }

    #[test]
    fn test_helper_constructors() {
        let cases = [
            (Ap2Error::mandate_not_found("test-1"), 404, Some("test-1")),
            (Ap2Error::mandate_already_revoked("test-2"), 409, Some("test-2")),
            (Ap2Error::mandate_expired("test-3"), 410, Some("test-3")),
            (Ap2Error::payment_declined("Card declined"), 402, None),
            (Ap2Error::unauthorized_agent("bad-agent"), 401, None),
            (Ap2Error::internal_server_error("boom"), 500, None),
        ];

        for (error, expected_status, expected_reference) in cases {
            assert_eq!(error.status, expected_status);
            assert_eq!(error.mandate_reference.as_deref(), expected_reference);
            assert!(error.error_type.starts_with(ERROR_URI_PREFIX));
        }
    }

    #[test]
    fn test_unauthorized_agent_folds_id_into_detail() {
        let error = Ap2Error::unauthorized_agent("agent-7");
        assert!(error.detail.contains("agent-7"));
        assert!(error.error_type.ends_with("unauthorized-agent"));
    }

    #[test]
    fn test_wire_format_shape() {
        let error = Ap2Error::mandate_already_revoked("revoked-456");
        let value = serde_json::to_value(&error).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "https://ap2-protocol.org/errors/mandate-already-revoked",
                "title": "Mandate Already Revoked",
                "status": 409,
                "detail": "Mandate revoked-456 has already been revoked and cannot be used.",
                "mandate_reference": "revoked-456",
            })
        );
    }

    #[test]
    fn test_mandate_reference_omitted_when_absent() {
        let error = Ap2Error::payment_declined("Card declined");
        let value = serde_json::to_value(&error).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("mandate_reference"));
        assert_eq!(object.len(), 4);
        for key in ["type", "title", "status", "detail"] {
            assert!(object.contains_key(key), "missing key '{key}'");
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        for kind in ErrorKind::ALL {
            let error = Ap2Error::from_kind(kind, format!("detail for {kind}"))
                .with_mandate_reference("mandate-42");
            let encoded = serde_json::to_string(&error).unwrap();
            let decoded: Ap2Error = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, error);
        }
    }

    #[test]
    fn test_display_uses_title_and_detail() {
        let error = Ap2Error::mandate_not_found("missing-9");
        let rendered = error.to_string();
        assert!(rendered.contains("Mandate Not Found"));
        assert!(rendered.contains("missing-9"));
    }
}
