use crate::errors::{ClaimKind, DomainError, RejectionReason};

#[test]
fn test_rejection_converts_into_domain_error() {
    let error: DomainError = RejectionReason::TokenRevoked.into();
    assert_eq!(error.rejection(), Some(RejectionReason::TokenRevoked));
    assert!(!error.is_infrastructure());
    assert_eq!(error.to_string(), "Token revoked");
}

#[test]
fn test_infrastructure_errors_are_not_rejections() {
    let storage = DomainError::storage("connection refused");
    assert!(storage.is_infrastructure());
    assert!(storage.rejection().is_none());

    let keygen = DomainError::KeyGenerationFailed {
        message: "entropy".to_string(),
    };
    assert!(keygen.is_infrastructure());

    let internal = DomainError::Internal {
        message: "bug".to_string(),
    };
    assert!(!internal.is_infrastructure());
}

#[test]
fn test_claim_invalid_names_the_claim() {
    let reason = RejectionReason::claim(ClaimKind::Audience);
    assert_eq!(reason.to_string(), "Invalid token claim: aud");
    assert_eq!(reason.code(), "claim_invalid");
}

#[test]
fn test_rejection_codes_are_distinct() {
    let reasons = [
        RejectionReason::MalformedToken,
        RejectionReason::UnknownKey,
        RejectionReason::DecryptionFailed,
        RejectionReason::SignatureInvalid,
        RejectionReason::claim(ClaimKind::Issuer),
        RejectionReason::TokenExpired,
        RejectionReason::TokenRevoked,
        RejectionReason::SubjectNotFound,
        RejectionReason::ExpiredOrRevoked,
    ];

    let codes: std::collections::HashSet<_> = reasons.iter().map(|r| r.code()).collect();
    assert_eq!(codes.len(), reasons.len());
}
