//! Tests for access token verification through the service facade

use chrono::Duration;

use crate::domain::entities::{AccessClaims, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE};
use crate::errors::{ClaimKind, DomainError, RejectionReason};
use crate::services::token::{Encrypted, LoadedKeyPair, Signed, TokenServiceConfig, Verification};

use super::support::{alice, t0, Harness};

fn craft(pair: &LoadedKeyPair, claims: &AccessClaims, typ: &str) -> String {
    let signed = Signed::sign(claims, typ, pair.kid(), pair.encoding_key()).unwrap();
    Encrypted::seal(&signed, pair.kid(), pair.public_key())
        .unwrap()
        .to_compact()
}

fn claims_at(issued_offset: Duration) -> AccessClaims {
    AccessClaims::new(
        &alice(),
        "warden",
        "warden-clients",
        t0() + issued_offset,
        Duration::minutes(15),
    )
}

#[tokio::test]
async fn test_fresh_token_is_valid() {
    let harness = Harness::new().await;
    let tokens = harness.service.authorize("alice").await.unwrap();

    let verified = harness
        .service
        .authenticate(&tokens.access_token)
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(verified.subject.id, "alice");
    assert_eq!(verified.subject.email.as_deref(), Some("alice@example.com"));
    assert_eq!(verified.claims.roles, vec!["reader".to_string()]);
    assert!(!verified.jti().is_empty());
    assert_eq!(tokens.access_expires_at, t0() + Duration::minutes(15));
}

#[tokio::test]
async fn test_expiry_boundary_with_tolerance() {
    let harness = Harness::new().await;
    let tokens = harness.service.authorize("alice").await.unwrap();

    harness.clock.set(t0() + Duration::minutes(14));
    assert!(harness.service.authenticate(&tokens.access_token).await.unwrap().is_valid());

    // Inside the 60s tolerance past exp
    harness.clock.set(t0() + Duration::seconds(15 * 60 + 30));
    assert!(harness.service.authenticate(&tokens.access_token).await.unwrap().is_valid());

    harness.clock.set(t0() + Duration::minutes(16));
    assert_eq!(
        harness.rejection(&tokens.access_token).await,
        RejectionReason::TokenExpired
    );
}

#[tokio::test]
async fn test_unknown_subject_cannot_be_authorized() {
    let harness = Harness::new().await;

    let err = harness.service.authorize("mallory").await.unwrap_err();
    assert_eq!(err.rejection(), Some(RejectionReason::SubjectNotFound));
}

#[tokio::test]
async fn test_garbage_is_malformed() {
    let harness = Harness::new().await;

    assert_eq!(
        harness.rejection("not-a-token").await,
        RejectionReason::MalformedToken
    );
}

#[tokio::test]
async fn test_token_from_foreign_key_store_is_unknown_key() {
    let ours = Harness::new().await;
    let theirs = Harness::new().await;
    let tokens = theirs.service.authorize("alice").await.unwrap();

    assert_eq!(
        ours.rejection(&tokens.access_token).await,
        RejectionReason::UnknownKey
    );
}

#[tokio::test]
async fn test_signature_from_other_pair_rejected() {
    let harness = Harness::new().await;
    let keys = harness.service.key_manager();

    let old = keys.get_active_pair().await.unwrap();
    harness.clock.advance(Duration::hours(2));
    let current = keys.get_active_pair().await.unwrap();
    harness.clock.set(t0());

    // Signed with the old private key but labelled and sealed for the current pair
    let signed = Signed::sign(&claims_at(Duration::zero()), ACCESS_TOKEN_TYPE, current.kid(), old.encoding_key())
        .unwrap();
    let token = Encrypted::seal(&signed, current.kid(), current.public_key())
        .unwrap()
        .to_compact();

    assert_eq!(
        harness.rejection(&token).await,
        RejectionReason::SignatureInvalid
    );
}

#[tokio::test]
async fn test_claim_mismatches_rejected() {
    let harness = Harness::new().await;
    let pair = harness.service.key_manager().get_active_pair().await.unwrap();

    let mut claims = claims_at(Duration::zero());
    claims.iss = "someone-else".to_string();
    assert_eq!(
        harness.rejection(&craft(&pair, &claims, ACCESS_TOKEN_TYPE)).await,
        RejectionReason::claim(ClaimKind::Issuer)
    );

    let mut claims = claims_at(Duration::zero());
    claims.aud = "another-app".to_string();
    assert_eq!(
        harness.rejection(&craft(&pair, &claims, ACCESS_TOKEN_TYPE)).await,
        RejectionReason::claim(ClaimKind::Audience)
    );

    let claims = claims_at(Duration::zero());
    assert_eq!(
        harness.rejection(&craft(&pair, &claims, REFRESH_TOKEN_TYPE)).await,
        RejectionReason::claim(ClaimKind::TokenType)
    );
}

#[tokio::test]
async fn test_time_claims_rejected() {
    let harness = Harness::new().await;
    let pair = harness.service.key_manager().get_active_pair().await.unwrap();

    let future = claims_at(Duration::minutes(5));
    assert_eq!(
        harness.rejection(&craft(&pair, &future, ACCESS_TOKEN_TYPE)).await,
        RejectionReason::claim(ClaimKind::IssuedAt)
    );

    // Long-lived token that outlasts the maximum age
    let mut stale = claims_at(-Duration::minutes(20));
    stale.exp = (t0() + Duration::minutes(10)).timestamp();
    assert_eq!(
        harness.rejection(&craft(&pair, &stale, ACCESS_TOKEN_TYPE)).await,
        RejectionReason::claim(ClaimKind::MaxAge)
    );
}

#[tokio::test]
async fn test_missing_jti_is_malformed() {
    let harness = Harness::new().await;
    let pair = harness.service.key_manager().get_active_pair().await.unwrap();

    let mut claims = claims_at(Duration::zero());
    claims.jti = None;

    assert_eq!(
        harness.rejection(&craft(&pair, &claims, ACCESS_TOKEN_TYPE)).await,
        RejectionReason::MalformedToken
    );
}

#[tokio::test]
async fn test_removed_subject_rejected() {
    let harness = Harness::new().await;
    let tokens = harness.service.authorize("alice").await.unwrap();

    harness.subjects.remove("alice").await;

    assert_eq!(
        harness.rejection(&tokens.access_token).await,
        RejectionReason::SubjectNotFound
    );
}

#[tokio::test]
async fn test_token_survives_key_rotation() {
    let config = TokenServiceConfig {
        key_lifetime: Duration::minutes(10),
        ..TokenServiceConfig::default()
    };
    let harness = Harness::with_config(config).await;
    let before = harness.service.authorize("alice").await.unwrap();

    harness.clock.advance(Duration::minutes(11));
    let after = harness.service.authorize("alice").await.unwrap();

    let old = harness.service.authenticate(&before.access_token).await.unwrap();
    let new = harness.service.authenticate(&after.access_token).await.unwrap();

    let (Verification::Valid(old), Verification::Valid(new)) = (old, new) else {
        panic!("both tokens should verify across a rotation");
    };
    assert_ne!(old.kid, new.kid);
}

#[tokio::test]
async fn test_storage_outage_is_not_a_rejection() {
    let harness = Harness::new().await;
    let tokens = harness.service.authorize("alice").await.unwrap();

    harness.revocations.set_down(true);

    let err = harness
        .service
        .authenticate(&tokens.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::StorageUnavailable { .. }));
    assert!(err.rejection().is_none());
}
