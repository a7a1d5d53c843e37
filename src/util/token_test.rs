use super::*;
use crate::test_support::{FAR_FUTURE_SECS, LONG_AGO_SECS, NOW_MS, admin_token, expired_token, make_token};
use serde_json::json;

// =============================================================
// decode
// =============================================================

#[test]
fn decode_reads_subject_roles_and_times() {
    let claims = decode(&admin_token()).unwrap();
    assert_eq!(claims.subject.as_deref(), Some("admin@example.com"));
    assert!(claims.has_role("ROLE_ADMIN"));
    assert!(claims.has_role("ROLE_USER"));
    assert_eq!(claims.display_name.as_deref(), Some("Ada"));
    assert_eq!(claims.issued_at, Some(LONG_AGO_SECS));
    assert_eq!(claims.expires_at, Some(FAR_FUTURE_SECS));
}

#[test]
fn decode_accepts_sub_and_name_spellings() {
    let token = make_token(&json!({ "sub": "x@example.com", "name": "Xavier", "exp": FAR_FUTURE_SECS }));
    let claims = decode(&token).unwrap();
    assert_eq!(claims.subject.as_deref(), Some("x@example.com"));
    assert_eq!(claims.display_name.as_deref(), Some("Xavier"));
    assert!(claims.roles.is_empty());
}

#[test]
fn decode_prefers_username_over_sub() {
    let token = make_token(&json!({ "sub": "42", "username": "a@example.com" }));
    assert_eq!(decode(&token).unwrap().subject.as_deref(), Some("a@example.com"));
}

#[test]
fn decode_tolerates_padded_payload() {
    let token = admin_token();
    let mut parts: Vec<String> = token.split('.').map(ToOwned::to_owned).collect();
    parts[1].push_str("==");
    let padded = parts.join(".");
    assert!(decode(&padded).is_ok());
}

#[test]
fn decode_rejects_wrong_segment_count() {
    assert_eq!(decode("abc.def"), Err(DecodeError::SegmentCount(2)));
    assert_eq!(decode("not-a-token"), Err(DecodeError::SegmentCount(1)));
    assert_eq!(decode("a.b.c.d"), Err(DecodeError::SegmentCount(4)));
}

#[test]
fn decode_rejects_empty_segment() {
    assert_eq!(decode("header..sig"), Err(DecodeError::EmptySegment(1)));
}

#[test]
fn decode_rejects_non_base64_payload() {
    assert!(matches!(decode("header.!!!.sig"), Err(DecodeError::Base64(_))));
}

#[test]
fn decode_rejects_non_object_payload() {
    let body = URL_SAFE_NO_PAD.encode("[1,2,3]");
    assert!(matches!(decode(&format!("h.{body}.s")), Err(DecodeError::Payload(_))));

    let body = URL_SAFE_NO_PAD.encode("plain text");
    assert!(matches!(decode(&format!("h.{body}.s")), Err(DecodeError::Payload(_))));
}

#[test]
fn decode_accepts_fractional_times() {
    let token = make_token(&json!({ "username": "a@b.c", "iat": 1_577_836_800.25, "exp": 1_893_456_000.9 }));
    let claims = decode(&token).unwrap();
    assert_eq!(claims.issued_at, Some(LONG_AGO_SECS));
    assert_eq!(claims.expires_at, Some(FAR_FUTURE_SECS));
    assert!(validate(&token, NOW_MS).is_ok());
}

#[test]
fn decode_treats_null_times_as_absent() {
    let claims = decode(&make_token(&json!({ "exp": null, "iat": null }))).unwrap();
    assert_eq!(claims.expires_at, None);
    assert_eq!(claims.issued_at, None);
}

#[test]
fn decode_rejects_non_numeric_expiry() {
    let token = make_token(&json!({ "exp": "tomorrow" }));
    assert!(matches!(decode(&token), Err(DecodeError::Payload(_))));
}

// =============================================================
// expiry
// =============================================================

#[test]
fn expiry_compares_seconds_against_milliseconds() {
    let token = make_token(&json!({ "exp": 1_000 }));
    let claims = decode(&token).unwrap();
    assert!(!claims.is_expired_at(999_999));
    assert!(claims.is_expired_at(1_000_000));
    assert!(claims.is_expired_at(1_000_001));
}

#[test]
fn missing_expiry_counts_as_expired() {
    let claims = decode(&make_token(&json!({ "username": "a@b.c" }))).unwrap();
    assert!(claims.is_expired_at(0));
}

#[test]
fn validate_accepts_future_expiry() {
    assert!(validate(&admin_token(), NOW_MS).is_ok());
}

#[test]
fn validate_rejects_past_expiry() {
    assert_eq!(
        validate(&expired_token(), NOW_MS),
        Err(TokenError::Expired { expires_at: LONG_AGO_SECS })
    );
}

#[test]
fn validate_rejects_missing_expiry() {
    let token = make_token(&json!({ "username": "a@b.c" }));
    assert_eq!(validate(&token, NOW_MS), Err(TokenError::MissingExpiry));
}

#[test]
fn validate_wraps_decode_errors() {
    assert_eq!(
        validate("garbage", NOW_MS),
        Err(TokenError::Decode(DecodeError::SegmentCount(1)))
    );
}
