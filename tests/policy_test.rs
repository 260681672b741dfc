//! Integration tests for policy files

use serde_json::json;
use std::io::Write;
use tablemask::domain::FailureKind;
use tablemask::masking::{load_policy, load_policy_document, MaskingKind, MaskingPolicy};
use tempfile::NamedTempFile;
use test_case::test_case;

fn write_policy(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_policy_file() {
    let file = write_policy(
        r#"{
            "fields": {
                "email": { "maskingType": "partial" },
                "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" },
                "notes": { "maskingType": "shuffle" }
            }
        }"#,
    );

    let policy = load_policy(file.path()).unwrap();

    assert_eq!(policy.len(), 3);
    assert_eq!(policy.rule("email").unwrap().kind, MaskingKind::Partial);
    assert_eq!(policy.rule("ssn").unwrap().replacement_text(), Some("XXX-XX-"));
    assert_eq!(
        policy.rule("notes").unwrap().kind,
        MaskingKind::Unrecognized("shuffle".to_string())
    );
    assert!(policy.rule("id").is_none());
}

#[test]
fn test_empty_fields_is_valid() {
    let policy = MaskingPolicy::parse(&json!({ "fields": {} })).unwrap();
    assert!(policy.is_empty());
}

#[test]
fn test_extra_top_level_keys_are_ignored() {
    let policy = MaskingPolicy::parse(&json!({
        "version": 2,
        "fields": { "ssn": { "maskingType": "redact", "replacement": "X" } }
    }))
    .unwrap();
    assert_eq!(policy.len(), 1);
}

#[test_case(json!([]); "document is an array")]
#[test_case(json!({}); "missing fields")]
#[test_case(json!({ "fields": [] }); "fields is not a mapping")]
#[test_case(json!({ "fields": { "ssn": "last_4" } }); "rule is not an object")]
#[test_case(json!({ "fields": { "ssn": {} } }); "rule without masking type")]
#[test_case(json!({ "fields": { "ssn": { "maskingType": 4 } } }); "masking type is not a string")]
fn test_malformed_policy(document: serde_json::Value) {
    let err = MaskingPolicy::parse(&document).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidPolicy);
}

#[test]
fn test_missing_policy_file() {
    let err = load_policy("/nonexistent/policy.json").unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidPolicy);
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_policy_file_not_json() {
    let file = write_policy("fields:\n  ssn: redact\n");
    let err = load_policy_document(file.path()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidPolicy);
}

#[test]
fn test_fingerprint_changes_with_content() {
    let a = MaskingPolicy::parse(&json!({ "fields": { "ssn": { "maskingType": "partial" } } })).unwrap();
    let b = MaskingPolicy::parse(&json!({ "fields": { "ssn": { "maskingType": "redact", "replacement": "X" } } })).unwrap();
    assert_ne!(a.fingerprint(), b.fingerprint());
}
