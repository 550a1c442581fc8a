use super::{InputMessage, OUTPUT_SCHEMA_VERSION, OutputEnvelope};
use crate::utils::error::{EncodingCause, FieldError, PublishError};
use serde_json::{Value, json};

fn sample_input() -> InputMessage {
    InputMessage::new(json!({
        "identity": {
            "identity": {
                "internal": { "org_id": "42" },
                "account_number": "7"
            }
        },
        "cluster_name": "c1",
        "timestamp": "2024-01-01T00:00:00Z",
        "request_id": "r1"
    }))
}

#[test]
fn test_extract_identity_from_strings() {
    let input = sample_input();
    assert_eq!(input.org_id().unwrap(), 42);
    assert_eq!(input.account_number().unwrap(), 7);
}

#[test]
fn test_extract_identity_from_numbers() {
    let input = InputMessage::new(json!({
        "identity": {
            "identity": {
                "internal": { "org_id": 1234.9 },
                "account_number": -5
            }
        }
    }));
    assert_eq!(input.org_id().unwrap(), 1234);
    assert_eq!(input.account_number().unwrap(), -5);
}

#[test]
fn test_extract_trims_whitespace() {
    let input = InputMessage::new(json!({
        "identity": { "identity": { "internal": { "org_id": " 17\n" } } }
    }));
    assert_eq!(input.org_id().unwrap(), 17);
}

#[test]
fn test_missing_org_id_names_the_key() {
    let input = InputMessage::new(json!({
        "identity": { "identity": { "internal": {}, "account_number": "1" } }
    }));
    match input.org_id() {
        Err(FieldError::MissingKey(key)) => assert_eq!(key, "org_id"),
        other => panic!("Expected a missing key, got {:?}", other),
    }
}

#[test]
fn test_missing_identity_block() {
    let input = InputMessage::new(json!({ "cluster_name": "c1" }));
    assert!(matches!(
        input.org_id(),
        Err(FieldError::MissingKey("identity"))
    ));
}

#[test]
fn test_non_numeric_account_number() {
    let input = InputMessage::new(json!({
        "identity": { "identity": { "account_number": "abc" } }
    }));
    match input.account_number() {
        Err(FieldError::NotNumeric { value, .. }) => assert_eq!(value, "abc"),
        other => panic!("Expected a parse failure, got {:?}", other),
    }
}

#[test]
fn test_wrong_types_are_rejected() {
    for bad in [json!(true), json!(null), json!([1]), json!({ "v": 1 })] {
        let input = InputMessage::new(json!({
            "identity": { "identity": { "internal": { "org_id": bad } } }
        }));
        assert!(
            matches!(input.org_id(), Err(FieldError::WrongType { key: "org_id", .. })),
            "value {:?} should be rejected",
            input.raw_org_id()
        );
    }
}

#[test]
fn test_non_object_parent_is_a_type_error() {
    let input = InputMessage::new(json!({ "identity": "nope" }));
    assert!(matches!(
        input.org_id(),
        Err(FieldError::WrongType { key: "identity", found: "a string" })
    ));

    let empty = InputMessage::default();
    assert!(matches!(
        empty.account_number(),
        Err(FieldError::WrongType { key: "message", found: "null" })
    ));
}

#[test]
fn test_huge_number_is_out_of_range() {
    let input = InputMessage::new(json!({
        "identity": { "identity": { "internal": { "org_id": u64::MAX } } }
    }));
    assert!(matches!(input.org_id(), Err(FieldError::OutOfRange(_))));
}

#[test]
fn test_build_envelope_matches_reference_example() {
    let input = sample_input();
    let envelope = OutputEnvelope::build(&input, 42, 7, "{\"a\":1}", OUTPUT_SCHEMA_VERSION).unwrap();

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "OrgID": 42,
            "AccountNumber": 7,
            "ClusterName": "c1",
            "Report": { "a": 1 },
            "LastChecked": "2024-01-01T00:00:00Z",
            "Version": 2,
            "RequestId": "r1"
        })
    );
}

#[test]
fn test_encode_keeps_field_order_and_newline() {
    let input = sample_input();
    let envelope = OutputEnvelope::build(&input, 42, 7, "{\"b\":2,\"a\":1}", 2).unwrap();
    let bytes = envelope.encode().unwrap();

    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
        text,
        "{\"OrgID\":42,\"AccountNumber\":7,\"ClusterName\":\"c1\",\"Report\":{\"b\":2,\"a\":1},\
         \"LastChecked\":\"2024-01-01T00:00:00Z\",\"Version\":2,\"RequestId\":\"r1\"}\n"
    );
    assert_eq!(text.matches('\n').count(), 1);
}

#[test]
fn test_absent_request_id_is_null() {
    let input = InputMessage::new(json!({
        "cluster_name": "c1",
        "timestamp": 1700000000
    }));
    let envelope = OutputEnvelope::build(&input, 1, 2, "[]", 2).unwrap();
    let value: Value = serde_json::from_slice(&envelope.encode().unwrap()).unwrap();
    assert_eq!(value["RequestId"], Value::Null);
    assert_eq!(value["LastChecked"], json!(1700000000));
}

#[test]
fn test_missing_timestamp_is_a_missing_field() {
    let input = InputMessage::new(json!({ "cluster_name": "c1" }));
    let err = OutputEnvelope::build(&input, 1, 2, "{}", 2).unwrap_err();
    assert!(matches!(err, PublishError::MissingField { key: "timestamp" }));
}

#[test]
fn test_missing_cluster_name_wins_over_bad_report() {
    let input = InputMessage::new(json!({ "timestamp": "t" }));
    let err = OutputEnvelope::build(&input, 1, 2, "not json", 2).unwrap_err();
    assert!(matches!(err, PublishError::MissingField { key: "cluster_name" }));
}

#[test]
fn test_invalid_report_is_an_encoding_error() {
    let input = sample_input();
    let err = OutputEnvelope::build(&input, 1, 2, "not json", 2).unwrap_err();
    match err {
        PublishError::Encoding { response, source } => {
            assert_eq!(response, "not json");
            assert!(matches!(source, EncodingCause::InvalidReport(_)));
        }
        other => panic!("Expected an encoding error, got {:?}", other),
    }
}

#[test]
fn test_non_string_cluster_name_is_an_encoding_error() {
    let input = InputMessage::new(json!({ "timestamp": "t", "cluster_name": 5 }));
    let err = OutputEnvelope::build(&input, 1, 2, "{}", 2).unwrap_err();
    assert!(matches!(
        err,
        PublishError::Encoding {
            source: EncodingCause::TypeMismatch { field: "cluster_name", .. },
            ..
        }
    ));
}

#[test]
fn test_display_field_renders_log_values() {
    let input = InputMessage::new(json!({ "topic": "in", "partition": 3, "offset": null }));
    assert_eq!(input.display_field(input.topic()), "in");
    assert_eq!(input.display_field(input.partition()), "3");
    assert_eq!(input.display_field(input.offset()), "-");
    assert_eq!(input.display_field(input.timestamp()), "-");
}
