use artifact_vault_core::{
    content_hash, Record, RecordBody, RecordKind, RecordState, UNKNOWN_LABEL,
};
use uuid::Uuid;

#[test]
fn new_artifact_sets_defaults() {
    let record = Record::new_artifact("hello");

    assert!(!record.id.is_nil());
    assert_eq!(record.kind(), RecordKind::Artifact);
    assert_eq!(record.state, RecordState::Accepted);
    assert_eq!(record.spine_label, UNKNOWN_LABEL);
    assert_eq!(record.hash, content_hash("hello"));
    assert_eq!(record.raw(), Some("hello"));
    assert_eq!(record.contains(), None);
}

#[test]
fn new_container_has_synthetic_hash_and_no_members() {
    let record = Record::new_container("Taxes");

    assert_eq!(record.kind(), RecordKind::Container);
    assert!(record.hash.starts_with("container:"));
    assert_eq!(record.raw(), None);
    assert_eq!(record.contains(), Some(&[][..]));
}

#[test]
fn artifact_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let record = Record {
        id,
        created_at: "2026-02-13T10:00:00.000Z".to_string(),
        state: RecordState::Frozen,
        spine_label: "Lease".to_string(),
        hash: content_hash("lease text"),
        body: RecordBody::Artifact {
            raw: "lease text".to_string(),
        },
        extra: Default::default(),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["createdAt"], "2026-02-13T10:00:00.000Z");
    assert_eq!(json["state"], "FROZEN");
    assert_eq!(json["type"], "ARTIFACT");
    assert_eq!(json["hash"], content_hash("lease text"));
    assert_eq!(json["raw"], "lease text");
    assert_eq!(json["spineLabel"], "Lease");
    assert!(json.get("contains").is_none());

    let decoded: Record = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn container_serialization_carries_empty_raw_and_contains() {
    let member = Uuid::new_v4();
    let mut record = Record::new_container("Folder");
    record.contains_mut().unwrap().push(member);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["type"], "CONTAINER");
    assert_eq!(json["raw"], "");
    assert_eq!(json["contains"], serde_json::json!([member.to_string()]));

    let decoded: Record = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn deserialize_defaults_missing_optional_fields() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "hash": "99162322",
        "raw": "hello"
    });

    let record: Record = serde_json::from_value(value).unwrap();
    assert_eq!(record.kind(), RecordKind::Artifact);
    assert_eq!(record.state, RecordState::Accepted);
    assert_eq!(record.spine_label, "");
    assert_eq!(record.display_label(), UNKNOWN_LABEL);
}

#[test]
fn deserialize_container_without_contains_is_empty() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "state": "ACCEPTED",
        "type": "CONTAINER",
        "hash": "container:abc",
        "raw": "",
        "spineLabel": "Old folder"
    });

    let record: Record = serde_json::from_value(value).unwrap();
    assert_eq!(record.contains(), Some(&[][..]));
}

#[test]
fn deserialize_preserves_unknown_state_values() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "state": "REVIEW",
        "hash": "0"
    });

    let record: Record = serde_json::from_value(value).unwrap();
    assert_eq!(record.state, RecordState::Other("REVIEW".to_string()));
    assert_eq!(serde_json::to_value(&record).unwrap()["state"], "REVIEW");
}

#[test]
fn deserialize_rejects_nil_id() {
    let value = serde_json::json!({
        "id": "00000000-0000-0000-0000-000000000000",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "hash": "0"
    });

    let err = serde_json::from_value::<Record>(value).unwrap_err();
    assert!(
        err.to_string().contains("record id must not be nil"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialize_rejects_container_listing_itself() {
    let id = "11111111-2222-4333-8444-555555555555";
    let value = serde_json::json!({
        "id": id,
        "createdAt": "2025-01-01T00:00:00.000Z",
        "type": "CONTAINER",
        "hash": "container:x",
        "contains": [id]
    });

    let err = serde_json::from_value::<Record>(value).unwrap_err();
    assert!(err.to_string().contains("must not contain itself"));
}

#[test]
fn deserialize_rejects_unknown_type() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "type": "FOLDER",
        "hash": "0"
    });

    assert!(serde_json::from_value::<Record>(value).is_err());
}

#[test]
fn unknown_fields_survive_decode_and_encode() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "createdAt": "2025-01-01T00:00:00.000Z",
        "state": "ACCEPTED",
        "type": "ARTIFACT",
        "hash": "97",
        "raw": "a",
        "spineLabel": "Note",
        "tags": ["keep"],
        "source": { "app": "mobile" }
    });

    let record: Record = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(record.extra.len(), 2);
    assert_eq!(record.extra["tags"], serde_json::json!(["keep"]));

    assert_eq!(serde_json::to_value(&record).unwrap(), value);
}

#[test]
fn new_records_carry_no_extra_fields() {
    let json = serde_json::to_value(Record::new_artifact("fresh")).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 7, "unexpected keys: {keys:?}");
}
