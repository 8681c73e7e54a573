use api_contract::{ApiResponse, PlcCreateRequest, SendCommandRequest};

#[test]
fn response_with_data_serializes_both_fields() {
    let response = ApiResponse::with_data("PLC added successfully", vec![1, 2, 3]);
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json["message"], "PLC added successfully");
    assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
}

#[test]
fn message_only_response_omits_data() {
    let response = ApiResponse::message("PLC record not found");
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json["message"], "PLC record not found");
    assert!(json.get("data").is_none());
}

#[test]
fn create_request_defaults_optional_fields() {
    let request: PlcCreateRequest = serde_json::from_str(
        r#"{"plc_id": "PLC1", "ip_address": "192.168.1.1", "port": 502}"#,
    )
    .expect("deserialize");
    assert_eq!(request.plc_id, "PLC1");
    assert!(request.unit_id.is_none());
    assert!(request.status.is_none());
}

#[test]
fn send_command_accepts_legacy_command_field() {
    let request: SendCommandRequest =
        serde_json::from_str(r#"{"plc_id": "PLC1", "command": 3, "value": 17}"#)
            .expect("deserialize");
    assert_eq!(request.register_address, 3);
    assert_eq!(request.value, 17);
}
