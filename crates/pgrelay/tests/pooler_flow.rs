//! End-to-end use of the protocol layer the way a pooler drives it.

use pgrelay::prelude::*;
use pgrelay::protocol::{backend_type, error_response, startup_message};

fn backend_message(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![kind];
    buf.extend_from_slice(&((payload.len() + 4) as i32).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

#[test]
fn test_client_startup_routes_by_identity() {
    let packet = startup_message(&[
        ("user", "alice"),
        ("application_name", "psql"),
        ("client_encoding", "UTF8"),
    ]);

    let request = classify_request(&packet).unwrap();
    assert!(request.is_startup());

    let identity = extract_connection_identity(&packet).unwrap();
    assert_eq!(identity.username.as_deref(), Some("alice"));
    assert_eq!(identity.database.as_deref(), Some("alice"));
    assert_eq!(identity.application_name.as_deref(), Some("psql"));

    let params = parse_startup_parameters(&packet).unwrap();
    assert_eq!(params.get("client_encoding"), Some("UTF8"));
}

#[test]
fn test_client_startup_with_database() {
    let packet = startup_message(&[("user", "bob"), ("database", "salesdb")]);
    let identity = extract_connection_identity(&packet).unwrap();
    assert_eq!(identity.database.as_deref(), Some("salesdb"));
}

#[test]
fn test_startup_from_raw_socket_bytes() {
    let raw = startup_message(&[("user", "carol")]).as_bytes().to_vec();
    let packet = Message::untagged(&raw);
    assert_eq!(
        get_request_code(&packet).unwrap(),
        pgrelay::protocol::PROTOCOL_VERSION
    );
    let identity = extract_connection_identity(&packet).unwrap();
    assert_eq!(identity.username.as_deref(), Some("carol"));
}

#[test]
fn test_short_request_is_rejected() {
    let raw = [0_u8, 0, 0, 8];
    let err = get_request_code(&Message::untagged(&raw)).unwrap_err();
    assert!(err.is_malformed());
    assert!(get_request_code(&Message::untagged(&[])).is_err());
}

#[test]
fn test_backend_error_is_located_and_decoded() {
    let mut fields = Vec::new();
    for (code, value) in [
        (b'S', "ERROR"),
        (b'M', "relation \"x\" does not exist"),
        (b'C', "42P01"),
    ] {
        fields.push(code);
        fields.extend_from_slice(value.as_bytes());
        fields.push(0);
    }
    fields.push(0);

    let mut buf = backend_message(backend_type::PARAMETER_STATUS, b"TimeZone\0UTC\0");
    buf.extend(backend_message(backend_type::ERROR_RESPONSE, &fields));
    buf.extend(backend_message(backend_type::READY_FOR_QUERY, b"I"));

    let error = extract_message(backend_type::ERROR_RESPONSE, &buf)
        .unwrap()
        .expect("error response present");
    drop(buf);

    assert_eq!(
        extract_error_text(&error).unwrap().as_deref(),
        Some("relation \"x\" does not exist")
    );
    assert_eq!(parse_error_fields(&error).unwrap().code, "42P01");
}

#[test]
fn test_error_text_on_other_kind_is_usage_error() {
    let buf = backend_message(backend_type::READY_FOR_QUERY, b"I");
    let ready = extract_message(backend_type::READY_FOR_QUERY, &buf)
        .unwrap()
        .unwrap();
    let err = extract_error_text(&ready).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_pooler_refusal_roundtrips() {
    let refusal = error_response("FATAL", "53300", "connection pool is full");
    let relayed = refusal.as_bytes().to_vec();
    let located = extract_message(b'E', &relayed).unwrap().unwrap();
    assert_eq!(located, refusal);
    assert_eq!(
        extract_error_text(&located).unwrap().as_deref(),
        Some("connection pool is full")
    );
}

#[test]
fn test_limits_come_from_config() {
    let config: ProtocolConfig =
        serde_json::from_str(r#"{ "max_message_size": 16, "max_startup_packet_size": 32 }"#)
            .unwrap();

    let buf = backend_message(backend_type::DATA_ROW, &[0; 32]);
    assert!(matches!(
        pgrelay::protocol::extract_message_with(backend_type::DATA_ROW, &buf, &config),
        Err(ProtocolError::MessageTooLarge { .. })
    ));

    let packet = startup_message(&[("user", "a-rather-long-user-name")]);
    assert!(
        pgrelay::protocol::extract_connection_identity_with(&packet, &config).is_err()
    );
}

#[test]
fn test_state_labels_for_status_output() {
    assert_eq!(state_label(ConnectionState::InUse.as_tag()), "Active");
    assert_eq!(state_label(42), "Unknown");
    assert_eq!(ConnectionState::IdleCheck.to_string(), "Idle check");
}
