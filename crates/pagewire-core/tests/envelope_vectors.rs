//! Reply envelope normalization tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use pagewire_core::protocol::{normalize, RawReply, ResponseEnvelope};

#[test]
fn structured_reply_passes_through() {
    let raw = RawReply::Json(json!({
        "errcode": 0,
        "message": "Added to favorites",
        "data": { "IsCancel": false }
    }));
    let env = normalize(raw).unwrap();
    assert!(env.is_success());
    assert_eq!(env.message, "Added to favorites");
    assert!(!env.is_cancel());
}

#[test]
fn text_reply_is_parsed() {
    let raw = RawReply::Text(r#"{"errcode":1,"message":"Title already exists"}"#.into());
    let env = normalize(raw).unwrap();
    assert_eq!(env.errcode, 1);
    assert_eq!(env.message, "Title already exists");
    assert!(env.data.is_none());
}

#[test]
fn json_string_value_is_parsed_once() {
    let raw = RawReply::Json(json!(r#"{"errcode":0,"message":"ok","data":{"url":"/d/1.pdf"}}"#));
    let env = normalize(raw).unwrap();
    assert_eq!(env.redirect_url(), Some("/d/1.pdf"));
}

#[test]
fn string_and_object_forms_agree() {
    let env = ResponseEnvelope::failure(6002, "no permission").with_data(json!({ "IsCancel": true }));
    let encoded = env.encode().unwrap();

    let from_text = normalize(RawReply::Text(encoded)).unwrap();
    let from_json = normalize(RawReply::Json(serde_json::to_value(&env).unwrap())).unwrap();

    assert_eq!(from_text, env);
    assert_eq!(from_json, env);
}

#[test]
fn malformed_replies_are_protocol_errors() {
    let bad = [
        RawReply::Text(String::new()),
        RawReply::Text("   ".into()),
        RawReply::Text("<html>502 Bad Gateway</html>".into()),
        RawReply::Text(r#"{"errcode":0"#.into()),
        RawReply::Text("[1,2,3]".into()),
        RawReply::Json(json!(42)),
        RawReply::Json(json!({ "message": "no errcode" })),
        RawReply::Json(json!({ "errcode": 0 })),
        RawReply::Json(json!({ "errcode": "0", "message": "stringly" })),
    ];

    for raw in bad {
        let err = normalize(raw.clone()).expect_err("must fail");
        assert_eq!(err.kind().as_str(), "PROTOCOL", "raw={raw:?}");
    }
}

#[test]
fn null_data_reads_as_absent() {
    let env = normalize(RawReply::Text(r#"{"errcode":0,"message":"ok","data":null}"#.into())).unwrap();
    assert!(env.data.is_none());
    assert_eq!(env.redirect_url(), None);
}

#[test]
fn nonzero_errcode_becomes_application_error() {
    let err = ResponseEnvelope::failure(6004, "name required")
        .into_result()
        .expect_err("must fail");
    assert_eq!(err.kind().as_str(), "APPLICATION");
    assert!(err.to_string().contains("name required"));

    assert!(ResponseEnvelope::success("ok").into_result().is_ok());
}
