// Response capture tests
#![allow(clippy::unwrap_used)]

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue, SET_COOKIE};
use lambda_api_proxy::proxy::response::{
    Alb, AlbResponseSink, ApiGatewayResponseSink, ApiGatewayV2ResponseSink,
    FunctionUrlResponseSink,
};
use lambda_api_proxy::{Error, ResponseWriter};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

fn body_of<T: Serialize>(response: &T) -> Value {
    serde_json::to_value(response).unwrap()["body"].clone()
}

#[test]
fn test_empty_sink_fails_to_finish() {
    let sink = ApiGatewayResponseSink::default();
    let err = sink.finish().unwrap_err();
    assert!(matches!(err, Error::StatusNotSet));
    assert_eq!(err.to_string(), "status code not set on response");
}

#[test]
fn test_text_body_is_returned_verbatim() {
    let mut sink = ApiGatewayResponseSink::default();
    sink.write_all(b"hello").unwrap();

    let response = sink.finish().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(body_of(&response), "hello");
    assert!(!response.is_base64_encoded);
}

#[test]
fn test_binary_body_is_base64_encoded() {
    let bytes: [u8; 5] = [0xff, 0xfe, 0x00, 0x10, 0x80];
    let mut sink = ApiGatewayResponseSink::default();
    sink.write_all(&bytes).unwrap();

    let response = sink.finish().unwrap();
    assert!(response.is_base64_encoded);
    assert_eq!(body_of(&response), STANDARD.encode(bytes).as_str());
}

#[test]
fn test_content_type_is_detected_before_write_completes() {
    let mut sink = ApiGatewayResponseSink::default();
    assert!(sink.headers().get(CONTENT_TYPE).is_none());

    sink.write_all(&[0x00, 0x01, 0x02, 0x03]).unwrap();
    assert_eq!(
        sink.headers().get(CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[test]
fn test_preset_content_type_is_kept() {
    let mut sink = ApiGatewayResponseSink::default();
    sink.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("image/x-custom"));
    sink.write_all(b"<html></html>").unwrap();

    let response = sink.finish().unwrap();
    assert_eq!(response.multi_value_headers[CONTENT_TYPE], "image/x-custom");
    assert_eq!(
        response.multi_value_headers.get_all(CONTENT_TYPE).iter().count(),
        1
    );
}

#[test]
fn test_explicit_status_overrides_implied_status() {
    let mut sink = ApiGatewayV2ResponseSink::default();
    sink.write_all(b"partial").unwrap();
    assert_eq!(sink.status(), Some(StatusCode::OK));

    sink.write_status(StatusCode::SERVICE_UNAVAILABLE);
    let response = sink.finish().unwrap();
    assert_eq!(response.status_code, 503);
    assert_eq!(body_of(&response), "partial");
}

#[test]
fn test_close_notify_fires_on_finish() {
    let mut sink = FunctionUrlResponseSink::default();
    let first = sink.close_notify();
    let second = sink.close_notify();
    let dropped = sink.close_notify();
    drop(dropped);

    sink.write_status(StatusCode::OK);
    sink.finish().unwrap();

    tokio_test::block_on(async {
        first.await.unwrap();
        second.await.unwrap();
    });
}

#[test]
fn test_close_notify_fires_even_when_finish_fails() {
    let mut sink = ApiGatewayResponseSink::default();
    let mut closed = sink.close_notify();

    assert!(sink.finish().is_err());
    assert!(closed.try_recv().is_ok());
}

#[test]
fn test_function_url_cookies() {
    let mut sink = FunctionUrlResponseSink::default();
    sink.headers_mut()
        .append(SET_COOKIE, HeaderValue::from_static("id=a3fWa; Max-Age=2592000"));
    sink.write_status(StatusCode::FOUND);

    let response = sink.finish().unwrap();
    assert_eq!(response.status_code, 302);
    assert_eq!(response.cookies, vec!["id=a3fWa; Max-Age=2592000"]);
    assert!(response.headers.is_empty());
}

#[test]
fn test_alb_single_value_headers_are_joined() {
    let mut sink = AlbResponseSink::new(Alb {
        multi_value_headers: false,
    });
    sink.headers_mut()
        .append("x-tag", HeaderValue::from_static("a"));
    sink.headers_mut()
        .append("x-tag", HeaderValue::from_static("b"));
    sink.write_all(b"{\"ok\":true}").unwrap();

    let response = sink.finish().unwrap();
    assert_eq!(response.status_description.as_deref(), Some("200 OK"));
    assert_eq!(response.headers["x-tag"], "a,b");
    assert_eq!(response.headers[CONTENT_TYPE], "application/json");
    assert!(response.multi_value_headers.is_empty());
}
