// Host override tests
// Kept in their own binary: the override is read from the process environment
#![allow(clippy::unwrap_used)]

use http::header::{HOST, HeaderValue};
use lambda_api_proxy::RequestTranslator;
use lambda_api_proxy::models::{AlbTargetGroupRequest, ApiGatewayProxyRequest};
use lambda_api_proxy::proxy::CUSTOM_HOST_VARIABLE;
use lambda_api_proxy::proxy::request::RequestAccessor;
use lambda_api_proxy::proxy::request_alb::RequestAccessorAlb;

#[test]
#[allow(unsafe_code)]
fn test_custom_host_overrides_event_host() {
    // SAFETY: this is the only test in the binary, so nothing reads the environment concurrently.
    unsafe { std::env::set_var(CUSTOM_HOST_VARIABLE, "override.example.com") };

    let mut rest = ApiGatewayProxyRequest::default();
    rest.path = Some("/orders".to_string());
    rest.request_context.domain_name = Some("api.example.com".to_string());
    let request = RequestAccessor::default().event_to_request(&rest).unwrap();
    assert_eq!(request.uri().scheme_str(), Some("https"));
    assert_eq!(request.uri().host(), Some("override.example.com"));
    assert_eq!(request.uri().path(), "/orders");

    let mut alb = AlbTargetGroupRequest::default();
    alb.path = Some("/lambda".to_string());
    alb.headers
        .insert(HOST, HeaderValue::from_static("lambda-alb.elb.amazonaws.com"));
    let request = RequestAccessorAlb::default().event_to_request(&alb).unwrap();
    assert_eq!(request.uri().host(), Some("override.example.com"));

    // SAFETY: as above.
    unsafe { std::env::set_var(CUSTOM_HOST_VARIABLE, "http://localhost:3000/") };
    let request = RequestAccessor::default().event_to_request(&rest).unwrap();
    assert_eq!(request.uri().to_string(), "http://localhost:3000/orders");

    // SAFETY: as above.
    unsafe { std::env::remove_var(CUSTOM_HOST_VARIABLE) };
    let request = RequestAccessor::default().event_to_request(&rest).unwrap();
    assert_eq!(request.uri().host(), Some("api.example.com"));
}
