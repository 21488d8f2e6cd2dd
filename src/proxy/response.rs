//! Response capture: handlers write into a [`ResponseSink`] as they would into a live
//! connection, and the sink is then finished into the outbound event of one dialect.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::header::{CONTENT_TYPE, HeaderValue, SET_COOKIE};
use http::{HeaderMap, StatusCode};
use lambda_runtime::tracing::debug;
use std::io;
use tokio::sync::oneshot;

use super::sniff::detect_content_type;
use crate::models::{
    AlbTargetGroupResponse, ApiGatewayProxyResponse, ApiGatewayV2httpResponse, Error,
    LambdaFunctionUrlResponse, Result,
};

const GATEWAY_TIMEOUT: i64 = 504;

/// The write surface handed to handlers.
///
/// Body bytes go through [`io::Write`]. The first body write without an explicit status
/// implies `200 OK`.
pub trait ResponseWriter: io::Write {
    fn headers(&self) -> &HeaderMap;
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the status, replacing any earlier explicit or implied one.
    fn write_status(&mut self, status: StatusCode);
}

/// Final state of a sink, with the body already encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Shapes a [`RecordedResponse`] into one outbound event type.
pub trait ResponseDialect {
    type Response;

    fn build(&self, response: RecordedResponse) -> Self::Response;

    /// Placeholder returned when an event cannot be proxied.
    fn gateway_timeout() -> Self::Response;
}

/// REST API responses: every header in `multiValueHeaders`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiGatewayV1;

/// HTTP API responses: comma-joined `headers`, `Set-Cookie` moved to `cookies`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiGatewayV2;

/// ALB responses. Mirrors the header mode of the inbound event: a target group with
/// multi-value headers enabled only accepts `multiValueHeaders` back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alb {
    pub multi_value_headers: bool,
}

/// Function URL responses: comma-joined `headers`, `Set-Cookie` moved to `cookies`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionUrl;

impl ApiGatewayV1 {
    /// Bare `500` response for failures outside the handler.
    #[must_use]
    pub fn internal_server_error() -> ApiGatewayProxyResponse {
        let mut response = ApiGatewayProxyResponse::default();
        response.status_code = 500;
        response
    }
}

impl ResponseDialect for ApiGatewayV1 {
    type Response = ApiGatewayProxyResponse;

    fn build(&self, response: RecordedResponse) -> ApiGatewayProxyResponse {
        let mut out = ApiGatewayProxyResponse::default();
        out.status_code = i64::from(response.status.as_u16());
        out.multi_value_headers = response.headers;
        out.body = Some(response.body.into());
        out.is_base64_encoded = response.is_base64_encoded;
        out
    }

    fn gateway_timeout() -> ApiGatewayProxyResponse {
        let mut response = ApiGatewayProxyResponse::default();
        response.status_code = GATEWAY_TIMEOUT;
        response
    }
}

impl ResponseDialect for ApiGatewayV2 {
    type Response = ApiGatewayV2httpResponse;

    fn build(&self, response: RecordedResponse) -> ApiGatewayV2httpResponse {
        let mut out = ApiGatewayV2httpResponse::default();
        out.status_code = i64::from(response.status.as_u16());
        out.headers = joined_headers(&response.headers, true);
        out.cookies = set_cookies(&response.headers);
        out.body = Some(response.body.into());
        out.is_base64_encoded = response.is_base64_encoded;
        out
    }

    fn gateway_timeout() -> ApiGatewayV2httpResponse {
        let mut response = ApiGatewayV2httpResponse::default();
        response.status_code = GATEWAY_TIMEOUT;
        response
    }
}

impl ResponseDialect for Alb {
    type Response = AlbTargetGroupResponse;

    fn build(&self, response: RecordedResponse) -> AlbTargetGroupResponse {
        let mut out = AlbTargetGroupResponse::default();
        out.status_code = i64::from(response.status.as_u16());
        out.status_description = Some(status_description(response.status));
        if self.multi_value_headers {
            out.multi_value_headers = response.headers;
        } else {
            out.headers = joined_headers(&response.headers, false);
        }
        out.body = Some(response.body.into());
        out.is_base64_encoded = response.is_base64_encoded;
        out
    }

    fn gateway_timeout() -> AlbTargetGroupResponse {
        let mut response = AlbTargetGroupResponse::default();
        response.status_code = GATEWAY_TIMEOUT;
        response.status_description = Some(status_description(StatusCode::GATEWAY_TIMEOUT));
        response
    }
}

impl ResponseDialect for FunctionUrl {
    type Response = LambdaFunctionUrlResponse;

    fn build(&self, response: RecordedResponse) -> LambdaFunctionUrlResponse {
        let mut out = LambdaFunctionUrlResponse {
            status_code: 0,
            headers: HeaderMap::new(),
            body: None,
            is_base64_encoded: false,
            cookies: Vec::new(),
        };
        out.status_code = i64::from(response.status.as_u16());
        out.headers = joined_headers(&response.headers, true);
        out.cookies = set_cookies(&response.headers);
        out.body = Some(response.body);
        out.is_base64_encoded = response.is_base64_encoded;
        out
    }

    fn gateway_timeout() -> LambdaFunctionUrlResponse {
        let mut response = LambdaFunctionUrlResponse {
            status_code: 0,
            headers: HeaderMap::new(),
            body: None,
            is_base64_encoded: false,
            cookies: Vec::new(),
        };
        response.status_code = GATEWAY_TIMEOUT;
        response
    }
}

/// In-memory stand-in for a response connection.
///
/// Created per invocation, written during a single dispatch and finished exactly once.
#[derive(Debug)]
pub struct ResponseSink<D> {
    dialect: D,
    headers: HeaderMap,
    body: Vec<u8>,
    status: Option<StatusCode>,
    written: bool,
    observers: Vec<oneshot::Sender<()>>,
}

pub type ApiGatewayResponseSink = ResponseSink<ApiGatewayV1>;
pub type ApiGatewayV2ResponseSink = ResponseSink<ApiGatewayV2>;
pub type AlbResponseSink = ResponseSink<Alb>;
pub type FunctionUrlResponseSink = ResponseSink<FunctionUrl>;

impl<D: Default> Default for ResponseSink<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D> ResponseSink<D> {
    #[must_use]
    pub fn new(dialect: D) -> Self {
        Self {
            dialect,
            headers: HeaderMap::new(),
            body: Vec::new(),
            status: None,
            written: false,
            observers: Vec::new(),
        }
    }

    /// Status set so far, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a receiver that resolves once the sink is finished.
    pub fn close_notify(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.observers.push(tx);
        rx
    }

    fn notify_closed(&mut self) {
        for observer in self.observers.drain(..) {
            // A dropped receiver means nobody is waiting any more.
            let _ = observer.send(());
        }
    }
}

impl<D: ResponseDialect> ResponseSink<D> {
    /// Converts the captured response into the dialect's outbound event.
    ///
    /// Observers registered through [`ResponseSink::close_notify`] are notified first,
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StatusNotSet`] when the handler neither wrote a body nor set a
    /// status.
    pub fn finish(mut self) -> Result<D::Response> {
        self.notify_closed();

        let status = self.status.ok_or(Error::StatusNotSet)?;
        let (body, is_base64_encoded) = match String::from_utf8(self.body) {
            Ok(text) => (text, false),
            Err(err) => (STANDARD.encode(err.as_bytes()), true),
        };
        debug!(
            status = status.as_u16(),
            body_len = body.len(),
            is_base64_encoded,
            "Captured response"
        );

        Ok(self.dialect.build(RecordedResponse {
            status,
            headers: self.headers,
            body,
            is_base64_encoded,
        }))
    }
}

impl<D> io::Write for ResponseSink<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        if !self.written {
            self.written = true;
            if !self.headers.contains_key(CONTENT_TYPE) {
                self.headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(detect_content_type(buf)),
                );
            }
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<D> ResponseWriter for ResponseSink<D> {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

/// Collapses repeated headers into one comma-joined value per name.
fn joined_headers(headers: &HeaderMap, skip_set_cookie: bool) -> HeaderMap {
    let mut joined = HeaderMap::new();
    for name in headers.keys() {
        if skip_set_cookie && *name == SET_COOKIE {
            continue;
        }
        let bytes = headers
            .get_all(name)
            .iter()
            .map(HeaderValue::as_bytes)
            .collect::<Vec<_>>()
            .join(&b","[..]);
        if let Ok(value) = HeaderValue::from_bytes(&bytes) {
            joined.insert(name.clone(), value);
        }
    }
    joined
}

fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .collect()
}

/// `"200 OK"` style description used by ALB.
fn status_description(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
