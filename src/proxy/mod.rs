//! Translation between Lambda HTTP events and in-process `http` requests.
//!
//! Each trigger source has its own accessor (see [`request`], [`request_v2`],
//! [`request_alb`] and [`request_function_url`]) implementing [`RequestTranslator`].
//! The helpers in this module hold the rules they all share: body decoding, path and host
//! resolution, query re-encoding and header population.

pub mod context;
pub mod request;
pub mod request_alb;
pub mod request_function_url;
pub mod request_v2;
pub mod response;
pub mod sniff;
pub mod switchable;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::header::{COOKIE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri};
use lambda_runtime::Context;
use lambda_runtime::tracing::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Write as _;

use crate::models::{Error, QueryMap, Result};
use crate::utils;
use response::ResponseDialect;

/// Environment variable overriding the host of every translated request URL.
pub const CUSTOM_HOST_VARIABLE: &str = "LAMBDA_API_PROXY_HOST";

/// Scheme and host used when neither an override nor the event names a host.
pub const DEFAULT_SERVER_ADDRESS: &str = "https://aws-serverless-api.local";

/// Header carrying the JSON API Gateway request context (REST and HTTP APIs).
pub const API_GW_CONTEXT_HEADER: &str = "x-lambda-api-proxy-apigw-context";

/// Header carrying the JSON API Gateway stage variables.
pub const API_GW_STAGE_VARS_HEADER: &str = "x-lambda-api-proxy-apigw-stagevars";

/// Header carrying the JSON ALB request context.
pub const ALB_CONTEXT_HEADER: &str = "x-lambda-api-proxy-alb-context";

/// Header carrying the JSON function URL request context.
pub const FN_URL_CONTEXT_HEADER: &str = "x-lambda-api-proxy-fnurl-context";

/// The canonical request handed to handlers.
pub type ProxyRequest = Request<Vec<u8>>;

/// Converts one event dialect into a [`ProxyRequest`].
///
/// An accessor is configured once (see [`RequestTranslator::strip_base_path`]) and then
/// only read while translating. Translation is a pure function of the event and the
/// process environment.
pub trait RequestTranslator {
    /// Inbound event shape.
    type Event;
    /// Response dialect matching the event shape.
    type Dialect: ResponseDialect;

    /// Sets the base path removed from every inbound path and returns it normalized.
    fn strip_base_path(&mut self, base_path: &str) -> &str;

    /// Picks the response dialect for an event before it is consumed by the handler.
    fn response_dialect(&self, event: &Self::Event) -> Self::Dialect;

    /// Translates an event without attaching its context.
    ///
    /// # Errors
    ///
    /// Fails when the body is not valid base64, or when the method, URL or headers cannot
    /// form an HTTP request.
    fn event_to_request(&self, event: &Self::Event) -> Result<ProxyRequest>;

    /// Translates an event and attaches its context as JSON headers.
    ///
    /// # Errors
    ///
    /// As [`RequestTranslator::event_to_request`], plus context serialization failures.
    fn proxy_event_to_request(&self, event: &Self::Event) -> Result<ProxyRequest>;

    /// Translates an event and attaches its context, together with the invocation
    /// context, as request extensions.
    ///
    /// # Errors
    ///
    /// As [`RequestTranslator::event_to_request`].
    fn event_to_request_with_context(
        &self,
        context: Context,
        event: &Self::Event,
    ) -> Result<ProxyRequest>;
}

pub(crate) fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> Result<Vec<u8>> {
    let body = body.unwrap_or_default();
    if is_base64_encoded {
        return Ok(STANDARD.decode(body)?);
    }
    Ok(body.as_bytes().to_vec())
}

/// Picks the event path, strips the base path and guarantees a leading `/`.
pub(crate) fn resolve_path(path: &str, fallback: Option<&str>, base_path: &str) -> String {
    let path = if path.is_empty() {
        fallback.unwrap_or_default()
    } else {
        path
    };
    utils::ensure_leading_slash(utils::strip_base_path(path, base_path))
}

/// Reads the host override from the environment.
#[must_use]
pub fn custom_host() -> Option<String> {
    std::env::var(CUSTOM_HOST_VARIABLE).ok()
}

/// Resolves `scheme://host` for a request URL.
///
/// Precedence: override, then the event domain, then a `Host` header, then
/// [`DEFAULT_SERVER_ADDRESS`]. An override without a scheme is served over https.
#[must_use]
pub fn server_address(
    custom_host: Option<&str>,
    domain_name: Option<&str>,
    host_header: Option<&str>,
) -> String {
    if let Some(custom) = custom_host
        .map(|host| host.trim().trim_end_matches('/'))
        .filter(|host| !host.is_empty())
    {
        if custom.starts_with("http://") || custom.starts_with("https://") {
            return custom.to_string();
        }
        return format!("https://{custom}");
    }

    domain_name
        .or(host_header)
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map_or_else(
            || DEFAULT_SERVER_ADDRESS.to_string(),
            |host| format!("https://{host}"),
        )
}

/// Picks exactly one query source: raw string, then multi-value map, then single-value pairs.
///
/// Re-encoded pairs are ordered by key so the same event always yields the same URL.
pub(crate) fn resolve_query<'a>(
    raw: Option<&str>,
    multi: Option<&'a QueryMap>,
    single: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    if let Some(raw) = raw.filter(|raw| !raw.is_empty()) {
        return raw.to_string();
    }
    match multi.filter(|multi| !multi.is_empty()) {
        Some(multi) => encode_query(multi.iter()),
        None => encode_query(single),
    }
}

fn encode_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort_by_key(|(key, _)| *key);

    let mut query = String::new();
    for (key, value) in pairs {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&urlencoding::encode(key));
        query.push('=');
        query.push_str(&urlencoding::encode(value));
    }
    query
}

fn is_path_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@/%".contains(&byte)
}

fn is_query_byte(byte: u8) -> bool {
    is_path_byte(byte) || byte == b'?'
}

/// Percent-encodes every byte `keep` rejects. Existing escapes are left alone.
fn escape(input: &str, keep: fn(u8) -> bool) -> String {
    let mut escaped = String::with_capacity(input.len());
    for byte in input.bytes() {
        if keep(byte) {
            escaped.push(char::from(byte));
        } else {
            let _ = write!(escaped, "%{byte:02X}");
        }
    }
    escaped
}

/// Builds the request line of a [`ProxyRequest`]. An empty method means `GET`.
pub(crate) fn build_request(
    method: &str,
    server_address: &str,
    path: &str,
    query: &str,
    body: Vec<u8>,
) -> Result<ProxyRequest> {
    let method = if method.trim().is_empty() {
        Method::GET
    } else {
        let upper = method.to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes()).map_err(|_| Error::InvalidMethod(upper.clone()))?
    };

    let mut url = format!("{server_address}{}", escape(path, is_path_byte));
    if !query.is_empty() {
        url.push('?');
        url.push_str(&escape(query, is_query_byte));
    }
    let uri = url
        .parse::<Uri>()
        .map_err(|source| Error::InvalidUri { url, source })?;

    Ok(Request::builder().method(method).uri(uri).body(body)?)
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader {
        name: name.to_string(),
    })
}

/// Fills `headers` from the multi-value map, or from the comma-split single-value map when
/// the multi-value map is empty.
pub(crate) fn populate_headers(
    headers: &mut HeaderMap,
    multi: &HeaderMap,
    single: &HeaderMap,
) -> Result<()> {
    if !multi.is_empty() {
        for (name, value) in multi {
            headers.append(name.clone(), value.clone());
        }
        return Ok(());
    }

    for (name, value) in single {
        let Ok(joined) = value.to_str() else {
            // Opaque bytes cannot be split on commas.
            headers.append(name.clone(), value.clone());
            continue;
        };
        for part in joined.split(',').map(str::trim) {
            let part = header_value(name, part)?;
            headers.append(name.clone(), part);
        }
    }
    Ok(())
}

/// Re-emits a separate cookie list as individual `Cookie` headers.
pub(crate) fn append_cookies(headers: &mut HeaderMap, cookies: &[String]) -> Result<()> {
    for cookie in cookies {
        let value = header_value(&COOKIE, cookie)?;
        headers.append(COOKIE, value);
    }
    Ok(())
}

/// Stores `payload` as JSON in the header `name`, replacing any value sent by the caller.
pub(crate) fn insert_context_header<T: Serialize>(
    request: &mut ProxyRequest,
    name: &'static str,
    payload: &T,
) -> Result<()> {
    let json = serde_json::to_string(payload)?;
    let value = HeaderValue::try_from(json).map_err(|_| Error::InvalidHeader {
        name: name.to_string(),
    })?;
    request
        .headers_mut()
        .insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Reads back a payload stored by [`insert_context_header`].
pub(crate) fn read_context_header<T: DeserializeOwned, B>(
    request: &Request<B>,
    name: &'static str,
) -> Result<T> {
    let value = request
        .headers()
        .get(name)
        .ok_or(Error::MissingContextHeader(name))?;
    serde_json::from_slice(value.as_bytes()).map_err(|e| {
        warn!(header = name, error = %e, "Could not decode context header");
        Error::from(e)
    })
}
