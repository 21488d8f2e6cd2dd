//! Translation of Lambda function URL events.

use http::{HeaderMap, Request};
use lambda_runtime::Context;
use lambda_runtime::tracing::debug;

use super::context::{FunctionUrlContext, SourceIp};
use super::response::FunctionUrl;
use super::{
    FN_URL_CONTEXT_HEADER, ProxyRequest, RequestTranslator, append_cookies, build_request,
    custom_host, decode_body, insert_context_header, populate_headers, read_context_header,
    resolve_path, resolve_query, server_address,
};
use crate::models::{LambdaFunctionUrlRequest, LambdaFunctionUrlRequestContext, Result};
use crate::utils;

/// Request translator for function URL events.
#[derive(Debug, Clone, Default)]
pub struct RequestAccessorFnUrl {
    base_path: String,
}

impl RequestAccessorFnUrl {
    /// Reads the request context stored by [`RequestTranslator::proxy_event_to_request`].
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or does not hold a function URL request context.
    pub fn function_url_context<B>(
        request: &Request<B>,
    ) -> Result<LambdaFunctionUrlRequestContext> {
        read_context_header(request, FN_URL_CONTEXT_HEADER)
    }
}

impl RequestTranslator for RequestAccessorFnUrl {
    type Event = LambdaFunctionUrlRequest;
    type Dialect = FunctionUrl;

    fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.base_path = utils::normalize_base_path(base_path);
        &self.base_path
    }

    fn response_dialect(&self, _event: &LambdaFunctionUrlRequest) -> FunctionUrl {
        FunctionUrl
    }

    fn event_to_request(&self, event: &LambdaFunctionUrlRequest) -> Result<ProxyRequest> {
        let http = &event.request_context.http;
        let body = decode_body(event.body.as_deref(), event.is_base64_encoded)?;
        let path = resolve_path(
            event.raw_path.as_deref().unwrap_or_default(),
            http.path.as_deref(),
            &self.base_path,
        );
        let address = server_address(
            custom_host().as_deref(),
            event.request_context.domain_name.as_deref(),
            None,
        );
        let query = resolve_query(
            event.raw_query_string.as_deref(),
            None,
            event
                .query_string_parameters
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        let method = http.method.as_deref().unwrap_or_default();
        let mut request = build_request(method, &address, &path, &query, body)?;
        populate_headers(request.headers_mut(), &HeaderMap::new(), &event.headers)?;
        append_cookies(
            request.headers_mut(),
            event.cookies.as_deref().unwrap_or_default(),
        )?;
        if let Some(source_ip) = &http.source_ip {
            request.extensions_mut().insert(SourceIp(source_ip.clone()));
        }

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Translated function URL event"
        );
        Ok(request)
    }

    fn proxy_event_to_request(&self, event: &LambdaFunctionUrlRequest) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        insert_context_header(&mut request, FN_URL_CONTEXT_HEADER, &event.request_context)?;
        Ok(request)
    }

    fn event_to_request_with_context(
        &self,
        context: Context,
        event: &LambdaFunctionUrlRequest,
    ) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        request.extensions_mut().insert(FunctionUrlContext {
            lambda_context: context,
            request_context: event.request_context.clone(),
        });
        Ok(request)
    }
}
