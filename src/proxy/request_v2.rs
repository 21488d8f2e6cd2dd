//! Translation of API Gateway HTTP API (payload format 2.0) events.

use http::{HeaderMap, Request};
use lambda_runtime::Context;
use lambda_runtime::tracing::debug;
use std::collections::HashMap;

use super::context::{ApiGatewayV2Context, SourceIp};
use super::response::ApiGatewayV2;
use super::{
    API_GW_CONTEXT_HEADER, API_GW_STAGE_VARS_HEADER, ProxyRequest, RequestTranslator,
    append_cookies, build_request, custom_host, decode_body, insert_context_header,
    populate_headers, read_context_header, resolve_path, resolve_query, server_address,
};
use crate::models::{ApiGatewayV2httpRequest, ApiGatewayV2httpRequestContext, Result};
use crate::utils;

/// Request translator for HTTP API events.
#[derive(Debug, Clone, Default)]
pub struct RequestAccessorV2 {
    base_path: String,
}

impl RequestAccessorV2 {
    /// Reads the request context stored by [`RequestTranslator::proxy_event_to_request`].
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or does not hold an HTTP API request context.
    pub fn api_gateway_context<B>(
        request: &Request<B>,
    ) -> Result<ApiGatewayV2httpRequestContext> {
        read_context_header(request, API_GW_CONTEXT_HEADER)
    }

    /// Reads the stage variables stored by [`RequestTranslator::proxy_event_to_request`].
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or does not hold a JSON object of strings.
    pub fn stage_vars<B>(request: &Request<B>) -> Result<HashMap<String, String>> {
        read_context_header(request, API_GW_STAGE_VARS_HEADER)
    }
}

impl RequestTranslator for RequestAccessorV2 {
    type Event = ApiGatewayV2httpRequest;
    type Dialect = ApiGatewayV2;

    fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.base_path = utils::normalize_base_path(base_path);
        &self.base_path
    }

    fn response_dialect(&self, _event: &ApiGatewayV2httpRequest) -> ApiGatewayV2 {
        ApiGatewayV2
    }

    fn event_to_request(&self, event: &ApiGatewayV2httpRequest) -> Result<ProxyRequest> {
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
            event.query_string_parameters.iter(),
        );

        let mut request = build_request(http.method.as_str(), &address, &path, &query, body)?;
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
            "Translated HTTP API event"
        );
        Ok(request)
    }

    fn proxy_event_to_request(&self, event: &ApiGatewayV2httpRequest) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        insert_context_header(&mut request, API_GW_CONTEXT_HEADER, &event.request_context)?;
        insert_context_header(&mut request, API_GW_STAGE_VARS_HEADER, &event.stage_variables)?;
        Ok(request)
    }

    fn event_to_request_with_context(
        &self,
        context: Context,
        event: &ApiGatewayV2httpRequest,
    ) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        request.extensions_mut().insert(ApiGatewayV2Context {
            lambda_context: context,
            request_context: event.request_context.clone(),
            stage_variables: event.stage_variables.clone(),
        });
        Ok(request)
    }
}
