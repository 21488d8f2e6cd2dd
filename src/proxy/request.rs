//! Translation of API Gateway REST API (payload format 1.0) events.

use http::Request;
use lambda_runtime::Context;
use lambda_runtime::tracing::debug;
use std::collections::HashMap;

use super::context::{ApiGatewayContext, SourceIp};
use super::response::ApiGatewayV1;
use super::{
    API_GW_CONTEXT_HEADER, API_GW_STAGE_VARS_HEADER, ProxyRequest, RequestTranslator,
    build_request, custom_host, decode_body, insert_context_header, populate_headers,
    read_context_header, resolve_path, resolve_query, server_address,
};
use crate::models::{ApiGatewayProxyRequest, ApiGatewayProxyRequestContext, Result};
use crate::utils;

/// Request translator for REST API proxy events.
#[derive(Debug, Clone, Default)]
pub struct RequestAccessor {
    base_path: String,
}

impl RequestAccessor {
    /// Reads the request context stored by [`RequestTranslator::proxy_event_to_request`].
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or does not hold a REST API request context.
    pub fn api_gateway_context<B>(request: &Request<B>) -> Result<ApiGatewayProxyRequestContext> {
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

impl RequestTranslator for RequestAccessor {
    type Event = ApiGatewayProxyRequest;
    type Dialect = ApiGatewayV1;

    fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.base_path = utils::normalize_base_path(base_path);
        &self.base_path
    }

    fn response_dialect(&self, _event: &ApiGatewayProxyRequest) -> ApiGatewayV1 {
        ApiGatewayV1
    }

    fn event_to_request(&self, event: &ApiGatewayProxyRequest) -> Result<ProxyRequest> {
        let body = decode_body(event.body.as_deref(), event.is_base64_encoded)?;
        let path = resolve_path(
            event.path.as_deref().unwrap_or_default(),
            event.request_context.path.as_deref(),
            &self.base_path,
        );
        let address = server_address(
            custom_host().as_deref(),
            event.request_context.domain_name.as_deref(),
            None,
        );
        let query = resolve_query(
            None,
            Some(&event.multi_value_query_string_parameters),
            event.query_string_parameters.iter(),
        );

        let mut request =
            build_request(event.http_method.as_str(), &address, &path, &query, body)?;
        populate_headers(
            request.headers_mut(),
            &event.multi_value_headers,
            &event.headers,
        )?;
        if let Some(source_ip) = &event.request_context.identity.source_ip {
            request.extensions_mut().insert(SourceIp(source_ip.clone()));
        }

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Translated REST API event"
        );
        Ok(request)
    }

    fn proxy_event_to_request(&self, event: &ApiGatewayProxyRequest) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        insert_context_header(&mut request, API_GW_CONTEXT_HEADER, &event.request_context)?;
        insert_context_header(&mut request, API_GW_STAGE_VARS_HEADER, &event.stage_variables)?;
        Ok(request)
    }

    fn event_to_request_with_context(
        &self,
        context: Context,
        event: &ApiGatewayProxyRequest,
    ) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        request.extensions_mut().insert(ApiGatewayContext {
            lambda_context: context,
            request_context: event.request_context.clone(),
            stage_variables: event.stage_variables.clone(),
        });
        Ok(request)
    }
}
