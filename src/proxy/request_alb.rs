//! Translation of ALB target group events.

use http::Request;
use http::header::HOST;
use lambda_runtime::Context;
use lambda_runtime::tracing::debug;

use super::context::AlbContext;
use super::response::Alb;
use super::{
    ALB_CONTEXT_HEADER, ProxyRequest, RequestTranslator, build_request, custom_host, decode_body,
    insert_context_header, populate_headers, read_context_header, resolve_path, resolve_query,
    server_address,
};
use crate::models::{AlbTargetGroupRequest, AlbTargetGroupRequestContext, Result};
use crate::utils;

/// Request translator for ALB events.
///
/// ALB events carry no domain name, so the URL host comes from the `Host` header.
#[derive(Debug, Clone, Default)]
pub struct RequestAccessorAlb {
    base_path: String,
}

impl RequestAccessorAlb {
    /// Reads the request context stored by [`RequestTranslator::proxy_event_to_request`].
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or does not hold an ALB request context.
    pub fn alb_context<B>(request: &Request<B>) -> Result<AlbTargetGroupRequestContext> {
        read_context_header(request, ALB_CONTEXT_HEADER)
    }
}

impl RequestTranslator for RequestAccessorAlb {
    type Event = AlbTargetGroupRequest;
    type Dialect = Alb;

    fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.base_path = utils::normalize_base_path(base_path);
        &self.base_path
    }

    fn response_dialect(&self, event: &AlbTargetGroupRequest) -> Alb {
        Alb {
            multi_value_headers: !event.multi_value_headers.is_empty(),
        }
    }

    fn event_to_request(&self, event: &AlbTargetGroupRequest) -> Result<ProxyRequest> {
        let body = decode_body(event.body.as_deref(), event.is_base64_encoded)?;
        let path = resolve_path(
            event.path.as_deref().unwrap_or_default(),
            None,
            &self.base_path,
        );
        let host = event
            .multi_value_headers
            .get(HOST)
            .or_else(|| event.headers.get(HOST))
            .and_then(|value| value.to_str().ok());
        let address = server_address(custom_host().as_deref(), None, host);
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

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Translated ALB event"
        );
        Ok(request)
    }

    fn proxy_event_to_request(&self, event: &AlbTargetGroupRequest) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        insert_context_header(&mut request, ALB_CONTEXT_HEADER, &event.request_context)?;
        Ok(request)
    }

    fn event_to_request_with_context(
        &self,
        context: Context,
        event: &AlbTargetGroupRequest,
    ) -> Result<ProxyRequest> {
        let mut request = self.event_to_request(event)?;
        request.extensions_mut().insert(AlbContext {
            lambda_context: context,
            request_context: event.request_context.clone(),
        });
        Ok(request)
    }
}
