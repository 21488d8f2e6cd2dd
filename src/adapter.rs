//! Dispatch shims: translate an event, run the handler against a fresh sink, and finish the
//! sink into the outbound event.
//!
//! Handler panics are not caught here.

use lambda_runtime::Context;
use lambda_runtime::tracing::error;

use crate::handler::Handler;
use crate::models::{Error, Result};
use crate::proxy::request::RequestAccessor;
use crate::proxy::request_alb::RequestAccessorAlb;
use crate::proxy::request_function_url::RequestAccessorFnUrl;
use crate::proxy::request_v2::RequestAccessorV2;
use crate::proxy::response::{ApiGatewayV1, ApiGatewayV2, ResponseDialect, ResponseSink};
use crate::proxy::switchable::{SwitchableRequest, SwitchableResponse};
use crate::proxy::{ProxyRequest, RequestTranslator};

/// Outbound event type produced for translator `T`.
pub type DialectResponse<T> = <<T as RequestTranslator>::Dialect as ResponseDialect>::Response;

/// An invocation that could not be proxied.
///
/// Carries the gateway-timeout placeholder for the event's dialect next to the cause.
#[derive(Debug, thiserror::Error)]
#[error("could not proxy event: {source}")]
pub struct ProxyError<R> {
    response: R,
    #[source]
    source: Error,
}

impl<R> ProxyError<R> {
    #[must_use]
    pub const fn new(response: R, source: Error) -> Self {
        Self { response, source }
    }

    /// Placeholder response that should be returned in place of the real one.
    #[must_use]
    pub const fn response(&self) -> &R {
        &self.response
    }

    #[must_use]
    pub fn into_response(self) -> R {
        self.response
    }

    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.source
    }

    #[must_use]
    pub fn map_response<S>(self, f: impl FnOnce(R) -> S) -> ProxyError<S> {
        ProxyError {
            response: f(self.response),
            source: self.source,
        }
    }
}

fn gateway_timeout<D: ResponseDialect>(source: Error) -> ProxyError<D::Response> {
    error!(error = %source, "Could not proxy event");
    ProxyError::new(D::gateway_timeout(), source)
}

/// Runs `handler` against a translated request and finishes the captured response.
fn dispatch<D, H>(
    handler: &H,
    dialect: D,
    request: Result<ProxyRequest>,
) -> Result<D::Response, ProxyError<D::Response>>
where
    D: ResponseDialect,
    H: Handler + ?Sized,
{
    let request = request.map_err(gateway_timeout::<D>)?;
    let mut sink = ResponseSink::new(dialect);
    handler.serve_http(&mut sink, request);
    sink.finish().map_err(gateway_timeout::<D>)
}

/// Serves one event dialect through a [`Handler`].
#[derive(Debug, Clone, Default)]
pub struct ProxyAdapter<T, H> {
    translator: T,
    handler: H,
}

/// REST API (payload format 1.0) adapter.
pub type HandlerAdapter<H> = ProxyAdapter<RequestAccessor, H>;
/// HTTP API (payload format 2.0) adapter.
pub type HandlerAdapterV2<H> = ProxyAdapter<RequestAccessorV2, H>;
/// ALB target group adapter.
pub type HandlerAdapterAlb<H> = ProxyAdapter<RequestAccessorAlb, H>;
/// Function URL adapter.
pub type HandlerAdapterFnUrl<H> = ProxyAdapter<RequestAccessorFnUrl, H>;

impl<T: RequestTranslator + Default, H: Handler> ProxyAdapter<T, H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self::with_translator(T::default(), handler)
    }
}

impl<T: RequestTranslator, H: Handler> ProxyAdapter<T, H> {
    #[must_use]
    pub const fn with_translator(translator: T, handler: H) -> Self {
        Self {
            translator,
            handler,
        }
    }

    /// Sets the base path stripped from every event path and returns it normalized.
    ///
    /// Call before serving events.
    pub fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.translator.strip_base_path(base_path)
    }

    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Proxies an event, exposing its request context to the handler through headers.
    ///
    /// # Errors
    ///
    /// Fails when the event cannot be translated or the handler produced no response. The
    /// error carries a gateway-timeout placeholder and has already been logged.
    pub fn proxy(
        &self,
        event: T::Event,
    ) -> Result<DialectResponse<T>, ProxyError<DialectResponse<T>>> {
        let dialect = self.translator.response_dialect(&event);
        let request = self.translator.proxy_event_to_request(&event);
        dispatch(&self.handler, dialect, request)
    }

    /// Proxies an event, exposing its request context and the invocation context to the
    /// handler through request extensions.
    ///
    /// # Errors
    ///
    /// As [`ProxyAdapter::proxy`].
    pub fn proxy_with_context(
        &self,
        context: Context,
        event: T::Event,
    ) -> Result<DialectResponse<T>, ProxyError<DialectResponse<T>>> {
        let dialect = self.translator.response_dialect(&event);
        let request = self.translator.event_to_request_with_context(context, &event);
        dispatch(&self.handler, dialect, request)
    }
}

/// Serves both API Gateway payload versions through one [`Handler`].
#[derive(Debug, Clone, Default)]
pub struct SwitchableAdapter<H> {
    v1: RequestAccessor,
    v2: RequestAccessorV2,
    handler: H,
}

impl<H: Handler> SwitchableAdapter<H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            v1: RequestAccessor::default(),
            v2: RequestAccessorV2::default(),
            handler,
        }
    }

    /// Sets the base path for both payload versions and returns it normalized.
    pub fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.v1.strip_base_path(base_path);
        self.v2.strip_base_path(base_path)
    }

    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Proxies either payload version, exposing the request context through headers.
    ///
    /// # Errors
    ///
    /// As [`ProxyAdapter::proxy`]; the placeholder matches the payload version.
    pub fn proxy(
        &self,
        event: SwitchableRequest,
    ) -> Result<SwitchableResponse, ProxyError<SwitchableResponse>> {
        match event {
            SwitchableRequest::V1(event) => switch(dispatch(
                &self.handler,
                ApiGatewayV1,
                self.v1.proxy_event_to_request(&event),
            )),
            SwitchableRequest::V2(event) => switch(dispatch(
                &self.handler,
                ApiGatewayV2,
                self.v2.proxy_event_to_request(&event),
            )),
        }
    }

    /// Proxies either payload version, exposing the contexts through request extensions.
    ///
    /// # Errors
    ///
    /// As [`SwitchableAdapter::proxy`].
    pub fn proxy_with_context(
        &self,
        context: Context,
        event: SwitchableRequest,
    ) -> Result<SwitchableResponse, ProxyError<SwitchableResponse>> {
        match event {
            SwitchableRequest::V1(event) => switch(dispatch(
                &self.handler,
                ApiGatewayV1,
                self.v1.event_to_request_with_context(context, &event),
            )),
            SwitchableRequest::V2(event) => switch(dispatch(
                &self.handler,
                ApiGatewayV2,
                self.v2.event_to_request_with_context(context, &event),
            )),
        }
    }
}

fn switch<R: Into<SwitchableResponse>>(
    result: Result<R, ProxyError<R>>,
) -> Result<SwitchableResponse, ProxyError<SwitchableResponse>> {
    result
        .map(Into::into)
        .map_err(|err| err.map_response(Into::into))
}
