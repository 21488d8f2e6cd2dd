use lambda_runtime::tracing::{debug, info};
use lambda_runtime::{Diagnostic, LambdaEvent};
use std::sync::Arc;

use crate::adapter::{ProxyError, SwitchableAdapter};
use crate::models::Error;
use crate::proxy::ProxyRequest;
use crate::proxy::response::ResponseWriter;
use crate::proxy::switchable::{SwitchableRequest, SwitchableResponse};

/// Dispatch entry point of a request-handling framework.
///
/// Called once per invocation with a fresh writer. Whatever the handler writes is returned
/// to the trigger source once `serve_http` returns.
pub trait Handler {
    fn serve_http(&self, writer: &mut dyn ResponseWriter, request: ProxyRequest);
}

/// Adapts a plain function or closure into a [`Handler`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerFn<F>(F);

/// Wraps `f` so it can be served by an adapter.
pub const fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, ProxyRequest),
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, ProxyRequest),
{
    fn serve_http(&self, writer: &mut dyn ResponseWriter, request: ProxyRequest) {
        (self.0)(writer, request);
    }
}

impl<H: Handler + ?Sized> Handler for &H {
    fn serve_http(&self, writer: &mut dyn ResponseWriter, request: ProxyRequest) {
        (**self).serve_http(writer, request);
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve_http(&self, writer: &mut dyn ResponseWriter, request: ProxyRequest) {
        (**self).serve_http(writer, request);
    }
}

fn diagnostic<R>(err: &ProxyError<R>) -> Diagnostic {
    let error_type = match err.error() {
        Error::StatusNotSet => "InvalidResponse",
        Error::Json(_) => "SerializationError",
        _ => "InvalidRequest",
    };
    Diagnostic {
        error_type: error_type.to_string(),
        error_message: err.to_string(),
    }
}

/// Lambda event handler serving REST API and HTTP API events through `adapter`.
/// Logs the request id at `info`, event details only when `RUST_LOG=debug/trace`.
///
/// # Errors
///
/// Returns a `Diagnostic` error with one of the following types:
///
/// - `InvalidRequest`: The event could not be translated into an HTTP request
/// - `InvalidResponse`: The handler returned without writing a body or setting a status
/// - `SerializationError`: The event context could not be encoded
pub fn function_handler<H: Handler>(
    adapter: &SwitchableAdapter<H>,
    event: LambdaEvent<SwitchableRequest>,
) -> Result<SwitchableResponse, Diagnostic> {
    let (payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "Proxying event");
    debug!("Event payload: {:?}", payload);

    adapter
        .proxy_with_context(context, payload)
        .map_err(|e| diagnostic(&e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::proxy::response::{ApiGatewayResponseSink, ApiGatewayV1, ResponseDialect};
    use http::{Request, StatusCode};

    #[test]
    fn test_handler_fn_dispatches() {
        let handler = handler_fn(|writer: &mut dyn ResponseWriter, request: ProxyRequest| {
            writer.write_status(StatusCode::ACCEPTED);
            writer.write_all(request.body()).unwrap();
        });

        let mut sink = ApiGatewayResponseSink::default();
        handler.serve_http(&mut sink, Request::new(b"queued".to_vec()));

        let response = sink.finish().unwrap();
        assert_eq!(response.status_code, 202);
        assert_eq!(serde_json::to_value(&response).unwrap()["body"], "queued");
    }

    #[test]
    fn test_diagnostic_types() {
        let err = ProxyError::new(ApiGatewayV1::gateway_timeout(), Error::StatusNotSet);
        let diag = diagnostic(&err);
        assert_eq!(diag.error_type, "InvalidResponse");
        assert!(diag.error_message.contains("status code not set on response"));

        let err = ProxyError::new((), Error::InvalidMethod("G ET".to_string()));
        assert_eq!(diagnostic(&err).error_type, "InvalidRequest");
    }
}
