//! Context payloads attached to translated requests as extensions.
//!
//! Extensions travel with the request value itself, so they survive frameworks that strip
//! unknown headers, but they are lost if a handler rebuilds the request without them.

use http::Request;
use lambda_runtime::Context;
use std::collections::HashMap;

use crate::models::{
    AlbTargetGroupRequestContext, ApiGatewayProxyRequestContext, ApiGatewayV2httpRequestContext,
    LambdaFunctionUrlRequestContext,
};

/// Attached to requests translated from REST API events.
#[derive(Debug, Clone)]
pub struct ApiGatewayContext {
    pub lambda_context: Context,
    pub request_context: ApiGatewayProxyRequestContext,
    pub stage_variables: HashMap<String, String>,
}

/// Attached to requests translated from HTTP API events.
#[derive(Debug, Clone)]
pub struct ApiGatewayV2Context {
    pub lambda_context: Context,
    pub request_context: ApiGatewayV2httpRequestContext,
    pub stage_variables: HashMap<String, String>,
}

/// Attached to requests translated from ALB events.
#[derive(Debug, Clone)]
pub struct AlbContext {
    pub lambda_context: Context,
    pub request_context: AlbTargetGroupRequestContext,
}

/// Attached to requests translated from function URL events.
#[derive(Debug, Clone)]
pub struct FunctionUrlContext {
    pub lambda_context: Context,
    pub request_context: LambdaFunctionUrlRequestContext,
}

/// Address of the caller as reported by the trigger source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIp(pub String);

/// Read access to the extensions set by the request translators.
pub trait RequestExt {
    fn api_gateway_context(&self) -> Option<&ApiGatewayContext>;
    fn api_gateway_v2_context(&self) -> Option<&ApiGatewayV2Context>;
    fn alb_context(&self) -> Option<&AlbContext>;
    fn function_url_context(&self) -> Option<&FunctionUrlContext>;

    /// Stage variables of whichever API Gateway context is attached.
    fn stage_variables(&self) -> Option<&HashMap<String, String>>;

    /// Invocation context of whichever event context is attached.
    fn lambda_context(&self) -> Option<&Context>;

    fn source_ip(&self) -> Option<&str>;
}

impl<B> RequestExt for Request<B> {
    fn api_gateway_context(&self) -> Option<&ApiGatewayContext> {
        self.extensions().get()
    }

    fn api_gateway_v2_context(&self) -> Option<&ApiGatewayV2Context> {
        self.extensions().get()
    }

    fn alb_context(&self) -> Option<&AlbContext> {
        self.extensions().get()
    }

    fn function_url_context(&self) -> Option<&FunctionUrlContext> {
        self.extensions().get()
    }

    fn stage_variables(&self) -> Option<&HashMap<String, String>> {
        self.api_gateway_context()
            .map(|ctx| &ctx.stage_variables)
            .or_else(|| self.api_gateway_v2_context().map(|ctx| &ctx.stage_variables))
    }

    fn lambda_context(&self) -> Option<&Context> {
        self.api_gateway_context()
            .map(|ctx| &ctx.lambda_context)
            .or_else(|| self.api_gateway_v2_context().map(|ctx| &ctx.lambda_context))
            .or_else(|| self.alb_context().map(|ctx| &ctx.lambda_context))
            .or_else(|| self.function_url_context().map(|ctx| &ctx.lambda_context))
    }

    fn source_ip(&self) -> Option<&str> {
        self.extensions()
            .get::<SourceIp>()
            .map(|ip| ip.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_has_no_context() {
        let request = Request::new(());
        assert!(request.api_gateway_context().is_none());
        assert!(request.stage_variables().is_none());
        assert!(request.lambda_context().is_none());
        assert!(request.source_ip().is_none());
    }

    #[test]
    fn test_reads_attached_context() {
        let mut request = Request::new(());
        let mut lambda_context = Context::default();
        lambda_context.request_id = "req-1".to_string();
        request.extensions_mut().insert(AlbContext {
            lambda_context,
            request_context: AlbTargetGroupRequestContext::default(),
        });
        request
            .extensions_mut()
            .insert(SourceIp("203.0.113.7".to_string()));

        assert!(request.alb_context().is_some());
        assert!(request.stage_variables().is_none());
        assert_eq!(
            request.lambda_context().map(|ctx| ctx.request_id.as_str()),
            Some("req-1")
        );
        assert_eq!(request.source_ip(), Some("203.0.113.7"));
    }
}
