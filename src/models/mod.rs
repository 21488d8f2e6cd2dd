//! Event shapes exchanged with the trigger sources, plus the crate error type.

pub mod error;

pub use aws_lambda_events::alb::{
    AlbTargetGroupRequest, AlbTargetGroupRequestContext, AlbTargetGroupResponse,
};
pub use aws_lambda_events::apigw::{
    ApiGatewayProxyRequest, ApiGatewayProxyRequestContext, ApiGatewayProxyResponse,
    ApiGatewayV2httpRequest, ApiGatewayV2httpRequestContext, ApiGatewayV2httpResponse,
};
pub use aws_lambda_events::lambda_function_urls::{
    LambdaFunctionUrlRequest, LambdaFunctionUrlRequestContext, LambdaFunctionUrlResponse,
};
pub use aws_lambda_events::query_map::QueryMap;
pub use error::{Error, Result};
