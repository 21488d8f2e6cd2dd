//! Run conventional HTTP handlers behind API Gateway, ALB and Lambda function URL events.
//!
//! Each invocation's event is translated into an [`http::Request`], handed to a
//! [`Handler`], and whatever the handler writes is captured and turned back into the
//! outbound event of the same trigger source.

pub mod adapter;
pub mod handler;
pub mod models;
pub mod proxy;
pub mod utils;

pub use adapter::{
    HandlerAdapter, HandlerAdapterAlb, HandlerAdapterFnUrl, HandlerAdapterV2, ProxyAdapter,
    ProxyError, SwitchableAdapter,
};
pub use handler::{Handler, HandlerFn, handler_fn};
pub use models::{Error, Result};
pub use proxy::context::RequestExt;
pub use proxy::response::{ResponseSink, ResponseWriter};
pub use proxy::switchable::{SwitchableRequest, SwitchableResponse};
pub use proxy::{ProxyRequest, RequestTranslator};
