use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use lambda_api_proxy::handler::function_handler;
use lambda_api_proxy::{ProxyRequest, RequestExt, ResponseWriter, SwitchableAdapter, handler_fn};
use lambda_runtime::tracing::{error, info};
use lambda_runtime::{Error, service_fn};

/// Environment variable naming the base path stripped before routing.
const BASE_PATH_VARIABLE: &str = "LAMBDA_API_PROXY_BASE_PATH";

fn serve(writer: &mut dyn ResponseWriter, request: ProxyRequest) {
    let body: &[u8] = match request.uri().path() {
        "/hello" | "/ping" => b"pong",
        "/whoami" => {
            writer
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            request.source_ip().unwrap_or("unknown").as_bytes()
        }
        _ => {
            writer.write_status(StatusCode::NOT_FOUND);
            b"not found"
        }
    };
    if let Err(e) = writer.write_all(body) {
        error!(error = %e, "Failed to write response body");
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    let mut adapter = SwitchableAdapter::new(handler_fn(serve));
    if let Ok(base_path) = std::env::var(BASE_PATH_VARIABLE) {
        let base_path = adapter.strip_base_path(&base_path);
        info!(base_path = %base_path, "Stripping base path");
    }

    let adapter = &adapter;
    lambda_runtime::run(service_fn(move |event| async move {
        function_handler(adapter, event)
    }))
    .await
}
