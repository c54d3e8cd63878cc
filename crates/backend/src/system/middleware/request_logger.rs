use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs method, path, status and duration of every HTTP request
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();
    let size = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if status.is_server_error() {
        tracing::error!(
            "{} {} -> {} in {}ms ({})",
            method,
            path,
            status.as_u16(),
            elapsed_ms,
            format_size(size)
        );
    } else if status.is_client_error() {
        tracing::warn!(
            "{} {} -> {} in {}ms ({})",
            method,
            path,
            status.as_u16(),
            elapsed_ms,
            format_size(size)
        );
    } else {
        tracing::info!(
            "{} {} -> {} in {}ms ({})",
            method,
            path,
            status.as_u16(),
            elapsed_ms,
            format_size(size)
        );
    }

    response
}

fn format_size(size: Option<u64>) -> String {
    match size {
        None => "streamed".to_string(),
        Some(n) if n < 1024 => format!("{} B", n),
        Some(n) => format!("{:.1} KB", n as f64 / 1024.0),
    }
}
