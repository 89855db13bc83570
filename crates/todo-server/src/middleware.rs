//! Request middleware: legacy `/tasks` redirect and request logging.

use std::time::Instant;

use axum::extract::Request;
use axum::http::{StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use ::metrics::{counter, histogram};
use tracing::info;

use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

const LEGACY_PREFIX: &str = "/tasks";
const CANONICAL_PREFIX: &str = "/todos";

/// Where a `/tasks` request should be sent, if anywhere.
///
/// `/tasks` and `/tasks/<rest>` map to `/todos` and `/todos/<rest>`; the
/// query string is carried over. Anything else returns `None`.
pub fn redirect_target(uri: &Uri) -> Option<String> {
    let path = uri.path();
    let rest = path.strip_prefix(LEGACY_PREFIX)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    let mut target = format!("{CANONICAL_PREFIX}{rest}");
    if let Some(query) = uri.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

/// Answer `/tasks/*` with `302 Found` pointing at `/todos/*`.
pub async fn redirect_legacy_paths(req: Request, next: Next) -> Response {
    match redirect_target(req.uri()) {
        Some(target) => {
            info!(from = %req.uri(), to = %target, "redirecting legacy path");
            (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
        }
        None => next.run(req).await,
    }
}

/// Log method, path and UTC time when a request starts and when it finishes.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    info!(%method, %path, at = %utc_now(), "request started");
    let response = next.run(req).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    info!(
        %method,
        %path,
        status,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        at = %utc_now(),
        "request finished"
    );

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(elapsed.as_secs_f64());

    response
}

fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
