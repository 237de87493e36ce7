pub mod compression;
pub mod health;
pub mod rsa;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use codec_core::config::Config;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

async fn handle_timeout(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Wires every route, mirroring the `chi.Route` groups in
/// `internal/handler/handler.go` under the codec names this workspace
/// uses.
///
/// `config.read_timeout + config.write_timeout` becomes a single
/// per-request [`TimeoutLayer`] bound: `axum::serve`'s high-level API
/// doesn't expose the separate per-connection read/write/idle timeouts
/// `http.Server` sets natively (see `DESIGN.md`), so the two are combined
/// into the one knob tower-http actually offers. `config.idle_timeout` has
/// no equivalent at this level and is not applied.
pub fn build_router(config: &Config) -> Router {
    let request_timeout = config.read_timeout + config.write_timeout;
    Router::new()
        .route("/compression/{algo}/compress", post(compression::compress))
        .route("/compression/{algo}/decompress", post(compression::decompress))
        .route("/rsa/generate-keys", post(rsa::generate_keys))
        .route("/rsa/encrypt", post(rsa::encrypt))
        .route("/rsa/decrypt", post(rsa::decrypt))
        .route("/healthz", get(health::healthz))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
}
