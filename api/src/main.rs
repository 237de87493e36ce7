//! HTTP shell exposing the RLE/Huffman/Arithmetic/LZW codecs and textbook
//! RSA over a small REST surface. The Rust analog of
//! `internal/app/api/server.go` + `cmd/.../main.go`: read config, build
//! the router, serve, shut down on signal.

#[tokio::main]
async fn main() {
    let config = codec_core::config::Config::from_env();
    env_logger::Builder::new().parse_filters(&config.log_env).init();

    let app = api::routes::build_router(&config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    log::info!("server started, address {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("stopping REST server");
}
