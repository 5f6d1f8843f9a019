use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Router with CORS, body limit and request tracing applied.
///
/// Oversized bodies are rejected by the JSON extractor, so they get the same
/// `{"error": ...}` body as every other rejection.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router(state)
        .layer(DefaultBodyLimit::max(config.max_body_kb as usize * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(state, config);
    let addr = resolve(config).await?;

    #[cfg(feature = "tls")]
    if let Some(tls) = &config.tls {
        return tls::serve(addr, app, tls).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "Web server terminated unexpectedly")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn resolve(config: &ServerConfig) -> Result<SocketAddr> {
    let target = format!("{}:{}", config.host, config.port);
    tokio::net::lookup_host(&target)
        .await
        .with_context(|| format!("Invalid listen address {target}"))?
        .next()
        .with_context(|| format!("Listen address {target} did not resolve"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(feature = "tls")]
mod tls {
    use std::net::SocketAddr;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use axum::Router;
    use axum_server::Handle;
    use axum_server::tls_rustls::RustlsConfig;

    use crate::config::TlsConfig;

    pub(super) async fn serve(addr: SocketAddr, app: Router, tls: &TlsConfig) -> Result<()> {
        // A second install attempt fails harmlessly
        let _ = rustls::crypto::ring::default_provider().install_default();

        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to load TLS certificate {} / key {}",
                    tls.cert_path.display(),
                    tls.key_path.display()
                )
            })?;

        let handle = Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            super::shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        tracing::info!("Web server running at https://{}", addr);
        axum_server::bind_rustls(addr, rustls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .with_context(|| "TLS web server terminated unexpectedly")?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}
