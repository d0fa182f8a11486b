//! Gateway HTTP server (single port): health check and LINE webhook.

use crate::channels::{verify_signature, LineChannel, WebhookBody, SIGNATURE_HEADER};
use crate::config::{self, Config};
use crate::init;
use crate::pipeline::Pipeline;
use crate::translate::PapagoClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state for the gateway. Everything here is read-only after startup.
#[derive(Clone)]
pub struct GatewayState {
    /// When Some, webhook requests must carry a valid X-Line-Signature.
    pub channel_secret: Option<String>,
    pub pipeline: Arc<Pipeline>,
}

impl GatewayState {
    /// Wire the Papago client and LINE channel from config. Fails when credentials are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config::resolve_papago_credentials(config).context(
            "papago credentials not configured (set papago.clientId/clientSecret or NAVER_CLIENT_ID/NAVER_CLIENT_SECRET)",
        )?;
        let access_token = config::resolve_line_access_token(config).context(
            "line channel access token not configured (set channels.line.channelAccessToken or LINE_CHANNEL_ACCESS_TOKEN)",
        )?;
        let papago = Arc::new(
            PapagoClient::new(&config.papago, credentials).context("building papago client")?,
        );
        let line = Arc::new(LineChannel::new(&config.channels.line.api_base, access_token));
        let pipeline = Pipeline::new(
            papago.clone(),
            papago,
            line,
            config.relay.fallback_text.clone(),
        );
        Ok(Self {
            channel_secret: config::resolve_line_channel_secret(config),
            pipeline: Arc::new(pipeline),
        })
    }
}

/// Routes: `GET /` health check, `POST /webhook` LINE events.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", post(line_webhook))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// When bind is not loopback, a LINE channel secret must be configured or startup fails.
/// Blocks until shutdown (e.g. Ctrl+C).
/// Requires the config file to exist (`lingo init`).
pub async fn run_gateway(config: Config, config_path: PathBuf) -> Result<()> {
    init::require_initialized(&config_path)?;
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) && config::resolve_line_channel_secret(&config).is_none() {
        anyhow::bail!(
            "refusing to bind gateway to {} without signature verification (set channels.line.channelSecret or LINE_CHANNEL_SECRET)",
            bind
        );
    }
    let port = config.gateway.port;
    let state = GatewayState::from_config(&config)?;
    if state.channel_secret.is_none() {
        log::warn!("line channel secret not configured; webhook signatures are not verified");
    }
    let app = build_router(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// In-flight webhook batches finish before the server returns.
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
    log::info!("shutdown signal received, draining connections");
}

/// POST /webhook — verifies the optional signature, runs the batch, always answers 200 once parsed.
async fn line_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(ref secret) = state.channel_secret {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !verify_signature(secret, &body, provided) {
            log::warn!("webhook: signature verification failed");
            return StatusCode::UNAUTHORIZED;
        }
    }
    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("webhook: malformed body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let report = state.pipeline.run_batch(&payload.events).await;
    if report.is_failed() {
        log::error!(
            "webhook: {} of {} event(s) failed ({} replied, {} rejected)",
            report.failed,
            payload.events.len(),
            report.replied,
            report.rejected
        );
    } else {
        log::info!(
            "webhook: {} replied, {} rejected",
            report.replied,
            report.rejected
        );
    }
    StatusCode::OK
}

/// GET / returns 200 with an empty body (load balancer probe).
async fn health_http() -> StatusCode {
    log::debug!("health check");
    StatusCode::OK
}
