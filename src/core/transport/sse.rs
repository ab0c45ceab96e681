//! SSE transport implementation.
//!
//! MCP over HTTP event streams:
//! - `GET <sse_path>` opens a session and streams server messages. The first
//!   event (`endpoint`) tells the client where to POST.
//! - `POST <message_path>?sessionId=<id>` submits one JSON-RPC message.
//! - `GET /` serves a status page, `GET /health` a health check.
//!
//! Each session runs its own rmcp service over an in-memory pipe; see
//! [`super::session`] for how messages are ordered.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::StreamExt;
use http::StatusCode;
use rmcp::ServiceExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::session::{OUTBOUND_CAPACITY, SessionGuard, SessionPump, SessionRegistry};
use super::{SseConfig, TransportError, TransportResult, serve_until, shutdown_signal};
use crate::core::McpServer;
use crate::domains::tools::ToolRegistry;

/// Buffer size of the pipe between a session and its MCP service.
const DUPLEX_BUFFER: usize = 64 * 1024;

/// SSE transport handler.
pub struct SseTransport {
    config: SseConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    sessions: Arc<SessionRegistry>,
    sse_path: Arc<str>,
    message_path: Arc<str>,
    response_timeout: Duration,
    keep_alive: Duration,
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

impl SseTransport {
    /// Create a new SSE transport with the given config.
    pub fn new(config: SseConfig) -> Self {
        Self { config }
    }

    /// Run the SSE transport until a termination signal arrives.
    ///
    /// Failing to bind is fatal. On shutdown new sessions are refused, open
    /// sessions are closed, and the listener waits for their streams to end.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let sessions = Arc::new(SessionRegistry::new());
        let app = router(server, &self.config, sessions.clone());

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (MCP over SSE, CORS {})", addr, cors_status);
        info!("  → Stream:  GET {}", self.config.sse_path);
        info!("  → Message: POST {}?sessionId=<id>", self.config.message_path);
        info!("  → Health:  GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let closed = sessions.close_all();
                info!("Shutting down, closed {} SSE session(s)", closed);
            })
            .await
            .map_err(TransportError::http)?;

        info!("SSE transport stopped");
        Ok(())
    }
}

/// Build the HTTP router for the SSE binding.
pub fn router(server: McpServer, config: &SseConfig, sessions: Arc<SessionRegistry>) -> Router {
    let state = AppState {
        server,
        sessions,
        sse_path: config.sse_path.as_str().into(),
        message_path: config.message_path.as_str().into(),
        response_timeout: Duration::from_secs(config.response_timeout_secs.max(1)),
        keep_alive: Duration::from_secs(config.keep_alive_secs.max(1)),
    };

    let cors = config.enable_cors.then(|| {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    });

    Router::new()
        .route(&config.sse_path, get(open_stream))
        .route(&config.message_path, post(post_message))
        .route("/health", get(health_check))
        .route("/", get(status_page))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(cors),
        )
}

/// Open a session and stream its messages.
async fn open_stream(State(state): State<AppState>) -> Response {
    let Some((id, inbound)) = state.sessions.open() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response();
    };

    let (service_io, session_io) = tokio::io::duplex(DUPLEX_BUFFER);
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel::<()>();

    let server = state.server.clone();
    let session = id.clone();
    tokio::spawn(async move {
        let service = match server.serve(service_io).await {
            Ok(service) => service,
            Err(e) => {
                debug!(session = %session, "Session ended before initialization: {}", e);
                return;
            }
        };
        match serve_until(service, async move {
            let _ = done_rx.await;
        })
        .await
        {
            Ok(reason) => debug!(session = %session, "MCP service finished: {:?}", reason),
            Err(e) => warn!(session = %session, "MCP service failed: {}", e),
        }
    });

    let pump = SessionPump::new(
        id.clone(),
        session_io,
        inbound,
        outbound_tx,
        state.response_timeout,
        done_tx,
    );
    let session = id.clone();
    tokio::spawn(async move {
        if let Err(e) = pump.run().await {
            debug!(session = %session, "Session pump stopped: {}", e);
        }
    });

    info!(session = %id, "SSE session opened");

    let endpoint = format!("{}?sessionId={}", state.message_path, id);
    let guard = SessionGuard::new(id, state.sessions.clone());

    let first = futures::stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = futures::stream::unfold((outbound_rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        let event = Event::default().event("message").data(message);
        Some((Ok::<_, Infallible>(event), (rx, guard)))
    });

    Sse::new(first.chain(messages))
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response()
}

/// Check that `body` is a single JSON-RPC 2.0 message; return it compacted.
fn validate_message(body: &str) -> Result<String, &'static str> {
    let value: Value = serde_json::from_str(body).map_err(|_| "Malformed JSON")?;
    let Some(object) = value.as_object() else {
        return Err("Expected a single JSON-RPC message object");
    };
    if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err("Expected jsonrpc \"2.0\"");
    }
    serde_json::to_string(&value).map_err(|_| "Malformed JSON")
}

/// Queue a JSON-RPC message on an open session.
#[instrument(skip_all, fields(session))]
async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId").into_response();
    };
    tracing::Span::current().record("session", id.as_str());

    let Some(sender) = state.sessions.sender(&id) else {
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let message = match validate_message(&body) {
        Ok(message) => message,
        Err(reason) => return (StatusCode::BAD_REQUEST, reason).into_response(),
    };

    if sender.send(message).await.is_err() {
        state.sessions.remove(&id);
        return (StatusCode::GONE, "Session closed").into_response();
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable status page.
async fn status_page(State(state): State<AppState>) -> Html<String> {
    let tools: String = ToolRegistry::get_all_tools()
        .iter()
        .map(|tool| {
            format!(
                "      <li><code>{}</code>: {}</li>\n",
                escape_html(&tool.name),
                escape_html(tool.description.as_deref().unwrap_or(""))
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{name}</title>
  </head>
  <body>
    <h1>{name}</h1>
    <p>Version {version}. Status: running ({sessions} open session(s)).</p>
    <h2>Endpoints</h2>
    <ul>
      <li><code>GET {sse}</code>: open an event stream</li>
      <li><code>POST {message}?sessionId=&lt;id&gt;</code>: send a message</li>
      <li><code>GET /health</code>: health check</li>
    </ul>
    <h2>Tools</h2>
    <ul>
{tools}    </ul>
  </body>
</html>
"#,
        name = escape_html(state.server.name()),
        version = escape_html(state.server.version()),
        sessions = state.sessions.len(),
        sse = escape_html(&state.sse_path),
        message = escape_html(&state.message_path),
        tools = tools,
    ))
}
