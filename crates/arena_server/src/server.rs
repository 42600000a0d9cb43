//! HTTP and WebSocket transport.
//!
//! `GET /` serves the client page, `GET /ws` carries the game events and
//! `GET /health` answers liveness probes. All game interaction happens on
//! the WebSocket.

use axum::{
    Router,
    body::Body,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::Request,
    response::{Html, IntoResponse},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

use crate::actor::MatchHandle;
use crate::protocol::ClientEvent;
use crate::state::ConnectionId;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state of the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    handle: MatchHandle,
}

/// Builds the application router.
#[instrument(skip(handle))]
pub fn router(handle: MatchHandle) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(AppState { handle })
}

/// Serves `router(handle)` on `listener` until Ctrl+C.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, handle: MatchHandle) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Arena ready at http://{}/", addr);
    }
    axum::serve(listener, router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.handle))
}

/// Runs one client connection from upgrade to disconnect.
///
/// However the connection ends, the actor gets exactly one disconnect.
async fn handle_socket(socket: WebSocket, handle: MatchHandle) {
    let id = ConnectionId::generate();
    let (outbox, mut events) = mpsc::unbounded_channel();

    if handle.connect(id.clone(), outbox).await.is_err() {
        warn!(connection = %id, "Match closed, refusing connection");
        return;
    }
    info!(connection = %id, "WebSocket client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: forward events from the outbox to the socket
    let writer_id = id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!(connection = %writer_id, error = %e, "Failed to encode event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                debug!(connection = %writer_id, "Socket closed while writing");
                break;
            }
        }
    });

    // Reader task: decode client frames and hand them to the actor
    let reader_id = id.clone();
    let reader_handle = handle.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            match frame {
                Ok(Message::Text(text)) => match ClientEvent::decode(text.as_str()) {
                    Ok(event) => {
                        if reader_handle.client_event(reader_id.clone(), event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!(connection = %reader_id, error = %e, "Malformed frame dropped"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(connection = %reader_id, error = %e, "Socket read failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    if handle.disconnect(id.clone()).await.is_err() {
        warn!(connection = %id, "Match closed before disconnect was processed");
    }
    info!(connection = %id, "WebSocket client disconnected");
}
