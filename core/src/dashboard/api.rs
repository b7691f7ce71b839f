// Dashboard HTTP API server
//
// WebSocket and SSE snapshot streams plus a JSON topology endpoint

use crate::dashboard::event_stream::SnapshotBroadcaster;
use crate::dashboard::topology::TopologyView;
use crate::dashboard::DashboardConfig;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    routing::get,
    Json, Router,
};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, trace, warn};

/// Dashboard server state
#[derive(Clone)]
struct DashboardState {
    broadcaster: SnapshotBroadcaster,
    view: TopologyView,
}

/// Dashboard HTTP server
pub struct DashboardServer {
    config: DashboardConfig,
    broadcaster: SnapshotBroadcaster,
    view: TopologyView,
}

impl DashboardServer {
    pub fn new(
        config: DashboardConfig,
        broadcaster: SnapshotBroadcaster,
        view: TopologyView,
    ) -> Self {
        Self {
            config,
            broadcaster,
            view,
        }
    }

    pub fn router(&self) -> Router {
        let state = DashboardState {
            broadcaster: self.broadcaster.clone(),
            view: self.view.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/ws/heimdall", get(ws_handler))
            .route("/api/snapshots/stream", get(snapshot_stream_handler))
            .route("/api/topology", get(topology_handler))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }

    /// Start the Dashboard server
    pub async fn serve(self) -> crate::Result<()> {
        let addr = self.config.addr();
        info!(
            target: "dashboard",
            addr = %addr,
            "Starting Dashboard relay"
        );

        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            target: "dashboard",
            url = %format!("http://{}", addr),
            "Dashboard relay ready"
        );

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// WebSocket endpoint: one text message per producer payload
async fn ws_handler(
    upgrade: WebSocketUpgrade,
    State(state): State<DashboardState>,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |ws| ws_stream(ws, state.broadcaster))
}

async fn ws_stream(mut ws: WebSocket, broadcaster: SnapshotBroadcaster) {
    info!(target: "dashboard", "New WebSocket client connected");
    let mut receiver = broadcaster.subscribe();

    loop {
        match receiver.recv().await {
            Ok(frame) => {
                if let Err(e) = ws.send(Message::Text(frame.payload)).await {
                    // expected when the page is closed or reloaded
                    trace!(target: "dashboard", error = %e, "WebSocket client went away");
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "dashboard", skipped, "WebSocket client lagging, frames skipped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// SSE endpoint carrying the same payloads
async fn snapshot_stream_handler(
    State(state): State<DashboardState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    info!(target: "dashboard", "New SSE client connected");

    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(frame) => Some(Ok(Event::default()
            .id(frame.relay_seq.to_string())
            .event("snapshot")
            .data(frame.payload))),
        Err(e) => {
            warn!(target: "dashboard", error = %e, "Broadcast error");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Last committed topology
async fn topology_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.view.snapshot().await))
}
