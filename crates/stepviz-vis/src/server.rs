//! Axum web server: REST submission endpoints and a WebSocket per family
//! streaming the canvas after every change.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stepviz_algo::Algorithm;
use stepviz_layout::Point;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::families::Family;
use crate::scheduler::Notice;
use crate::surface::Canvas;
use crate::workbench::{Submission, Workbench, WorkbenchStatus};
use crate::Result;

type Bench = Arc<Workbench>;

/// Visualization server.
pub struct VisServer {
    bench: Bench,
}

impl VisServer {
    /// Create a server around a workbench.
    pub fn new(bench: Workbench) -> Self {
        Self {
            bench: Arc::new(bench),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/api/status", get(status_handler))
            .route("/api/{family}/scene", get(scene_handler))
            .route("/api/tree/insert", post(tree_insert))
            .route("/api/tree/remove", post(tree_remove))
            .route("/api/graph/vertex", post(graph_vertex))
            .route("/api/graph/remove", post(graph_remove))
            .route("/api/graph/edge", post(graph_edge))
            .route("/api/graph/run", post(graph_run))
            .route("/api/graph/drag", post(graph_drag))
            .route("/api/hash/insert", post(hash_insert))
            .route("/api/hash/search", post(hash_search))
            .route("/api/heap/insert", post(heap_insert))
            .route("/api/heap/extract", post(heap_extract))
            .route("/api/heap/mode", post(heap_mode))
            .route("/ws/{family}", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.bench.clone())
    }

    /// Run the server on `addr`.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn status_handler(State(bench): State<Bench>) -> Json<WorkbenchStatus> {
    Json(bench.status())
}

async fn scene_handler(
    State(bench): State<Bench>,
    Path(family): Path<String>,
) -> std::result::Result<Json<Canvas>, StatusCode> {
    let family: Family = family.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(bench.scene(family).await))
}

/// Outcome of a submission, as reported to clients.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct SubmitResponse {
    result: String,
}

impl From<Submission> for SubmitResponse {
    fn from(submission: Submission) -> Self {
        Self {
            result: submission.as_str().to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ValueRequest {
    value: String,
}

#[derive(Deserialize)]
struct VertexRequest {
    id: String,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Deserialize)]
struct EdgeRequest {
    u: String,
    v: String,
    weight: String,
}

#[derive(Deserialize)]
struct RunRequest {
    algorithm: String,
    start: String,
}

#[derive(Deserialize)]
struct DragRequest {
    id: String,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ModeRequest {
    min_heap: bool,
}

async fn tree_insert(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.tree_insert(&req.value).into())
}

async fn tree_remove(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.tree_remove(&req.value).into())
}

async fn graph_vertex(State(bench): State<Bench>, Json(req): Json<VertexRequest>) -> Json<SubmitResponse> {
    let at = req.x.zip(req.y).map(|(x, y)| Point::new(x, y));
    Json(bench.graph_add_vertex(&req.id, at).await.into())
}

async fn graph_remove(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.graph_remove_vertex(&req.value).await.into())
}

async fn graph_edge(State(bench): State<Bench>, Json(req): Json<EdgeRequest>) -> Json<SubmitResponse> {
    Json(bench.graph_add_edge(&req.u, &req.v, &req.weight).await.into())
}

async fn graph_run(State(bench): State<Bench>, Json(req): Json<RunRequest>) -> Json<SubmitResponse> {
    let submission = match req.algorithm.parse::<Algorithm>() {
        Ok(algorithm) => bench.graph_run(algorithm, &req.start).await,
        Err(err) => {
            debug!(%err, "rejected graph run");
            Submission::Skipped
        }
    };
    Json(submission.into())
}

async fn graph_drag(State(bench): State<Bench>, Json(req): Json<DragRequest>) -> Json<SubmitResponse> {
    Json(bench.graph_drag(&req.id, Point::new(req.x, req.y)).await.into())
}

async fn hash_insert(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.hash_insert(&req.value).into())
}

async fn hash_search(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.hash_search(&req.value).into())
}

async fn heap_insert(State(bench): State<Bench>, Json(req): Json<ValueRequest>) -> Json<SubmitResponse> {
    Json(bench.heap_insert(&req.value).into())
}

async fn heap_extract(State(bench): State<Bench>) -> Json<SubmitResponse> {
    Json(bench.heap_extract().into())
}

async fn heap_mode(State(bench): State<Bench>, Json(req): Json<ModeRequest>) -> Json<SubmitResponse> {
    Json(bench.heap_set_mode(req.min_heap).await.into())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(family): Path<String>,
    State(bench): State<Bench>,
) -> Response {
    match family.parse::<Family>() {
        Ok(family) => ws.on_upgrade(move |socket| stream_scene(socket, bench, family)),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// One message on a family's WebSocket.
#[derive(Serialize)]
struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
    canvas: Canvas,
}

async fn send_frame(socket: &mut WebSocket, bench: &Workbench, family: Family, notice: Option<Notice>) -> bool {
    let frame = Frame {
        notice,
        canvas: bench.scene(family).await,
    };
    match serde_json::to_string(&frame) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(err) => {
            debug!(%err, "failed to encode frame");
            false
        }
    }
}

async fn stream_scene(mut socket: WebSocket, bench: Bench, family: Family) {
    let mut notices = bench.subscribe(family);
    if !send_frame(&mut socket, &bench, family, None).await {
        return;
    }

    loop {
        tokio::select! {
            notice = notices.recv() => {
                let notice = match notice {
                    Ok(notice) => Some(notice),
                    // Fell behind; the current canvas is still correct.
                    Err(RecvError::Lagged(missed)) => {
                        debug!(%family, missed, "websocket lagged");
                        None
                    }
                    Err(RecvError::Closed) => break,
                };
                if !send_frame(&mut socket, &bench, family, notice).await {
                    break;
                }
            }
            message = socket.recv() => match message {
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    debug!(%family, "websocket closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisConfig;

    fn bench() -> Bench {
        Arc::new(Workbench::new(&VisConfig::default()))
    }

    #[test]
    fn router_builds() {
        let server = VisServer::new(Workbench::new(&VisConfig::default()));
        let _router = server.router();
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_family_is_not_found() {
        let result = scene_handler(State(bench()), Path("forest".to_string())).await;
        assert_eq!(result.err(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test(start_paused = true)]
    async fn submissions_report_outcome() {
        let bench = bench();
        let Json(first) = hash_insert(
            State(bench.clone()),
            Json(ValueRequest { value: "12".into() }),
        )
        .await;
        assert_eq!(first.result, "started");

        let Json(second) = hash_search(
            State(bench.clone()),
            Json(ValueRequest { value: "12".into() }),
        )
        .await;
        assert_eq!(second.result, "busy");

        let Json(bad) = graph_run(
            State(bench),
            Json(RunRequest {
                algorithm: "astar".into(),
                start: "1".into(),
            }),
        )
        .await;
        assert_eq!(bad.result, "skipped");
    }

    #[tokio::test(start_paused = true)]
    async fn status_lists_every_family() {
        let Json(status) = status_handler(State(bench())).await;
        let json = serde_json::to_value(status).unwrap();
        for family in Family::ALL {
            assert_eq!(json[family.as_str()], "idle");
        }
    }
}
