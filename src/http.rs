/// HTTP API for fontscape.
///
/// This module provides the JSON interface the exploration frontend talks
/// to. It enables remote clients to:
///
/// - List the fonts in the catalog
/// - Query nearest neighbors of a font under a configured metric
/// - Request latent-space interpolation images between two fonts
/// - Fetch a 2D similarity map shaped for the graph widget
/// - Monitor service status
///
/// # Example
///
/// ```ignore
/// use fontscape::http::HttpServer;
///
/// let service = FontScape::build(catalog, config)?;
/// let server = HttpServer::new(service);
/// server.bind("0.0.0.0:8080").await?;
/// ```
///
/// # API Endpoints
///
/// - `GET  /api/v1/fonts` - List fonts
/// - `POST /api/v1/fonts/similar` - Nearest neighbors of a font
/// - `POST /api/v1/fonts/interpolate` - Interpolation images
/// - `POST /api/v1/map` - 2D similarity map nodes
/// - `GET  /api/v1/status` - Service status
use crate::error::{FontscapeError, FontscapeResult};
use crate::graph::GraphNode;
use crate::metric::Metric;
use crate::model::InterpolatedGlyphs;
use crate::reduce::Reduction;
use crate::service::{FontRecord, FontScape, ServiceStats};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// HTTP server for fontscape.
pub struct HttpServer {
    service: FontScape,
}

impl HttpServer {
    /// Create a new HTTP server around a built service.
    pub fn new(service: FontScape) -> Self {
        Self { service }
    }

    /// Start the HTTP server on the given address. Blocks until the server
    /// exits.
    pub async fn bind(self, addr: &str) -> FontscapeResult<()> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| FontscapeError::StorageError(format!("invalid address: {}", e)))?;
        let app = create_router(Arc::new(self.service));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| FontscapeError::StorageError(format!("failed to bind: {}", e)))?;
        info!(%addr, "fontscape listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| FontscapeError::StorageError(format!("server error: {}", e)))?;

        Ok(())
    }
}

/// Create the Axum router with all routes.
///
/// The CORS layer is permissive: the original deployment served a browser
/// frontend from a different origin.
pub fn create_router(service: Arc<FontScape>) -> axum::Router {
    use axum::routing::{get, post};
    use axum::Router;

    Router::new()
        .route("/api/v1/fonts", get(handle_fonts))
        .route("/api/v1/fonts/similar", post(handle_similar))
        .route("/api/v1/fonts/interpolate", post(handle_interpolate))
        .route("/api/v1/map", post(handle_map))
        .route("/api/v1/status", get(handle_status))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Request body for POST /api/v1/fonts/similar
#[derive(Debug, Deserialize)]
struct SimilarFontsRequest {
    font_index: usize,
    #[serde(default)]
    metric: Option<Metric>,
    #[serde(default)]
    k: Option<usize>,
}

/// Request body for POST /api/v1/fonts/interpolate
#[derive(Debug, Deserialize)]
struct InterpolationRequest {
    font_1_index: usize,
    font_2_index: usize,
    interpolation_fraction: f32,
}

/// Request body for POST /api/v1/map
#[derive(Debug, Deserialize)]
struct MapRequest {
    #[serde(default)]
    font_indices: Option<Vec<usize>>,
    #[serde(default)]
    method: Option<Reduction>,
    #[serde(default)]
    extent: Option<f32>,
}

/// Response for POST /api/v1/map
#[derive(Debug, Serialize)]
struct MapResponse {
    nodes: Vec<GraphNode>,
}

/// Map a service error onto an HTTP status.
fn error_status(err: &FontscapeError) -> StatusCode {
    match err {
        FontscapeError::FontNotFound { .. } | FontscapeError::LabelNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        FontscapeError::UnsupportedMetric { .. }
        | FontscapeError::DimensionMismatch { .. }
        | FontscapeError::InvalidData { .. }
        | FontscapeError::ReductionError(_) => StatusCode::BAD_REQUEST,
        FontscapeError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        FontscapeError::SerializationError(_) | FontscapeError::StorageError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn into_response<T>(result: FontscapeResult<T>) -> Result<Json<T>, StatusCode> {
    result.map(Json).map_err(|e| error_status(&e))
}

// Handler implementations

async fn handle_fonts(State(service): State<Arc<FontScape>>) -> Json<Vec<FontRecord>> {
    Json(service.fonts())
}

async fn handle_similar(
    State(service): State<Arc<FontScape>>,
    Json(request): Json<SimilarFontsRequest>,
) -> Result<Json<Vec<FontRecord>>, StatusCode> {
    into_response(service.similar_fonts(request.font_index, request.metric, request.k))
}

async fn handle_interpolate(
    State(service): State<Arc<FontScape>>,
    Json(request): Json<InterpolationRequest>,
) -> Result<Json<InterpolatedGlyphs>, StatusCode> {
    into_response(service.interpolation(
        request.font_1_index,
        request.font_2_index,
        request.interpolation_fraction,
    ))
}

async fn handle_map(
    State(service): State<Arc<FontScape>>,
    Json(request): Json<MapRequest>,
) -> Result<Json<MapResponse>, StatusCode> {
    let method = request.method.unwrap_or(Reduction::Tsne);
    into_response(
        service
            .map(request.font_indices, method, request.extent)
            .map(|nodes| MapResponse { nodes }),
    )
}

async fn handle_status(State(service): State<Arc<FontScape>>) -> Json<ServiceStats> {
    Json(service.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&FontscapeError::FontNotFound { index: 1, count: 0 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&FontscapeError::ModelUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_status(&FontscapeError::ReductionError("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&FontscapeError::StorageError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_request_shapes_deserialize() {
        let similar: SimilarFontsRequest =
            serde_json::from_str(r#"{"font_index": 3, "metric": "angular"}"#).unwrap();
        assert_eq!(similar.font_index, 3);
        assert_eq!(similar.metric, Some(Metric::Angular));
        assert_eq!(similar.k, None);

        let interp: InterpolationRequest = serde_json::from_str(
            r#"{"font_1_index": 0, "font_2_index": 1, "interpolation_fraction": 0.4}"#,
        )
        .unwrap();
        assert!((interp.interpolation_fraction - 0.4).abs() < 1e-6);

        let map: MapRequest = serde_json::from_str(r#"{"method": "pca"}"#).unwrap();
        assert_eq!(map.method, Some(Reduction::Pca));
        assert!(map.font_indices.is_none());
    }
}
