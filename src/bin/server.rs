use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use flockgrid::config::ItemSpec;
use flockgrid::render;
use flockgrid::viewport::Viewport;
use flockgrid::{GridConfig, ItemPosition, LayoutError};

#[derive(Deserialize)]
struct LayoutRequest {
    width: f64,
    height: f64,
    // Flock overrides
    item_width: Option<f64>,
    item_height: Option<f64>,
    count: Option<usize>,
    margin: Option<f64>,
    #[serde(default)]
    render: bool,
}

#[derive(Debug, Serialize)]
struct LayoutResponse {
    grid: GridConfig,
    positions: Vec<ItemPosition>,
    timings: Vec<TimingEntry>,
    width: f64,
    height: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    layers: Vec<Layer>,
}

#[derive(Debug, Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Debug, Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

struct ApiError(StatusCode, String);

impl From<LayoutError> for ApiError {
    fn from(err: LayoutError) -> Self {
        let status = match &err {
            LayoutError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, LayoutError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .map_err(|e| LayoutError::Encode(e.to_string()))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_response(req: LayoutRequest) -> Result<LayoutResponse, LayoutError> {
    let spec = ItemSpec::with_overrides(req.item_width, req.item_height, req.count, req.margin)?;
    let viewport = Viewport::new(req.width, req.height);
    let (layout, timings) = flockgrid::layout(viewport, &spec)?;

    let layers = if req.render {
        // Refuse oversized rasters before allocating anything.
        let (w, h) = render::pixel_size(&layout)?;
        vec![
            Layer {
                name: "layout".into(),
                data_url: encode_png(&render::render_layout(&layout, &spec)?, w, h)?,
            },
            Layer {
                name: "cells".into(),
                data_url: encode_png(&render::render_cells(&layout)?, w, h)?,
            },
        ]
    } else {
        Vec::new()
    };

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(LayoutResponse {
        grid: layout.grid,
        positions: layout.positions,
        timings: timing_entries,
        width: viewport.width,
        height: viewport.height,
        layers,
    })
}

async fn layout_handler(Json(req): Json<LayoutRequest>) -> Result<Json<LayoutResponse>, ApiError> {
    let (width, height) = (req.width, req.height);

    let response = tokio::task::spawn_blocking(move || build_response(req))
        .await
        .map_err(|e| {
            error!("layout task failed: {e}");
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, "layout task failed".into())
        })?;

    match response {
        Ok(body) => {
            info!(width, height, cols = body.grid.cols, rows = body.grid.rows, "layout");
            Ok(Json(body))
        }
        Err(err) => {
            warn!(width, height, %err, "layout rejected");
            Err(err.into())
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,flockgrid=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/layout", post(layout_handler))
        .layer(CorsLayer::permissive())
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("flockgrid server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> LayoutRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let body = build_response(request(r#"{"width": 600, "height": 300}"#)).unwrap();
        assert_eq!(body.positions.len(), ItemSpec::default().count);
        assert!(body.layers.is_empty());
    }

    #[test]
    fn test_render_adds_png_layers() {
        let body = build_response(request(
            r#"{"width": 64, "height": 48, "count": 6, "render": true}"#,
        ))
        .unwrap();
        let names: Vec<_> = body.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["layout", "cells"]);
        assert!(body.layers[0].data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_unmeasured_is_unprocessable() {
        let err = build_response(request(r#"{"width": 0, "height": 300}"#)).unwrap_err();
        assert_eq!(ApiError::from(err).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_huge_count_is_unprocessable() {
        let err = build_response(request(
            r#"{"width": 600, "height": 300, "count": 1000000000000000}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LayoutError::TooManyItems { .. }));
        assert_eq!(ApiError::from(err).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_huge_render_is_unprocessable() {
        let err = build_response(request(
            r#"{"width": 1e10, "height": 1e10, "count": 4, "render": true}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LayoutError::RenderTooLarge { .. }));
        assert_eq!(ApiError::from(err).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_huge_viewport_without_render_is_fine() {
        let body = build_response(request(r#"{"width": 1e10, "height": 1e10, "count": 4}"#))
            .unwrap();
        assert_eq!(body.positions.len(), 4);
    }

    #[test]
    fn test_invalid_margin_is_unprocessable() {
        let err = build_response(request(r#"{"width": 100, "height": 100, "margin": 0.7}"#))
            .unwrap_err();
        assert_eq!(err, LayoutError::InvalidMargin(0.7));
    }
}
