pub mod config;
pub mod error;
pub mod grid;
pub mod render;
pub mod viewport;

use std::time::Instant;

use config::ItemSpec;
use error::Result;
use viewport::{Layout, Viewport};

pub use error::LayoutError;
pub use grid::{GridConfig, ItemPosition, compute_grid, layout_positions};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Fit the flock to a measured viewport, timing each stage.
/// Fails with [`LayoutError::Unmeasured`] before touching the grid math.
pub fn layout(viewport: Viewport, spec: &ItemSpec) -> Result<(Layout, Vec<Timing>)> {
    viewport.require_measured()?;

    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Grid fit
    let t = Instant::now();
    let grid = grid::compute_grid(viewport.width, viewport.height, spec);
    timings.push(Timing {
        name: "grid_fit",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Item centers
    let t = Instant::now();
    let positions =
        grid::layout_positions(grid.cols, grid.rows, grid.cell_width, grid.cell_height, spec.count);
    timings.push(Timing {
        name: "positions",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    tracing::debug!(
        cols = grid.cols,
        rows = grid.rows,
        scale = grid.scale,
        unused = grid.unused_cells(spec.count),
        "flock fitted"
    );

    let layout = Layout {
        viewport,
        grid,
        positions,
    };

    Ok((layout, timings))
}
