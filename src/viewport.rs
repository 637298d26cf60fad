use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ItemSpec;
use crate::error::{LayoutError, Result};
use crate::grid::{self, GridConfig, ItemPosition};

/// Measured pixel size of the host container. Zero means not measured yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True once both sides are finite and positive; only then may the grid
    /// be computed.
    #[inline]
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn require_measured(&self) -> Result<()> {
        if self.is_measured() {
            Ok(())
        } else {
            Err(LayoutError::Unmeasured {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Everything a renderer needs for one viewport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub viewport: Viewport,
    pub grid: GridConfig,
    pub positions: Vec<ItemPosition>,
}

impl Layout {
    /// Full recomputation for a measured viewport.
    pub fn compute(viewport: Viewport, spec: &ItemSpec) -> Result<Self> {
        viewport.require_measured()?;
        let grid = grid::compute_grid(viewport.width, viewport.height, spec);
        let positions =
            grid::layout_positions(grid.cols, grid.rows, grid.cell_width, grid.cell_height, spec.count);
        Ok(Self {
            viewport,
            grid,
            positions,
        })
    }
}

/// Holds the flock spec and the layout for the most recent measurement.
/// Every resize replaces the previous layout outright.
#[derive(Debug)]
pub struct FlockLayout {
    spec: ItemSpec,
    current: Option<Layout>,
}

impl FlockLayout {
    pub fn new(spec: ItemSpec) -> Self {
        Self {
            spec,
            current: None,
        }
    }

    /// Apply a new measurement. Returns the fresh layout, or `None` when the
    /// container is not measured (the host renders a placeholder).
    pub fn on_resize(&mut self, viewport: Viewport) -> Option<&Layout> {
        match Layout::compute(viewport, &self.spec) {
            Ok(layout) => {
                debug!(
                    width = viewport.width,
                    height = viewport.height,
                    cols = layout.grid.cols,
                    rows = layout.grid.rows,
                    scale = layout.grid.scale,
                    "flock relayout"
                );
                self.current = Some(layout);
            }
            Err(err) => {
                debug!(%err, "skipping relayout");
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Layout> {
        self.current.as_ref()
    }
}
