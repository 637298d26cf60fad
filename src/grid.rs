use serde::{Deserialize, Serialize};

use crate::config::ItemSpec;

/// Row/column split and uniform scale that fit a flock into a container.
/// Derived, never stored across viewport changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub cols: usize,
    pub rows: usize,
    /// Scaled cell footprint, margins included (px).
    pub cell_width: f64,
    pub cell_height: f64,
    pub scale: f64,
}

impl GridConfig {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Trailing cells of the last row left empty by a flock of `count`.
    #[inline]
    pub fn unused_cells(&self, count: usize) -> usize {
        self.cell_count().saturating_sub(count)
    }

    /// Extent of the full grid: (cols * cell_width, rows * cell_height).
    pub fn grid_size(&self) -> (f64, f64) {
        (
            self.cols as f64 * self.cell_width,
            self.rows as f64 * self.cell_height,
        )
    }

    /// Drawn item size, margins excluded.
    pub fn item_size(&self, spec: &ItemSpec) -> (f64, f64) {
        (spec.width * self.scale, spec.height * self.scale)
    }

    #[inline]
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }
}

/// Center of one flock item within the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemPosition {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in container pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ItemPosition {
    /// Rectangle of an item of `size` centered on this position.
    pub fn bounds(&self, size: (f64, f64)) -> Rect {
        let hw = size.0 / 2.0;
        let hh = size.1 / 2.0;
        Rect {
            x0: self.x - hw,
            y0: self.y - hh,
            x1: self.x + hw,
            y1: self.y + hh,
        }
    }
}

/// Pick cols/rows and the largest uniform scale at which every margined
/// cell fits inside `container_width` x `container_height`.
///
/// The caller must only pass a measured container (both sides > 0). Zero or
/// negative sides are not checked here and yield a degenerate, non-finite
/// config; see [`crate::viewport::Viewport::is_measured`].
///
/// Space left over on the non-binding axis is not redistributed.
pub fn compute_grid(container_width: f64, container_height: f64, spec: &ItemSpec) -> GridConfig {
    let (space_w, space_h) = spec.cell_space();
    let container_aspect = container_width / container_height;
    let cell_aspect = space_w / space_h;

    let ideal_cols = (spec.count as f64 * container_aspect / cell_aspect).sqrt();
    let cols = (ideal_cols.ceil() as usize).max(1);
    let rows = spec.count.div_ceil(cols);

    let scale_x = container_width / (cols as f64 * space_w);
    let scale_y = container_height / (rows as f64 * space_h);
    let scale = scale_x.min(scale_y);

    GridConfig {
        cols,
        rows,
        cell_width: space_w * scale,
        cell_height: space_h * scale,
        scale,
    }
}

/// Row-major item centers for `count` items. A partially filled last row
/// keeps its items flush left.
pub fn layout_positions(
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    count: usize,
) -> Vec<ItemPosition> {
    debug_assert!(cols >= 1);
    debug_assert!(cols * rows >= count);

    (0..count)
        .map(|index| {
            let col = index % cols;
            let row = index / cols;
            ItemPosition {
                index,
                x: col as f64 * cell_width + cell_width / 2.0,
                y: row as f64 * cell_height + cell_height / 2.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(count: usize) -> ItemSpec {
        ItemSpec::new(10.0, 10.0, count, 0.0).unwrap()
    }

    #[test]
    fn test_square_container_square_items() {
        let g = compute_grid(100.0, 100.0, &square(4));
        assert_eq!((g.cols, g.rows), (2, 2));
        assert_eq!(g.scale, 5.0);
        assert_eq!((g.cell_width, g.cell_height), (50.0, 50.0));
        assert_eq!(g.unused_cells(4), 0);
    }

    #[test]
    fn test_wide_container_single_row() {
        let g = compute_grid(1000.0, 100.0, &square(10));
        assert_eq!((g.cols, g.rows), (10, 1));
        assert_eq!(g.scale, 10.0);
    }

    #[test]
    fn test_tall_container_single_column() {
        let g = compute_grid(100.0, 10_000.0, &square(10));
        assert_eq!((g.cols, g.rows), (1, 10));
        // Width binds: one 10px cell scaled to 100px.
        assert_eq!(g.scale, 10.0);
        assert_eq!(g.grid_size(), (100.0, 1000.0));
    }

    #[test]
    fn test_partial_last_row() {
        // 5 items in a square: cols = ceil(sqrt 5) = 3, rows = 2.
        let g = compute_grid(300.0, 300.0, &square(5));
        assert_eq!((g.cols, g.rows), (3, 2));
        assert_eq!(g.unused_cells(5), 1);
        // Width binds at 10x, leaving 100px of height unused.
        assert_eq!(g.scale, 10.0);
        assert_eq!(g.grid_size(), (300.0, 200.0));
    }

    #[test]
    fn test_margin_shrinks_item_not_cell() {
        let spec = ItemSpec::new(10.0, 10.0, 1, 0.25).unwrap();
        let g = compute_grid(150.0, 150.0, &spec);
        assert_eq!(g.scale, 10.0);
        assert_eq!(g.cell_width, 150.0);
        assert_eq!(g.item_size(&spec), (100.0, 100.0));
    }

    #[test]
    fn test_positions_row_major() {
        let p = layout_positions(3, 2, 20.0, 10.0, 5);
        assert_eq!(p.len(), 5);
        assert_eq!((p[0].x, p[0].y), (10.0, 5.0));
        assert_eq!((p[2].x, p[2].y), (50.0, 5.0));
        assert_eq!((p[3].x, p[3].y), (10.0, 15.0));
        assert_eq!((p[4].x, p[4].y), (30.0, 15.0));
    }

    #[test]
    fn test_positions_match_cell_of() {
        let g = GridConfig {
            cols: 4,
            rows: 3,
            cell_width: 8.0,
            cell_height: 6.0,
            scale: 1.0,
        };
        for p in layout_positions(g.cols, g.rows, g.cell_width, g.cell_height, 11) {
            let (col, row) = g.cell_of(p.index);
            assert_eq!(p.x, col as f64 * 8.0 + 4.0);
            assert_eq!(p.y, row as f64 * 6.0 + 3.0);
        }
    }

    #[test]
    fn test_bounds_centered() {
        let p = ItemPosition {
            index: 0,
            x: 50.0,
            y: 20.0,
        };
        let r = p.bounds((40.0, 10.0));
        assert_eq!(
            r,
            Rect {
                x0: 30.0,
                y0: 15.0,
                x1: 70.0,
                y1: 25.0
            }
        );
    }
}
