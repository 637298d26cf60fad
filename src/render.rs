use rayon::prelude::*;

use crate::config::ItemSpec;
use crate::error::{LayoutError, Result};
use crate::grid::GridConfig;
use crate::viewport::Layout;

// Landing-page palette
const BACKGROUND: [u8; 4] = [250, 247, 240, 255];
const CELL_EDGE: [u8; 4] = [225, 218, 205, 255];
const BIRD_LEAD: [u8; 4] = [38, 70, 110, 255];
const BIRD_TAIL: [u8; 4] = [210, 120, 70, 255];

// Occupancy diagnostic
const CELL_USED_A: [u8; 4] = [90, 150, 110, 255];
const CELL_USED_B: [u8; 4] = [110, 170, 130, 255];
const CELL_UNUSED: [u8; 4] = [200, 90, 80, 255];
const LEFTOVER: [u8; 4] = [40, 40, 40, 255];

/// Largest raster area (px) the renderers will allocate.
pub const MAX_RENDER_PIXELS: usize = 4096 * 4096;

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Raster size for a layout: the viewport rounded up to whole pixels.
/// Fails when the area exceeds [`MAX_RENDER_PIXELS`].
pub fn pixel_size(layout: &Layout) -> Result<(usize, usize)> {
    let w = layout.viewport.width.ceil() as usize;
    let h = layout.viewport.height.ceil() as usize;
    match w.checked_mul(h) {
        Some(area) if area <= MAX_RENDER_PIXELS => Ok((w, h)),
        _ => Err(LayoutError::RenderTooLarge {
            width: layout.viewport.width,
            height: layout.viewport.height,
        }),
    }
}

/// Cell under pixel center (px, py), if inside the grid.
#[inline]
fn cell_at(grid: &GridConfig, px: f64, py: f64) -> Option<(usize, usize)> {
    let col = (px / grid.cell_width).floor();
    let row = (py / grid.cell_height).floor();
    if col < 0.0 || row < 0.0 {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    (col < grid.cols && row < grid.rows).then_some((col, row))
}

/// Render the flock: one ellipse per item, shaded from the first bird to
/// the last, over faint cell outlines.
pub fn render_layout(layout: &Layout, spec: &ItemSpec) -> Result<Vec<u8>> {
    let (w, h) = pixel_size(layout)?;
    let grid = &layout.grid;
    let (item_w, item_h) = grid.item_size(spec);
    let (rx, ry) = (item_w / 2.0, item_h / 2.0);
    let last = layout.positions.len().saturating_sub(1).max(1) as f32;
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y as f64 + 0.5;
            for x in 0..w {
                let px = x as f64 + 0.5;
                let color = match cell_at(grid, px, py) {
                    Some((col, r)) => {
                        let index = r * grid.cols + col;
                        let inside = layout.positions.get(index).is_some_and(|p| {
                            let dx = (px - p.x) / rx;
                            let dy = (py - p.y) / ry;
                            dx * dx + dy * dy <= 1.0
                        });
                        if inside {
                            lerp_color(BIRD_LEAD, BIRD_TAIL, index as f32 / last)
                        } else {
                            // 1px outline on the left/top edge of every cell
                            let fx = px - col as f64 * grid.cell_width;
                            let fy = py - r as f64 * grid.cell_height;
                            if fx < 1.0 || fy < 1.0 {
                                CELL_EDGE
                            } else {
                                BACKGROUND
                            }
                        }
                    }
                    None => BACKGROUND,
                };

                let out = &mut row[x * 4..x * 4 + 4];
                out.copy_from_slice(&color);
            }
        });

    Ok(rgba)
}

/// Diagnostic: cell occupancy. Used cells in a green checker, trailing
/// unused cells of the last row in red, space outside the grid dark.
pub fn render_cells(layout: &Layout) -> Result<Vec<u8>> {
    let (w, h) = pixel_size(layout)?;
    let grid = &layout.grid;
    let count = layout.positions.len();
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let py = y as f64 + 0.5;
        for x in 0..w {
            let px = x as f64 + 0.5;
            let color = match cell_at(grid, px, py) {
                Some((col, r)) if r * grid.cols + col < count => {
                    if (col + r) % 2 == 0 {
                        CELL_USED_A
                    } else {
                        CELL_USED_B
                    }
                }
                Some(_) => CELL_UNUSED,
                None => LEFTOVER,
            };
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    Ok(rgba)
}
