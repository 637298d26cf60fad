use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use tracing::{error, info, warn};

use flockgrid::config::ItemSpec;
use flockgrid::render;
use flockgrid::viewport::{Layout, Viewport};

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,flockgrid=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(viewport: Viewport, spec: &ItemSpec, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;

    let (layout, timings) = flockgrid::layout(viewport, spec)?;
    let grid = &layout.grid;
    info!(
        cols = grid.cols,
        rows = grid.rows,
        cell_width = grid.cell_width,
        cell_height = grid.cell_height,
        scale = grid.scale,
        "grid"
    );

    for t in &timings {
        info!("  {:20} {:8.3} ms", t.name, t.ms);
    }

    let (w, h) = render::pixel_size(&layout)?;
    let save = |name: &str, rgba: &[u8]| -> Result<(), Box<dyn std::error::Error>> {
        let path = out_dir.join(name);
        image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)?;
        info!("saved {}", path.display());
        Ok(())
    };

    // 1. Flock as drawn
    save("layout.png", &render::render_layout(&layout, spec)?)?;

    // 2. Cell occupancy
    save("cells.png", &render::render_cells(&layout)?)?;

    // 3. Raw layout for the page
    write_json(&out_dir.join("layout.json"), &layout)?;

    Ok(())
}

fn write_json(path: &Path, layout: &Layout) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(layout)?;
    std::fs::write(path, json)?;
    info!("saved {}", path.display());
    Ok(())
}

/// Positional argument `i`. A value that is present but unparsable is
/// logged and treated as absent.
fn parse_arg<T: FromStr>(args: &[String], i: usize, name: &str) -> Option<T> {
    let raw = args.get(i)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {name} {raw:?}: not a number, using default");
            None
        }
    }
}

fn main() -> ExitCode {
    setup_logging();

    let args: Vec<String> = std::env::args().collect();

    let width: f64 = parse_arg(&args, 1, "width").unwrap_or(1280.0);
    let height: f64 = parse_arg(&args, 2, "height").unwrap_or(720.0);
    let count: Option<usize> = parse_arg(&args, 3, "count");
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    let spec = match ItemSpec::with_overrides(None, None, count, None) {
        Ok(spec) => spec,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "fitting {} items of {}x{} (margin {}) into {}x{}",
        spec.count, spec.width, spec.height, spec.margin, width, height
    );

    match run(Viewport::new(width, height), &spec, &out_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_arg_reads_numbers() {
        let a = args(&["flockgrid", "800", "600", "12"]);
        assert_eq!(parse_arg::<f64>(&a, 1, "width"), Some(800.0));
        assert_eq!(parse_arg::<usize>(&a, 3, "count"), Some(12));
    }

    #[test]
    fn test_parse_arg_missing_and_rejected() {
        let a = args(&["flockgrid", "wide"]);
        assert_eq!(parse_arg::<f64>(&a, 1, "width"), None);
        assert_eq!(parse_arg::<f64>(&a, 2, "height"), None);
    }
}
