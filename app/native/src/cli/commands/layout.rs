//! Layout CLI command.
//!
//! Runs the layout calculator on synthetic windows, which is useful for
//! tuning and for reproducing a crowded arrangement with a fixed seed.

use clap::Args;
use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::error::ScatterError;
use crate::scatter::geometry::{ScreenRect, Size};
use crate::scatter::layout::{LayoutCalculator, LayoutPlan};
use crate::scatter::window::{SourceWindow, WindowHandle};

/// Offset between synthetic windows that have no explicit position.
const CASCADE_STEP: i32 = 30;

/// Maximum characters shown for a title in the table.
const TITLE_WIDTH: usize = 24;

/// Canvas dimensions given as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// A synthetic window given as `WxH` or `WxH@X,Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub width: i32,
    pub height: i32,
    pub origin: Option<(i32, i32)>,
}

/// Arguments of `scatter layout`.
#[derive(Args, Debug)]
#[command(after_long_help = r#"Examples:
  scatter layout --window 1280x720 --window 800x600
  scatter layout --canvas 2560x1440 --window 1920x1080@0,0 --window 640x480@100,80 --seed 42
  scatter layout --window 1024x768 --json"#)]
pub struct LayoutArgs {
    /// Canvas size the thumbnails are placed on.
    #[arg(long, value_name = "WxH", default_value = "1920x1080", value_parser = parse_canvas)]
    pub canvas: CanvasSize,

    /// A window to place, foreground first. Repeat for more windows.
    #[arg(long = "window", short, value_name = "WxH[@X,Y]", value_parser = parse_window)]
    pub windows: Vec<WindowSpec>,

    /// Seed for the random jitter, for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PlacementRow {
    #[tabled(rename = "Window")]
    title: String,
    #[tabled(rename = "Original")]
    original: String,
    #[tabled(rename = "Thumbnail")]
    size: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Scale")]
    scale: String,
}

/// Execute the layout command.
///
/// # Errors
///
/// Returns an error if the plan cannot be serialized.
pub fn execute(args: &LayoutArgs) -> Result<(), ScatterError> {
    let windows = synthetic_windows(&args.windows);
    let canvas = Size::new(f64::from(args.canvas.width), f64::from(args.canvas.height));

    let mut calculator =
        args.seed.map_or_else(LayoutCalculator::from_entropy, LayoutCalculator::with_seed);
    let plan = calculator.calculate(&windows, canvas);

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(&plan)?);
        return Ok(());
    }

    if plan.layouts.is_empty() {
        println!("{}", "No windows to place. Add some with --window WxH.".dimmed());
        return Ok(());
    }

    let table = Table::new(placement_rows(&plan))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..5)).with(Alignment::right()))
        .to_string();

    let count = plan.layouts.len();
    println!(
        "{}",
        format!("Layout ({count} windows on {}x{})", args.canvas.width, args.canvas.height).bold()
    );
    println!("{table}");
    println!("Scale factor: {:.3}", plan.scale);
    if plan.fallbacks > 0 {
        println!(
            "{} {} window(s) did not fit and were centered",
            "Warning:".yellow(),
            plan.fallbacks
        );
    }

    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
fn synthetic_windows(specs: &[WindowSpec]) -> Vec<SourceWindow> {
    (0_i32..)
        .zip(specs)
        .map(|(index, spec)| {
            let (left, top) =
                spec.origin.unwrap_or((index * CASCADE_STEP, index * CASCADE_STEP));
            SourceWindow::new(
                WindowHandle(index as isize + 1),
                format!("Window {}", index + 1),
                ScreenRect::from_origin_size(left, top, spec.width, spec.height),
            )
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn placement_rows(plan: &LayoutPlan) -> Vec<PlacementRow> {
    plan.layouts
        .iter()
        .map(|layout| {
            let rect = layout.rect;
            let ratio = rect.width / layout.original_width.max(1.0);
            PlacementRow {
                title: output::truncate(&layout.window.title, TITLE_WIDTH),
                original: format!("{}x{}", layout.original_width, layout.original_height),
                size: format!("{}x{}", rect.width.round() as i64, rect.height.round() as i64),
                position: format!("{}, {}", rect.x.round() as i64, rect.y.round() as i64),
                scale: format!("{:.0}%", ratio * 100.0),
            }
        })
        .collect()
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Invalid size '{value}'. Expected WxH, e.g. 1280x720."))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("Invalid size '{value}'. Width and height must be positive."))
    };

    Ok((parse(width)?, parse(height)?))
}

fn parse_canvas(value: &str) -> Result<CanvasSize, String> {
    let (width, height) = parse_dimensions(value)?;
    Ok(CanvasSize { width, height })
}

fn parse_window(value: &str) -> Result<WindowSpec, String> {
    let (size, origin) = match value.split_once('@') {
        Some((size, origin)) => (size, Some(origin)),
        None => (value, None),
    };

    let (width, height) = parse_dimensions(size)?;
    let too_large = || format!("Invalid size '{size}'. Dimensions are too large.");
    let width = i32::try_from(width).map_err(|_| too_large())?;
    let height = i32::try_from(height).map_err(|_| too_large())?;

    let origin = origin
        .map(|origin| {
            let (x, y) = origin
                .split_once(',')
                .ok_or_else(|| format!("Invalid position '{origin}'. Expected X,Y."))?;
            let coord = |part: &str| {
                part.trim()
                    .parse::<i32>()
                    .map_err(|_| format!("Invalid position '{origin}'. Expected integers."))
            };
            Ok::<_, String>((coord(x)?, coord(y)?))
        })
        .transpose()?;

    let overflows = origin
        .is_some_and(|(x, y)| x.checked_add(width).is_none() || y.checked_add(height).is_none());
    if overflows {
        return Err(format!("Invalid window '{value}'. It extends past the coordinate range."));
    }

    Ok(WindowSpec { width, height, origin })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("1920x1080"), Ok(CanvasSize { width: 1920, height: 1080 }));
        assert_eq!(parse_canvas("800X600"), Ok(CanvasSize { width: 800, height: 600 }));
        assert!(parse_canvas("1920").is_err());
        assert!(parse_canvas("0x100").is_err());
        assert!(parse_canvas("-5x100").is_err());
    }

    #[test]
    fn test_parse_window_without_position() {
        assert_eq!(
            parse_window("1280x720"),
            Ok(WindowSpec { width: 1280, height: 720, origin: None })
        );
    }

    #[test]
    fn test_parse_window_with_position() {
        assert_eq!(
            parse_window("640x480@-10,25"),
            Ok(WindowSpec { width: 640, height: 480, origin: Some((-10, 25)) })
        );
        assert!(parse_window("640x480@10").is_err());
        assert!(parse_window("640x480@a,b").is_err());
    }

    #[test]
    fn test_parse_window_rejects_overflowing_extent() {
        assert!(parse_window("2000000000x200@2000000000,0").is_err());
        assert!(parse_window("200x2000000000@0,2000000000").is_err());
        assert!(parse_window("2000000000x200@-2000000000,0").is_ok());
    }

    #[test]
    fn test_synthetic_windows_cascade() {
        let specs = [
            WindowSpec { width: 800, height: 600, origin: None },
            WindowSpec { width: 800, height: 600, origin: None },
            WindowSpec { width: 400, height: 300, origin: Some((5, 6)) },
        ];
        let windows = synthetic_windows(&specs);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].rect, ScreenRect::from_origin_size(0, 0, 800, 600));
        assert_eq!(windows[1].rect, ScreenRect::from_origin_size(30, 30, 800, 600));
        assert_eq!(windows[2].rect, ScreenRect::from_origin_size(5, 6, 400, 300));
        assert_eq!(windows[2].title, "Window 3");
        assert_eq!(windows[0].handle, WindowHandle(1));
    }

    #[test]
    fn test_synthetic_windows_cascade_near_range_limit() {
        let spec = parse_window("2147483647x200").unwrap();
        let windows = synthetic_windows(&[spec, spec]);
        assert_eq!(windows[1].rect.right, i32::MAX);
        assert_eq!(windows[1].rect.left, 30);
    }

    #[test]
    fn test_placement_rows_follow_plan() {
        let specs = [
            WindowSpec { width: 1280, height: 720, origin: None },
            WindowSpec { width: 800, height: 600, origin: None },
        ];
        let windows = synthetic_windows(&specs);
        let plan = LayoutCalculator::with_seed(3).calculate(&windows, Size::new(1920.0, 1080.0));
        let rows = placement_rows(&plan);

        assert_eq!(rows.len(), 2);
        // Bottom-most window comes first.
        assert_eq!(rows[0].title, "Window 2");
        assert_eq!(rows[0].original, "800x600");
        assert!(rows[1].scale.ends_with('%'));
    }

    #[test]
    fn test_execute_json_and_table() {
        let args = LayoutArgs {
            canvas: CanvasSize { width: 1280, height: 800 },
            windows: vec![WindowSpec { width: 1024, height: 768, origin: None }],
            seed: Some(1),
            json: false,
        };
        assert!(execute(&args).is_ok());
        assert!(execute(&LayoutArgs { json: true, ..args }).is_ok());
    }
}
