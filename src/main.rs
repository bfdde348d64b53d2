use clap::Parser;
use std::path::PathBuf;

use rastervec::output::{dxf, svg};
use rastervec::raster::{self, RasterOptions};
use rastervec::{trace, TraceError, TraceOptions, TurnPolicy};

#[derive(Parser)]
#[command(name = "rastervec", about = "Raster bitmap to SVG/DXF vector tracer")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; format chosen by extension (.svg or .dxf)
    #[arg(short, long)]
    output: PathBuf,

    /// Fixed brightness threshold (0-255). Overrides Otsu auto-detection.
    #[arg(long)]
    threshold: Option<u8>,

    /// Trace bright regions instead of dark ones
    #[arg(long)]
    invert: bool,

    /// Shrink the image by this integer factor before tracing
    #[arg(long, default_value = "1")]
    downsample: u32,

    /// Display scale applied to the SVG dimensions
    #[arg(long, default_value = "1.0")]
    scale: f64,

    /// Unit for the SVG dimensions (px, mm, ...)
    #[arg(long, default_value = "px")]
    unit: String,

    /// Ambiguity tie-break: black, white, left, right, majority, minority
    #[arg(long, default_value = "minority")]
    turnpolicy: String,

    /// Drop contours whose area is at or below this many pixels
    #[arg(long, default_value = "2")]
    turdsize: i32,

    /// Corner detection sensitivity (0.0-1.34). Lower = more corners.
    #[arg(long, default_value = "1.0")]
    alphamax: f64,

    /// Maximum deviation when merging curve segments
    #[arg(long, default_value = "0.2")]
    opttolerance: f64,

    /// Disable curve segment merging
    #[arg(long)]
    no_optcurve: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let raster_options = RasterOptions {
        threshold: cli.threshold,
        invert: cli.invert,
        downsample: cli.downsample,
    };
    let options = TraceOptions {
        turn_policy: cli.turnpolicy.parse::<TurnPolicy>()?,
        turd_size: cli.turdsize,
        opt_curve: !cli.no_optcurve,
        alpha_max: cli.alphamax,
        opt_tolerance: cli.opttolerance,
    };

    eprintln!();
    eprintln!("  rastervec \u{00b7} {}", cli.input.display());
    eprintln!();

    let bitmap = raster::load_bitmap(&cli.input, &raster_options)?;
    let threshold_name = match cli.threshold {
        Some(t) => format!("fixed {}", t),
        None => "Otsu".to_string(),
    };
    eprintln!(
        "  Load        {}x{} px, {} threshold",
        bitmap.width(),
        bitmap.height(),
        threshold_name
    );

    let paths = trace(&bitmap, &options)?;
    if paths.is_empty() {
        return Err(TraceError::EmptyPathList.into());
    }
    eprintln!(
        "  Trace       {} contours \u{2192} {} segments  ({} policy, turdsize {})",
        paths.curves.len(),
        paths.segment_count(),
        options.turn_policy,
        options.turd_size,
    );

    let ext = cli.output.extension().and_then(|e| e.to_str()).unwrap_or("");
    let text = match ext {
        "svg" => svg::render_svg(&paths, cli.scale, &cli.unit)?,
        "dxf" => dxf::render_dxf(&paths),
        other => {
            return Err(TraceError::InvalidOptions(format!(
                "unsupported output extension {:?} (expected svg or dxf)",
                other
            ))
            .into())
        }
    };
    std::fs::write(&cli.output, text)?;

    eprintln!();
    eprintln!("  \u{2713} {}", cli.output.display());
    eprintln!();

    Ok(())
}
