//! A thin CLI demonstrator around `scanchop_core`. Not a desktop-shell UI --
//! just enough wiring to drive `extract_frame` against a path and a seed
//! from the command line.

#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scanchop_core::{init_logging, LoadVariant, ProcessingConfig, ScanChop, Vector2};

#[derive(Parser)]
#[command(name = "scanchop", about = "Seed-point crop extraction for scanned sheets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a single frame from a seed point and write it to a PNG file.
    Extract {
        /// Path to the source sheet image.
        source: PathBuf,
        /// Seed x coordinate, in display-space pixels -- the same
        /// coordinates as the image `render` writes out, not the original's.
        #[arg(long)]
        x: f64,
        /// Seed y coordinate, in display-space pixels.
        #[arg(long)]
        y: f64,
        /// Where to write the extracted frame.
        #[arg(long, default_value = "frame.png")]
        output: PathBuf,
        /// Label to store on the frame record.
        #[arg(long, default_value = "frame")]
        label: String,
        /// Path to a JSON `ProcessingConfig` override file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overwrite `output` if it already exists.
        #[arg(long)]
        overwrite: bool,
    },
    /// Decode a source image and write a display-scaled PNG copy.
    Render {
        source: PathBuf,
        #[arg(long, default_value = "display.png")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let app = ScanChop::new();

    let result = match cli.command {
        Command::Extract { source, x, y, output, label, config, overwrite } => {
            extract(&app, source, x, y, output, label, config, overwrite).await
        }
        Command::Render { source, output } => render(&app, source, output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn extract(
    app: &ScanChop,
    source: PathBuf,
    x: f64,
    y: f64,
    output: PathBuf,
    label: String,
    config_path: Option<PathBuf>,
    overwrite: bool,
) -> Result<(), String> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
            serde_json::from_str(&text).map_err(|e| e.to_string())?
        }
        None => ProcessingConfig::default(),
    };

    let record = app
        .extract_frame(&source, Vector2::new(x, y), label, &config)
        .await
        .map_err(|e| e.to_string())?;

    info!("extracted {} ({}x{})", record.id, record.image.width(), record.image.height());

    app.save_frame_to_path(&record.id, &output, overwrite).await.map_err(|e| e.to_string())?;
    info!("wrote {}", output.display());
    Ok(())
}

async fn render(app: &ScanChop, source: PathBuf, output: PathBuf) -> Result<(), String> {
    let display = app
        .load_image_for_display(&source, LoadVariant::MaxDims { max_width: Some(1920), max_height: Some(1080) })
        .await
        .map_err(|e| e.to_string())?;
    std::fs::write(&output, &display.image_bytes).map_err(|e| e.to_string())?;
    info!(
        "wrote {} ({}x{}, original {}x{})",
        output.display(),
        display.width,
        display.height,
        display.original_width,
        display.original_height
    );
    Ok(())
}
