use std::path::PathBuf;

use anyhow::{Context, Result};
use cbct_viewer::{
    Orientation, Reslicer, SortBy, ViewerConfig, VolumeLoader, VolumeStore, worker::RotationWorker,
};
use clap::Parser;
use tracing::info;

/// Load a CBCT series and write its three midpoint reslices as PNG files.
#[derive(Parser)]
#[command(name = "cbct-viewer")]
struct Cli {
    /// Directory containing the .dcm files of the series
    #[arg(default_value = "dicom")]
    input: PathBuf,

    /// Directory the slice images are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Lower clip percentile of the display normalization
    #[arg(long, default_value_t = 1.0)]
    lower_percentile: f32,

    /// Upper clip percentile of the display normalization
    #[arg(long, default_value_t = 99.0)]
    upper_percentile: f32,

    /// Euler angles in degrees applied before slicing, composed in zxy order
    #[arg(long, num_args = 3, value_names = ["A", "B", "C"], allow_negative_numbers = true)]
    rotate: Option<Vec<f64>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ViewerConfig {
        lower_percentile: cli.lower_percentile,
        upper_percentile: cli.upper_percentile,
        ..ViewerConfig::default()
    };

    let series = VolumeLoader::load_series(&cli.input, SortBy::ImagePositionPatient)
        .with_context(|| format!("failed to load series from {}", cli.input.display()))?;
    for (label, value) in series.metadata.display_rows() {
        println!("{label}: {value}");
    }

    let mut data = series.volume.data;
    if let Some(angles) = cli.rotate {
        let angles = [angles[0], angles[1], angles[2]];
        let matrix = config.euler_order.matrix(angles);
        data = RotationWorker::spawn(data, matrix).result().await?;
    }

    let mut store = VolumeStore::new(config.lower_percentile, config.upper_percentile);
    store.load(data, series.volume.spacing)?;

    for orientation in Orientation::ALL {
        let slice = store.display_slice(orientation, None);
        let image = Reslicer::slice_to_image(&slice).context("slice does not fit an image")?;
        let path = cli
            .output
            .join(format!("{}.png", orientation.label().to_lowercase()));
        image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "slice written");
    }
    Ok(())
}
