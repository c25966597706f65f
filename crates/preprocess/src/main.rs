//! Offline preprocessing binary.
//!
//! Reads the raw dataset tables, builds every precomputed artifact and
//! writes the snapshot directory the recommendation service loads at start.

use tracing::info;

use bookrec_preprocess::PreprocessConfig;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting preprocessing pipeline");

    let config = PreprocessConfig::load()?;
    bookrec_preprocess::run(&config)?;

    info!("Preprocessing pipeline finished");
    Ok(())
}
