//! # parkscan Station Entry Point
//!
//! ```text
//! parkscan-station [scanner.toml] < frames.txt
//! ```
//!
//! Each stdin line is one camera frame.

use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    parkscan_station::init_tracing();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    parkscan_station::run(config_path).await?;

    Ok(())
}
