// src/main.rs

use color_eyre::eyre::{Result, eyre};

use reputon::logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let target = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: reputon <hostname | url | ipv4>"))?;

    let report = reputon::analyze_reputation(&target).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
