//! Seed script for development: hashes plaintext profile passwords in the dataset file.
//!
//! Usage: `cargo run --bin seed`
//!
//! Reads `DATA_PATH` (default `server/db.json`, `.env` honoured) and rewrites it in place.

use anyhow::Context;
use kpidash::config::AppConfig;
use kpidash::db::Dataset;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let path = AppConfig::from_env().data_path;
    println!("=== Dashboard Seed Script ===");

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let mut dataset = Dataset::from_json(&raw)?;

    println!(
        "Loaded {} stats, {} revenue, {} orders, {} users, {} traffic, {} profiles",
        dataset.stats.len(),
        dataset.revenue.len(),
        dataset.orders.len(),
        dataset.users.len(),
        dataset.traffic.len(),
        dataset.profiles.len(),
    );

    let hashed = dataset.hash_plaintext_passwords()?;
    if hashed == 0 {
        println!("[skip] All profile passwords already hashed");
        return Ok(());
    }

    tokio::fs::write(&path, serde_json::to_string_pretty(&dataset)?).await?;
    println!("[done] Hashed {hashed} password(s) in {}", path.display());

    Ok(())
}
