//! Utility to print the snapshot documents' record counts and locations.

use fraud_score_api::snapshot_store::SnapshotStore;

/// Main entry point for the snapshot inspection utility.
///
/// Takes the data directory as the first argument (default `./data`). Does not
/// create missing documents.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let data_dir = std::env::current_dir()?.join(data_dir);
    let store = SnapshotStore::new(data_dir);

    let counts = store
        .read_counts()
        .await
        .map_err(|e| anyhow::anyhow!("cannot read snapshot: {}", e))?;

    println!("Snapshot in {}", store.data_dir().display());
    println!("- users:       {} ({})", counts.users_count, counts.paths.users);
    println!(
        "- predictions: {} ({})",
        counts.predictions_count, counts.paths.predictions
    );

    Ok(())
}
