//! Catalog commands: list, current, add, delete, use, export

use backdrop_core::{AssetRecord, BackdropConfig};
use backdrop_engine::CatalogManager;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Image file to add
    pub file: PathBuf,

    /// Extension for the stored key (default: the file's extension)
    #[arg(long)]
    pub ext: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    /// Asset id as shown by `list`
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    pub id: String,

    /// Destination file
    pub out: PathBuf,
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

async fn open_manager(config: &BackdropConfig) -> Result<CatalogManager, Box<dyn std::error::Error>> {
    let manager = CatalogManager::open(config).await?;
    manager.initialize().await?;
    tracing::debug!(backend = %manager.backend(), "catalog ready");
    Ok(manager)
}

/// One catalog line: current marker, id, key, creation time, default flag
pub fn format_record(record: &AssetRecord, is_current: bool) -> String {
    format!(
        "{} {:<22} {:<34} {}{}",
        if is_current { "*" } else { " " },
        record.id,
        record.key,
        record.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        if record.is_default { "  (default)" } else { "" }
    )
}

/// Extension hint for a file: explicit override, else the file's extension
pub fn extension_hint(file: &Path, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

pub async fn list(config: &BackdropConfig) -> CmdResult {
    let manager = open_manager(config).await?;
    let current = manager.current().await;

    println!("backend: {}", manager.backend());
    for record in manager.catalog().await {
        println!("{}", format_record(&record, record.id == current.id));
    }
    Ok(())
}

pub async fn current(config: &BackdropConfig) -> CmdResult {
    let manager = open_manager(config).await?;
    println!("{}", format_record(&manager.current().await, true));
    Ok(())
}

pub async fn add(config: &BackdropConfig, args: AddArgs) -> CmdResult {
    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| format!("{}: {}", args.file.display(), e))?;
    let hint = extension_hint(&args.file, args.ext.as_deref());

    let manager = open_manager(config).await?;
    let record = manager.add_asset(&bytes, &hint).await?;

    println!("Added {} ({})", record.id, record.key);
    Ok(())
}

pub async fn delete(config: &BackdropConfig, args: IdArgs) -> CmdResult {
    let manager = open_manager(config).await?;
    manager.delete_asset(&args.id).await?;

    println!("Deleted {}", args.id);
    println!("Current: {}", manager.current().await.id);
    Ok(())
}

pub async fn use_asset(config: &BackdropConfig, args: IdArgs) -> CmdResult {
    let manager = open_manager(config).await?;
    let record = manager.set_current(&args.id).await?;

    println!("Current: {} ({})", record.id, record.key);
    Ok(())
}

pub async fn export(config: &BackdropConfig, args: ExportArgs) -> CmdResult {
    let manager = open_manager(config).await?;
    let bytes = manager
        .asset_bytes(&args.id)
        .await?
        .ok_or_else(|| format!("no stored bytes for asset {}", args.id))?;

    tokio::fs::write(&args.out, &bytes)
        .await
        .map_err(|e| format!("{}: {}", args.out.display(), e))?;
    println!("Exported {} bytes to {}", bytes.len(), args.out.display());
    Ok(())
}
