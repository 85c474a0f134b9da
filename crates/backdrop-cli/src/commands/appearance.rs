//! Brightness and contrast commands

use backdrop_core::imaging::{analyze, Brightness, ContrastStyle};
use backdrop_core::BackdropConfig;
use backdrop_engine::CatalogManager;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Image file to measure
    pub file: PathBuf,
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn describe(brightness: &Brightness, style: &ContrastStyle) -> String {
    let mut out = format!(
        "luminance: {:.3}{}\ntone: {:?}\n",
        brightness.luminance,
        if brightness.decoded { "" } else { " (neutral, image not decodable)" },
        brightness.tone
    );
    for (name, value) in style.css_variables() {
        out.push_str(&format!("{}: {}\n", name, value));
    }
    out
}

pub async fn classify(args: ClassifyArgs) -> CmdResult {
    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| format!("{}: {}", args.file.display(), e))?;
    let brightness = analyze(&bytes);

    print!("{}", describe(&brightness, &ContrastStyle::for_brightness(&brightness)));
    Ok(())
}

pub async fn contrast(config: &BackdropConfig) -> CmdResult {
    let manager = CatalogManager::open(config).await?;
    manager.initialize().await?;

    let current = manager.current().await;
    let brightness = manager.current_brightness().await?;
    println!("asset: {}", current.id);
    print!("{}", describe(&brightness, &ContrastStyle::for_brightness(&brightness)));
    Ok(())
}
