use anyhow::{Context, Result};
use asset_gen::asset_gen::{ADAPTIVE_ICON_FILE, ASSET_FILES, DEFAULT_OUTPUT_DIR, ICON_FILE};
use std::path::PathBuf;

fn main() -> Result<()> {
    let dir = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
    );

    println!("Checking assets in: {}", dir.display());

    for name in ASSET_FILES {
        let path = dir.join(name);
        let (width, height) = image::image_dimensions(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        println!("  {name}: {width}x{height}");
    }

    let icon = std::fs::read(dir.join(ICON_FILE)).context("Failed to read icon")?;
    let adaptive =
        std::fs::read(dir.join(ADAPTIVE_ICON_FILE)).context("Failed to read adaptive icon")?;

    if icon == adaptive {
        println!("✓ {ADAPTIVE_ICON_FILE} is identical to {ICON_FILE}");
    } else {
        println!("⚠ {ADAPTIVE_ICON_FILE} differs from {ICON_FILE}");
    }

    Ok(())
}
