use anyhow::Result;
use asset_gen::asset_gen::{generate_assets, Args, DEFAULT_FONT_PATH, DEFAULT_OUTPUT_DIR};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = "asset-gen",
    about = "Generate placeholder icon, splash, adaptive icon and favicon assets"
)]
struct Cli {
    /// Output directory.
    #[clap(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// TrueType font used for the icon and splash text. Falls back to a built-in font if it can't be loaded.
    #[clap(long, value_name = "PATH", default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    /// Print every generated file and the reason for a font fallback
    #[clap(short, long)]
    verbose: bool,
}

impl From<Cli> for Args {
    fn from(cli: Cli) -> Self {
        Self {
            output: cli.output,
            font: cli.font,
            verbose: cli.verbose,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::from(Cli::parse());

    generate_assets(&args)
}
