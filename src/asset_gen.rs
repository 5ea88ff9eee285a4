use crate::font::{self, TextFace};
use anyhow::{Context, Result};
use image::{
    codecs::png::PngEncoder, imageops::FilterType, ColorType, ImageEncoder, Rgb, RgbImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

pub const DEFAULT_OUTPUT_DIR: &str = "assets";
pub const DEFAULT_FONT_PATH: &str = "/System/Library/Fonts/Helvetica.ttc";
pub const FONT_SIZE: f32 = 400.0;

pub const BACKGROUND_COLOR: &str = "#3B82F6";
pub const TEXT_COLOR: &str = "#FFFFFF";

pub const ICON_SIZE: u32 = 1024;
pub const ICON_TEXT: &str = "T";
pub const SPLASH_WIDTH: u32 = 1242;
pub const SPLASH_HEIGHT: u32 = 2436;
pub const SPLASH_TEXT: &str = "TechRide";
pub const FAVICON_SIZE: u32 = 48;

pub const ICON_FILE: &str = "icon.png";
pub const SPLASH_FILE: &str = "splash.png";
pub const ADAPTIVE_ICON_FILE: &str = "adaptive-icon.png";
pub const FAVICON_FILE: &str = "favicon.png";

/// Every file a run writes, in the order they are written
pub const ASSET_FILES: [&str; 4] = [ICON_FILE, SPLASH_FILE, ADAPTIVE_ICON_FILE, FAVICON_FILE];

pub const SUCCESS_MESSAGE: &str = "Assets created successfully!";

#[derive(Debug, Clone)]
pub struct Args {
    pub output: PathBuf,
    pub font: PathBuf,
    pub verbose: bool,
}

pub fn generate_assets(args: &Args) -> Result<()> {
    ensure_output_dir(&args.output)?;

    let (face, fallback_cause) = font::load_font(&args.font, FONT_SIZE);
    if let (true, Some(cause)) = (args.verbose, fallback_cause) {
        eprintln!("Using built-in font: {:#}", anyhow::Error::from(cause));
    }

    let icon = create_icon(&args.output, &face)?;
    report(args, ICON_FILE);

    create_splash(&args.output, &face)?;
    report(args, SPLASH_FILE);

    derive_adaptive_icon(&args.output, &icon)?;
    report(args, ADAPTIVE_ICON_FILE);

    derive_favicon(&args.output, &icon)?;
    report(args, FAVICON_FILE);

    println!("{SUCCESS_MESSAGE}");
    Ok(())
}

fn report(args: &Args, filename: &str) {
    if args.verbose {
        println!("  ✓ Generated {}", args.output.join(filename).display());
    }
}

/// Create `dir` and any missing parents; an existing directory is fine
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir)
        .with_context(|| format!("Can't create output directory {}", dir.display()))
}

/// Draw the app icon, save it and hand the canvas back for the derived assets
pub fn create_icon(out_dir: &Path, face: &TextFace) -> Result<RgbImage> {
    let mut icon = brand_canvas(ICON_SIZE, ICON_SIZE)?;
    let center = (ICON_SIZE as f32 / 2.0, ICON_SIZE as f32 / 2.0);
    face.draw_centered(&mut icon, ICON_TEXT, center, parse_color(TEXT_COLOR)?);

    save_png(&icon, &out_dir.join(ICON_FILE))?;
    Ok(icon)
}

pub fn create_splash(out_dir: &Path, face: &TextFace) -> Result<()> {
    let mut splash = brand_canvas(SPLASH_WIDTH, SPLASH_HEIGHT)?;
    let center = (SPLASH_WIDTH as f32 / 2.0, SPLASH_HEIGHT as f32 / 2.0);
    face.draw_centered(&mut splash, SPLASH_TEXT, center, parse_color(TEXT_COLOR)?);

    save_png(&splash, &out_dir.join(SPLASH_FILE))
}

/// The adaptive icon is the icon canvas saved under a second name
pub fn derive_adaptive_icon(out_dir: &Path, icon: &RgbImage) -> Result<()> {
    save_png(icon, &out_dir.join(ADAPTIVE_ICON_FILE))
}

pub fn derive_favicon(out_dir: &Path, icon: &RgbImage) -> Result<()> {
    let favicon = image::imageops::resize(icon, FAVICON_SIZE, FAVICON_SIZE, FilterType::CatmullRom);
    save_png(&favicon, &out_dir.join(FAVICON_FILE))
}

fn brand_canvas(width: u32, height: u32) -> Result<RgbImage> {
    Ok(RgbImage::from_pixel(width, height, parse_color(BACKGROUND_COLOR)?))
}

/// Parse a CSS color into an opaque RGB pixel
pub fn parse_color(color: &str) -> Result<Rgb<u8>> {
    let srgb = css_color::Srgb::from_str(color)
        .map_err(|_| anyhow::anyhow!("Invalid color: {color}"))?;

    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.).round() as u8;
    Ok(Rgb([
        channel(srgb.red),
        channel(srgb.green),
        channel(srgb.blue),
    ]))
}

fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);

    PngEncoder::new(&mut out_file)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    out_file.flush()?;

    Ok(())
}
