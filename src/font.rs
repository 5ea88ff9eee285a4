use crate::builtin_font;
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::{
    fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Why a TrueType font could not be used
#[derive(Debug, Error)]
pub enum FontError {
    /// The file is missing or could not be read
    #[error("Can't read font file {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but holds no usable face at index 0
    #[error("{} is not a supported font file", .path.display())]
    Unsupported { path: PathBuf },
}

/// The typeface every piece of text in a run is drawn with
pub enum TextFace {
    /// A TrueType face scaled to a fixed size
    TrueType { font: Font<'static>, scale: Scale },
    /// The built-in bitmap face, which has no size setting
    Builtin,
}

impl fmt::Debug for TextFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFace::TrueType { scale, .. } => f
                .debug_struct("TrueType")
                .field("scale", scale)
                .finish_non_exhaustive(),
            TextFace::Builtin => f.write_str("Builtin"),
        }
    }
}

/// Load the font at `path`, falling back to the built-in face on any failure.
///
/// Never fails. The second element carries the reason a fallback happened so
/// callers can report it; it does not change which face is returned.
pub fn load_font(path: &Path, px_per_em: f32) -> (TextFace, Option<FontError>) {
    match load_truetype(path, px_per_em) {
        Ok(face) => (face, None),
        Err(err) => (TextFace::Builtin, Some(err)),
    }
}

/// Load face 0 of a TrueType/OpenType file or collection at `px_per_em` pixels per em
pub fn load_truetype(path: &Path, px_per_em: f32) -> Result<TextFace, FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let unsupported = || FontError::Unsupported {
        path: path.to_path_buf(),
    };
    let font = Font::try_from_vec_and_index(data, 0).ok_or_else(unsupported)?;
    let scale = em_scale(&font, px_per_em).ok_or_else(unsupported)?;

    Ok(TextFace::TrueType { font, scale })
}

// rusttype scales by line height (ascent to descent); font sizes are given per em.
fn em_scale(font: &Font<'_>, px_per_em: f32) -> Option<Scale> {
    let v_metrics = font.v_metrics_unscaled();
    line_height_scale(
        v_metrics.ascent,
        v_metrics.descent,
        font.units_per_em(),
        px_per_em,
    )
}

fn line_height_scale(
    ascent: f32,
    descent: f32,
    units_per_em: u16,
    px_per_em: f32,
) -> Option<Scale> {
    if units_per_em == 0 {
        return None;
    }
    let line_height = (ascent - descent) / f32::from(units_per_em);
    Some(Scale::uniform(line_height * px_per_em))
}

impl TextFace {
    /// Width and height of the box `text` occupies when drawn
    pub fn text_size(&self, text: &str) -> (f32, f32) {
        match self {
            TextFace::TrueType { font, scale } => {
                let v_metrics = font.v_metrics(*scale);
                (
                    advance_width(font, *scale, text),
                    v_metrics.ascent - v_metrics.descent,
                )
            }
            TextFace::Builtin => {
                let (width, height) = builtin_font::text_size(text);
                (width as f32, height as f32)
            }
        }
    }

    /// Draw `text` so the middle of its box lands on `center`.
    ///
    /// Horizontally the box spans the advance width, vertically it spans
    /// ascender to descender. Anything falling outside the canvas is clipped.
    pub fn draw_centered(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        center: (f32, f32),
        color: Rgb<u8>,
    ) {
        let (center_x, center_y) = center;
        let (width, height) = self.text_size(text);
        let left = center_x - width / 2.0;
        let top = center_y - height / 2.0;

        match self {
            TextFace::TrueType { font, scale } => {
                let baseline = point(left, top + font.v_metrics(*scale).ascent);

                for glyph in font.layout(text, *scale, baseline) {
                    if let Some(bounds) = glyph.pixel_bounding_box() {
                        glyph.draw(|x, y, coverage| {
                            blend_pixel(
                                canvas,
                                bounds.min.x + x as i32,
                                bounds.min.y + y as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                }
            }
            TextFace::Builtin => {
                let (left, top) = (left.round() as i32, top.round() as i32);
                builtin_font::rasterize(text, |x, y| {
                    blend_pixel(canvas, left + x as i32, top + y as i32, color, 1.0);
                });
            }
        }
    }
}

fn advance_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }

    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        let blended = f32::from(*dst) * (1.0 - coverage) + f32::from(src) * coverage;
        *dst = blended.round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLUE: Rgb<u8> = Rgb([59, 130, 246]);

    fn lit_bounds(canvas: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if *pixel == WHITE {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    #[test]
    fn test_missing_font_is_unreadable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nope.ttf");

        let err = load_truetype(&path, 400.0).unwrap_err();
        match err {
            FontError::Unreadable { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_font_is_unsupported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("broken.ttc");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let err = load_truetype(&path, 400.0).unwrap_err();
        assert!(matches!(err, FontError::Unsupported { .. }));
        assert!(err.to_string().contains("broken.ttc"));
    }

    #[test]
    fn test_load_font_falls_back_to_builtin() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("Helvetica.ttc");

        let (face, cause) = load_font(&path, 400.0);
        assert!(matches!(face, TextFace::Builtin));
        assert!(matches!(cause, Some(FontError::Unreadable { .. })));
    }

    #[test]
    fn test_builtin_text_size() {
        assert_eq!(TextFace::Builtin.text_size("T"), (10.0, 14.0));
        assert_eq!(TextFace::Builtin.text_size(""), (0.0, 0.0));
    }

    #[test]
    fn test_builtin_draw_is_centered() {
        let mut canvas = RgbImage::from_pixel(200, 100, BLUE);
        TextFace::Builtin.draw_centered(&mut canvas, "T", (100.0, 50.0), WHITE);

        let (x0, y0, x1, y1) = lit_bounds(&canvas).expect("nothing was drawn");
        let mid_x = (x0 + x1) as f32 / 2.0;
        let mid_y = (y0 + y1) as f32 / 2.0;
        assert!((mid_x - 100.0).abs() <= 1.0, "horizontal middle at {mid_x}");
        assert!((mid_y - 50.0).abs() <= 1.0, "vertical middle at {mid_y}");
        assert_eq!(*canvas.get_pixel(0, 0), BLUE);
    }

    #[test]
    fn test_draw_clips_at_canvas_edges() {
        let mut canvas = RgbImage::from_pixel(8, 8, BLUE);
        // only the top-left quarter of the text box overlaps the canvas
        TextFace::Builtin.draw_centered(&mut canvas, "TechRide", (0.0, 0.0), WHITE);

        // left stroke of the R, and the blank column before it
        assert_eq!(*canvas.get_pixel(1, 0), WHITE);
        assert_eq!(*canvas.get_pixel(1, 1), WHITE);
        assert_eq!(*canvas.get_pixel(0, 0), BLUE);

        let before = canvas.clone();
        TextFace::Builtin.draw_centered(&mut canvas, "TechRide", (-1000.0, -1000.0), WHITE);
        TextFace::Builtin.draw_centered(&mut canvas, "TechRide", (1000.0, 1000.0), WHITE);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_zero_units_per_em_is_rejected() {
        assert!(line_height_scale(1900.0, -500.0, 0, 400.0).is_none());

        let scale = line_height_scale(1901.0, -483.0, 2048, 400.0).unwrap();
        assert!((scale.y - 2384.0 / 2048.0 * 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_truetype_draw_is_centered_when_available() {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ];
        let Some(path) = candidates.into_iter().find(|path| Path::new(path).is_file()) else {
            println!("DejaVuSans not found, skipping");
            return;
        };

        let face = load_truetype(Path::new(path), 400.0).unwrap();
        let TextFace::TrueType { font, scale } = &face else {
            panic!("expected a TrueType face, got {face:?}");
        };
        let v_metrics = font.v_metrics(*scale);
        let baseline = 512.0 + (v_metrics.ascent + v_metrics.descent) / 2.0;

        let mut canvas = RgbImage::from_pixel(1024, 1024, BLUE);
        face.draw_centered(&mut canvas, "T", (512.0, 512.0), WHITE);

        let mut ink: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if *pixel != BLUE {
                ink = Some(match ink {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        let (x0, _, x1, y1) = ink.expect("nothing was drawn");

        let mid_x = (x0 + x1) as f32 / 2.0;
        assert!((mid_x - 512.0).abs() <= 1.0, "horizontal middle at {mid_x}");
        // T sits on the baseline
        assert!(
            (y1 as f32 - baseline).abs() <= 1.0,
            "bottom ink row {y1}, baseline {baseline}"
        );
    }

    #[test]
    fn test_blend_pixel_mixes_by_coverage() {
        let mut canvas = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        blend_pixel(&mut canvas, 0, 0, WHITE, 0.5);
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([128, 128, 128]));

        blend_pixel(&mut canvas, -1, 0, WHITE, 1.0);
        blend_pixel(&mut canvas, 0, 1, WHITE, 1.0);
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([128, 128, 128]));
    }
}
