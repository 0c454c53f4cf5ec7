//! Text rasterization: one line of text onto a fresh monochrome bitmap.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};
use rusttype::{point, Font, Scale};

use crate::consts::{BACKGROUND_SUM_THRESHOLD, LINE_HEIGHT_FACTOR};
use crate::epl::GraphicsSegment;
use crate::error::{LabelError, Result};
use crate::label::LabelField;

/// A monochrome bitmap whose width is always a whole number of bytes.
/// `true` = background (unprinted), `false` = ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width_bytes: u32,
    height_px: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// All-background bitmap of `width_bytes * 8` by `height_px`.
    pub fn new(width_bytes: u32, height_px: u32) -> Self {
        let len = width_bytes as usize * 8 * height_px as usize;
        Self { width_bytes, height_px, pixels: vec![true; len] }
    }

    pub fn width_bytes(&self) -> u32 {
        self.width_bytes
    }

    pub fn width_px(&self) -> u32 {
        self.width_bytes * 8
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width_px() && y < self.height_px)
            .then(|| y as usize * self.width_px() as usize + x as usize)
    }

    /// Out-of-range coordinates read as background.
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        self.index(x, y).map_or(true, |i| self.pixels[i])
    }

    pub fn set_ink(&mut self, x: u32, y: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = false;
        }
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|bg| !**bg).count()
    }

    /// Apply the luminance midpoint rule to a drawn surface.
    ///
    /// A pixel is background when `(R+G+B)/3 > 128`, compared as
    /// `R+G+B > 384` so no precision is lost to integer division.
    pub fn from_surface(surface: &RgbImage) -> Self {
        let mut bitmap = Self::new(surface.width().div_ceil(8), surface.height());
        for (x, y, px) in surface.enumerate_pixels() {
            let sum: u32 = px.0.iter().map(|c| u32::from(*c)).sum();
            if sum <= BACKGROUND_SUM_THRESHOLD {
                bitmap.set_ink(x, y);
            }
        }
        bitmap
    }

    /// Black-on-white preview image.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width_px(), self.height_px, |x, y| {
            if self.is_background(x, y) { Luma([255]) } else { Luma([0]) }
        })
    }
}

struct Face {
    font: Font<'static>,
    // Regular faces are emboldened by a second pass 1px to the right.
    synthetic_bold: bool,
}

/// Fonts available to the rasterizer, keyed by family name.
#[derive(Default)]
pub struct FontBook {
    faces: HashMap<String, Face>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook").field("families", &self.families()).finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a regular face; bold is synthesized when drawing.
    pub fn insert_bytes(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        self.insert(family, bytes, true)
    }

    /// Register a face that is already bold.
    pub fn insert_bold_bytes(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        self.insert(family, bytes, false)
    }

    pub fn load_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let bytes = fs::read(path)?;
        self.insert_bytes(family, bytes)
    }

    fn insert(&mut self, family: &str, bytes: Vec<u8>, synthetic_bold: bool) -> Result<()> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| LabelError::Font(format!("cannot parse font data for {family}")))?;
        self.faces.insert(family.to_string(), Face { font, synthetic_bold });
        Ok(())
    }

    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.faces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn face(&self, family: &str) -> Option<&Face> {
        self.faces.get(family)
    }

    /// Advance width of `text` in bold at `font_px`, like a canvas `measureText`.
    pub fn measure_text(&self, family: &str, text: &str, font_px: u32) -> Result<f32> {
        let face = self.face(family).ok_or_else(|| unknown_family(family))?;
        Ok(measure(face, text, font_px))
    }
}

fn unknown_family(family: &str) -> LabelError {
    LabelError::RasterizationUnavailable(format!("no font registered for family {family:?}"))
}

/// rusttype scales by ascent-to-descent height; CSS px sizes are em sizes.
fn em_scale(font: &Font<'_>, font_px: u32) -> Scale {
    let vm = font.v_metrics_unscaled();
    let units = f32::from(font.units_per_em().max(1));
    Scale::uniform(font_px as f32 * (vm.ascent - vm.descent) / units)
}

fn measure(face: &Face, text: &str, font_px: u32) -> f32 {
    let scale = em_scale(&face.font, font_px);
    let advance = face
        .font
        .layout(text, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);
    if face.synthetic_bold && advance > 0.0 {
        advance + 1.0
    } else {
        advance
    }
}

/// Pixel height of a line drawn at `font_px`.
pub fn line_height(font_px: u32) -> u32 {
    (f64::from(font_px) * LINE_HEIGHT_FACTOR).ceil() as u32
}

/// Draw one line of text in black on a white, byte-aligned surface and
/// threshold it into a bitmap.
///
/// The glyph baseline sits one hhea ascent below the top edge, not at the
/// em-box top a canvas `"top"` baseline uses. The surface is only
/// `ceil(1.2 * font_px)` tall, so faces whose ascent minus descent exceeds
/// 1.2 em (most CJK faces) lose the bottom of their descenders.
pub fn rasterize_text(fonts: &FontBook, family: &str, text: &str, font_px: u32) -> Result<Bitmap> {
    let face = fonts.face(family).ok_or_else(|| unknown_family(family))?;

    let measured = measure(face, text, font_px);
    let width_bytes = (measured / 8.0).ceil() as u32;
    let w = width_bytes * 8;
    let h = line_height(font_px);
    if w == 0 || h == 0 {
        return Err(LabelError::RasterizationUnavailable(format!(
            "cannot create a {w}x{h} surface for {text:?}"
        )));
    }

    let mut surface = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));

    // Top baseline: the glyph origin sits one ascent below the surface top.
    let scale = em_scale(&face.font, font_px);
    let ascent = face.font.v_metrics(scale).ascent;
    let passes: &[f32] = if face.synthetic_bold { &[0.0, 1.0] } else { &[0.0] };

    for &dx in passes {
        for g in face.font.layout(text, scale, point(dx, ascent)) {
            let Some(bb) = g.pixel_bounding_box() else { continue };
            g.draw(|gx, gy, v| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
                    return;
                }
                let shade = (255.0 * (1.0 - v.clamp(0.0, 1.0))).round() as u8;
                let pixel = surface.get_pixel_mut(px as u32, py as u32);
                for c in pixel.0.iter_mut() {
                    *c = (*c).min(shade);
                }
            });
        }
    }

    Ok(Bitmap::from_surface(&surface))
}

/// Rasterize a field into a GW segment at its position.
///
/// If the surface cannot be created the label degrades to a blank block
/// instead of failing the whole job.
pub fn rasterize(fonts: &FontBook, field: &LabelField, family: &str) -> GraphicsSegment {
    match rasterize_text(fonts, family, &field.text, field.font_size_px) {
        Ok(bitmap) => GraphicsSegment::from_bitmap(field.x, field.y, &bitmap),
        Err(e) => {
            tracing::warn!(text = %field.text, x = field.x, y = field.y, error = %e,
                "rasterization unavailable, emitting blank graphics block");
            GraphicsSegment::blank(field.x, field.y)
        }
    }
}
