use std::io::Cursor;

use gtk4::cairo;
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

pub const DEFAULT_SURFACE_WIDTH: i32 = 600;
pub const DEFAULT_SURFACE_HEIGHT: i32 = 400;

pub const FILTER_MIN: f64 = 0.0;
pub const FILTER_MAX: f64 = 2.0;
pub const FILTER_STEP: f64 = 0.05;
pub const FILTER_DEFAULT: f64 = 1.0;

const CAPTION_FONT_FAMILY: &str = "Sans";
const CAPTION_FONT_SIZE: f64 = 20.0;
const BANNER_LEFT: f64 = 10.0;
const BANNER_BOTTOM_OFFSET: f64 = 40.0;
const BANNER_HEIGHT: f64 = 30.0;
const BANNER_PADDING: f64 = 20.0;
const BANNER_ALPHA: f64 = 0.6;
const CAPTION_LEFT: f64 = 20.0;
const CAPTION_BASELINE_OFFSET: f64 = 20.0;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("image of {width}x{height} cannot be uploaded to the surface")]
    Upload { width: u32, height: u32 },
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("surface pixels unavailable: {0}")]
    Borrow(#[from] cairo::BorrowError),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Display-only brightness/contrast multipliers, expressed as a CSS `filter` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFilter {
    pub brightness: f64,
    pub contrast: f64,
}

impl Default for DisplayFilter {
    fn default() -> Self {
        Self {
            brightness: FILTER_DEFAULT,
            contrast: FILTER_DEFAULT,
        }
    }
}

impl DisplayFilter {
    pub const fn new(brightness: f64, contrast: f64) -> Self {
        Self {
            brightness,
            contrast,
        }
    }

    pub fn css(&self) -> String {
        format!(
            "brightness({}) contrast({})",
            format_filter_value(self.brightness),
            format_filter_value(self.contrast)
        )
    }
}

pub fn format_filter_value(value: f64) -> String {
    format!("{value:.2}")
}

/// Fixed-size raster the current image and caption are composited onto.
pub struct Surface {
    canvas: cairo::ImageSurface,
    width: i32,
    height: i32,
}

impl Surface {
    pub fn new(width: i32, height: i32) -> SurfaceResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        let canvas = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
        Ok(Self {
            canvas,
            width,
            height,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Clears the surface, paints `image` stretched over it and overlays the caption banner.
    pub fn render(&self, image: &RgbaImage, caption: &str) -> SurfaceResult<()> {
        let source = rgba_image_to_cairo_surface(image)?;
        {
            let context = cairo::Context::new(&self.canvas)?;
            context.set_operator(cairo::Operator::Clear);
            context.paint()?;
            context.set_operator(cairo::Operator::Over);

            context.save()?;
            context.scale(
                f64::from(self.width) / f64::from(image.width().max(1)),
                f64::from(self.height) / f64::from(image.height().max(1)),
            );
            context.set_source_surface(&source, 0.0, 0.0)?;
            context.source().set_extend(cairo::Extend::Pad);
            context.paint()?;
            context.restore()?;

            let caption = caption.trim();
            if !caption.is_empty() {
                self.draw_caption_banner(&context, caption)?;
            }
        }
        self.canvas.flush();
        tracing::trace!(
            width = self.width,
            height = self.height,
            source_width = image.width(),
            source_height = image.height(),
            "surface rendered"
        );
        Ok(())
    }

    fn draw_caption_banner(&self, context: &cairo::Context, caption: &str) -> SurfaceResult<()> {
        let height = f64::from(self.height);
        context.select_font_face(
            CAPTION_FONT_FAMILY,
            cairo::FontSlant::Normal,
            cairo::FontWeight::Normal,
        );
        context.set_font_size(CAPTION_FONT_SIZE);

        let advance = measure_text_advance(context, caption);
        context.set_source_rgba(0.0, 0.0, 0.0, BANNER_ALPHA);
        context.rectangle(
            BANNER_LEFT,
            height - BANNER_BOTTOM_OFFSET,
            advance + BANNER_PADDING,
            BANNER_HEIGHT,
        );
        context.fill()?;

        context.set_source_rgb(1.0, 1.0, 1.0);
        context.move_to(CAPTION_LEFT, height - CAPTION_BASELINE_OFFSET);
        context.show_text(caption)?;
        Ok(())
    }

    /// Paints the raw surface onto a widget context; display filters are applied by GTK CSS.
    pub fn paint_onto(&self, context: &cairo::Context) -> SurfaceResult<()> {
        context.set_source_surface(&self.canvas, 0.0, 0.0)?;
        context.paint()?;
        Ok(())
    }

    /// Reads the surface back as straight-alpha RGBA.
    pub fn snapshot(&self) -> SurfaceResult<RgbaImage> {
        self.canvas.flush();
        let width = usize::try_from(self.width).unwrap_or_default();
        let height = usize::try_from(self.height).unwrap_or_default();
        let stride = usize::try_from(self.canvas.stride()).unwrap_or_default();
        let mut rgba = vec![0_u8; width * height * 4];

        self.canvas.with_data(|data| {
            for row in 0..height {
                let src = &data[row * stride..row * stride + width * 4];
                let dst = &mut rgba[row * width * 4..(row + 1) * width * 4];
                for (src_pixel, dst_pixel) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
                    let [r, g, b, a] = unpremultiply_bgra(src_pixel);
                    dst_pixel.copy_from_slice(&[r, g, b, a]);
                }
            }
        })?;

        RgbaImage::from_raw(self.width as u32, self.height as u32, rgba).ok_or(
            SurfaceError::Upload {
                width: self.width as u32,
                height: self.height as u32,
            },
        )
    }

    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        let snapshot = self.snapshot()?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(snapshot)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn measure_text_advance(context: &cairo::Context, text: &str) -> f64 {
    context
        .text_extents(text)
        .map(|extents| extents.x_advance())
        .unwrap_or_else(|_| {
            let per_char = context
                .font_extents()
                .map(|extents| extents.max_x_advance().max(1.0) * 0.62)
                .unwrap_or(CAPTION_FONT_SIZE * 0.6);
            text.chars().count() as f64 * per_char
        })
}

fn unpremultiply_bgra(pixel: &[u8]) -> [u8; 4] {
    let (b, g, r, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
    match a {
        0 => [0, 0, 0, 0],
        255 => [r, g, b, 255],
        _ => {
            let alpha = u16::from(a);
            let restore = |channel: u8| {
                ((u16::from(channel) * 255 + alpha / 2) / alpha).min(255) as u8
            };
            [restore(r), restore(g), restore(b), a]
        }
    }
}

fn premultiply_to_bgra(pixel: &[u8]) -> [u8; 4] {
    let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
    match a {
        0 => [0, 0, 0, 0],
        255 => [b, g, r, 255],
        _ => {
            let alpha = u16::from(a);
            let scale = |channel: u8| ((u16::from(channel) * alpha + 127) / 255) as u8;
            [scale(b), scale(g), scale(r), a]
        }
    }
}

fn rgba_image_to_cairo_surface(image: &RgbaImage) -> SurfaceResult<cairo::ImageSurface> {
    let upload_error = || SurfaceError::Upload {
        width: image.width(),
        height: image.height(),
    };
    let width = i32::try_from(image.width()).map_err(|_| upload_error())?;
    let height = i32::try_from(image.height()).map_err(|_| upload_error())?;
    if width == 0 || height == 0 {
        return Err(upload_error());
    }

    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
    let stride = usize::try_from(surface.stride()).map_err(|_| upload_error())?;
    let row_len = image.width() as usize * 4;
    {
        let mut data = surface.data()?;
        for (row, src_row) in image.as_raw().chunks_exact(row_len).enumerate() {
            let dst_row = &mut data[row * stride..row * stride + row_len];
            for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                dst_pixel.copy_from_slice(&premultiply_to_bgra(src_pixel));
            }
        }
    }
    surface.mark_dirty();
    Ok(surface)
}
