//! Backdrop shown behind the scattered thumbnails.
//!
//! The desktop wallpaper is scaled to cover the canvas and a blurred copy is
//! prepared once. While animating, the overlay cross-fades between the two
//! copies: the blurred layer's opacity follows the current blur radius, so
//! the backdrop appears to blur in on scatter and sharpen again on return.
//!
//! When no wallpaper can be found or decoded a solid dark fill is used.

pub mod source;

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use thiserror::Error;

pub use source::{WallpaperWatcher, wallpaper_path};

/// Fill used when no wallpaper is available.
pub const FALLBACK_COLOR: Rgb<u8> = Rgb([30, 30, 30]);

/// Errors that can occur while preparing the backdrop.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// The wallpaper could not be opened or decoded.
    #[error("Failed to read image: {0}")]
    ImageRead(String),
    /// The canvas has a zero dimension.
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

/// Pixel size of the canvas the backdrop is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }

    const fn is_empty(self) -> bool { self.width == 0 || self.height == 0 }
}

/// Sharp and blurred copies of the wallpaper at canvas size.
#[derive(Debug, Clone)]
pub struct Backdrop {
    sharp: RgbImage,
    blurred: RgbImage,
    max_blur: u32,
}

impl Backdrop {
    /// Loads `source`, covers the canvas with it and prepares the blurred
    /// copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is empty or the image cannot be read.
    pub fn load(source: &Path, screen: ScreenSize, max_blur: u32) -> Result<Self, BackdropError> {
        if screen.is_empty() {
            return Err(BackdropError::InvalidCanvas { width: screen.width, height: screen.height });
        }

        let img = ImageReader::open(source)
            .map_err(|_| BackdropError::ImageRead(source.display().to_string()))?
            .with_guessed_format()
            .map_err(|_| BackdropError::ImageRead(source.display().to_string()))?
            .decode()
            .map_err(|_| BackdropError::ImageRead(source.display().to_string()))?;

        Ok(Self::from_image(&img, screen, max_blur))
    }

    /// Prepares a backdrop from an already decoded image.
    #[must_use]
    pub fn from_image(img: &DynamicImage, screen: ScreenSize, max_blur: u32) -> Self {
        let covered = resize_to_screen(img, screen);
        let blurred = apply_fast_blur(&covered, max_blur).to_rgb8();
        Self {
            sharp: covered.to_rgb8(),
            blurred,
            max_blur,
        }
    }

    /// A solid fallback backdrop.
    #[must_use]
    pub fn solid(screen: ScreenSize) -> Self {
        let fill = RgbImage::from_pixel(screen.width.max(1), screen.height.max(1), FALLBACK_COLOR);
        Self {
            sharp: fill.clone(),
            blurred: fill,
            max_blur: 0,
        }
    }

    /// Loads the wallpaper at `source` if there is one, falling back to the
    /// solid fill on any failure.
    #[must_use]
    pub fn prepare(source: Option<&Path>, screen: ScreenSize, max_blur: u32) -> Self {
        let Some(source) = source else {
            tracing::debug!("scatter: no wallpaper found, using solid backdrop");
            return Self::solid(screen);
        };

        match Self::load(source, screen, max_blur) {
            Ok(backdrop) => backdrop,
            Err(err) => {
                tracing::warn!(error = %err, "scatter: failed to prepare backdrop, using solid fill");
                Self::solid(screen)
            }
        }
    }

    /// The unblurred layer.
    #[must_use]
    pub const fn sharp(&self) -> &RgbImage { &self.sharp }

    /// The fully blurred layer.
    #[must_use]
    pub const fn blurred(&self) -> &RgbImage { &self.blurred }

    /// Blur radius the blurred layer was prepared with.
    #[must_use]
    pub const fn max_blur(&self) -> u32 { self.max_blur }

    /// Opacity of the blurred layer for the given current blur radius.
    #[must_use]
    pub fn blend_alpha(&self, radius: f64) -> u8 { blend_alpha(radius, self.max_blur) }
}

/// Opacity (0-255) of the blurred layer that approximates blur `radius` when
/// the layer was prepared with `max_blur`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_alpha(radius: f64, max_blur: u32) -> u8 {
    if max_blur == 0 || !radius.is_finite() {
        return 0;
    }
    let ratio = (radius / f64::from(max_blur)).clamp(0.0, 1.0);
    (ratio * 255.0).round() as u8
}

/// Converts an image into the top-down BGRA rows expected by a 32-bit DIB
/// section.
#[must_use]
pub fn to_bgra(img: &RgbImage) -> Vec<u8> {
    img.pixels().flat_map(|Rgb([r, g, b])| [*b, *g, *r, 255]).collect()
}

/// Resizes an image to cover the screen dimensions while maintaining aspect ratio.
///
/// Uses "cover" scaling: the image is scaled to fill the entire screen,
/// cropping edges if necessary to avoid letterboxing.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn resize_to_screen(img: &DynamicImage, screen: ScreenSize) -> DynamicImage {
    let (img_width, img_height) = img.dimensions();
    let target_width = screen.width;
    let target_height = screen.height;

    let scale_x = f64::from(target_width) / f64::from(img_width.max(1));
    let scale_y = f64::from(target_height) / f64::from(img_height.max(1));

    // Use "cover" scaling: scale to fill the entire target, cropping if needed
    let scale = scale_x.max(scale_y);

    let scaled_width = ((f64::from(img_width) * scale).ceil() as u32).max(target_width);
    let scaled_height = ((f64::from(img_height) * scale).ceil() as u32).max(target_height);

    let resized = img.resize_exact(
        scaled_width,
        scaled_height,
        image::imageops::FilterType::CatmullRom,
    );

    // Crop to exact target dimensions (center crop)
    let crop_x = (scaled_width.saturating_sub(target_width)) / 2;
    let crop_y = (scaled_height.saturating_sub(target_height)) / 2;

    resized.crop_imm(crop_x, crop_y, target_width, target_height)
}

/// Applies a fast box blur approximation to an image.
///
/// Large radii are blurred on a 4x downscaled copy and scaled back up, which
/// is much cheaper and visually close for a background.
#[allow(clippy::cast_precision_loss)]
fn apply_fast_blur(img: &DynamicImage, blur_radius: u32) -> DynamicImage {
    if blur_radius == 0 {
        return img.clone();
    }
    if blur_radius <= 5 {
        return img.blur(blur_radius as f32);
    }

    let (width, height) = img.dimensions();
    let scale_factor = 4u32;

    let small = img.resize_exact(
        (width / scale_factor).max(1),
        (height / scale_factor).max(1),
        image::imageops::FilterType::CatmullRom,
    );

    let blur_at_scale = (blur_radius / scale_factor).max(1);
    let blurred_small = small.blur(blur_at_scale as f32);

    blurred_small.resize_exact(width, height, image::imageops::FilterType::CatmullRom)
}
