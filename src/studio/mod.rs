use image::RgbaImage;
use rand::seq::IndexedRandom;

use crate::config::AppConfig;
use crate::export::{download_file_name, surface_data_uri, ExportError, ExportService};
use crate::gallery::{GalleryEntry, GalleryError, GalleryStore, KeyValueStore};
use crate::loader::LoadResult;
use crate::status::{StatusMessage, StatusReporter};
use crate::surface::{format_filter_value, DisplayFilter, Surface, SurfaceResult};
use crate::validation::validate_caption;

pub const GENERATED_STATUS: &str = "Generated new anime image!";
pub const LOAD_FAILED_STATUS: &str = "Failed to load image.";
pub const NO_IMAGE_TO_DOWNLOAD_STATUS: &str = "No image to download.";
pub const GENERATE_FIRST_STATUS: &str = "Generate an image first.";
pub const SAVED_STATUS: &str = "Saved to gallery.";
pub const GALLERY_CLEARED_STATUS: &str = "Gallery cleared.";
const EXPORT_FAILED_STATUS: &str = "Failed to export image.";
const NO_DOWNLOAD_DIR_STATUS: &str = "No download folder. Set export_dir in config.json.";
const RENDER_FAILED_STATUS: &str = "Failed to draw image.";
const GALLERY_CORRUPT_STATUS: &str = "Saved gallery is unreadable. Clear the gallery to reset it.";
const GALLERY_UNAVAILABLE_STATUS: &str = "Gallery storage is unavailable.";

/// Page-level state: the current image, form values, surface and gallery.
#[derive(Debug)]
pub struct Studio<S> {
    current_image: Option<RgbaImage>,
    caption: String,
    caption_error: &'static str,
    filter: DisplayFilter,
    status: StatusReporter,
    surface: Surface,
    gallery: GalleryStore<S>,
    exporter: ExportService,
    sample_images: Vec<String>,
    caption_samples: Vec<String>,
}

impl<S: KeyValueStore> Studio<S> {
    pub fn new(
        surface: Surface,
        gallery: GalleryStore<S>,
        exporter: ExportService,
        sample_images: Vec<String>,
        caption_samples: Vec<String>,
    ) -> Self {
        Self {
            current_image: None,
            caption: String::new(),
            caption_error: "",
            filter: DisplayFilter::default(),
            status: StatusReporter::default(),
            surface,
            gallery,
            exporter,
            sample_images,
            caption_samples,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        store: S,
        exporter: ExportService,
    ) -> SurfaceResult<Self> {
        let (width, height) = config.surface_size();
        Ok(Self::new(
            Surface::new(width, height)?,
            GalleryStore::new(store),
            exporter,
            config.sample_images(),
            config.caption_samples(),
        ))
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn status(&self) -> &StatusMessage {
        self.status.current()
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn caption_error(&self) -> &str {
        self.caption_error
    }

    pub fn display_filter(&self) -> DisplayFilter {
        self.filter
    }

    pub fn has_image(&self) -> bool {
        self.current_image.is_some()
    }

    pub fn gallery_store(&self) -> &GalleryStore<S> {
        &self.gallery
    }

    /// Picks a sample URL for the caller to load; the result comes back via [`Self::finish_load`].
    pub fn begin_generate(&mut self) -> Option<String> {
        let url = self.sample_images.choose(&mut rand::rng()).cloned()?;
        tracing::info!(%url, "generating image");
        self.status.info(GENERATED_STATUS);
        Some(url)
    }

    /// Applies a finished load. Loads are never cancelled, so whichever finishes last wins.
    pub fn finish_load(&mut self, result: LoadResult<RgbaImage>) -> bool {
        match result {
            Ok(image) => {
                self.current_image = Some(image);
                self.render();
                true
            }
            Err(err) => {
                tracing::warn!(%err, "image load failed");
                self.status.error(LOAD_FAILED_STATUS);
                false
            }
        }
    }

    pub fn render(&mut self) {
        let Some(image) = self.current_image.as_ref() else {
            return;
        };
        if let Err(err) = self.surface.render(image, &self.caption) {
            tracing::error!(%err, "surface render failed");
            self.status.error(RENDER_FAILED_STATUS);
        }
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn randomize_caption(&mut self) -> &str {
        if let Some(caption) = self.caption_samples.choose(&mut rand::rng()) {
            self.caption = caption.clone();
        }
        self.render();
        &self.caption
    }

    /// Returns the value label for the slider.
    pub fn set_brightness(&mut self, value: f64) -> String {
        self.filter.brightness = value;
        self.render();
        format_filter_value(value)
    }

    pub fn set_contrast(&mut self, value: f64) -> String {
        self.filter.contrast = value;
        self.render();
        format_filter_value(value)
    }

    pub fn download(&mut self, millis: i64) -> bool {
        if self.current_image.is_none() {
            self.status.error(NO_IMAGE_TO_DOWNLOAD_STATUS);
            return false;
        }
        match self.exporter.download(&self.surface, millis) {
            Ok(_) => {
                self.status
                    .info(format!("Downloaded {}", download_file_name(millis)));
                true
            }
            Err(ExportError::MissingHomeDirectory) => {
                tracing::warn!("download skipped: no export directory");
                self.status.error(NO_DOWNLOAD_DIR_STATUS);
                false
            }
            Err(err) => {
                tracing::error!(%err, "download failed");
                self.status.error(EXPORT_FAILED_STATUS);
                false
            }
        }
    }

    /// Validates the caption, then prepends the current surface to the gallery.
    pub fn save_to_gallery(&mut self, millis: i64) -> bool {
        self.caption_error = "";
        let validation = validate_caption(&self.caption);
        if !validation.valid {
            self.caption_error = validation.message;
            return false;
        }
        if self.current_image.is_none() {
            self.status.error(GENERATE_FIRST_STATUS);
            return false;
        }

        let url = match surface_data_uri(&self.surface) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(%err, "snapshot encoding failed");
                self.status.error(EXPORT_FAILED_STATUS);
                return false;
            }
        };
        match self.gallery.add(millis, url) {
            Ok(_) => {
                self.status.info(SAVED_STATUS);
                true
            }
            Err(err) => {
                self.report_gallery_error(&err);
                false
            }
        }
    }

    /// Current gallery contents; unreadable storage is reported and shown as empty.
    pub fn gallery_entries(&mut self) -> Vec<GalleryEntry> {
        self.gallery.list().unwrap_or_else(|err| {
            self.report_gallery_error(&err);
            Vec::new()
        })
    }

    /// Returns what the store holds afterwards, whether or not the removal was persisted.
    pub fn delete_entry(&mut self, id: i64) -> Vec<GalleryEntry> {
        match self.gallery.remove(id) {
            Ok(entries) => entries,
            Err(err) => {
                self.report_gallery_error(&err);
                self.gallery_entries()
            }
        }
    }

    pub fn clear_gallery(&mut self) {
        match self.gallery.clear() {
            Ok(()) => self.status.info(GALLERY_CLEARED_STATUS),
            Err(err) => self.report_gallery_error(&err),
        }
    }

    fn report_gallery_error(&mut self, err: &GalleryError) {
        tracing::error!(%err, "gallery operation failed");
        match err {
            GalleryError::Corrupt { .. } => self.status.error(GALLERY_CORRUPT_STATUS),
            _ => self.status.error(GALLERY_UNAVAILABLE_STATUS),
        }
    }
}
