use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::surface::{Surface, SurfaceError};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
const DOWNLOAD_PREFIX: &str = "anime-";
const DEFAULT_EXPORT_SUBDIR: &str = "Pictures";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to encode surface: {0}")]
    Surface(#[from] SurfaceError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

pub fn download_file_name(millis: i64) -> String {
    format!("{DOWNLOAD_PREFIX}{millis}.png")
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png))
}

/// Decodes the payload of a base64 `data:` URI. Non-base64 data URIs are not supported.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

pub fn surface_data_uri(surface: &Surface) -> ExportResult<String> {
    Ok(png_data_uri(&surface.encode_png()?))
}

/// Writes surface snapshots as `anime-<millis>.png` into a fixed directory.
///
/// Without a directory every download fails with [`ExportError::MissingHomeDirectory`].
#[derive(Debug, Clone)]
pub struct ExportService {
    export_dir: Option<PathBuf>,
}

impl ExportService {
    pub fn with_dir(export_dir: PathBuf) -> Self {
        Self {
            export_dir: Some(export_dir),
        }
    }

    /// `$HOME/Pictures`, if `HOME` is set.
    pub fn with_default_dir() -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::with_home(home.as_deref())
    }

    pub(crate) fn with_home(home: Option<&Path>) -> Self {
        Self {
            export_dir: home.map(|home| home.join(DEFAULT_EXPORT_SUBDIR)),
        }
    }

    pub fn export_dir(&self) -> Option<&Path> {
        self.export_dir.as_deref()
    }

    pub fn target_path(&self, millis: i64) -> ExportResult<PathBuf> {
        let export_dir = self
            .export_dir()
            .ok_or(ExportError::MissingHomeDirectory)?;
        Ok(export_dir.join(download_file_name(millis)))
    }

    pub fn download(&self, surface: &Surface, millis: i64) -> ExportResult<PathBuf> {
        let target = self.target_path(millis)?;
        let png = surface.encode_png()?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, png).map_err(|source| ExportError::Write {
            path: target.clone(),
            source,
        })?;
        tracing::info!(path = %target.display(), "surface exported");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn download_file_name_uses_millis() {
        assert_eq!(download_file_name(1_700_000_000_123), "anime-1700000000123.png");
    }

    #[test]
    fn png_data_uri_decodes_back_to_bytes() {
        let uri = png_data_uri(&[0x89, b'P', b'N', b'G']);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn decode_data_uri_rejects_non_base64_and_foreign_schemes() {
        assert!(decode_data_uri("data:text/plain,hello").is_none());
        assert!(decode_data_uri("https://example.com/a.png").is_none());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn download_writes_png_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let service = ExportService::with_dir(dir.path().join("nested"));
        let surface = Surface::new(16, 16).unwrap();
        surface
            .render(&RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])), "")
            .unwrap();

        let path = service.download(&surface, 42).unwrap();
        assert_eq!(path, dir.path().join("nested").join("anime-42.png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn default_dir_resolves_under_home_pictures() {
        let service = ExportService::with_home(Some(Path::new("/tmp/home")));
        assert_eq!(service.export_dir(), Some(Path::new("/tmp/home/Pictures")));
        assert_eq!(
            service.target_path(7).unwrap(),
            PathBuf::from("/tmp/home/Pictures/anime-7.png")
        );
    }

    #[test]
    fn download_without_home_fails_only_when_attempted() {
        let service = ExportService::with_home(None);
        assert!(service.export_dir().is_none());

        let surface = Surface::new(8, 8).unwrap();
        assert!(matches!(
            service.download(&surface, 1),
            Err(ExportError::MissingHomeDirectory)
        ));
    }
}
