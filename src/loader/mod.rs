use std::io;
use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

use crate::export::decode_data_uri;

pub const DEFAULT_SAMPLE_IMAGES: [&str; 3] = [
    "https://i.ibb.co/2sJmDqB/anime1.jpg",
    "https://i.ibb.co/x8W9Nyr/anime2.jpg",
    "https://i.ibb.co/N2sK9Vb/anime3.jpg",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported image source: {0}")]
    UnsupportedSource(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request for {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed data uri")]
    InvalidDataUri,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Http(String),
    DataUri(String),
    File(PathBuf),
}

impl ImageSource {
    pub fn parse(url: &str) -> LoadResult<Self> {
        let trimmed = url.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Http(trimmed.to_string()));
        }
        if lower.starts_with("data:") {
            return Ok(Self::DataUri(trimmed.to_string()));
        }
        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if trimmed.is_empty() || trimmed.contains("://") {
            return Err(LoadError::UnsupportedSource(trimmed.to_string()));
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

pub trait ImageFetcher {
    fn fetch(&self, source: &ImageSource) -> LoadResult<Vec<u8>>;
}

/// Fetches over HTTP(S) with a blocking client; meant to run off the UI thread.
///
/// Requests carry no timeout: a load stays pending until the transfer
/// completes or the connection fails.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    client: reqwest::blocking::Client,
}

impl DefaultFetcher {
    pub fn new() -> LoadResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(LoadError::Client)?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> LoadResult<Vec<u8>> {
        let http_error = |source| LoadError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(http_error)?;
        Ok(bytes.to_vec())
    }
}

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, source: &ImageSource) -> LoadResult<Vec<u8>> {
        match source {
            ImageSource::Http(url) => self.fetch_http(url),
            ImageSource::DataUri(uri) => decode_data_uri(uri).ok_or(LoadError::InvalidDataUri),
            ImageSource::File(path) => std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

pub fn load_image<F: ImageFetcher + ?Sized>(fetcher: &F, url: &str) -> LoadResult<RgbaImage> {
    let source = ImageSource::parse(url)?;
    tracing::debug!(?source, "loading image");
    let bytes = fetcher.fetch(&source)?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    tracing::info!(
        width = image.width(),
        height = image.height(),
        "image loaded"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::png_data_uri;
    use image::{ImageFormat, Rgba};
    use std::io::{Cursor, Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    fn fetcher() -> DefaultFetcher {
        DefaultFetcher::new().expect("http client should build")
    }

    /// Serves one response on a local port after `delay`, returning the URL to request.
    fn serve_once(status_line: &'static str, body: Vec<u8>, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/anime.png", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0_u8; 512];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
            }
            std::thread::sleep(delay);
            let head = format!(
                "{status_line}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        });
        url
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([9, 8, 7, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn parse_classifies_sources() {
        assert_eq!(
            ImageSource::parse(DEFAULT_SAMPLE_IMAGES[0]).unwrap(),
            ImageSource::Http(DEFAULT_SAMPLE_IMAGES[0].to_string())
        );
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAA").unwrap(),
            ImageSource::DataUri(_)
        ));
        assert_eq!(
            ImageSource::parse("file:///tmp/a.png").unwrap(),
            ImageSource::File(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            ImageSource::parse("images/a.png").unwrap(),
            ImageSource::File(PathBuf::from("images/a.png"))
        );
    }

    #[test]
    fn parse_rejects_unknown_schemes_and_empty_input() {
        assert!(matches!(
            ImageSource::parse("ftp://example.com/a.png"),
            Err(LoadError::UnsupportedSource(_))
        ));
        assert!(matches!(
            ImageSource::parse("  "),
            Err(LoadError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn load_image_decodes_data_uri() {
        let uri = png_data_uri(&png_bytes(3, 2));
        let image = load_image(&fetcher(), &uri).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn load_image_reads_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        std::fs::write(&path, png_bytes(5, 4)).unwrap();

        let image = load_image(&fetcher(), path.to_str().unwrap()).unwrap();
        assert_eq!(image.dimensions(), (5, 4));
    }

    #[test]
    fn load_image_reports_missing_file_and_garbage_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(
            load_image(&fetcher(), missing.to_str().unwrap()),
            Err(LoadError::Io { .. })
        ));

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        assert!(matches!(
            load_image(&fetcher(), garbage.to_str().unwrap()),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn load_image_waits_for_slow_http_response() {
        let url = serve_once("HTTP/1.1 200 OK", png_bytes(6, 2), Duration::from_millis(300));
        let image = load_image(&fetcher(), &url).unwrap();
        assert_eq!(image.dimensions(), (6, 2));
    }

    #[test]
    fn load_image_reports_http_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found", Vec::new(), Duration::ZERO);
        assert!(matches!(
            load_image(&fetcher(), &url),
            Err(LoadError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn load_image_rejects_malformed_data_uri() {
        assert!(matches!(
            load_image(&fetcher(), "data:image/png,raw"),
            Err(LoadError::InvalidDataUri)
        ));
    }
}
