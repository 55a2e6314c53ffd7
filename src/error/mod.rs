use crate::export::ExportError;
use crate::gallery::GalleryError;
use crate::loader::LoadError;
use crate::surface::SurfaceError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("gtk application exited with {0}")]
    Runtime(String),
}
