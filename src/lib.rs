pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod loader;
pub mod logging;
pub mod status;
pub mod studio;
pub mod surface;
pub mod ui;
pub mod validation;
pub use error::{AppError, AppResult};

/// Entrypoint used by the binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting anicap");

    let app = app::App::new(config::load_app_config());
    app.start()?;

    tracing::info!("anicap exited");
    Ok(())
}
