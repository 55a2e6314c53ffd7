use std::sync::mpsc;
use std::time::Duration;

use image::RgbaImage;

use crate::loader::{load_image, DefaultFetcher, LoadResult};

const LOAD_RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

/// Fetches and decodes `url` on a worker thread and hands the result to
/// `on_result` on the GTK main loop. Loads are not cancellable; overlapping
/// loads resolve in completion order.
pub(super) fn spawn_image_load<H>(url: String, on_result: H)
where
    H: FnOnce(LoadResult<RgbaImage>) + 'static,
{
    let (tx, rx) = mpsc::channel::<LoadResult<RgbaImage>>();
    std::thread::spawn(move || {
        let result = DefaultFetcher::new().and_then(|fetcher| load_image(&fetcher, &url));
        if tx.send(result).is_err() {
            tracing::debug!(%url, "image load finished after receiver was dropped");
        }
    });

    let mut on_result = Some(on_result);
    gtk4::glib::timeout_add_local(LOAD_RESULT_POLL_INTERVAL, move || match rx.try_recv() {
        Ok(result) => {
            if let Some(on_result) = on_result.take() {
                on_result(result);
            }
            gtk4::glib::ControlFlow::Break
        }
        Err(mpsc::TryRecvError::Empty) => gtk4::glib::ControlFlow::Continue,
        Err(mpsc::TryRecvError::Disconnected) => {
            tracing::warn!("image load worker exited without a result");
            gtk4::glib::ControlFlow::Break
        }
    });
}
