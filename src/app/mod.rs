use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::export::{epoch_millis, ExportService};
use crate::gallery::{FileKeyValueStore, GalleryEntry};
use crate::studio::Studio;
use crate::ui::{StyleTokens, LAYOUT_TOKENS};
use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow};

mod gallery_view;
mod layout;
mod runtime_css;
mod worker;

use self::gallery_view::render_gallery;
use self::layout::{build_studio_ui, StudioUi};
use self::runtime_css::{install_runtime_css, SurfaceFilterCss};
use self::worker::spawn_image_load;

const APP_ID: &str = "io.github.anicap.Anicap";
const WINDOW_TITLE: &str = "Anime Caption Studio";

type SharedStudio = Rc<RefCell<Studio<FileKeyValueStore>>>;

/// Widgets plus the controller they drive; every handler goes through here.
struct StudioPage {
    studio: SharedStudio,
    ui: StudioUi,
    filter_css: SurfaceFilterCss,
    tokens: StyleTokens,
}

impl StudioPage {
    fn sync(&self) {
        {
            let studio = self.studio.borrow();
            let status = studio.status();
            self.ui.set_status(&status.text, status.level.color());
            self.ui.set_caption_error(studio.caption_error());
            self.filter_css.apply(studio.display_filter());
        }
        self.ui.surface_area.queue_draw();
    }

    fn refresh_gallery(self: &Rc<Self>) {
        let entries = self.studio.borrow_mut().gallery_entries();
        self.show_gallery(&entries);
    }

    fn show_gallery(self: &Rc<Self>, entries: &[GalleryEntry]) {
        let page = Rc::downgrade(self);
        render_gallery(
            &self.ui.gallery_grid,
            self.tokens,
            entries,
            Rc::new(move |id| {
                if let Some(page) = page.upgrade() {
                    page.delete_entry(id);
                }
            }),
        );
    }

    fn delete_entry(self: &Rc<Self>, id: i64) {
        let entries = self.studio.borrow_mut().delete_entry(id);
        self.show_gallery(&entries);
        self.sync();
    }

    fn generate(self: &Rc<Self>) {
        let url = self.studio.borrow_mut().begin_generate();
        self.sync();
        let Some(url) = url else {
            return;
        };
        let page = Rc::downgrade(self);
        spawn_image_load(url, move |result| {
            if let Some(page) = page.upgrade() {
                page.studio.borrow_mut().finish_load(result);
                page.sync();
            }
        });
    }

    fn randomize_caption(&self) {
        let caption = self.studio.borrow_mut().randomize_caption().to_string();
        self.ui.caption_entry.set_text(&caption);
        self.sync();
    }

    fn download(&self) {
        self.studio.borrow_mut().download(epoch_millis());
        self.sync();
    }

    fn save(self: &Rc<Self>) {
        let saved = self.studio.borrow_mut().save_to_gallery(epoch_millis());
        if saved {
            self.refresh_gallery();
        }
        self.sync();
    }

    fn clear_gallery(self: &Rc<Self>) {
        self.studio.borrow_mut().clear_gallery();
        self.refresh_gallery();
        self.sync();
    }
}

fn connect_button<F>(button: &gtk4::Button, page: &Rc<StudioPage>, action: F)
where
    F: Fn(&Rc<StudioPage>) + 'static,
{
    let page: Weak<StudioPage> = Rc::downgrade(page);
    button.connect_clicked(move |_| {
        if let Some(page) = page.upgrade() {
            action(&page);
        }
    });
}

fn connect_filter_scale<F>(
    scale: &gtk4::Scale,
    value_label: &gtk4::Label,
    page: &Rc<StudioPage>,
    apply: F,
) where
    F: Fn(&mut Studio<FileKeyValueStore>, f64) -> String + 'static,
{
    let page = Rc::downgrade(page);
    let value_label = value_label.clone();
    scale.connect_value_changed(move |scale| {
        let Some(page) = page.upgrade() else {
            return;
        };
        let label = apply(&mut *page.studio.borrow_mut(), scale.value());
        value_label.set_text(&label);
        page.sync();
    });
}

fn connect_page(page: &Rc<StudioPage>) {
    let studio = page.studio.clone();
    page.ui
        .surface_area
        .set_draw_func(move |_, context, _width, _height| {
            if let Err(err) = studio.borrow().surface().paint_onto(context) {
                tracing::warn!(%err, "failed to paint surface");
            }
        });

    {
        let studio = page.studio.clone();
        page.ui.caption_entry.connect_changed(move |entry| {
            studio.borrow_mut().set_caption(entry.text().as_str());
        });
    }

    connect_filter_scale(
        &page.ui.brightness_scale,
        &page.ui.brightness_value_label,
        page,
        Studio::set_brightness,
    );
    connect_filter_scale(
        &page.ui.contrast_scale,
        &page.ui.contrast_value_label,
        page,
        Studio::set_contrast,
    );

    connect_button(&page.ui.generate_button, page, |page| page.generate());
    connect_button(&page.ui.randomize_button, page, |page| page.randomize_caption());
    connect_button(&page.ui.download_button, page, |page| page.download());
    connect_button(&page.ui.save_button, page, |page| page.save());
    connect_button(&page.ui.clear_gallery_button, page, |page| page.clear_gallery());
}

fn gtk_launch_args() -> Vec<String> {
    std::env::args().take(1).collect()
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn start(&self) -> AppResult<()> {
        let store = FileKeyValueStore::with_default_root()?;
        let exporter = match self.config.export_dir.clone() {
            Some(dir) => ExportService::with_dir(dir),
            None => ExportService::with_default_dir(),
        };
        tracing::info!(
            store = %store.root().display(),
            export_dir = ?exporter.export_dir(),
            "resolved storage locations"
        );
        let studio: SharedStudio = Rc::new(RefCell::new(Studio::from_config(
            &self.config,
            store,
            exporter,
        )?));

        let application = Application::new(Some(APP_ID), gtk4::gio::ApplicationFlags::NON_UNIQUE);
        let activate_once = Rc::new(Cell::new(false));
        let page_slot = Rc::new(RefCell::new(None::<Rc<StudioPage>>));
        let page_slot_for_activate = page_slot.clone();
        application.connect_activate(move |app| {
            if activate_once.replace(true) {
                tracing::debug!("ignoring duplicate gtk activate signal");
                return;
            }
            let tokens = LAYOUT_TOKENS;
            install_runtime_css(tokens);

            let (surface_width, surface_height, filter) = {
                let studio = studio.borrow();
                (
                    studio.surface().width(),
                    studio.surface().height(),
                    studio.display_filter(),
                )
            };
            let ui = build_studio_ui(tokens, surface_width, surface_height);

            let window = ApplicationWindow::new(app);
            window.add_css_class("anicap-root");
            window.set_title(Some(WINDOW_TITLE));
            window.set_default_size(tokens.window_default_width, tokens.window_default_height);
            window.set_child(Some(&ui.root));

            let page = Rc::new(StudioPage {
                studio: studio.clone(),
                ui,
                filter_css: SurfaceFilterCss::install(filter),
                tokens,
            });
            connect_page(&page);
            page.refresh_gallery();
            page.sync();
            page_slot_for_activate.borrow_mut().replace(page);

            tracing::info!("presenting studio window");
            window.present();
        });

        let exit_code = application.run_with_args(&gtk_launch_args());
        page_slot.borrow_mut().take();
        if exit_code != gtk4::glib::ExitCode::SUCCESS {
            return Err(AppError::Runtime(format!("{exit_code:?}")));
        }
        Ok(())
    }
}
