use std::rc::Rc;

use crate::export::decode_data_uri;
use crate::gallery::GalleryEntry;
use crate::ui::StyleTokens;
use gtk4::prelude::*;
use gtk4::{gdk, glib, Align, Box as GtkBox, Button, FlowBox, Label, Orientation, Picture};

pub(super) const EMPTY_GALLERY_TEXT: &str = "No saved images.";

/// Clears `grid` and rebuilds one card per entry. `on_delete` receives the entry id.
pub(super) fn render_gallery(
    grid: &FlowBox,
    tokens: StyleTokens,
    entries: &[GalleryEntry],
    on_delete: Rc<dyn Fn(i64)>,
) {
    while let Some(child) = grid.first_child() {
        grid.remove(&child);
    }

    if entries.is_empty() {
        let empty = Label::new(Some(EMPTY_GALLERY_TEXT));
        empty.add_css_class("anicap-empty");
        grid.insert(&empty, -1);
        return;
    }

    for entry in entries {
        grid.insert(&gallery_card(tokens, entry, on_delete.clone()), -1);
    }
    tracing::debug!(count = entries.len(), "gallery rendered");
}

fn gallery_card(
    tokens: StyleTokens,
    entry: &GalleryEntry,
    on_delete: Rc<dyn Fn(i64)>,
) -> GtkBox {
    let card = GtkBox::new(Orientation::Vertical, tokens.spacing_8);
    card.add_css_class("anicap-card");

    let picture = Picture::new();
    picture.set_can_shrink(true);
    picture.set_size_request(tokens.gallery_thumb_size, tokens.gallery_thumb_size);
    match entry_texture(entry) {
        Some(texture) => picture.set_paintable(Some(&texture)),
        None => tracing::warn!(id = entry.id, "gallery entry has no decodable image"),
    }

    let delete_button = Button::with_label("Delete");
    delete_button.set_halign(Align::Center);
    let id = entry.id;
    delete_button.connect_clicked(move |_| on_delete(id));

    card.append(&picture);
    card.append(&delete_button);
    card
}

fn entry_texture(entry: &GalleryEntry) -> Option<gdk::MemoryTexture> {
    let bytes = decode_data_uri(&entry.url)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|err| tracing::warn!(id = entry.id, %err, "failed to decode gallery image"))
        .ok()?
        .to_rgba8();
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let stride = image.width() as usize * 4;
    Some(gdk::MemoryTexture::new(
        width,
        height,
        gdk::MemoryFormat::R8g8b8a8,
        &glib::Bytes::from_owned(image.into_raw()),
        stride,
    ))
}
