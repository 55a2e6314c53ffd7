use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GALLERY_KEY: &str = "animeGallery";

const APP_DIR: &str = "anicap";
const STORE_FILE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("persisted gallery under `{key}` is corrupted: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize gallery: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type GalleryResult<T> = std::result::Result<T, GalleryError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: i64,
    pub url: String,
}

/// String key-value persistence with whole-value replacement per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> GalleryResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> GalleryResult<()>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> GalleryResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> GalleryResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> GalleryResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> GalleryResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key; writes go through a per-process temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn with_default_root() -> GalleryResult<Self> {
        let xdg_data_home = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Ok(Self::with_root(data_root(
            xdg_data_home.as_deref(),
            home.as_deref(),
        )?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{STORE_FILE_EXTENSION}"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> GalleryError + '_ {
    move |source| GalleryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> GalleryResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> GalleryResult<()> {
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let path = self.path_for(key);
        let staging = self.root.join(format!(
            ".{key}.{STORE_FILE_EXTENSION}.{}.tmp",
            std::process::id()
        ));
        fs::write(&staging, value).map_err(io_error(&staging))?;
        fs::rename(&staging, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> GalleryResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}

pub(crate) fn data_root(
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> GalleryResult<PathBuf> {
    let mut root = match xdg_data_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home
            .ok_or(GalleryError::MissingHomeDirectory)?
            .join(".local")
            .join("share"),
    };
    root.push(APP_DIR);
    Ok(root)
}

/// Newest-first list of saved snapshots persisted as one JSON array.
///
/// Every mutation is a full read-modify-write of the blob; there is no
/// coordination between processes sharing the same store.
#[derive(Debug)]
pub struct GalleryStore<S> {
    store: S,
}

impl<S: KeyValueStore> GalleryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    pub fn list(&self) -> GalleryResult<Vec<GalleryEntry>> {
        let Some(raw) = self.store.get(GALLERY_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| {
            tracing::warn!(key = GALLERY_KEY, %source, "persisted gallery is malformed");
            GalleryError::Corrupt {
                key: GALLERY_KEY.to_string(),
                source,
            }
        })
    }

    pub fn add(&self, id: i64, url: impl Into<String>) -> GalleryResult<GalleryEntry> {
        let entry = GalleryEntry {
            id,
            url: url.into(),
        };
        let mut entries = self.list()?;
        entries.insert(0, entry.clone());
        self.write(&entries)?;
        tracing::info!(id, count = entries.len(), "gallery entry added");
        Ok(entry)
    }

    pub fn remove(&self, id: i64) -> GalleryResult<Vec<GalleryEntry>> {
        let mut entries = self.list()?;
        entries.retain(|entry| entry.id != id);
        self.write(&entries)?;
        tracing::info!(id, count = entries.len(), "gallery entry removed");
        Ok(entries)
    }

    pub fn clear(&self) -> GalleryResult<()> {
        self.store.remove(GALLERY_KEY)?;
        tracing::info!("gallery cleared");
        Ok(())
    }

    fn write(&self, entries: &[GalleryEntry]) -> GalleryResult<()> {
        let raw = serde_json::to_string(entries).map_err(GalleryError::Serialize)?;
        self.store.set(GALLERY_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_gallery() -> GalleryStore<MemoryKeyValueStore> {
        GalleryStore::new(MemoryKeyValueStore::default())
    }

    #[test]
    fn fresh_store_lists_empty() {
        assert!(memory_gallery().list().unwrap().is_empty());
    }

    #[test]
    fn add_prepends_and_grows_by_one() {
        let gallery = memory_gallery();
        gallery.add(1, "data:image/png;base64,AAA").unwrap();
        let before = gallery.list().unwrap().len();

        gallery.add(2, "data:image/png;base64,BBB").unwrap();
        let entries = gallery.list().unwrap();
        assert_eq!(entries.len(), before + 1);
        assert_eq!(entries[0].url, "data:image/png;base64,BBB");
    }

    #[test]
    fn later_additions_come_first() {
        let gallery = memory_gallery();
        gallery.add(10, "x").unwrap();
        gallery.add(20, "y").unwrap();
        assert_eq!(
            gallery.list().unwrap(),
            vec![
                GalleryEntry {
                    id: 20,
                    url: "y".into()
                },
                GalleryEntry {
                    id: 10,
                    url: "x".into()
                },
            ]
        );
    }

    #[test]
    fn remove_drops_only_matching_id_and_keeps_order() {
        let gallery = memory_gallery();
        for id in 1..=4 {
            gallery.add(id, format!("u{id}")).unwrap();
        }
        let remaining = gallery.remove(3).unwrap();
        let ids = remaining.iter().map(|entry| entry.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![4, 2, 1]);
        assert_eq!(gallery.list().unwrap(), remaining);
    }

    #[test]
    fn clear_is_idempotent() {
        let gallery = memory_gallery();
        gallery.add(1, "x").unwrap();
        gallery.clear().unwrap();
        assert!(gallery.list().unwrap().is_empty());
        gallery.clear().unwrap();
        assert!(gallery.list().unwrap().is_empty());
        assert_eq!(gallery.backend().get(GALLERY_KEY).unwrap(), None);
    }

    #[test]
    fn persisted_layout_is_plain_json_array() {
        let gallery = memory_gallery();
        gallery.add(7, "data:image/png;base64,AAA").unwrap();
        let raw = gallery.backend().get(GALLERY_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":7,"url":"data:image/png;base64,AAA"}]"#);
    }

    #[test]
    fn malformed_blob_is_reported_as_corrupt_and_clear_recovers() {
        let gallery = memory_gallery();
        gallery.backend().set(GALLERY_KEY, "{not json").unwrap();

        assert!(matches!(gallery.list(), Err(GalleryError::Corrupt { .. })));
        assert!(matches!(gallery.add(1, "x"), Err(GalleryError::Corrupt { .. })));
        assert_eq!(
            gallery.backend().get(GALLERY_KEY).unwrap().as_deref(),
            Some("{not json")
        );

        gallery.clear().unwrap();
        assert!(gallery.list().unwrap().is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("anicap");
        GalleryStore::new(FileKeyValueStore::with_root(root.clone()))
            .add(5, "data:image/png;base64,AAA")
            .unwrap();

        let reopened = GalleryStore::new(FileKeyValueStore::with_root(root.clone()));
        assert_eq!(reopened.list().unwrap()[0].id, 5);
        assert!(root.join("animeGallery.json").exists());
        let files = std::fs::read_dir(&root)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(files, vec![std::ffi::OsString::from("animeGallery.json")]);

        reopened.clear().unwrap();
        reopened.clear().unwrap();
        assert!(!root.join("animeGallery.json").exists());
    }

    #[test]
    fn file_store_stages_writes_under_process_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::with_root(dir.path().to_path_buf());
        let foreign_staging = dir.path().join(".animeGallery.json.0.tmp");
        std::fs::write(&foreign_staging, "[{\"id\":").unwrap();

        store.set(GALLERY_KEY, "[]").unwrap();
        assert_eq!(store.get(GALLERY_KEY).unwrap().as_deref(), Some("[]"));
        assert!(foreign_staging.exists());
    }

    #[test]
    fn data_root_prefers_xdg_data_home() {
        let root = data_root(Some(Path::new("/tmp/data")), Some(Path::new("/tmp/home"))).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/data/anicap"));

        let root = data_root(None, Some(Path::new("/tmp/home"))).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/home/.local/share/anicap"));

        assert!(matches!(
            data_root(None, None),
            Err(GalleryError::MissingHomeDirectory)
        ));
    }
}
