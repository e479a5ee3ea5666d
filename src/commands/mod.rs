pub mod init;
pub mod list;
pub mod status;
pub mod view;

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::config::{Settings, SourceKind};
use crate::data::DataSource;
use crate::data::file::FileStore;
use crate::data::http::HttpSource;
use crate::store;

/// Settings from the store under `root`, or defaults without one.
pub fn load_settings(root: Option<&Path>) -> Result<Settings> {
    match root {
        Some(root) => Settings::load(&store::config_path(root)),
        None => Ok(Settings::default()),
    }
}

/// Open the configured data source. `api` overrides the configured kind.
///
/// A file source needs an initialised store; an HTTP source does not.
pub fn open_source(api: Option<&str>) -> Result<(Box<dyn DataSource>, Settings)> {
    let cwd = std::env::current_dir()?;
    open_source_from(&cwd, api)
}

pub fn open_source_from(start: &Path, api: Option<&str>) -> Result<(Box<dyn DataSource>, Settings)> {
    let root = store::find_root_from(start).ok();
    let settings = load_settings(root.as_deref())?;
    let source: Box<dyn DataSource> = match (api, settings.source.kind) {
        (Some(url), _) => Box::new(HttpSource::new(url)),
        (None, SourceKind::Http) => Box::new(HttpSource::new(&settings.source.url)),
        (None, SourceKind::File) => {
            let root = match root {
                Some(root) => root,
                None => store::find_root_from(start)?,
            };
            Box::new(FileStore::new(store::data_path(&root)))
        }
    };
    Ok((source, settings))
}

pub struct ViewerSource {
    pub source: Box<dyn DataSource>,
    pub settings: Settings,
    /// No store was found; the viewer opens empty.
    pub missing_store: bool,
}

/// Like `open_source_from`, but a missing file store still opens an empty
/// viewer pointed at `start`.
pub fn open_viewer_source_from(start: &Path, api: Option<&str>) -> Result<ViewerSource> {
    if api.is_none() && store::find_root_from(start).is_err() {
        let settings = Settings::default();
        if settings.source.kind == SourceKind::File {
            warn!(dir = %start.display(), "no timeline store found, opening an empty viewer");
            return Ok(ViewerSource {
                source: Box::new(FileStore::new(store::data_path(start))),
                settings,
                missing_store: true,
            });
        }
    }
    let (source, settings) = open_source_from(start, api)?;
    Ok(ViewerSource {
        source,
        settings,
        missing_store: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cache::DataCache;
    use crate::data::seed;
    use tempfile::TempDir;

    #[test]
    fn plain_open_requires_a_store() {
        let dir = TempDir::new().unwrap();
        let err = open_source_from(dir.path(), None).err().unwrap();
        assert!(err.to_string().contains("divergence init"));
    }

    #[test]
    fn viewer_opens_empty_without_a_store() {
        let dir = TempDir::new().unwrap();
        let opened = open_viewer_source_from(dir.path(), None).unwrap();
        assert!(opened.missing_store);
        let data = DataCache::load(opened.source.as_ref());
        assert!(data.worldlines.is_empty());
        assert!(data.load_error.is_some());
    }

    #[test]
    fn viewer_uses_the_store_when_present() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(store::store_dir(dir.path())).unwrap();
        FileStore::create(store::data_path(dir.path()), &seed::document()).unwrap();
        let opened = open_viewer_source_from(dir.path(), None).unwrap();
        assert!(!opened.missing_store);
        assert_eq!(DataCache::load(opened.source.as_ref()).worldlines.len(), 4);
    }
}
