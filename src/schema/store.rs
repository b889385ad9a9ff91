use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{info, warn};

use super::merge::{query_root_name, MergeOptions};
use super::{WorkingSchema, DEFAULT_EXTENSION, DEFAULT_SCHEMA, ROOT_TYPE_PLACEHOLDER};
use crate::domain::{SchemaError, StoreError};

/// Where the base document comes from
#[derive(Debug, Clone)]
pub enum SchemaMode {
    /// The local SDL file is the whole schema
    Mock,
    /// The local SDL file extends a schema introspected from the upstream server
    Proxy { remote_sdl: String },
}

impl std::fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaMode::Mock => f.write_str("mock"),
            SchemaMode::Proxy { .. } => f.write_str("proxy"),
        }
    }
}

/// Holds the Working Schema currently served and replaces it atomically.
///
/// Readers take a snapshot with [`SchemaStore::snapshot`] and keep using it for the whole
/// request, even if the schema is replaced in the meantime.
pub struct SchemaStore {
    current: ArcSwap<WorkingSchema>,
    local_sdl: ArcSwap<String>,
    mode: SchemaMode,
    root_type: String,
    path: PathBuf,
    options: MergeOptions,
    write_lock: Mutex<()>,
}

impl SchemaStore {
    /// Loads the local SDL file, or the bundled default when it does not exist yet
    pub fn open(
        mode: SchemaMode,
        path: impl Into<PathBuf>,
        options: MergeOptions,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let local = match read_file(&path)? {
            Some(sdl) => sdl,
            None => {
                info!(path = %path.display(), "SDL file not found, serving the default document");
                match mode {
                    SchemaMode::Mock => DEFAULT_SCHEMA.to_string(),
                    SchemaMode::Proxy { .. } => DEFAULT_EXTENSION.to_string(),
                }
            }
        };
        let root_type = match &mode {
            SchemaMode::Mock => "Query".to_string(),
            SchemaMode::Proxy { remote_sdl } => query_root_name(remote_sdl),
        };

        let schema = build_for(&mode, &root_type, &local, options)?;

        Ok(Self {
            current: ArcSwap::from_pointee(schema),
            local_sdl: ArcSwap::from_pointee(local),
            mode,
            root_type,
            path,
            options,
            write_lock: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<WorkingSchema> {
        self.current.load_full()
    }

    /// The SDL text as written by the user
    pub fn local_sdl(&self) -> Arc<String> {
        self.local_sdl.load_full()
    }

    pub fn mode(&self) -> &SchemaMode {
        &self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds a Working Schema from a local SDL text without serving it
    pub fn build(&self, local: &str) -> Result<WorkingSchema, SchemaError> {
        build_for(&self.mode, &self.root_type, local, self.options)
    }

    /// Validates `sdl`, writes it to the SDL file and starts serving it
    pub fn save(&self, sdl: String) -> Result<Arc<WorkingSchema>, StoreError> {
        let schema = Arc::new(self.build(&sdl)?);
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        fs::write(&self.path, &sdl).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.swap(sdl, schema.clone());
        Ok(schema)
    }

    /// Re-reads the SDL file. Returns `None` when the file is gone or unchanged.
    pub fn reload(&self) -> Result<Option<Arc<WorkingSchema>>, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sdl) = read_file(&self.path)? else {
            warn!(path = %self.path.display(), "SDL file disappeared, keeping the current schema");
            return Ok(None);
        };
        if sdl == *self.local_sdl.load_full() {
            return Ok(None);
        }
        let schema = Arc::new(self.build(&sdl)?);
        self.swap(sdl, schema.clone());
        Ok(Some(schema))
    }

    fn swap(&self, sdl: String, schema: Arc<WorkingSchema>) {
        self.local_sdl.store(Arc::new(sdl));
        self.current.store(schema);
    }
}

fn build_for(
    mode: &SchemaMode,
    root_type: &str,
    local: &str,
    options: MergeOptions,
) -> Result<WorkingSchema, SchemaError> {
    match mode {
        SchemaMode::Mock => WorkingSchema::build(local.to_string(), None, options),
        SchemaMode::Proxy { remote_sdl } => WorkingSchema::build(
            remote_sdl.clone(),
            Some(local.replace(ROOT_TYPE_PLACEHOLDER, root_type)),
            options,
        ),
    }
}

fn read_file(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(sdl) => Ok(Some(sdl)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SDL: &str = "type Query { greeting: String @fake(type: word) }";

    #[test]
    fn test_open_missing_file_serves_default() {
        let dir = TempDir::new().unwrap();
        let store = SchemaStore::open(
            SchemaMode::Mock,
            dir.path().join("schema.faker.graphql"),
            MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(*store.local_sdl(), DEFAULT_SCHEMA);
        assert!(store.snapshot().schema.get_object("Company").is_some());
    }

    #[test]
    fn test_save_swaps_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        let store = SchemaStore::open(SchemaMode::Mock, &path, MergeOptions::default()).unwrap();
        let before = store.snapshot();

        store.save(SDL.to_string()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), SDL);
        assert!(store.snapshot().schema.get_object("Company").is_none());
        // snapshots taken earlier are unaffected
        assert!(before.schema.get_object("Company").is_some());
    }

    #[test]
    fn test_invalid_save_keeps_previous_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        fs::write(&path, SDL).unwrap();
        let store = SchemaStore::open(SchemaMode::Mock, &path, MergeOptions::default()).unwrap();

        let err = store.save("type Query { a: Missing }".to_string()).unwrap_err();

        assert!(matches!(err, StoreError::Schema(SchemaError::Validation(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), SDL);
        assert!(store.snapshot().schema.get_object("Query").unwrap().fields.contains_key("greeting"));
    }

    #[test]
    fn test_reload_picks_up_external_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        fs::write(&path, SDL).unwrap();
        let store = SchemaStore::open(SchemaMode::Mock, &path, MergeOptions::default()).unwrap();

        assert!(store.reload().unwrap().is_none());

        fs::write(&path, "type Query { other: Int }").unwrap();
        let reloaded = store.reload().unwrap().unwrap();
        assert!(reloaded.schema.get_object("Query").unwrap().fields.contains_key("other"));
    }

    #[test]
    fn test_proxy_mode_replaces_root_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extension.graphql");
        fs::write(&path, "extend type <RootTypeName> { extra: String }").unwrap();
        let store = SchemaStore::open(
            SchemaMode::Proxy {
                remote_sdl: "schema { query: Root } type Root { a: Int }".to_string(),
            },
            &path,
            MergeOptions::default(),
        )
        .unwrap();

        let schema = store.snapshot();
        assert!(schema.is_extension_field("Root", "extra"));
        assert!(store.local_sdl().contains("<RootTypeName>"));
    }
}
