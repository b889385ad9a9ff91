use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

/// Calls `on_change` whenever the watched SDL file is written, created or replaced.
///
/// The parent directory is watched rather than the file itself so that editors which save
/// through a rename keep triggering reloads.
pub struct SdlWatcher {
    _watcher: RecommendedWatcher,
}

impl SdlWatcher {
    pub fn new<F>(path: impl AsRef<Path>, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        let file = absolute(path.as_ref())?;
        let directory = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        info!("Watching SDL file: {}", file.display());

        std::thread::spawn(move || loop {
            match rx.recv() {
                Ok(Ok(event)) => {
                    if !concerns(&event, &file) {
                        continue;
                    }
                    // Debounce slightly by waiting, then drop the burst of events of one save
                    std::thread::sleep(Duration::from_millis(100));
                    while rx.try_recv().is_ok() {}
                    info!("SDL change detected, reloading...");
                    on_change();
                }
                Ok(Err(e)) => error!("Watch error: {:?}", e),
                Err(_) => break,
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn concerns(event: &Event, file: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|path| path.file_name() == file.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_change_to_watched_file_triggers_callback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.graphql");
        std::fs::write(&path, "type Query { a: Int }").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _watcher = SdlWatcher::new(&path, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        std::thread::sleep(Duration::from_millis(200));
        std::fs::write(&path, "type Query { b: Int }").unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_other_files_are_ignored() {
        let file = PathBuf::from("/tmp/schema.graphql");
        let event = Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/other.graphql"));
        assert!(!concerns(&event, &file));

        let event = Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(file.clone());
        assert!(concerns(&event, &file));
    }
}
