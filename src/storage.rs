use crate::model::Document;
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const STORAGE_PREFIX: &str = "tyrozen-section-view";
pub const DATA_DIR_ENV: &str = "TYROZEN_DATA_DIR";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("creating data directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("serializing view {view}: {source}")]
    Serialize {
        view: String,
        source: serde_yaml::Error,
    },
    #[error("writing {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("locating the platform data directory")]
    NoDataDir,
}

pub fn storage_key(view: &str) -> String {
    format!("{}-{}", STORAGE_PREFIX, view)
}

/// One YAML file per view under a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    /// Store rooted at `dir` when given, else the platform data directory.
    pub fn open(dir: Option<PathBuf>) -> Result<Self, StoreError> {
        match dir {
            Some(dir) => Ok(Store::new(dir)),
            None => default_data_dir().map(Store::new),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, view: &str) -> PathBuf {
        self.dir.join(format!("{}.yml", file_stem(&storage_key(view))))
    }

    /// Stored document for `view`, or `None` when nothing usable is stored.
    pub fn load(&self, view: &str) -> Option<Document> {
        let path = self.path_for(view);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no stored document for view {}", view);
                return None;
            }
            Err(err) => {
                log::warn!("reading {:?}: {}", path, err);
                return None;
            }
        };
        if data.trim().is_empty() {
            return None;
        }
        match serde_yaml::from_str::<Document>(&data) {
            Ok(doc) => {
                log::debug!("loaded {} sections for view {}", doc.len(), view);
                Some(doc)
            }
            Err(err) => {
                log::warn!("ignoring unreadable document at {:?}: {}", path, err);
                None
            }
        }
    }

    /// Replace the stored document for `view`.
    pub fn save(&self, view: &str, doc: &Document) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let serialized = serde_yaml::to_string(doc).map_err(|source| StoreError::Serialize {
            view: view.to_string(),
            source,
        })?;
        let path = self.path_for(view);
        let tmp = path.with_extension("yml.tmp");
        fs::write(&tmp, serialized)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        log::debug!("saved view {} to {:?}", view, path);
        Ok(())
    }
}

pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    let dirs = ProjectDirs::from("", "", "tyrozen").ok_or(StoreError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

// Keys become file names. Every byte outside `[A-Za-z0-9-]` is
// percent-encoded, so distinct views never share a file and none can leave
// the directory.
fn file_stem(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Section, Task};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Document {
        vec![
            Section {
                id: "s1".into(),
                title: "monday".into(),
                tasks: vec![
                    Task {
                        id: "t1".into(),
                        title: "Math: chapter 3".into(),
                        priority: Priority::Low,
                        deadline: NaiveDate::from_ymd_opt(2025, 11, 27),
                        completed: true,
                    },
                    Task::blank("t2".into()),
                ],
            },
            Section::new("s2".into(), "wed"),
        ]
    }

    #[test]
    fn key_has_shared_prefix() {
        assert_eq!(storage_key("daily"), "tyrozen-section-view-daily");
        assert_eq!(storage_key("weekly"), "tyrozen-section-view-weekly");
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join("data"));
        let doc = sample();
        store.save("daily", &doc).unwrap();
        assert_eq!(store.load("daily"), Some(doc));
    }

    #[test]
    fn missing_entry_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        assert_eq!(store.load("daily"), None);
    }

    #[test]
    fn corrupt_entry_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        fs::write(store.path_for("daily"), "{ this is: [not a section list").unwrap();
        assert_eq!(store.load("daily"), None);
        fs::write(store.path_for("daily"), "just a string").unwrap();
        assert_eq!(store.load("daily"), None);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        store.save("daily", &sample()).unwrap();
        let smaller = vec![Section::new("only".into(), "only")];
        store.save("daily", &smaller).unwrap();
        assert_eq!(store.load("daily"), Some(smaller));
        assert!(!store.path_for("daily").with_extension("yml.tmp").exists());
    }

    #[test]
    fn views_do_not_share_entries() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        store.save("daily", &sample()).unwrap();
        assert_eq!(store.load("weekly"), None);
        assert_ne!(store.path_for("daily"), store.path_for("weekly"));
    }

    #[test]
    fn view_names_stay_inside_the_directory() {
        let store = Store::new("/data");
        let path = store.path_for("../../etc/passwd");
        assert_eq!(path.parent(), Some(Path::new("/data")));
    }

    #[test]
    fn similar_view_names_keep_separate_entries() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path());
        let first = vec![Section::new("s1".into(), "underscore")];
        let second = vec![Section::new("s2".into(), "slash")];
        store.save("a_b", &first).unwrap();
        store.save("a/b", &second).unwrap();
        assert_ne!(store.path_for("a_b"), store.path_for("a/b"));
        assert_ne!(store.path_for("x..y"), store.path_for("x__y"));
        assert_eq!(store.load("a_b"), Some(first));
        assert_eq!(store.load("a/b"), Some(second));
    }

    #[test]
    fn plain_view_names_map_to_readable_files() {
        let store = Store::new("/data");
        assert_eq!(
            store.path_for("weekly"),
            Path::new("/data/tyrozen-section-view-weekly.yml")
        );
        assert_eq!(
            store.path_for("a_b"),
            Path::new("/data/tyrozen-section-view-a%5Fb.yml")
        );
    }
}
