//! Record store backed by one JSON file per match

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::RecordStore;
use crate::error::CollaboratorError;
use crate::record::{GameRecord, RecordSummary};

/// Saves each record as `<dir>/<id>.json`
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    dir: PathBuf,
}

impl JsonRecordStore {
    /// Open (and create if needed) a store directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CollaboratorError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, CollaboratorError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CollaboratorError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn read(path: &Path) -> Result<GameRecord, CollaboratorError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// File-name friendly version of a match name
fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "match".to_string()
    } else {
        slug.chars().take(40).collect()
    }
}

impl RecordStore for JsonRecordStore {
    fn save(&mut self, record: &GameRecord) -> Result<String, CollaboratorError> {
        let now = Utc::now();
        let mut record = record.clone();
        record.time_saved = Some(now);

        let base = format!("{}-{}", now.format("%Y%m%d%H%M%S%3f"), slug(&record.name_match));
        let mut id = base.clone();
        let mut n = 1;
        while self.path_for(&id)?.exists() {
            n += 1;
            id = format!("{base}-{n}");
        }

        let path = self.path_for(&id)?;
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        debug!(path = %path.display(), "record written");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<RecordSummary>, CollaboratorError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match Self::read(&path) {
                Ok(record) => summaries.push(RecordSummary {
                    id,
                    name: record.name_match,
                    time_saved: record.time_saved,
                }),
                Err(err) => warn!(path = %path.display(), %err, "skipping unreadable record"),
            }
        }
        // Newest first; undated records last
        summaries.sort_by(|a, b| b.time_saved.cmp(&a.time_saved).then_with(|| b.id.cmp(&a.id)));
        Ok(summaries)
    }

    fn load(&self, id: &str) -> Result<GameRecord, CollaboratorError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(CollaboratorError::NotFound(id.to_string()));
        }
        Self::read(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pos, Stone};
    use crate::game::Move;

    fn sample(name: &str) -> GameRecord {
        GameRecord::new(
            name,
            &[
                Move::new(Pos::new(7, 7), Stone::Black),
                Move::new(Pos::new(8, 8), Stone::White),
            ],
            &[],
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonRecordStore::open(dir.path()).unwrap();

        let id = store.save(&sample("Friday Final!")).unwrap();
        assert!(id.ends_with("friday-final"));

        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.name_match, "Friday Final!");
        assert_eq!(loaded.move_list.len(), 2);
        assert!(loaded.time_saved.is_some());
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonRecordStore::open(dir.path()).unwrap();
        store.save(&sample("first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.save(&sample("second")).unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_same_name_twice_gets_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonRecordStore::open(dir.path()).unwrap();
        let a = store.save(&sample("dup")).unwrap();
        let b = store.save(&sample("dup")).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_list_skips_garbage_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonRecordStore::open(dir.path()).unwrap();
        store.save(&sample("good")).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "good");
    }

    #[test]
    fn test_load_unknown_or_unsafe_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRecordStore::open(dir.path()).unwrap();
        assert!(matches!(store.load("nope"), Err(CollaboratorError::NotFound(_))));
        assert!(matches!(store.load("../etc/passwd"), Err(CollaboratorError::NotFound(_))));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Hello World"), "hello-world");
        assert_eq!(slug("!!!"), "match");
    }
}
