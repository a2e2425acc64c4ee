//! JSON file-based session repository.
//!
//! All sessions live in one `sessions.json` holding an array of flat,
//! versioned records (newest first). Records written by the browser build
//! carry no `version` field and are read as 1.0.0.
//!
//! - **Atomic writes**: tmp file + fsync + rename
//! - **Per-record recovery**: a record that fails to migrate is skipped,
//!   after the file is copied to `sessions.json.partial-<ts>`
//! - **Quarantine**: an unparsable file is moved to
//!   `sessions.json.corrupt-<ts>` and loading starts empty

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use version_migrate::Migrator;
use wandalf_core::error::{Result, WandalfError};
use wandalf_core::session::{Session, SessionRepository};

use crate::dto::create_session_migrator;

const ENTITY: &str = "session";
const LEGACY_VERSION: &str = "1.0.0";

pub struct JsonSessionRepository {
    path: PathBuf,
    migrator: Migrator,
}

impl JsonSessionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            migrator: create_session_migrator(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path `sessions.json.<label>-<timestamp>`.
    fn aside_path(&self, label: &str) -> PathBuf {
        self.path.with_extension(format!(
            "json.{}-{}",
            label,
            Utc::now().format("%Y%m%d%H%M%S%3f")
        ))
    }

    /// Moves an unreadable file aside so the next save starts a fresh one.
    ///
    /// If the file cannot be moved it stays where it is and an error is
    /// returned, which keeps the store from writing over it.
    fn quarantine(&self, reason: &str) -> Result<Vec<Session>> {
        let target = self.aside_path("corrupt");

        match fs::rename(&self.path, &target) {
            Ok(()) => {
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %target.display(),
                    "Quarantined unreadable session file: {}",
                    reason
                );
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    "Failed to quarantine unreadable session file: {}",
                    e
                );
                Err(WandalfError::serialization(
                    "JSON",
                    format!(
                        "Session file '{}' is unreadable ({}) and could not be moved aside: {}",
                        self.path.display(),
                        reason,
                        e
                    ),
                ))
            }
        }
    }

    /// Copies the file aside before records that failed to load are dropped
    /// by the next save.
    fn preserve_partial(&self, skipped: usize) -> Result<()> {
        let target = self.aside_path("partial");
        fs::copy(&self.path, &target).map_err(|e| {
            WandalfError::io(format!(
                "Failed to back up '{}' before dropping {} unreadable records: {}",
                self.path.display(),
                skipped,
                e
            ))
        })?;
        tracing::warn!(
            path = %self.path.display(),
            copied_to = %target.display(),
            skipped,
            "Kept a copy of the session file with unreadable records"
        );
        Ok(())
    }

    fn decode_record(&self, index: usize, mut record: Value) -> Option<Session> {
        if let Value::Object(fields) = &mut record {
            fields
                .entry("version")
                .or_insert_with(|| Value::String(LEGACY_VERSION.to_string()));
        }

        match self.migrator.load_flat_from(ENTITY, record) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(index, "Skipping unreadable session record: {}", e);
                None
            }
        }
    }

    fn encode_all(&self, sessions: &[Session]) -> Result<String> {
        let records = sessions
            .iter()
            .map(|session| {
                let json = self
                    .migrator
                    .save_domain_flat(ENTITY, session)
                    .map_err(|e| {
                        WandalfError::serialization(
                            "JSON",
                            format!("Failed to serialize session '{}': {}", session.id, e),
                        )
                    })?;
                serde_json::from_str::<Value>(&json).map_err(WandalfError::from)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(serde_json::to_string_pretty(&Value::Array(records))?)
    }

    fn write_atomically(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WandalfError::io(format!(
                    "Failed to create data directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            WandalfError::io(format!(
                "Failed to create temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        tmp_file.write_all(content.as_bytes()).map_err(|e| {
            WandalfError::io(format!(
                "Failed to write temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        tmp_file.sync_all().map_err(|e| {
            WandalfError::io(format!(
                "Failed to sync temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            WandalfError::io(format!(
                "Failed to rename '{}' to '{}': {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })
    }
}

impl SessionRepository for JsonSessionRepository {
    fn load_all(&self) -> Result<Vec<Session>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path).map_err(|e| {
            WandalfError::io(format!(
                "Failed to read session file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => return self.quarantine(&format!("not valid UTF-8: {}", e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(records)) => records,
            Ok(_) => return self.quarantine("top-level value is not an array"),
            Err(e) => return self.quarantine(&e.to_string()),
        };

        let total = records.len();
        let sessions: Vec<Session> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| self.decode_record(index, record))
            .collect();

        let skipped = total - sessions.len();
        if skipped > 0 {
            self.preserve_partial(skipped)?;
        }

        tracing::debug!(
            path = %self.path.display(),
            loaded = sessions.len(),
            skipped,
            "Loaded sessions"
        );
        Ok(sessions)
    }

    fn save_all(&self, sessions: &[Session]) -> Result<()> {
        let content = self.encode_all(sessions)?;
        self.write_atomically(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wandalf_core::session::{Message, Platform};

    fn repo_in(dir: &TempDir) -> JsonSessionRepository {
        JsonSessionRepository::new(dir.path().join("sessions.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(repo_in(&dir).load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload_preserves_order() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let mut newest = Session::new("b", Platform::Macos, "Second", 20);
        newest.messages.push(Message::user_image("https://img.example/x.png"));
        let oldest = Session::new("a", Platform::Web, "First", 10);

        repo.save_all(&[newest.clone(), oldest.clone()]).unwrap();
        let loaded = repo.load_all().unwrap();

        assert_eq!(loaded, vec![newest, oldest]);
        assert!(!dir.path().join("sessions.json.tmp").exists());
    }

    #[test]
    fn test_legacy_records_without_version_are_migrated() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        fs::write(
            repo.path(),
            r#"[{"id":"old","title":"Legacy","platform":"web",
                "messages":[{"sender":"user","text":"hello"}],
                "files":{},"previewUrl":null,"downloadUrl":null,
                "createdAt":5,"updatedAt":6}]"#,
        )
        .unwrap();

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].messages[0].text(), Some("hello"));
        assert_eq!(loaded[0].updated_at, 6);
    }

    fn files_starting_with(dir: &TempDir, prefix: &str) -> Vec<PathBuf> {
        fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| entry.path())
            .collect()
    }

    #[test]
    fn test_bad_record_is_skipped_and_kept_aside() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        fs::write(
            repo.path(),
            r#"[{"version":"2.0.0","id":"ok","title":"t","platform":"web","created_at":1,"updated_at":1},
                {"version":"9.0.0","id":"future","title":"from a newer build"}]"#,
        )
        .unwrap();

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "ok");

        repo.save_all(&loaded).unwrap();

        let copies = files_starting_with(&dir, "sessions.json.partial-");
        assert_eq!(copies.len(), 1);
        assert!(fs::read_to_string(&copies[0]).unwrap().contains("from a newer build"));
        assert!(!fs::read_to_string(repo.path()).unwrap().contains("future"));
    }

    #[test]
    fn test_corrupt_file_is_quarantined() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        fs::write(repo.path(), "{not json").unwrap();

        assert!(repo.load_all().unwrap().is_empty());
        assert!(!repo.path().exists());

        let quarantined = files_starting_with(&dir, "sessions.json.corrupt-");
        assert_eq!(quarantined.len(), 1);
        assert_eq!(fs::read_to_string(&quarantined[0]).unwrap(), "{not json");
    }

    #[test]
    fn test_non_utf8_file_is_quarantined() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        fs::write(repo.path(), [0xff, 0xfe, b'[', b']']).unwrap();

        assert!(repo.load_all().unwrap().is_empty());

        let quarantined = files_starting_with(&dir, "sessions.json.corrupt-");
        assert_eq!(quarantined.len(), 1);
        assert_eq!(fs::read(&quarantined[0]).unwrap(), vec![0xff, 0xfe, b'[', b']']);

        repo.save_all(&[Session::new("new", Platform::Web, "Fresh", 1)])
            .unwrap();
        assert_eq!(fs::read(&quarantined[0]).unwrap(), vec![0xff, 0xfe, b'[', b']']);
    }
}
