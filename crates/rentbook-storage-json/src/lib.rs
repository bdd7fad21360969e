use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use rentbook_core::{
    storage::{BookBackupInfo, BookStorage},
    CoreError,
};
use rentbook_domain::RentBook;
use serde::Deserialize;
use tracing::{debug, info};

const BOOK_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directories holding books and their backups.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub book_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `books/` and `backups/` under `home`.
    pub fn under(home: &Path) -> Self {
        Self {
            book_root: home.join("books"),
            backup_root: home.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for rent books and their backups.
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

#[derive(Deserialize)]
struct RevisionProbe {
    #[serde(default)]
    revision: u64,
}

impl JsonBookStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.book_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            books_dir: paths.book_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    /// Revision currently stored on disk, or `None` when the book does not exist.
    pub fn stored_revision(&self, name: &str) -> Result<Option<u64>, CoreError> {
        let path = self.book_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let probe: RevisionProbe =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        Ok(Some(probe.revision))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn write_backup_file(
        &self,
        book: &RentBook,
        name: &str,
        note: Option<&str>,
    ) -> Result<BookBackupInfo, CoreError> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{}.{}", stem, BOOK_EXTENSION);
        let path = dir.join(&file_name);
        write_atomic(&path, &serialize_book(book)?)?;
        self.prune_backups(name)?;
        info!(book = %canonical_name(name), backup = %file_name, "backup written");
        Ok(BookBackupInfo {
            book: canonical_name(name),
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{}_{}.{}", canonical_name(name), timestamp, BOOK_EXTENSION);
        fs::copy(path, dir.join(&file_name))?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        let mut entries = self.list_backups(name)?;
        entries.sort_by_key(|info| Reverse(parse_backup_timestamp(&info.id)));
        for entry in entries.into_iter().skip(self.retention) {
            debug!(backup = %entry.id, "pruning backup");
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl BookStorage for JsonBookStorage {
    fn save_book(
        &self,
        name: &str,
        book: &RentBook,
        expected_revision: Option<u64>,
    ) -> Result<u64, CoreError> {
        let path = self.book_path(name);
        let stored = self.stored_revision(name)?;
        match (stored, expected_revision) {
            (Some(_), None) => {
                return Err(CoreError::Conflict(format!(
                    "book `{}` already exists",
                    canonical_name(name)
                )))
            }
            (Some(on_disk), Some(expected)) if on_disk != expected => {
                return Err(CoreError::Conflict(format!(
                    "book `{}` changed on disk (revision {on_disk}, expected {expected})",
                    canonical_name(name)
                )))
            }
            _ => {}
        }

        let revision = stored.or(expected_revision).unwrap_or(0) + 1;
        let mut snapshot = book.clone();
        snapshot.revision = revision;
        self.backup_existing_file(name, &path)?;
        save_book_to_path(&snapshot, &path)?;
        debug!(book = %canonical_name(name), revision, "book saved");
        Ok(revision)
    }

    fn load_book(&self, name: &str) -> Result<RentBook, CoreError> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(CoreError::BookNotFound(canonical_name(name)));
        }
        load_book_from_path(&path)
    }

    fn list_books(&self) -> Result<Vec<String>, CoreError> {
        if !self.books_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_book(&self, name: &str) -> Result<(), CoreError> {
        let path = self.book_path(name);
        if path.exists() {
            fs::remove_file(path)?;
            info!(book = %canonical_name(name), "book deleted");
        }
        Ok(())
    }

    fn backup_book(
        &self,
        name: &str,
        book: &RentBook,
        note: Option<&str>,
    ) -> Result<BookBackupInfo, CoreError> {
        self.write_backup_file(book, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<BookBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let book_slug = canonical_name(name);
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let created_at = parse_backup_timestamp(file_name)
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| file_name.to_string());
                entries.push(BookBackupInfo {
                    book: book_slug.clone(),
                    id: file_name.to_string(),
                    created_at,
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(parse_backup_timestamp(&info.id)));
        Ok(entries)
    }

    /// Copies the backup over the live book. The revision keeps increasing so
    /// writers holding the pre-restore revision see a conflict.
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<RentBook, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let mut book = load_book_from_path(&backup.path)?;
        let stored = self.stored_revision(&backup.book)?.unwrap_or(0);
        book.revision = stored.max(book.revision) + 1;
        save_book_to_path(&book, &self.book_path(&backup.book))?;
        info!(book = %backup.book, backup = %backup.id, revision = book.revision, "backup restored");
        Ok(book)
    }
}

/// Saves a book to an arbitrary path on disk.
pub fn save_book_to_path(book: &RentBook, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_book(book)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a book from the provided filesystem path.
pub fn load_book_from_path(path: &Path) -> Result<RentBook, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// File-system slug for a book name.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "book".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Reads the `YYYYMMDD_HHMM` stamp out of `<slug>_<date>_<time>[_note].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BOOK_EXTENSION))?;
    let segments: Vec<&str> = stem.split('_').collect();
    segments.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        if !is_digits(date, 8) || !is_digits(time, 4) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_book(book: &RentBook) -> Result<String, CoreError> {
    serde_json::to_string_pretty(book).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_parse_with_and_without_notes() {
        let plain = parse_backup_timestamp("main_20240720_0930.json").unwrap();
        assert_eq!(plain.format("%Y-%m-%d %H:%M").to_string(), "2024-07-20 09:30");
        let noted = parse_backup_timestamp("main_house_20240720_0930_before-move.json").unwrap();
        assert_eq!(noted, plain);
        assert!(parse_backup_timestamp("main.json").is_none());
    }

    #[test]
    fn notes_are_sanitized() {
        assert_eq!(
            sanitize_backup_note(Some("  Before July rent! ")),
            Some("before-july-rent".into())
        );
        assert_eq!(sanitize_backup_note(Some("!!!")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn names_become_slugs() {
        assert_eq!(canonical_name("Sunrise Flats"), "sunrise_flats");
        assert_eq!(canonical_name("  "), "book");
    }
}
