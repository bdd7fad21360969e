use std::sync::Arc;

use chrono::NaiveDate;
use rentbook_core::{
    storage::{book_warnings, BookBackupInfo, BookStorage},
    Clock, CoreError, OccupancyStats, ReadCache, ReportService, RoomService,
};
use rentbook_domain::{RentBook, Room};
use rentbook_storage_json::canonical_name;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no book is open")]
    NoBookOpen,
    #[error("backup `{0}` not found")]
    BackupNotFound(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Facade over the open book, its storage, and the read cache.
///
/// Every mutation runs against a copy of the open book and only replaces it
/// once storage has accepted the new revision.
pub struct BookManager {
    storage: Box<dyn BookStorage>,
    clock: Arc<dyn Clock>,
    cache: ReadCache,
    current: Option<RentBook>,
    current_name: Option<String>,
}

impl BookManager {
    pub fn new(storage: Box<dyn BookStorage>, clock: Arc<dyn Clock>, cache_ttl_secs: u64) -> Self {
        Self {
            cache: ReadCache::new(clock.clone(), cache_ttl_secs),
            storage,
            clock,
            current: None,
            current_name: None,
        }
    }

    pub fn storage(&self) -> &dyn BookStorage {
        self.storage.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn current(&self) -> Result<&RentBook, ManagerError> {
        self.current.as_ref().ok_or(ManagerError::NoBookOpen)
    }

    /// Replaces the cache, e.g. after the TTL setting changed.
    pub fn set_cache_ttl(&mut self, ttl_secs: u64) {
        self.cache = ReadCache::new(self.clock.clone(), ttl_secs);
    }

    /// Creates and opens an empty book. Fails if the name is taken.
    pub fn create(&mut self, name: &str) -> Result<&RentBook, ManagerError> {
        let mut book = RentBook::new(name.trim());
        book.revision = self.storage.save_book(name, &book, None)?;
        info!(book = %name, "book created");
        Ok(self.install(name, book))
    }

    /// Opens a stored book and returns integrity warnings found in it.
    pub fn open(&mut self, name: &str) -> Result<Vec<String>, ManagerError> {
        let book = self.storage.load_book(name)?;
        let warnings = book_warnings(&book);
        for warning in &warnings {
            warn!(book = %name, "{warning}");
        }
        self.install(name, book);
        Ok(warnings)
    }

    pub fn close(&mut self) {
        self.current = None;
        self.current_name = None;
        self.cache.invalidate_all();
    }

    pub fn list_books(&self) -> Result<Vec<String>, ManagerError> {
        Ok(self.storage.list_books()?)
    }

    /// Deletes a stored book. The open book has to be closed first.
    pub fn delete(&self, name: &str) -> Result<(), ManagerError> {
        let slug = canonical_name(name);
        if self.current_name.as_deref().map(canonical_name) == Some(slug) {
            return Err(CoreError::Conflict(format!(
                "book `{}` is open, close it first",
                name.trim()
            ))
            .into());
        }
        self.storage.load_book(name)?;
        self.storage.delete_book(name)?;
        info!(book = %name, "book deleted");
        Ok(())
    }

    /// Applies `change` to a copy of the open book and persists it.
    ///
    /// The open book is left untouched when `change` or the save fails. A
    /// save that detects a newer revision on disk surfaces as `Conflict`.
    pub fn mutate<T, F>(&mut self, change: F) -> Result<T, ManagerError>
    where
        F: FnOnce(&mut RentBook) -> Result<T, CoreError>,
    {
        let name = self
            .current_name
            .clone()
            .ok_or(ManagerError::NoBookOpen)?;
        let mut working = self.current()?.clone();
        let value = change(&mut working)?;
        working.touch();
        working.revision = self
            .storage
            .save_book(&name, &working, Some(working.revision))?;
        self.current = Some(working);
        self.cache.invalidate_all();
        Ok(value)
    }

    /// Rooms in display order, served from the cache when fresh.
    pub fn rooms(&mut self) -> Result<Vec<Room>, ManagerError> {
        let book = self.current.as_ref().ok_or(ManagerError::NoBookOpen)?;
        Ok(self
            .cache
            .rooms_or_insert_with(|| RoomService::list(book).into_iter().cloned().collect()))
    }

    pub fn stats(&mut self) -> Result<OccupancyStats, ManagerError> {
        let book = self.current.as_ref().ok_or(ManagerError::NoBookOpen)?;
        Ok(self
            .cache
            .stats_or_insert_with(|| ReportService::occupancy(book)))
    }

    pub fn backup(&self, note: Option<&str>) -> Result<BookBackupInfo, ManagerError> {
        let name = self.current_name.as_deref().ok_or(ManagerError::NoBookOpen)?;
        Ok(self.storage.backup_book(name, self.current()?, note)?)
    }

    pub fn list_backups(&self) -> Result<Vec<BookBackupInfo>, ManagerError> {
        let name = self.current_name.as_deref().ok_or(ManagerError::NoBookOpen)?;
        Ok(self.storage.list_backups(name)?)
    }

    /// Restores the backup whose file name starts with `id` and reopens it.
    pub fn restore(&mut self, id: &str) -> Result<BookBackupInfo, ManagerError> {
        let wanted = id.trim();
        let backups = self.list_backups()?;
        let backup = match backups.iter().find(|backup| backup.id == wanted) {
            Some(exact) => exact.clone(),
            None => {
                let matches: Vec<&BookBackupInfo> = backups
                    .iter()
                    .filter(|backup| !wanted.is_empty() && backup.id.starts_with(wanted))
                    .collect();
                match matches.as_slice() {
                    [only] => (*only).clone(),
                    _ => return Err(ManagerError::BackupNotFound(wanted.to_string())),
                }
            }
        };
        let book = self.storage.restore_backup(&backup)?;
        info!(backup = %backup.id, revision = book.revision, "backup restored");
        let name = self.current_name.clone().unwrap_or_else(|| backup.book.clone());
        self.install(&name, book);
        Ok(backup)
    }

    fn install(&mut self, name: &str, book: RentBook) -> &RentBook {
        self.cache.invalidate_all();
        self.current_name = Some(name.trim().to_string());
        self.current.insert(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentbook_core::{FixedClock, PaymentService, TenantService};
    use rentbook_domain::{Money, Tenant};
    use rentbook_storage_json::{JsonBookStorage, StoragePaths};
    use tempfile::tempdir;

    fn manager_in(dir: &std::path::Path) -> BookManager {
        let storage = JsonBookStorage::new(StoragePaths::under(dir)).expect("storage");
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()));
        BookManager::new(Box::new(storage), clock, 30)
    }

    #[test]
    fn mutations_require_an_open_book() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        let err = manager.mutate(|_| Ok(())).unwrap_err();
        assert!(matches!(err, ManagerError::NoBookOpen));
        assert!(matches!(manager.rooms(), Err(ManagerError::NoBookOpen)));
    }

    #[test]
    fn mutate_persists_and_bumps_revision() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.create("Sunrise").unwrap();
        assert_eq!(manager.current().unwrap().revision, 1);

        manager
            .mutate(|book| RoomService::add(book, Room::new("1", "single", Money::from_major(8_000))))
            .unwrap();
        assert_eq!(manager.current().unwrap().revision, 2);

        let reloaded = manager.storage().load_book("Sunrise").unwrap();
        assert_eq!(reloaded.rooms.len(), 1);
        assert_eq!(reloaded.revision, 2);
    }

    #[test]
    fn failed_change_leaves_open_book_untouched() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.create("Sunrise").unwrap();
        let err = manager
            .mutate(|book| {
                PaymentService::apply_payment(
                    book,
                    uuid::Uuid::new_v4(),
                    Money::from_major(100),
                    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                    None,
                )
            })
            .unwrap_err();
        assert!(matches!(err, ManagerError::Core(CoreError::TenantNotFound(_))));
        assert!(manager.current().unwrap().payments.is_empty());
        assert_eq!(manager.current().unwrap().revision, 1);
    }

    #[test]
    fn concurrent_writer_is_detected() {
        let dir = tempdir().unwrap();
        let mut first = manager_in(dir.path());
        let mut second = manager_in(dir.path());
        first.create("Shared").unwrap();
        second.open("Shared").unwrap();

        first
            .mutate(|book| RoomService::add(book, Room::new("1", "single", Money::from_major(1))))
            .unwrap();
        let err = second
            .mutate(|book| RoomService::add(book, Room::new("2", "single", Money::from_major(1))))
            .unwrap_err();
        assert!(matches!(err, ManagerError::Core(CoreError::Conflict(_))));
    }

    #[test]
    fn cached_views_refresh_after_writes() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.create("Sunrise").unwrap();
        assert_eq!(manager.stats().unwrap().total_rooms, 0);

        let room = manager
            .mutate(|book| RoomService::add(book, Room::new("1", "single", Money::from_major(8_000))))
            .unwrap();
        manager
            .mutate(|book| {
                TenantService::add(
                    book,
                    Tenant::new("Amina", "0700", Some(room), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                )
            })
            .unwrap();

        let stats = manager.stats().unwrap();
        assert_eq!(stats.total_rooms, 1);
        assert_eq!(stats.occupied_rooms, 1);
        assert!(!manager.rooms().unwrap()[0].is_vacant());
    }

    #[test]
    fn only_closed_books_can_be_deleted() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.create("Old Block").unwrap();
        assert!(matches!(
            manager.delete("old block"),
            Err(ManagerError::Core(CoreError::Conflict(_)))
        ));

        manager.close();
        manager.delete("Old Block").unwrap();
        assert!(manager.list_books().unwrap().is_empty());
        assert!(matches!(
            manager.delete("Old Block"),
            Err(ManagerError::Core(CoreError::BookNotFound(_)))
        ));
    }

    #[test]
    fn restore_reopens_backup_contents() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.create("Sunrise").unwrap();
        let backup = manager.backup(Some("empty")).unwrap();
        manager
            .mutate(|book| RoomService::add(book, Room::new("1", "single", Money::from_major(1))))
            .unwrap();

        manager.restore(&backup.id).unwrap();
        assert!(manager.current().unwrap().rooms.is_empty());
        assert!(matches!(
            manager.restore("no-such-backup"),
            Err(ManagerError::BackupNotFound(_))
        ));
    }
}
