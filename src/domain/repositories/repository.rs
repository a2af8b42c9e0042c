// src/domain/repositories/repository.rs

use std::collections::HashSet;

use crate::domain::entry::Entry;
use crate::domain::error::DomainError;
use crate::domain::tag::Tag;

/// Result of an atomic insert keyed by (user_id, url)
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The entry was inserted; it now carries its id
    Created(Entry),
    /// Another entry already holds the (user_id, url) key; nothing was written
    Existing(Entry),
}

/// A stored tag row of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTag {
    pub id: i32,
    pub user_id: i32,
    pub tag: Tag,
}

/// Repository trait for entry persistence.
///
/// The store enforces at most one entry per (user_id, url); `insert_or_get` relies
/// on that constraint instead of a separate read-then-write.
pub trait EntryRepository: std::fmt::Debug + Send + Sync {
    /// Get an entry by exact (url, user) match
    fn find_by_url_and_user(&self, url: &str, user_id: i32) -> Result<Option<Entry>, DomainError>;

    /// Get an entry by its ID
    fn get_by_id(&self, id: i32) -> Result<Option<Entry>, DomainError>;

    /// Insert the entry with its tags unless (user_id, url) already exists
    fn insert_or_get(&self, entry: &Entry) -> Result<UpsertOutcome, DomainError>;

    /// Persist changes of an existing entry; its tag links become exactly `entry.tags`
    fn save(&self, entry: &Entry) -> Result<(), DomainError>;

    /// Add tags to a stored entry and archive it if asked, in one transaction.
    ///
    /// Only ever adds state, so concurrent merges into the same entry all survive.
    /// Returns the entry as stored afterwards.
    fn merge_into(
        &self,
        entry_id: i32,
        user_id: i32,
        tags: &HashSet<Tag>,
        archive: bool,
    ) -> Result<Entry, DomainError>;

    /// Get the tag row for a user, creating it on first use
    fn find_or_create_tag(&self, user_id: i32, tag: &Tag) -> Result<StoredTag, DomainError>;

    /// All entries of a user, oldest first
    fn get_all_for_user(&self, user_id: i32) -> Result<Vec<Entry>, DomainError>;

    fn count_for_user(&self, user_id: i32) -> Result<usize, DomainError>;
}
