// src/application/services/entry_resolver.rs
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::enrichment::{ContentFetcher, EnrichmentOutcome};
use crate::domain::entry::Entry;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::import::{ImportOptions, RawImportRecord};
use crate::domain::repositories::repository::{EntryRepository, UpsertOutcome};
use crate::domain::report::RecordOutcome;

/// What resolving one record did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Created(Entry),
    /// The (user, url) entry existed; tags and archive flag were merged into it
    Merged(Entry),
}

impl Resolution {
    pub fn entry(&self) -> &Entry {
        match self {
            Resolution::Created(entry) | Resolution::Merged(entry) => entry,
        }
    }

    pub fn outcome(&self) -> RecordOutcome {
        match self {
            Resolution::Created(_) => RecordOutcome::Imported,
            Resolution::Merged(_) => RecordOutcome::Merged,
        }
    }
}

/// Matches import records against stored entries and creates enriched entries for new URLs
#[derive(Debug, Clone)]
pub struct EntryResolver {
    repository: Arc<dyn EntryRepository>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl EntryResolver {
    pub fn new(repository: Arc<dyn EntryRepository>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            repository,
            fetcher,
        }
    }

    #[instrument(skip(self, record), level = "debug", fields(url = %record.url))]
    pub fn resolve(
        &self,
        user_id: i32,
        record: &RawImportRecord,
        options: &ImportOptions,
    ) -> DomainResult<Resolution> {
        if let Some(existing) = self.repository.find_by_url_and_user(&record.url, user_id)? {
            return self.merge(existing, record, options);
        }

        let outcome = if options.disable_content_update {
            EnrichmentOutcome::Skipped
        } else {
            self.fetcher.fetch(&record.url)
        };
        debug!("Enrichment: {}", outcome.label());

        let entry = Entry::from_import(user_id, record, outcome.into_metadata(), options)?;

        match self.repository.insert_or_get(&entry)? {
            UpsertOutcome::Created(created) => Ok(Resolution::Created(created)),
            // A concurrent import stored the URL between lookup and insert
            UpsertOutcome::Existing(existing) => {
                debug!("Lost insert race for {}, merging", record.url);
                self.merge(existing, record, options)
            }
        }
    }

    /// Apply the record to a stored entry. `existing` may be stale; the store merges additively.
    fn merge(
        &self,
        existing: Entry,
        record: &RawImportRecord,
        options: &ImportOptions,
    ) -> DomainResult<Resolution> {
        // Import state only grows, so a stale copy that already holds it proves a no-op
        if !existing.clone().merge_import(record, options) {
            return Ok(Resolution::Merged(existing));
        }
        let id = existing.id.ok_or_else(|| {
            DomainError::Other(format!("Stored entry for {} has no ID", existing.url))
        })?;

        let merged = self
            .repository
            .merge_into(id, existing.user_id, &record.tags, options.mark_as_read)?;
        debug!("Merged import into entry {}", id);
        Ok(Resolution::Merged(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::{EntryMetadata, NoopFetcher};
    use crate::domain::repositories::repository::StoredTag;
    use crate::domain::tag::Tag;
    use crate::infrastructure::repositories::sqlite::repository::SqliteEntryRepository;
    use crate::util::testing::{setup_test_db, TestDb};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl ContentFetcher for CountingFetcher {
        fn fetch(&self, _url: &str) -> EnrichmentOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            EnrichmentOutcome::from_metadata(EntryMetadata {
                title: Some("Fetched title".to_string()),
                mimetype: Some("text/html".to_string()),
                preview_picture: Some("https://example.com/p.png".to_string()),
                language: Some("en".to_string()),
            })
        }
    }

    /// Stores `rival` right before the first insert, as a concurrent import would
    #[derive(Debug)]
    struct RacingRepository {
        inner: SqliteEntryRepository,
        rival: Mutex<Option<Entry>>,
    }

    impl EntryRepository for RacingRepository {
        fn find_by_url_and_user(&self, url: &str, user_id: i32) -> DomainResult<Option<Entry>> {
            self.inner.find_by_url_and_user(url, user_id)
        }

        fn get_by_id(&self, id: i32) -> DomainResult<Option<Entry>> {
            self.inner.get_by_id(id)
        }

        fn insert_or_get(&self, entry: &Entry) -> DomainResult<UpsertOutcome> {
            if let Some(rival) = self.rival.lock().unwrap().take() {
                self.inner.insert_or_get(&rival)?;
            }
            self.inner.insert_or_get(entry)
        }

        fn save(&self, entry: &Entry) -> DomainResult<()> {
            self.inner.save(entry)
        }

        fn merge_into(
            &self,
            entry_id: i32,
            user_id: i32,
            tags: &HashSet<Tag>,
            archive: bool,
        ) -> DomainResult<Entry> {
            self.inner.merge_into(entry_id, user_id, tags, archive)
        }

        fn find_or_create_tag(&self, user_id: i32, tag: &Tag) -> DomainResult<StoredTag> {
            self.inner.find_or_create_tag(user_id, tag)
        }

        fn get_all_for_user(&self, user_id: i32) -> DomainResult<Vec<Entry>> {
            self.inner.get_all_for_user(user_id)
        }

        fn count_for_user(&self, user_id: i32) -> DomainResult<usize> {
            self.inner.count_for_user(user_id)
        }
    }

    fn resolver(db: &TestDb) -> (EntryResolver, Arc<CountingFetcher>) {
        let fetcher = Arc::new(CountingFetcher::default());
        let resolver = EntryResolver::new(Arc::new(db.repository.clone()), fetcher.clone());
        (resolver, fetcher)
    }

    fn record(url: &str, title: &str, tags: &str) -> RawImportRecord {
        RawImportRecord::new(url, title)
            .unwrap()
            .with_tags(Tag::parse_tags(tags).unwrap())
    }

    #[test]
    fn given_new_url_when_resolve_then_created_with_enrichment() {
        let db = setup_test_db();
        let (resolver, fetcher) = resolver(&db);

        let resolution = resolver
            .resolve(1, &record("https://example.com/a", "", "foo"), &ImportOptions::default())
            .unwrap();

        assert_eq!(resolution.outcome(), RecordOutcome::Imported);
        let entry = resolution.entry();
        assert!(entry.id.is_some());
        assert_eq!(entry.title, "Fetched title");
        assert_eq!(entry.mimetype.as_deref(), Some("text/html"));
        assert_eq!(entry.language.as_deref(), Some("en"));
        assert!(!entry.is_archived);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn given_existing_url_when_resolve_then_merged_without_fetch() {
        let db = setup_test_db();
        let (resolver, fetcher) = resolver(&db);
        let options = ImportOptions::default();

        resolver
            .resolve(1, &record("https://example.com/a", "A", "foo"), &options)
            .unwrap();
        let resolution = resolver
            .resolve(1, &record("https://example.com/a", "Other", "bar"), &options)
            .unwrap();

        assert_eq!(resolution.outcome(), RecordOutcome::Merged);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let stored = db
            .repository
            .find_by_url_and_user("https://example.com/a", 1)
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "A");
        assert_eq!(stored.formatted_tags(), "bar,foo");
        assert_eq!(db.repository.count_for_user(1).unwrap(), 1);
    }

    #[test]
    fn given_mark_as_read_when_resolving_existing_then_archived() {
        let db = setup_test_db();
        let (resolver, _) = resolver(&db);

        resolver
            .resolve(1, &record("https://example.com/a", "A", ""), &ImportOptions::default())
            .unwrap();
        let options = ImportOptions {
            mark_as_read: true,
            disable_content_update: true,
        };
        let resolution = resolver
            .resolve(1, &record("https://example.com/a", "A", ""), &options)
            .unwrap();

        assert!(resolution.entry().is_archived);
        let stored = db.repository.get_by_id(resolution.entry().id.unwrap()).unwrap().unwrap();
        assert!(stored.is_archived);
    }

    #[test]
    fn given_disabled_content_update_when_resolve_then_no_fetch_and_url_title() {
        let db = setup_test_db();
        let (resolver, fetcher) = resolver(&db);
        let options = ImportOptions {
            mark_as_read: false,
            disable_content_update: true,
        };

        let resolution = resolver
            .resolve(1, &record("https://example.com/a", "", ""), &options)
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolution.entry().title, "https://example.com/a");
        assert!(resolution.entry().mimetype.is_none());
    }

    #[test]
    fn given_url_stored_between_lookup_and_insert_when_resolve_then_merged_into_it() {
        let db = setup_test_db();
        let rival = Entry::from_import(
            1,
            &record("https://example.com/a", "Rival", "theirs"),
            EntryMetadata::default(),
            &ImportOptions::default(),
        )
        .unwrap();
        let repository = Arc::new(RacingRepository {
            inner: db.repository.clone(),
            rival: Mutex::new(Some(rival)),
        });
        let resolver = EntryResolver::new(repository, Arc::new(NoopFetcher));
        let options = ImportOptions {
            mark_as_read: true,
            disable_content_update: false,
        };

        let resolution = resolver
            .resolve(1, &record("https://example.com/a", "Mine", "ours"), &options)
            .unwrap();

        assert_eq!(resolution.outcome(), RecordOutcome::Merged);
        assert_eq!(db.repository.count_for_user(1).unwrap(), 1);
        let stored = db
            .repository
            .find_by_url_and_user("https://example.com/a", 1)
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Rival");
        assert_eq!(stored.formatted_tags(), "ours,theirs");
        assert!(stored.is_archived);
        assert_eq!(resolution.entry(), &stored);
    }

    #[test]
    fn given_parallel_resolves_of_one_url_when_done_then_one_entry_with_all_tags() {
        let db = setup_test_db();
        let (resolver, _) = resolver(&db);
        let options = ImportOptions {
            mark_as_read: false,
            disable_content_update: true,
        };

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let resolver = &resolver;
                scope.spawn(move || {
                    for n in 0..10 {
                        let tag = format!("w{}-{}", worker, n);
                        resolver
                            .resolve(1, &record("https://example.com/a", "A", &tag), &options)
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(db.repository.count_for_user(1).unwrap(), 1);
        let stored = db
            .repository
            .find_by_url_and_user("https://example.com/a", 1)
            .unwrap()
            .unwrap();
        assert_eq!(stored.tags.len(), 80);
    }
}
