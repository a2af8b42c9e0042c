// src/infrastructure/repositories/sqlite/repository.rs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use crate::domain::entry::{Entry, EntryBuilder};
use crate::domain::error::DomainError;
use crate::domain::repositories::repository::{EntryRepository, StoredTag, UpsertOutcome};
use crate::domain::tag::Tag;
use crate::infrastructure::repositories::sqlite::model::{
    DbEntry, DbEntryChanges, DbTag, NewEntry, NewEntryTag, NewTag,
};
use crate::infrastructure::repositories::sqlite::schema::{entries, entry_tags, tags};

#[derive(Clone, Debug)]
pub struct SqliteEntryRepository {
    pool: ConnectionPool,
}

impl SqliteEntryRepository {
    /// Create a new SQLite repository with the provided connection pool
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Create a new SQLite repository with the provided database URL, running migrations
    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = super::connection::init_pool(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    #[instrument(skip_all, level = "trace")]
    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::Pool(e.to_string()))
    }

    fn load_tags(conn: &mut SqliteConnection, entry_id: i32) -> SqliteResult<HashSet<Tag>> {
        let names: Vec<String> = entry_tags::table
            .inner_join(tags::table)
            .filter(entry_tags::entry_id.eq(entry_id))
            .select(tags::name)
            .load(conn)?;

        names
            .into_iter()
            .map(|name| {
                Tag::new(&name).map_err(|e| {
                    SqliteRepositoryError::CorruptRow(format!(
                        "Invalid stored tag '{}' on entry {}: {}",
                        name, entry_id, e
                    ))
                })
            })
            .collect()
    }

    /// Convert a database row plus its tag links to a domain entity
    #[instrument(skip_all, level = "trace")]
    fn to_domain_model(conn: &mut SqliteConnection, row: DbEntry) -> SqliteResult<Entry> {
        let tags = Self::load_tags(conn, row.id)?;

        EntryBuilder::default()
            .id(Some(row.id))
            .user_id(row.user_id)
            .url(row.url)
            .title(row.title)
            .mimetype(row.mimetype)
            .preview_picture(row.preview_picture)
            .language(row.language)
            .tags(tags)
            .is_archived(row.is_archived)
            .is_starred(row.is_starred)
            .created_at(DateTime::<Utc>::from_naive_utc_and_offset(row.created_at, Utc))
            .updated_at(DateTime::<Utc>::from_naive_utc_and_offset(row.updated_at, Utc))
            .build()
            .map_err(|e| {
                SqliteRepositoryError::CorruptRow(format!(
                    "Failed to create domain entry from DB model for ID {}: {}",
                    row.id, e
                ))
            })
    }

    fn to_new_entry(entry: &Entry) -> NewEntry {
        NewEntry {
            user_id: entry.user_id,
            url: entry.url.clone(),
            title: entry.title.clone(),
            mimetype: entry.mimetype.clone(),
            preview_picture: entry.preview_picture.clone(),
            language: entry.language.clone(),
            is_archived: entry.is_archived,
            is_starred: entry.is_starred,
            created_at: entry.created_at.naive_utc(),
            updated_at: entry.updated_at.naive_utc(),
        }
    }

    fn to_changes(entry: &Entry) -> DbEntryChanges {
        DbEntryChanges {
            title: entry.title.clone(),
            mimetype: entry.mimetype.clone(),
            preview_picture: entry.preview_picture.clone(),
            language: entry.language.clone(),
            is_archived: entry.is_archived,
            is_starred: entry.is_starred,
            updated_at: entry.updated_at.naive_utc(),
        }
    }

    fn find_row(conn: &mut SqliteConnection, url: &str, user_id: i32) -> SqliteResult<Option<DbEntry>> {
        Ok(entries::table
            .filter(entries::user_id.eq(user_id))
            .filter(entries::url.eq(url))
            .select(DbEntry::as_select())
            .first::<DbEntry>(conn)
            .optional()?)
    }

    /// Insert-or-ignore on (user_id, name), then read back the row
    fn find_or_create_tag_row(
        conn: &mut SqliteConnection,
        user_id: i32,
        tag: &Tag,
    ) -> SqliteResult<DbTag> {
        diesel::insert_into(tags::table)
            .values(&NewTag {
                user_id,
                name: tag.value(),
            })
            .on_conflict((tags::user_id, tags::name))
            .do_nothing()
            .execute(conn)?;

        Ok(tags::table
            .filter(tags::user_id.eq(user_id))
            .filter(tags::name.eq(tag.value()))
            .select(DbTag::as_select())
            .first::<DbTag>(conn)?)
    }

    /// Add links to the given tags, keeping existing ones. Returns the tag ids and
    /// the number of links that were new.
    fn link_tags(
        conn: &mut SqliteConnection,
        entry_id: i32,
        user_id: i32,
        tags: &HashSet<Tag>,
    ) -> SqliteResult<(Vec<i32>, usize)> {
        let mut tag_ids = Vec::with_capacity(tags.len());
        let mut linked = 0;
        for tag in tags {
            let row = Self::find_or_create_tag_row(conn, user_id, tag)?;
            linked += diesel::insert_into(entry_tags::table)
                .values(&NewEntryTag {
                    entry_id,
                    tag_id: row.id,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
            tag_ids.push(row.id);
        }
        Ok((tag_ids, linked))
    }

    /// Link the entry to exactly the given tags
    fn sync_tags(
        conn: &mut SqliteConnection,
        entry_id: i32,
        user_id: i32,
        wanted: &HashSet<Tag>,
    ) -> SqliteResult<()> {
        let (tag_ids, _) = Self::link_tags(conn, entry_id, user_id, wanted)?;

        let removed = diesel::delete(
            entry_tags::table
                .filter(entry_tags::entry_id.eq(entry_id))
                .filter(entry_tags::tag_id.ne_all(tag_ids)),
        )
        .execute(conn)?;
        if removed > 0 {
            debug!("Unlinked {} tag(s) from entry {}", removed, entry_id);
        }
        Ok(())
    }
}

impl EntryRepository for SqliteEntryRepository {
    #[instrument(skip(self), level = "debug")]
    fn find_by_url_and_user(&self, url: &str, user_id: i32) -> Result<Option<Entry>, DomainError> {
        let mut conn = self.get_connection()?;

        match Self::find_row(&mut conn, url, user_id)? {
            Some(row) => Ok(Some(Self::to_domain_model(&mut conn, row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), level = "debug")]
    fn get_by_id(&self, id: i32) -> Result<Option<Entry>, DomainError> {
        let mut conn = self.get_connection()?;

        let row = entries::table
            .filter(entries::id.eq(id))
            .select(DbEntry::as_select())
            .first::<DbEntry>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::Query)?;

        match row {
            Some(row) => Ok(Some(Self::to_domain_model(&mut conn, row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, level = "debug", fields(url = %entry.url, user_id = entry.user_id))]
    fn insert_or_get(&self, entry: &Entry) -> Result<UpsertOutcome, DomainError> {
        let mut conn = self.get_connection()?;
        let new_entry = Self::to_new_entry(entry);

        let outcome = conn.immediate_transaction::<_, SqliteRepositoryError, _>(|conn| {
            let inserted = diesel::insert_into(entries::table)
                .values(&new_entry)
                .on_conflict((entries::user_id, entries::url))
                .do_nothing()
                .execute(conn)?;

            let row = Self::find_row(conn, &entry.url, entry.user_id)?.ok_or_else(|| {
                SqliteRepositoryError::Inconsistent(format!(
                    "Entry vanished after insert: {}",
                    entry.url
                ))
            })?;

            if inserted == 0 {
                debug!("Entry already exists: id {}", row.id);
                return Ok(UpsertOutcome::Existing(Self::to_domain_model(conn, row)?));
            }

            Self::link_tags(conn, row.id, entry.user_id, &entry.tags)?;

            let mut created = entry.clone();
            created.set_id(row.id);
            debug!("Inserted entry: id {}", row.id);
            Ok(UpsertOutcome::Created(created))
        })?;

        Ok(outcome)
    }

    #[instrument(skip_all, level = "debug", fields(id = ?entry.id))]
    fn save(&self, entry: &Entry) -> Result<(), DomainError> {
        let id = entry.id.ok_or_else(|| {
            SqliteRepositoryError::Inconsistent("Entry has no ID".to_string())
        })?;
        let mut conn = self.get_connection()?;
        let changes = Self::to_changes(entry);

        conn.immediate_transaction::<_, SqliteRepositoryError, _>(|conn| {
            let updated = diesel::update(
                entries::table
                    .filter(entries::id.eq(id))
                    .filter(entries::user_id.eq(entry.user_id)),
            )
            .set(&changes)
            .execute(conn)?;

            if updated == 0 {
                return Err(SqliteRepositoryError::EntryNotFound(id));
            }

            Self::sync_tags(conn, id, entry.user_id, &entry.tags)
        })?;

        Ok(())
    }

    #[instrument(skip(self, tags), level = "debug")]
    fn merge_into(
        &self,
        entry_id: i32,
        user_id: i32,
        tags: &HashSet<Tag>,
        archive: bool,
    ) -> Result<Entry, DomainError> {
        let mut conn = self.get_connection()?;

        let merged = conn.immediate_transaction::<_, SqliteRepositoryError, _>(|conn| {
            let owned = entries::table
                .filter(entries::id.eq(entry_id))
                .filter(entries::user_id.eq(user_id));

            if !diesel::select(diesel::dsl::exists(owned.clone())).get_result::<bool>(conn)? {
                return Err(SqliteRepositoryError::EntryNotFound(entry_id));
            }

            let (_, linked) = Self::link_tags(conn, entry_id, user_id, tags)?;
            let archived = if archive {
                diesel::update(owned.clone().filter(entries::is_archived.eq(false)))
                    .set(entries::is_archived.eq(true))
                    .execute(conn)?
            } else {
                0
            };
            if linked + archived > 0 {
                diesel::update(owned.clone())
                    .set(entries::updated_at.eq(Utc::now().naive_utc()))
                    .execute(conn)?;
                debug!("Entry {}: {} new tag link(s), archived {}", entry_id, linked, archived > 0);
            }

            let row = owned.select(DbEntry::as_select()).first::<DbEntry>(conn)?;
            Self::to_domain_model(conn, row)
        })?;

        Ok(merged)
    }

    #[instrument(skip(self), level = "debug")]
    fn find_or_create_tag(&self, user_id: i32, tag: &Tag) -> Result<StoredTag, DomainError> {
        let mut conn = self.get_connection()?;
        let row = Self::find_or_create_tag_row(&mut conn, user_id, tag)?;

        Ok(StoredTag {
            id: row.id,
            user_id: row.user_id,
            tag: tag.clone(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    fn get_all_for_user(&self, user_id: i32) -> Result<Vec<Entry>, DomainError> {
        let mut conn = self.get_connection()?;

        let rows = entries::table
            .filter(entries::user_id.eq(user_id))
            .order(entries::id.asc())
            .select(DbEntry::as_select())
            .load::<DbEntry>(&mut conn)
            .map_err(SqliteRepositoryError::Query)?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(Self::to_domain_model(&mut conn, row)?);
        }
        Ok(result)
    }

    #[instrument(skip(self), level = "trace")]
    fn count_for_user(&self, user_id: i32) -> Result<usize, DomainError> {
        let mut conn = self.get_connection()?;

        let count: i64 = entries::table
            .filter(entries::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .map_err(SqliteRepositoryError::Query)?;

        Ok(count as usize)
    }
}
