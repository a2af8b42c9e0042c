// src/domain/entry.rs
use crate::domain::enrichment::EntryMetadata;
use crate::domain::error::DomainResult;
use crate::domain::import::{ImportOptions, RawImportRecord};
use crate::domain::tag::Tag;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use std::collections::HashSet;
use std::fmt;

/// A saved article of one user, unique per (user_id, url)
#[derive(Builder, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Entry {
    #[builder(default)]
    pub id: Option<i32>,
    pub user_id: i32,
    pub url: String,
    #[builder(default)]
    pub title: String,
    #[builder(default)]
    pub mimetype: Option<String>,
    #[builder(default)]
    pub preview_picture: Option<String>,
    #[builder(default)]
    pub language: Option<String>,
    #[builder(default)]
    pub tags: HashSet<Tag>,
    #[builder(default = "false")]
    pub is_archived: bool,
    #[builder(default = "false")]
    pub is_starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Build a fresh entry from an imported record and whatever metadata could be fetched.
    ///
    /// Title falls back from the export to the fetched page title to the URL.
    pub fn from_import(
        user_id: i32,
        record: &RawImportRecord,
        metadata: EntryMetadata,
        options: &ImportOptions,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        let title = if !record.title.is_empty() {
            record.title.clone()
        } else {
            metadata
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| record.url.clone())
        };

        let entry = EntryBuilder::default()
            .user_id(user_id)
            .url(record.url.clone())
            .title(title)
            .mimetype(metadata.mimetype)
            .preview_picture(metadata.preview_picture)
            .language(metadata.language)
            .tags(record.tags.clone())
            .is_archived(record.is_read || options.mark_as_read)
            .is_starred(record.is_starred)
            .created_at(record.created_at.unwrap_or(now))
            .updated_at(now)
            .build()?;
        Ok(entry)
    }

    /// Union the given tags into the entry. Returns true if any tag was new.
    pub fn merge_tags(&mut self, tags: &HashSet<Tag>) -> bool {
        let before = self.tags.len();
        self.tags.extend(tags.iter().cloned());
        let changed = self.tags.len() != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Returns true if the flag changed
    pub fn archive(&mut self) -> bool {
        if self.is_archived {
            return false;
        }
        self.is_archived = true;
        self.updated_at = Utc::now();
        true
    }

    /// Apply a re-import of the same URL: tags are merged, metadata stays untouched.
    pub fn merge_import(&mut self, record: &RawImportRecord, options: &ImportOptions) -> bool {
        let tags_changed = self.merge_tags(&record.tags);
        let archived = options.mark_as_read && self.archive();
        tags_changed || archived
    }

    pub fn formatted_tags(&self) -> String {
        Tag::format_tags(&self.tags)
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = Some(id);
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("url", &self.url)
            .field("title", &self.title)
            .field("tags", &self.formatted_tags())
            .field("is_archived", &self.is_archived)
            .finish()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} <{}> [{}]",
            self.id.unwrap_or(0),
            self.title,
            self.url,
            self.formatted_tags()
        )
    }
}
