use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use std::fmt;

use crate::infrastructure::repositories::sqlite::schema::{entries, entry_tags, internal_settings, tags};

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbEntry {
    pub id: i32,
    pub user_id: i32,
    pub url: String,
    pub title: String,
    pub mimetype: Option<String>,
    pub preview_picture: Option<String>,
    pub language: Option<String>,
    pub is_archived: bool,
    pub is_starred: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl fmt::Debug for DbEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, user_id: {}, url: {}, title: {}, mimetype: {:?}, language: {:?}, archived: {}",
            self.id,
            self.user_id,
            self.url,
            self.title,
            self.mimetype,
            self.language,
            self.is_archived
        )
    }
}

/// New entry for insertion
#[derive(Insertable, Debug)]
#[diesel(table_name = entries)]
pub struct NewEntry {
    pub user_id: i32,
    pub url: String,
    pub title: String,
    pub mimetype: Option<String>,
    pub preview_picture: Option<String>,
    pub language: Option<String>,
    pub is_archived: bool,
    pub is_starred: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changes for updating an entry; key columns are never rewritten
#[derive(AsChangeset, Debug)]
#[diesel(table_name = entries)]
#[diesel(treat_none_as_null = true)]
pub struct DbEntryChanges {
    pub title: String,
    pub mimetype: Option<String>,
    pub preview_picture: Option<String>,
    pub language: Option<String>,
    pub is_archived: bool,
    pub is_starred: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbTag {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tags)]
pub struct NewTag<'a> {
    pub user_id: i32,
    pub name: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = entry_tags)]
pub struct NewEntryTag {
    pub entry_id: i32,
    pub tag_id: i32,
}

#[derive(Queryable, Insertable, Debug)]
#[diesel(table_name = internal_settings)]
pub struct DbSetting {
    pub name: String,
    pub value: String,
}
