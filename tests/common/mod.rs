#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use inkwell_backend::helper::slug_helpers::slugify;
use inkwell_backend::helper::submission_helpers::{self, SubmissionRequest};
use inkwell_backend::models::db_operations::works_db_operations::{self, NewWork};
use inkwell_backend::models::db_operations::open_catalog_pool;
use inkwell_backend::models::{Language, WorkType};
use inkwell_backend::setup::db_setup;
use inkwell_backend::DbPool;
use redb::Database;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

/// A catalogue and a view counter store in a throwaway directory.
pub struct TestStore {
    pub dir: TempDir,
    pub pool: DbPool,
    pub views: Database,
}

pub fn store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();

    let catalog_path = dir.path().join("catalog.db");
    let mut conn = Connection::open(&catalog_path).unwrap();
    db_setup::setup_catalog_db(&mut conn).unwrap();
    drop(conn);

    let views = Database::create(dir.path().join("views.redb")).unwrap();
    db_setup::setup_view_counts_db(&views).unwrap();

    let pool = open_catalog_pool(&catalog_path).unwrap();
    TestStore { dir, pool, views }
}

pub fn submit(pool: &DbPool, body: Value) -> String {
    let request: SubmissionRequest = serde_json::from_value(body).unwrap();
    submission_helpers::submit(pool, request).unwrap()
}

pub fn poem_body(title: &str, author: &str, content: &str) -> Value {
    serde_json::json!({
        "title": title,
        "authorName": author,
        "language": "en",
        "type": "POEM",
        "content": content,
        "submitterEmail": "poet@example.org",
    })
}

pub fn work_slug(pool: &DbPool, work_id: &str) -> String {
    let conn = pool.get().unwrap();
    conn.query_row("SELECT slug FROM works WHERE id = ?1", [work_id], |row| row.get(0))
        .unwrap()
}

pub fn count_rows(pool: &DbPool, table: &str) -> i64 {
    let conn = pool.get().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Inserts a published work directly, bypassing the submission flow. Returns its slug.
pub fn publish(
    pool: &DbPool,
    author: &str,
    title: &str,
    work_type: WorkType,
    language: Language,
    published_at: DateTime<Utc>,
) -> String {
    let conn = pool.get().unwrap();
    let author_id = match works_db_operations::find_author_id_by_name(&conn, author).unwrap() {
        Some(id) => id,
        None => works_db_operations::insert_author(&conn, author, &slugify(author, "author"), &[language]).unwrap(),
    };
    let slug = slugify(title, "work");
    let new_work = NewWork {
        author_id,
        title: title.to_string(),
        work_type,
        language,
        content: Some(format!("{} text", title)),
        excerpt: Some(format!("{} text...", title)),
        rendering_config: None,
        published_at: Some(published_at),
    };
    works_db_operations::insert_work(&conn, &new_work, &slug).unwrap();
    slug
}
