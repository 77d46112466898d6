use crate::models::db_operations::{tags_db_operations, DbError};
use crate::models::{
    Author, AuthorRef, Chapter, Language, RenderingConfig, WorkDetail, WorkSummary, WorkType,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewWork {
    pub author_id: String,
    pub title: String,
    pub work_type: WorkType,
    pub language: Language,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub rendering_config: Option<RenderingConfig>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Filters for the public catalogue. `limit: None` means no cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogFilter {
    pub featured_only: bool,
    pub language: Option<Language>,
    pub work_type: Option<WorkType>,
    pub limit: Option<u32>,
}

// --- Authors ---

const AUTHOR_COLUMNS: &str = "id, name, name_original, slug, birth_year, death_year, bio_en, bio_de, bio_ru, \
     nationality, portrait_url, languages";

fn row_to_author(row: &Row) -> rusqlite::Result<Author> {
    let languages_json: String = row.get(11)?;
    let languages = serde_json::from_str(&languages_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;

    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        name_original: row.get(2)?,
        slug: row.get(3)?,
        birth_year: row.get(4)?,
        death_year: row.get(5)?,
        bio_en: row.get(6)?,
        bio_de: row.get(7)?,
        bio_ru: row.get(8)?,
        nationality: row.get(9)?,
        portrait_url: row.get(10)?,
        languages,
    })
}

/// Exact-name lookup; name variants are deliberately not merged.
pub fn find_author_id_by_name(conn: &Connection, name: &str) -> Result<Option<String>, DbError> {
    Ok(conn
        .query_row("SELECT id FROM authors WHERE name = ?1 ORDER BY created_at LIMIT 1", [name], |row| row.get(0))
        .optional()?)
}

/// Inserts a bare author under `slug`. A taken slug surfaces as a unique violation.
pub fn insert_author(conn: &Connection, name: &str, slug: &str, languages: &[Language]) -> Result<String, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO authors (id, name, slug, languages, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, slug, serde_json::to_string(languages)?, Utc::now()],
    )?;
    Ok(id)
}

pub fn update_author_profile(
    conn: &Connection,
    author_id: &str,
    birth_year: Option<i32>,
    death_year: Option<i32>,
    bio_en: Option<&str>,
    bio_de: Option<&str>,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE authors SET birth_year = ?1, death_year = ?2, bio_en = ?3, bio_de = ?4 WHERE id = ?5",
        params![birth_year, death_year, bio_en, bio_de, author_id],
    )?;
    Ok(())
}

pub fn read_author_by_slug(conn: &Connection, slug: &str) -> Result<Option<Author>, DbError> {
    let sql = format!("SELECT {} FROM authors WHERE slug = ?1", AUTHOR_COLUMNS);
    Ok(conn.query_row(&sql, [slug], row_to_author).optional()?)
}

pub fn read_all_authors(conn: &Connection) -> Result<Vec<Author>, DbError> {
    let sql = format!("SELECT {} FROM authors ORDER BY name ASC", AUTHOR_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let authors = stmt.query_map([], row_to_author)?.collect::<Result<Vec<_>, _>>()?;
    Ok(authors)
}

// --- Works and chapters ---

/// Inserts a published work under `slug`. A taken slug surfaces as a unique violation.
pub fn insert_work(conn: &Connection, new: &NewWork, slug: &str) -> Result<String, DbError> {
    let id = Uuid::new_v4().to_string();
    let config_json = new.rendering_config.as_ref().map(RenderingConfig::to_json).transpose()?;

    conn.execute(
        "INSERT INTO works
            (id, author_id, title, slug, work_type, language, content, excerpt, rendering_config,
             published, featured, published_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, 0, ?10, ?11)",
        params![
            id,
            new.author_id,
            new.title,
            slug,
            new.work_type,
            new.language,
            new.content,
            new.excerpt,
            config_json,
            new.published_at.unwrap_or_else(Utc::now),
            Utc::now(),
        ],
    )?;
    Ok(id)
}

pub fn insert_chapter(
    conn: &Connection,
    work_id: &str,
    order: i64,
    title: Option<&str>,
    content: &str,
) -> Result<String, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO chapters (id, work_id, chapter_order, title, content) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, work_id, order, title, content],
    )?;
    Ok(id)
}

pub fn read_chapters(conn: &Connection, work_id: &str) -> Result<Vec<Chapter>, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, chapter_order, title, content FROM chapters WHERE work_id = ?1 ORDER BY chapter_order ASC",
    )?;
    let chapters = stmt
        .query_map([work_id], |row| {
            Ok(Chapter {
                id: row.get(0)?,
                order: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(chapters)
}

const SUMMARY_COLUMNS: &str = "w.id, w.slug, w.title, w.work_type, w.language, w.content, w.excerpt, w.featured, \
     w.published_at, a.name, a.slug";

fn row_to_summary(row: &Row) -> rusqlite::Result<WorkSummary> {
    Ok(WorkSummary {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        work_type: row.get(3)?,
        language: row.get(4)?,
        content: row.get(5)?,
        excerpt: row.get(6)?,
        featured: row.get(7)?,
        published_at: row.get(8)?,
        view_count: 0,
        author: AuthorRef {
            name: row.get(9)?,
            slug: row.get(10)?,
        },
        tags: Vec::new(),
    })
}

fn attach_tags(conn: &Connection, mut works: Vec<WorkSummary>) -> Result<Vec<WorkSummary>, DbError> {
    for work in works.iter_mut() {
        work.tags = tags_db_operations::read_tags_for_work(conn, &work.id)?;
    }
    Ok(works)
}

/// Published works, newest publication first. View counts are left at zero
/// for the caller to fill in from the counter store.
pub fn read_published_summaries(conn: &Connection, filter: &CatalogFilter) -> Result<Vec<WorkSummary>, DbError> {
    let sql = format!(
        "SELECT {}
         FROM works w JOIN authors a ON a.id = w.author_id
         WHERE w.published = 1
           AND (?1 = 0 OR w.featured = 1)
           AND (?2 IS NULL OR w.language = ?2)
           AND (?3 IS NULL OR w.work_type = ?3)
         ORDER BY w.published_at DESC, w.rowid DESC
         LIMIT ?4",
        SUMMARY_COLUMNS
    );
    // SQLite reads a negative LIMIT as "no limit".
    let limit: i64 = filter.limit.map(i64::from).unwrap_or(-1);

    let mut stmt = conn.prepare(&sql)?;
    let works = stmt
        .query_map(
            params![filter.featured_only, filter.language, filter.work_type, limit],
            row_to_summary,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    attach_tags(conn, works)
}

pub fn read_published_summaries_by_author(conn: &Connection, author_id: &str) -> Result<Vec<WorkSummary>, DbError> {
    let sql = format!(
        "SELECT {}
         FROM works w JOIN authors a ON a.id = w.author_id
         WHERE w.published = 1 AND w.author_id = ?1
         ORDER BY w.published_at DESC, w.rowid DESC",
        SUMMARY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let works = stmt.query_map([author_id], row_to_summary)?.collect::<Result<Vec<_>, _>>()?;
    attach_tags(conn, works)
}

/// Full work by slug, whether published or not; the caller decides visibility.
pub fn read_work_by_slug(conn: &Connection, slug: &str) -> Result<Option<WorkDetail>, DbError> {
    let sql = format!(
        "SELECT {}, w.rendering_config, w.published
         FROM works w JOIN authors a ON a.id = w.author_id
         WHERE w.slug = ?1",
        SUMMARY_COLUMNS
    );
    let found = conn
        .query_row(&sql, [slug], |row| {
            let summary = row_to_summary(row)?;
            let config_json: Option<String> = row.get(11)?;
            let published: bool = row.get(12)?;
            Ok((summary, config_json, published))
        })
        .optional()?;

    let Some((mut summary, config_json, published)) = found else {
        return Ok(None);
    };

    summary.tags = tags_db_operations::read_tags_for_work(conn, &summary.id)?;
    let chapters = read_chapters(conn, &summary.id)?;

    Ok(Some(WorkDetail {
        rendering_config: config_json.as_deref().and_then(RenderingConfig::from_stored),
        published,
        chapters,
        summary,
    }))
}

pub fn read_published_work_id(conn: &Connection, slug: &str) -> Result<Option<String>, DbError> {
    Ok(conn
        .query_row("SELECT id FROM works WHERE slug = ?1 AND published = 1", [slug], |row| row.get(0))
        .optional()?)
}

/// Returns false when no work has that slug.
pub fn set_featured(conn: &Connection, slug: &str, featured: bool) -> Result<bool, DbError> {
    let changed = conn.execute("UPDATE works SET featured = ?1 WHERE slug = ?2", params![featured, slug])?;
    Ok(changed == 1)
}

pub fn delete_work_by_slug(conn: &Connection, slug: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM works WHERE slug = ?1", [slug])?)
}
