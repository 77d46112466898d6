use crate::models::db_operations::DbError;
use crate::models::Tag;
use rusqlite::{params, Connection, Row};

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        slug: row.get(0)?,
        name_en: row.get(1)?,
        name_de: row.get(2)?,
        name_ru: row.get(3)?,
    })
}

/// The full tag vocabulary, ordered by slug.
pub fn read_all_tags(conn: &Connection) -> Result<Vec<Tag>, DbError> {
    let mut stmt = conn.prepare("SELECT slug, name_en, name_de, name_ru FROM tags ORDER BY slug ASC")?;
    let tags = stmt.query_map([], row_to_tag)?.collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

pub fn insert_tag(conn: &Connection, tag: &Tag) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO tags (slug, name_en, name_de, name_ru) VALUES (?1, ?2, ?3, ?4)",
        params![tag.slug, tag.name_en, tag.name_de, tag.name_ru],
    )?;
    Ok(())
}

pub fn read_tags_for_work(conn: &Connection, work_id: &str) -> Result<Vec<Tag>, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.slug, t.name_en, t.name_de, t.name_ru
         FROM work_tags wt JOIN tags t ON t.id = wt.tag_id
         WHERE wt.work_id = ?1
         ORDER BY t.slug ASC",
    )?;
    let tags = stmt.query_map([work_id], row_to_tag)?.collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Links a work to every slug that exists in the vocabulary; unknown slugs are skipped.
/// Returns how many links were created.
pub fn link_work_tags(conn: &Connection, work_id: &str, slugs: &[String]) -> Result<usize, DbError> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO work_tags (work_id, tag_id) SELECT ?1, id FROM tags WHERE slug = ?2",
    )?;
    let mut linked = 0;
    for slug in slugs {
        linked += stmt.execute(params![work_id, slug])?;
    }
    Ok(linked)
}
