use crate::models::db_operations::view_counts_db_operations::VIEW_COUNTS;
use crate::models::db_operations::works_db_operations::{self, NewWork};
use crate::models::db_operations::{tags_db_operations, DbError};
use crate::models::rendering_config::{FontFamily, Spacing, TextSize};
use crate::models::{Language, RenderingConfig, WorkType};
use chrono::{TimeZone, Utc};
use redb::{CommitError, Database, StorageError, TableError, TransactionError};
use rusqlite::{Connection, Result as RusqliteResult, Transaction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            role TEXT NOT NULL CHECK(role IN ('admin', 'submitter')),
            password_hash TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login_time TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "authors",
        "CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_original TEXT,
            slug TEXT NOT NULL UNIQUE,
            birth_year INTEGER,
            death_year INTEGER,
            bio_en TEXT,
            bio_de TEXT,
            bio_ru TEXT,
            nationality TEXT,
            portrait_url TEXT,
            languages TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )",
    ),
    (
        "works",
        "CREATE TABLE IF NOT EXISTS works (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            work_type TEXT NOT NULL CHECK(work_type IN ('POEM', 'TALE', 'NOVEL')),
            language TEXT NOT NULL CHECK(language IN ('de', 'en', 'ru')),
            content TEXT,
            excerpt TEXT,
            rendering_config TEXT,
            published INTEGER NOT NULL DEFAULT 0,
            featured INTEGER NOT NULL DEFAULT 0,
            published_at TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "chapters",
        "CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            work_id TEXT NOT NULL REFERENCES works(id) ON DELETE CASCADE,
            chapter_order INTEGER NOT NULL CHECK(chapter_order >= 1),
            title TEXT,
            content TEXT NOT NULL,
            UNIQUE(work_id, chapter_order)
        )",
    ),
    (
        "tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            name_en TEXT NOT NULL,
            name_de TEXT NOT NULL,
            name_ru TEXT NOT NULL
        )",
    ),
    (
        "work_tags",
        "CREATE TABLE IF NOT EXISTS work_tags (
            work_id TEXT NOT NULL REFERENCES works(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (work_id, tag_id)
        )",
    ),
    (
        "submissions",
        "CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author_name TEXT NOT NULL,
            language TEXT NOT NULL CHECK(language IN ('de', 'en', 'ru')),
            work_type TEXT NOT NULL CHECK(work_type IN ('POEM', 'TALE', 'NOVEL')),
            content TEXT NOT NULL,
            chapters TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'PENDING' CHECK(status IN ('PENDING', 'APPROVED', 'REJECTED')),
            submitter_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            reviewed_at TEXT,
            approved_work_id TEXT REFERENCES works(id)
        )",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_works_published_at ON works(published, published_at)",
    "CREATE INDEX IF NOT EXISTS idx_works_author ON works(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_submissions_created_at ON submissions(created_at)",
];

/// slug, English, German, Russian.
const DEFAULT_TAGS: &[(&str, &str, &str, &str)] = &[
    ("love", "Love", "Liebe", "Любовь"),
    ("nature", "Nature", "Natur", "Природа"),
    ("death", "Death", "Tod", "Смерть"),
    ("war", "War", "Krieg", "Война"),
    ("faith", "Faith", "Glaube", "Вера"),
    ("city", "City", "Stadt", "Город"),
    ("childhood", "Childhood", "Kindheit", "Детство"),
    ("homeland", "Homeland", "Heimat", "Родина"),
    ("melancholy", "Melancholy", "Melancholie", "Меланхолия"),
    ("freedom", "Freedom", "Freiheit", "Свобода"),
];

pub fn setup_catalog_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    for (name, ddl) in SCHEMA {
        println!("- Creating '{}' table...", name);
        tx.execute(ddl, [])?;
    }
    for ddl in INDEXES {
        tx.execute(ddl, [])?;
    }

    seed_default_tags(&tx)?;

    tx.commit()?;
    Ok(())
}

fn seed_default_tags(tx: &Transaction) -> RusqliteResult<()> {
    println!("- Seeding default tag vocabulary...");
    let mut added = 0;
    for (slug, en, de, ru) in DEFAULT_TAGS {
        added += tx.execute(
            "INSERT OR IGNORE INTO tags (slug, name_en, name_de, name_ru) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![slug, en, de, ru],
        )?;
    }
    println!("  > {} of {} default tags added", added, DEFAULT_TAGS.len());
    Ok(())
}

pub fn setup_view_counts_db(db: &Database) -> Result<(), SetupError> {
    let write_txn = db.begin_write()?;
    {
        println!("- Creating 'view_counts' table in Redb...");
        write_txn.open_table(VIEW_COUNTS)?;
    }
    write_txn.commit()?;
    Ok(())
}

const DEMO_AUTHOR_SLUG: &str = "franz-kafka";
const DEMO_WORK_SLUG: &str = "die-verwandlung";

const DEMO_CHAPTERS: &[(&str, &str)] = &[
    (
        "Erstes Kapitel",
        "Als Gregor Samsa eines Morgens aus unruhigen Träumen erwachte, fand er sich in seinem Bett zu einem ungeheueren Ungeziefer verwandelt. Er lag auf seinem panzerartig harten Rücken und sah, wenn er den Kopf ein wenig hob, seinen gewölbten, braunen, von bogenförmigen Versteifungen geteilten Bauch.\n\n»Was ist mit mir geschehen?« dachte er. Es war kein Traum. Sein Zimmer, ein richtiges, nur etwas zu kleines Menschenzimmer, lag ruhig zwischen den vier wohlbekannten Wänden.",
    ),
    (
        "Zweites Kapitel",
        "Erst in der Abenddämmerung erwachte Gregor aus seinem schweren ohnmachtähnlichen Schlaf. Er wäre gewiß nicht viel später auch ohne Störung erwacht, denn er fühlte sich genügend ausgeruht und ausgeschlafen.\n\nErst bei der Tür merkte er, was ihn eigentlich dorthin gelockt hatte; es war der Geruch von etwas Eßbarem gewesen.",
    ),
    (
        "Drittes Kapitel",
        "Die schwere Verwundung Gregors, an der er über einen Monat litt, schien selbst dem Vater daran erinnert zu haben, daß Gregor trotz seiner gegenwärtigen traurigen und ekelhaften Gestalt ein Familienmitglied war.\n\nUnd wenn nun auch Gregor durch seine Wunde an Beweglichkeit wahrscheinlich für immer eingebüßt hatte, so bekam er für diese Verschlechterung seines Zustandes einen vollständig genügenden Ersatz.",
    ),
];

/// Seeds a demo author and a three-chapter novel. Re-running replaces the novel.
pub fn seed_demo_content(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;

    let author_id = match works_db_operations::read_author_by_slug(&tx, DEMO_AUTHOR_SLUG)? {
        Some(author) => author.id,
        None => {
            println!("- Creating demo author 'Franz Kafka'...");
            let id = works_db_operations::insert_author(&tx, "Franz Kafka", DEMO_AUTHOR_SLUG, &[Language::De])?;
            works_db_operations::update_author_profile(
                &tx,
                &id,
                Some(1883),
                Some(1924),
                Some("Franz Kafka was a German-speaking Bohemian novelist and short-story writer, widely regarded as one of the major figures of 20th-century literature."),
                Some("Franz Kafka war ein deutschsprachiger Schriftsteller. Seine Erzählungen sowie die Romane Der Process, Das Schloss und Der Verschollene zählen zur Weltliteratur."),
            )?;
            id
        }
    };

    if works_db_operations::delete_work_by_slug(&tx, DEMO_WORK_SLUG)? > 0 {
        println!("- Removed previous demo novel");
    }

    println!("- Creating demo novel 'Die Verwandlung'...");
    let novel = NewWork {
        author_id,
        title: "Die Verwandlung".to_string(),
        work_type: WorkType::Novel,
        language: Language::De,
        content: None,
        excerpt: Some(
            "Als Gregor Samsa eines Morgens aus unruhigen Träumen erwachte, fand er sich in seinem Bett zu einem ungeheueren Ungeziefer verwandelt.".to_string(),
        ),
        rendering_config: Some(RenderingConfig {
            font_family: Some(FontFamily::Playfair),
            font_size: Some(TextSize::Lg),
            line_height: Some(Spacing::Relaxed),
            drop_cap: Some(true),
            paragraph_spacing: Some(Spacing::Relaxed),
            ..Default::default()
        }),
        published_at: Utc.with_ymd_and_hms(1915, 10, 1, 0, 0, 0).single(),
    };
    let work_id = works_db_operations::insert_work(&tx, &novel, DEMO_WORK_SLUG)?;

    for (index, (title, content)) in DEMO_CHAPTERS.iter().enumerate() {
        works_db_operations::insert_chapter(&tx, &work_id, index as i64 + 1, Some(*title), content)?;
    }
    tags_db_operations::link_work_tags(&tx, &work_id, &["melancholy".to_string()])?;

    tx.commit()?;
    Ok(())
}
