use crate::models::db_operations::DbError;
use crate::models::{
    ChapterInput, Language, Submission, SubmissionStatus, SubmissionWithSubmitter, SubmitterContact, WorkType,
};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// A validated submission ready to be stored as PENDING.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub title: String,
    pub author_name: String,
    pub language: Language,
    pub work_type: WorkType,
    pub content: String,
    pub chapters: Option<Vec<ChapterInput>>,
    pub tags: Vec<String>,
    pub submitter_id: i64,
}

const SUBMISSION_COLUMNS: &str = "s.id, s.title, s.author_name, s.language, s.work_type, s.content, s.chapters, \
     s.tags, s.status, s.submitter_id, s.created_at, s.reviewed_at, s.approved_work_id";

fn json_column<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_submission(row: &Row) -> rusqlite::Result<Submission> {
    let chapters_json: Option<String> = row.get(6)?;
    let tags_json: String = row.get(7)?;

    Ok(Submission {
        id: row.get(0)?,
        title: row.get(1)?,
        author_name: row.get(2)?,
        language: row.get(3)?,
        work_type: row.get(4)?,
        content: row.get(5)?,
        chapters: chapters_json.map(|raw| json_column(6, &raw)).transpose()?,
        tags: json_column(7, &tags_json)?,
        status: row.get(8)?,
        submitter_id: row.get(9)?,
        created_at: row.get(10)?,
        reviewed_at: row.get(11)?,
        approved_work_id: row.get(12)?,
    })
}

pub fn insert_submission(conn: &Connection, new: &NewSubmission) -> Result<String, DbError> {
    let id = Uuid::new_v4().to_string();
    let chapters_json = new.chapters.as_ref().map(serde_json::to_string).transpose()?;
    let tags_json = serde_json::to_string(&new.tags)?;

    conn.execute(
        "INSERT INTO submissions
            (id, title, author_name, language, work_type, content, chapters, tags, status, submitter_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'PENDING', ?9, ?10)",
        params![
            id,
            new.title,
            new.author_name,
            new.language,
            new.work_type,
            new.content,
            chapters_json,
            tags_json,
            new.submitter_id,
            Utc::now(),
        ],
    )?;
    Ok(id)
}

pub fn read_submission(conn: &Connection, id: &str) -> Result<Option<Submission>, DbError> {
    let sql = format!("SELECT {} FROM submissions s WHERE s.id = ?1", SUBMISSION_COLUMNS);
    Ok(conn.query_row(&sql, [id], row_to_submission).optional()?)
}

/// Every submission, newest first, with the submitter's contact details.
pub fn read_all_submissions(conn: &Connection) -> Result<Vec<SubmissionWithSubmitter>, DbError> {
    let sql = format!(
        "SELECT {}, u.email, u.name
         FROM submissions s JOIN users u ON u.id = s.submitter_id
         ORDER BY s.created_at DESC, s.rowid DESC",
        SUBMISSION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let submissions = stmt
        .query_map([], |row| {
            Ok(SubmissionWithSubmitter {
                submission: row_to_submission(row)?,
                submitter: SubmitterContact {
                    email: row.get(13)?,
                    name: row.get(14)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(submissions)
}

/// Moves a PENDING submission to its final status. The `status = 'PENDING'` guard
/// makes this a compare-and-set: returns false when the submission had already
/// left PENDING (or does not exist), and nothing is written in that case.
pub fn mark_reviewed(
    conn: &Connection,
    id: &str,
    status: SubmissionStatus,
    approved_work_id: Option<&str>,
) -> Result<bool, DbError> {
    let changed = conn.execute(
        "UPDATE submissions
         SET status = ?1, reviewed_at = ?2, approved_work_id = ?3
         WHERE id = ?4 AND status = 'PENDING'",
        params![status, Utc::now(), approved_work_id, id],
    )?;
    Ok(changed == 1)
}
