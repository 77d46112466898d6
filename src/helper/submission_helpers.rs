//! Submission lifecycle: intake, review listing, and the PENDING -> APPROVED |
//! REJECTED transitions, including publication of the approved work.

use crate::helper::sanitization_helpers::strip_all_html;
use crate::helper::slug_helpers::{insert_with_unique_slug, slugify};
use crate::helper::tag_helpers::normalize_tag_list;
use crate::models::db_operations::submissions_db_operations::{self, NewSubmission};
use crate::models::db_operations::works_db_operations::{self, NewWork};
use crate::models::db_operations::{tags_db_operations, users_db_operations, DbError};
use crate::models::{
    ChapterInput, Language, RenderingConfig, Submission, SubmissionStatus, SubmissionWithSubmitter, WorkType,
};
use crate::DbPool;
use chrono::Utc;
use rusqlite::TransactionBehavior;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

const EXCERPT_CHARS: usize = 300;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("Submission not found")]
    NotFound,
    #[error("Submission already processed")]
    AlreadyProcessed,
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<rusqlite::Error> for SubmissionError {
    fn from(e: rusqlite::Error) -> Self {
        SubmissionError::Persistence(DbError::from(e))
    }
}

impl From<r2d2::Error> for SubmissionError {
    fn from(e: r2d2::Error) -> Self {
        SubmissionError::Persistence(DbError::from(e))
    }
}

fn deserialize_tag_input<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    match Option::<StringOrVec>::deserialize(deserializer)? {
        Some(StringOrVec::String(s)) => Ok(s.split(',').map(str::to_string).collect()),
        Some(StringOrVec::Vec(v)) => Ok(v),
        None => Ok(Vec::new()),
    }
}

/// Body of the public submission form. Everything is optional here so that
/// missing fields become validation errors naming the field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub title: Option<String>,
    #[serde(alias = "author")]
    pub author_name: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub content: Option<String>,
    pub chapters: Option<Vec<ChapterInput>>,
    #[serde(alias = "email")]
    pub submitter_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tag_input")]
    pub tags: Vec<String>,
}

/// A request that passed validation. Tags are still raw tokens at this point.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub title: String,
    pub author_name: String,
    pub language: Language,
    pub work_type: WorkType,
    pub content: String,
    pub chapters: Option<Vec<ChapterInput>>,
    pub submitter_email: String,
    pub raw_tags: Vec<String>,
}

fn required(field: &str, value: Option<&str>) -> Result<String, SubmissionError> {
    match value.map(strip_all_html) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SubmissionError::Validation(format!("{} is required", field))),
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.trim().is_empty())
}

pub fn validate_submission(request: SubmissionRequest) -> Result<ValidSubmission, SubmissionError> {
    let title = required("title", request.title.as_deref())?;
    let author_name = required("authorName", request.author_name.as_deref())?;

    // Codes are matched exactly; "DE" or " de" is not a language code.
    let language = match request.language.as_deref() {
        None => return Err(SubmissionError::Validation("language is required".into())),
        Some(raw) if raw.trim().is_empty() => return Err(SubmissionError::Validation("language is required".into())),
        Some(raw) => Language::ALL
            .into_iter()
            .find(|language| language.as_str() == raw)
            .ok_or_else(|| SubmissionError::Validation("language must be one of de, en, ru".into()))?,
    };

    let work_type = match request.work_type.as_deref().map(str::trim) {
        None | Some("") => WorkType::Poem,
        Some(raw) => raw
            .parse::<WorkType>()
            .map_err(|_| SubmissionError::Validation("type must be one of POEM, TALE, NOVEL".into()))?,
    };

    let submitter_email = request
        .submitter_email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| SubmissionError::Validation("submitterEmail is required".into()))?;
    if !submitter_email.contains('@') || submitter_email.chars().any(char::is_whitespace) {
        return Err(SubmissionError::Validation("submitterEmail is not a valid address".into()));
    }

    let chapters = request.chapters.filter(|c| !c.is_empty());
    match work_type {
        WorkType::Novel => {
            let any_text = chapters
                .as_ref()
                .map_or(false, |list| list.iter().any(|c| has_text(c.content.as_deref())));
            if !any_text {
                return Err(SubmissionError::Validation(
                    "chapters must contain at least one chapter with content".into(),
                ));
            }
        }
        _ => {
            if chapters.is_some() {
                return Err(SubmissionError::Validation("chapters are only accepted for NOVEL".into()));
            }
            if !has_text(request.content.as_deref()) {
                return Err(SubmissionError::Validation("content is required".into()));
            }
        }
    }

    Ok(ValidSubmission {
        title,
        author_name,
        language,
        work_type,
        content: request.content.unwrap_or_default(),
        chapters,
        submitter_email,
        raw_tags: request.tags,
    })
}

/// Validates and stores a submission as PENDING. Returns its id.
pub fn submit(pool: &DbPool, request: SubmissionRequest) -> Result<String, SubmissionError> {
    let valid = validate_submission(request)?;

    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let vocabulary = tags_db_operations::read_all_tags(&tx)?;
    let tags = normalize_tag_list(&valid.raw_tags, &vocabulary);

    let submitter_id = users_db_operations::get_or_create_submitter(&tx, &valid.submitter_email)?;
    let id = submissions_db_operations::insert_submission(
        &tx,
        &NewSubmission {
            title: valid.title,
            author_name: valid.author_name,
            language: valid.language,
            work_type: valid.work_type,
            content: valid.content,
            chapters: valid.chapters,
            tags,
            submitter_id,
        },
    )?;
    tx.commit()?;

    log::info!("Submission created: {}", id);
    Ok(id)
}

pub fn list_submissions(pool: &DbPool) -> Result<Vec<SubmissionWithSubmitter>, SubmissionError> {
    let conn = pool.get()?;
    Ok(submissions_db_operations::read_all_submissions(&conn)?)
}

/// First `EXCERPT_CHARS` characters plus an ellipsis; `None` for empty text.
pub fn excerpt_of(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    Some(format!("{}...", head))
}

/// Stored content and excerpt for the work published from `submission`.
/// Novels with chapters keep their text in the chapters only.
fn derive_content(submission: &Submission) -> (Option<String>, Option<String>) {
    match (&submission.work_type, &submission.chapters) {
        (WorkType::Novel, Some(chapters)) if !chapters.is_empty() => {
            let first = chapters[0].content.as_deref().unwrap_or("");
            (None, excerpt_of(first))
        }
        _ => (Some(submission.content.clone()), excerpt_of(&submission.content)),
    }
}

/// Publishes a PENDING submission. Author, work, chapters, tag links and the
/// status change are committed together or not at all. The write lock is taken
/// before the status is read, so of two concurrent approvals exactly one sees
/// PENDING.
pub fn approve_submission(
    pool: &DbPool,
    submission_id: &str,
    rendering_config: Option<RenderingConfig>,
) -> Result<String, SubmissionError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let submission =
        submissions_db_operations::read_submission(&tx, submission_id)?.ok_or(SubmissionError::NotFound)?;
    if submission.status != SubmissionStatus::Pending {
        return Err(SubmissionError::AlreadyProcessed);
    }

    let author_id = match works_db_operations::find_author_id_by_name(&tx, &submission.author_name)? {
        Some(id) => id,
        None => {
            let base = slugify(&submission.author_name, "author");
            let (id, slug) = insert_with_unique_slug(&base, |slug| {
                works_db_operations::insert_author(&tx, &submission.author_name, slug, &[submission.language])
            })?;
            log::info!("Author created: {} ({})", submission.author_name, slug);
            id
        }
    };

    let (content, excerpt) = derive_content(&submission);
    let new_work = NewWork {
        author_id,
        title: submission.title.clone(),
        work_type: submission.work_type,
        language: submission.language,
        content,
        excerpt,
        rendering_config,
        published_at: Some(Utc::now()),
    };
    let base = slugify(&submission.title, "work");
    let (work_id, work_slug) =
        insert_with_unique_slug(&base, |slug| works_db_operations::insert_work(&tx, &new_work, slug))?;

    if submission.work_type == WorkType::Novel {
        for (index, chapter) in submission.chapters.iter().flatten().enumerate() {
            let order = index as i64 + 1;
            let fallback = format!("Chapter {}", order);
            let title = chapter.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(fallback.as_str());
            let content = chapter.content.as_deref().unwrap_or("");
            works_db_operations::insert_chapter(&tx, &work_id, order, Some(title), content)?;
        }
    }

    tags_db_operations::link_work_tags(&tx, &work_id, &submission.tags)?;

    if !submissions_db_operations::mark_reviewed(&tx, submission_id, SubmissionStatus::Approved, Some(&work_id))? {
        // Dropping the transaction rolls back everything above.
        return Err(SubmissionError::AlreadyProcessed);
    }
    tx.commit()?;

    log::info!("Work published: {} ({}) from submission {}", work_slug, work_id, submission_id);
    Ok(work_id)
}

pub fn reject_submission(pool: &DbPool, submission_id: &str) -> Result<(), SubmissionError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let submission =
        submissions_db_operations::read_submission(&tx, submission_id)?.ok_or(SubmissionError::NotFound)?;
    if submission.status != SubmissionStatus::Pending
        || !submissions_db_operations::mark_reviewed(&tx, submission_id, SubmissionStatus::Rejected, None)?
    {
        return Err(SubmissionError::AlreadyProcessed);
    }
    tx.commit()?;

    log::info!("Submission rejected: {}", submission_id);
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub submission_id: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub rendering_config: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Decision {
    Approved {
        #[serde(rename = "workId")]
        work_id: String,
    },
    Rejected,
}

/// Applies an admin decision. Input is fully validated before storage is touched.
pub fn decide_submission(pool: &DbPool, request: DecisionRequest) -> Result<Decision, SubmissionError> {
    let submission_id = request
        .submission_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SubmissionError::Validation("submissionId is required".into()))?;

    match request.action.as_deref() {
        Some("approve") => {
            let config = match request.rendering_config.as_ref() {
                None | Some(Value::Null) => None,
                Some(value) => Some(RenderingConfig::from_admin_input(value).map_err(SubmissionError::Validation)?),
            };
            let work_id = approve_submission(pool, submission_id, config)?;
            Ok(Decision::Approved { work_id })
        }
        Some("reject") => {
            reject_submission(pool, submission_id)?;
            Ok(Decision::Rejected)
        }
        _ => Err(SubmissionError::Validation("action must be 'approve' or 'reject'".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> SubmissionRequest {
        serde_json::from_value(value).unwrap()
    }

    fn validation_message(result: Result<ValidSubmission, SubmissionError>) -> String {
        match result {
            Err(SubmissionError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_minimal_poem_and_defaults_type() {
        let valid = validate_submission(request(json!({
            "title": "<i>Herbsttag</i>",
            "author": "Rainer Maria Rilke",
            "language": "de",
            "content": "Herr: es ist Zeit.",
            "email": " Reader@Example.org ",
            "tags": "Autumn, nature"
        })))
        .unwrap();

        assert_eq!(valid.title, "Herbsttag");
        assert_eq!(valid.language, Language::De);
        assert_eq!(valid.work_type, WorkType::Poem);
        assert_eq!(valid.submitter_email, "reader@example.org");
        assert_eq!(valid.raw_tags, vec!["Autumn", " nature"]);
    }

    #[test]
    fn missing_fields_are_named() {
        let msg = validation_message(validate_submission(request(json!({
            "authorName": "A", "language": "en", "content": "x", "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("title"));

        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "content": "x", "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("language"));

        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "en", "content": "x"
        }))));
        assert!(msg.contains("submitterEmail"));
    }

    #[test]
    fn unsupported_language_is_rejected() {
        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "fr", "content": "x", "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("language"));
    }

    #[test]
    fn language_code_must_match_exactly() {
        for code in ["DE", "En", " ru"] {
            let msg = validation_message(validate_submission(request(json!({
                "title": "T", "authorName": "A", "language": code, "content": "x", "submitterEmail": "a@b.c"
            }))));
            assert_eq!(msg, "language must be one of de, en, ru", "{:?}", code);
        }
    }

    #[test]
    fn novel_needs_a_chapter_with_text() {
        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "ru", "type": "NOVEL",
            "chapters": [{"title": "One", "content": "   "}], "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("chapters"));

        let valid = validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "ru", "type": "NOVEL",
            "chapters": [{"title": "", "content": "Text"}], "submitterEmail": "a@b.c"
        })))
        .unwrap();
        assert_eq!(valid.content, "");
        assert_eq!(valid.chapters.unwrap().len(), 1);
    }

    #[test]
    fn chapters_on_a_tale_are_rejected() {
        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "en", "type": "TALE", "content": "x",
            "chapters": [{"content": "y"}], "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("chapters"));
    }

    #[test]
    fn tale_needs_content() {
        let msg = validation_message(validate_submission(request(json!({
            "title": "T", "authorName": "A", "language": "en", "type": "TALE", "content": "  ",
            "submitterEmail": "a@b.c"
        }))));
        assert!(msg.contains("content"));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let long = "ж".repeat(400);
        let excerpt = excerpt_of(&long).unwrap();
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt_of("line1\nline2").as_deref(), Some("line1\nline2..."));
        assert_eq!(excerpt_of(""), None);
    }
}
