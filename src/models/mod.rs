use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use rendering_config::RenderingConfig;

/// Languages a work can be written in. Also the set of UI locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
    Ru,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::De, Language::En, Language::Ru];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkType {
    Poem,
    Tale,
    Novel,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Poem => "POEM",
            WorkType::Tale => "TALE",
            WorkType::Novel => "NOVEL",
        }
    }
}

impl FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POEM" => Ok(WorkType::Poem),
            "TALE" => Ok(WorkType::Tale),
            "NOVEL" => Ok(WorkType::Novel),
            other => Err(format!("unsupported work type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SubmissionStatus::Pending),
            "APPROVED" => Ok(SubmissionStatus::Approved),
            "REJECTED" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status '{}'", other)),
        }
    }
}

// The three enums above are stored as their canonical text form.
macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_column!(Language);
text_column!(WorkType);
text_column!(SubmissionStatus);

/// One chapter as entered on the submission form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub author_name: String,
    pub language: Language,
    pub content: String,
    #[serde(rename = "type")]
    pub work_type: WorkType,
    pub chapters: Option<Vec<ChapterInput>>,
    pub tags: Vec<String>,
    pub status: SubmissionStatus,
    pub submitter_id: i64,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub approved_work_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitterContact {
    pub email: String,
    pub name: Option<String>,
}

/// Admin listing row: the submission plus who sent it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionWithSubmitter {
    #[serde(flatten)]
    pub submission: Submission,
    pub submitter: SubmitterContact,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub name_original: Option<String>,
    pub slug: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub bio_en: Option<String>,
    pub bio_de: Option<String>,
    pub bio_ru: Option<String>,
    pub nationality: Option<String>,
    pub portrait_url: Option<String>,
    pub languages: Vec<Language>,
}

impl Author {
    pub fn bio_for(&self, locale: Language) -> Option<&str> {
        match locale {
            Language::De => self.bio_de.as_deref(),
            Language::Ru => self.bio_ru.as_deref(),
            Language::En => self.bio_en.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorRef {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub slug: String,
    pub name_en: String,
    pub name_de: String,
    pub name_ru: String,
}

impl Tag {
    pub fn name_for(&self, locale: Language) -> &str {
        match locale {
            Language::De => &self.name_de,
            Language::Ru => &self.name_ru,
            Language::En => &self.name_en,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub order: i64,
    pub title: Option<String>,
    pub content: String,
}

/// A published work as it appears in catalogue listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub work_type: WorkType,
    pub language: Language,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub author: AuthorRef,
    pub tags: Vec<Tag>,
}

/// A single work with everything the reader needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDetail {
    #[serde(flatten)]
    pub summary: WorkSummary,
    pub rendering_config: Option<RenderingConfig>,
    pub published: bool,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorWithWorks {
    #[serde(flatten)]
    pub author: Author,
    pub works: Vec<WorkSummary>,
}

#[derive(Debug, Serialize)]
pub struct AdminAccount {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub last_login_time: Option<DateTime<Utc>>,
}

pub mod db_operations;
pub mod rendering_config;
