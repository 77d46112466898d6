use crate::helper::rendering_helpers::{self, RenderParams, ResolvedStyle};
use crate::helper::tag_helpers;
use crate::models::db_operations::works_db_operations::{self, CatalogFilter};
use crate::models::db_operations::{tags_db_operations, view_counts_db_operations, DbError};
use crate::models::{Author, AuthorWithWorks, Tag, WorkDetail, WorkSummary, WorkType};
use crate::DbPool;
use redb::Database;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not found")]
    NotFound,
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Persistence(DbError::from(e))
    }
}

impl From<r2d2::Error> for CatalogError {
    fn from(e: r2d2::Error) -> Self {
        CatalogError::Persistence(DbError::from(e))
    }
}

/// A published work together with the typography it should be read in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedWork {
    #[serde(flatten)]
    pub work: WorkDetail,
    pub resolved_style: ResolvedStyle,
    pub render_params: RenderParams,
}

fn attach_view_counts(views: &Database, mut works: Vec<WorkSummary>) -> Result<Vec<WorkSummary>, CatalogError> {
    let ids: Vec<&str> = works.iter().map(|w| w.id.as_str()).collect();
    let counts = view_counts_db_operations::read_view_counts(views, &ids)?;
    for work in works.iter_mut() {
        work.view_count = counts.get(&work.id).copied().unwrap_or(0);
    }
    Ok(works)
}

/// Published works, newest first. A featured-only request that matches
/// nothing falls back to the latest works, so the homepage is never empty.
pub fn list_works(pool: &DbPool, views: &Database, filter: CatalogFilter) -> Result<Vec<WorkSummary>, CatalogError> {
    let conn = pool.get()?;
    let mut works = works_db_operations::read_published_summaries(&conn, &filter)?;

    if works.is_empty() && filter.featured_only {
        log::debug!("No featured works, falling back to the latest published works");
        let latest = CatalogFilter { featured_only: false, ..filter };
        works = works_db_operations::read_published_summaries(&conn, &latest)?;
    }

    attach_view_counts(views, works)
}

pub fn list_poems(pool: &DbPool, views: &Database, filter: CatalogFilter) -> Result<Vec<WorkSummary>, CatalogError> {
    list_works(pool, views, CatalogFilter { work_type: Some(WorkType::Poem), ..filter })
}

/// A published work by slug. Unpublished works are reported as missing.
pub fn fetch_published_work(pool: &DbPool, views: &Database, slug: &str) -> Result<PublishedWork, CatalogError> {
    let conn = pool.get()?;
    let mut work = works_db_operations::read_work_by_slug(&conn, slug)?
        .filter(|w| w.published)
        .ok_or(CatalogError::NotFound)?;

    work.summary.view_count = view_counts_db_operations::read_view_count(views, &work.summary.id)?;
    let resolved_style = rendering_helpers::resolve(work.summary.work_type, work.rendering_config.as_ref());

    Ok(PublishedWork {
        render_params: resolved_style.params(),
        resolved_style,
        work,
    })
}

/// Adds one view to a published work and returns the new total.
pub fn increment_view_count(pool: &DbPool, views: &Database, slug: &str) -> Result<u64, CatalogError> {
    let work_id = {
        let conn = pool.get()?;
        works_db_operations::read_published_work_id(&conn, slug)?.ok_or(CatalogError::NotFound)?
    };
    Ok(view_counts_db_operations::increment_view_count(views, &work_id)?)
}

pub fn list_tags(pool: &DbPool) -> Result<Vec<Tag>, CatalogError> {
    let conn = pool.get()?;
    Ok(tags_db_operations::read_all_tags(&conn)?)
}

pub fn suggest_tags(pool: &DbPool, query: &str, committed: &[String]) -> Result<Vec<Tag>, CatalogError> {
    let vocabulary = list_tags(pool)?;
    Ok(tag_helpers::suggest_tags(query, committed, &vocabulary)
        .into_iter()
        .cloned()
        .collect())
}

pub fn list_authors(pool: &DbPool) -> Result<Vec<Author>, CatalogError> {
    let conn = pool.get()?;
    Ok(works_db_operations::read_all_authors(&conn)?)
}

pub fn fetch_author(pool: &DbPool, views: &Database, slug: &str) -> Result<AuthorWithWorks, CatalogError> {
    let (author, works) = {
        let conn = pool.get()?;
        let author = works_db_operations::read_author_by_slug(&conn, slug)?.ok_or(CatalogError::NotFound)?;
        let works = works_db_operations::read_published_summaries_by_author(&conn, &author.id)?;
        (author, works)
    };
    Ok(AuthorWithWorks {
        author,
        works: attach_view_counts(views, works)?,
    })
}
