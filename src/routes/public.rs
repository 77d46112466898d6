use crate::helper::public_helpers;
use crate::helper::submission_helpers::{self, SubmissionRequest};
use crate::models::db_operations::works_db_operations::CatalogFilter;
use crate::models::{Language, WorkType};
use crate::routes::{bad_request, catalog_error_response, submission_error_response};
use crate::DbPool;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct CatalogQuery {
    featured: Option<bool>,
    limit: Option<u32>,
    language: Option<String>,
    #[serde(rename = "type")]
    work_type: Option<String>,
}

impl CatalogQuery {
    fn to_filter(&self) -> Result<CatalogFilter, HttpResponse> {
        let language = match self.language.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Language>().map_err(|e| bad_request(&format!("language: {}", e)))?),
        };
        let work_type = match self.work_type.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<WorkType>().map_err(|e| bad_request(&format!("type: {}", e)))?),
        };
        Ok(CatalogFilter {
            featured_only: self.featured.unwrap_or(false),
            language,
            work_type,
            limit: self.limit,
        })
    }
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    q: Option<String>,
    committed: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/works", web::get().to(list_works))
            .route("/works/{slug}", web::get().to(get_work))
            .route("/works/{slug}/view", web::patch().to(increment_view_count))
            .route("/poems", web::get().to(list_poems))
            .route("/authors", web::get().to(list_authors))
            .route("/authors/{slug}", web::get().to(get_author))
            .route("/tags", web::get().to(list_tags))
            .route("/tags/suggest", web::get().to(suggest_tags))
            .route("/submit", web::post().to(submit)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn list_works(
    pool: web::Data<DbPool>,
    views: web::Data<Database>,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    let filter = match query.to_filter() {
        Ok(f) => f,
        Err(response) => return response,
    };
    match public_helpers::list_works(&pool, &views, filter) {
        Ok(works) => HttpResponse::Ok().json(json!({ "works": works })),
        Err(e) => catalog_error_response(&e, "Failed to fetch works"),
    }
}

async fn list_poems(
    pool: web::Data<DbPool>,
    views: web::Data<Database>,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    let filter = match query.to_filter() {
        Ok(f) => f,
        Err(response) => return response,
    };
    match public_helpers::list_poems(&pool, &views, filter) {
        Ok(poems) => HttpResponse::Ok().json(json!({ "poems": poems })),
        Err(e) => catalog_error_response(&e, "Failed to fetch poems"),
    }
}

async fn get_work(pool: web::Data<DbPool>, views: web::Data<Database>, slug: web::Path<String>) -> impl Responder {
    match public_helpers::fetch_published_work(&pool, &views, &slug) {
        Ok(work) => HttpResponse::Ok().json(json!({ "work": work })),
        Err(e) => catalog_error_response(&e, "Failed to fetch work"),
    }
}

async fn increment_view_count(
    pool: web::Data<DbPool>,
    views: web::Data<Database>,
    slug: web::Path<String>,
) -> impl Responder {
    match public_helpers::increment_view_count(&pool, &views, &slug) {
        Ok(count) => HttpResponse::Ok().json(json!({ "viewCount": count })),
        Err(e) => catalog_error_response(&e, "Failed to increment view count"),
    }
}

async fn list_authors(pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::list_authors(&pool) {
        Ok(authors) => HttpResponse::Ok().json(json!({ "authors": authors })),
        Err(e) => catalog_error_response(&e, "Failed to fetch authors"),
    }
}

async fn get_author(pool: web::Data<DbPool>, views: web::Data<Database>, slug: web::Path<String>) -> impl Responder {
    match public_helpers::fetch_author(&pool, &views, &slug) {
        Ok(author) => HttpResponse::Ok().json(json!({ "author": author })),
        Err(e) => catalog_error_response(&e, "Failed to fetch author"),
    }
}

async fn list_tags(pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::list_tags(&pool) {
        Ok(tags) => HttpResponse::Ok().json(json!({ "tags": tags })),
        Err(e) => catalog_error_response(&e, "Failed to fetch tags"),
    }
}

async fn suggest_tags(pool: web::Data<DbPool>, query: web::Query<SuggestQuery>) -> impl Responder {
    let committed: Vec<String> = query
        .committed
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    match public_helpers::suggest_tags(&pool, query.q.as_deref().unwrap_or(""), &committed) {
        Ok(tags) => HttpResponse::Ok().json(json!({ "tags": tags })),
        Err(e) => catalog_error_response(&e, "Failed to suggest tags"),
    }
}

async fn submit(pool: web::Data<DbPool>, body: web::Json<SubmissionRequest>) -> impl Responder {
    let request = body.into_inner();
    let result = web::block(move || submission_helpers::submit(&pool, request)).await;

    match result {
        Ok(Ok(id)) => HttpResponse::Created().json(json!({
            "success": true,
            "message": "Work submitted successfully",
            "id": id,
        })),
        Ok(Err(e)) => submission_error_response(&e, "Failed to submit work"),
        Err(e) => {
            log::error!("Submission worker failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "success": false, "error": "Failed to submit work" }))
        }
    }
}
