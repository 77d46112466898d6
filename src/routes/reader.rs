use crate::helper::{i18n_helpers, public_helpers, reader_helpers};
use crate::helper::public_helpers::CatalogError;
use crate::models::db_operations::works_db_operations::CatalogFilter;
use crate::models::Language;
use crate::{AppState, DbPool};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ChapterQuery {
    chapter: Option<usize>,
}

pub fn config_reader(cfg: &mut web::ServiceConfig) {
    cfg.route("/{locale}/works", web::get().to(show_works))
        .route("/{locale}/works/{slug}", web::get().to(show_work));
}

/// Browsers are sent to the works page in their best locale; anything else
/// gets the plain health response.
pub async fn root_handler(req: HttpRequest) -> impl Responder {
    let headers = req.headers();
    let wants_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |accept| accept.contains("text/html"));

    if !wants_html {
        return HttpResponse::Ok().content_type("text/plain").body("OK");
    }

    let locale = i18n_helpers::negotiate_locale(headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()));
    HttpResponse::Found()
        .append_header((header::LOCATION, format!("/{}/works", locale)))
        .finish()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

fn render_failed(e: tera::Error) -> HttpResponse {
    log::error!("Template rendering failed: {:?}", e);
    HttpResponse::InternalServerError().finish()
}

async fn show_works(
    locale: web::Path<String>,
    pool: web::Data<DbPool>,
    views: web::Data<Database>,
    state: web::Data<AppState>,
) -> impl Responder {
    let Ok(locale) = locale.parse::<Language>() else {
        return HttpResponse::NotFound().finish();
    };

    match public_helpers::list_works(&pool, &views, CatalogFilter::default()) {
        Ok(works) => match reader_helpers::render_listing_page(&state.templates, &works, locale, &state.dictionaries) {
            Ok(page) => html(page),
            Err(e) => render_failed(e),
        },
        Err(e) => {
            log::error!("Failed to fetch works for listing page: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn show_work(
    path: web::Path<(String, String)>,
    query: web::Query<ChapterQuery>,
    pool: web::Data<DbPool>,
    views: web::Data<Database>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (locale, slug) = path.into_inner();
    let Ok(locale) = locale.parse::<Language>() else {
        return HttpResponse::NotFound().finish();
    };

    let view = public_helpers::fetch_published_work(&pool, &views, &slug)
        .and_then(|work| reader_helpers::compose_reader_view(&work, locale, &state.dictionaries, query.chapter));

    match view {
        Ok(view) => match reader_helpers::render_reader_page(&state.templates, &view, &state.dictionaries) {
            Ok(page) => html(page),
            Err(e) => render_failed(e),
        },
        Err(CatalogError::NotFound) => HttpResponse::NotFound().finish(),
        Err(CatalogError::Persistence(e)) => {
            log::error!("Failed to load work '{}' for reading: {}", slug, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
