use crate::helper::admin_helpers::{self, NewTagRequest};
use crate::helper::submission_helpers::{self, Decision, DecisionRequest};
use crate::middleware::{AuthenticatedAdmin, ADMIN_ROLE};
use crate::routes::{admin_error_response, submission_error_response};
use crate::DbPool;
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct FeaturedRequest {
    featured: bool,
}

pub fn config_login(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(handle_admin_login))
        .route("/logout", web::post().to(handle_admin_logout));
}

pub fn config_dashboard(cfg: &mut web::ServiceConfig) {
    cfg.route("/submissions", web::get().to(list_submissions))
        .route("/submissions", web::post().to(decide_submission))
        .route("/works/{slug}/featured", web::post().to(set_featured))
        .route("/tags", web::post().to(add_tag));
}

async fn handle_admin_login(
    session: Session,
    pool: web::Data<DbPool>,
    body: web::Json<LoginRequest>,
) -> impl Responder {
    let LoginRequest { email, password } = body.into_inner();
    let email = email.trim().to_lowercase();

    let verify_email = email.clone();
    let verified = web::block(move || admin_helpers::verify_admin_login(&pool, &verify_email, &password)).await;

    match verified {
        Ok(Ok(true)) => {
            session.renew();
            if let Err(e) = session
                .insert("email", &email)
                .and_then(|_| session.insert("role", ADMIN_ROLE))
            {
                log::error!("Failed to write admin session: {}", e);
                return HttpResponse::InternalServerError().json(json!({ "success": false, "error": "Login failed" }));
            }
            log::info!("Admin '{}' logged in", email);
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        Ok(Ok(false)) => {
            log::warn!("Failed admin login for '{}'", email);
            HttpResponse::Unauthorized().json(json!({ "success": false, "error": "Invalid credentials" }))
        }
        Ok(Err(e)) => admin_error_response(&e, "Login failed"),
        Err(e) => {
            log::error!("Login worker failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "success": false, "error": "Login failed" }))
        }
    }
}

async fn handle_admin_logout(session: Session) -> impl Responder {
    session.purge();
    HttpResponse::Ok().json(json!({ "success": true }))
}

async fn list_submissions(_admin: AuthenticatedAdmin, pool: web::Data<DbPool>) -> impl Responder {
    match submission_helpers::list_submissions(&pool) {
        Ok(submissions) => HttpResponse::Ok().json(json!({ "submissions": submissions })),
        Err(e) => submission_error_response(&e, "Failed to fetch submissions"),
    }
}

async fn decide_submission(
    admin: AuthenticatedAdmin,
    pool: web::Data<DbPool>,
    body: web::Json<DecisionRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let result = web::block(move || submission_helpers::decide_submission(&pool, request)).await;

    match result {
        Ok(Ok(Decision::Approved { work_id })) => {
            log::info!("Submission approved by {}", admin.email);
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Work published successfully",
                "workId": work_id,
            }))
        }
        Ok(Ok(Decision::Rejected)) => {
            log::info!("Submission rejected by {}", admin.email);
            HttpResponse::Ok().json(json!({ "success": true, "message": "Submission rejected" }))
        }
        Ok(Err(e)) => submission_error_response(&e, "Failed to process submission"),
        Err(e) => {
            log::error!("Decision worker failed: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to process submission" }))
        }
    }
}

async fn set_featured(
    _admin: AuthenticatedAdmin,
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    body: web::Json<FeaturedRequest>,
) -> impl Responder {
    match admin_helpers::set_featured(&pool, &slug, body.featured) {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true, "featured": body.featured })),
        Err(e) => admin_error_response(&e, "Failed to update work"),
    }
}

async fn add_tag(_admin: AuthenticatedAdmin, pool: web::Data<DbPool>, body: web::Json<NewTagRequest>) -> impl Responder {
    match admin_helpers::add_tag(&pool, &body) {
        Ok(tag) => HttpResponse::Created().json(json!({ "success": true, "tag": tag })),
        Err(e) => admin_error_response(&e, "Failed to add tag"),
    }
}
