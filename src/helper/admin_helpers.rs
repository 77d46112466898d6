use crate::models::db_operations::{tags_db_operations, users_db_operations, works_db_operations, DbError};
use crate::models::Tag;
use crate::DbPool;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminHelperError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<r2d2::Error> for AdminHelperError {
    fn from(e: r2d2::Error) -> Self {
        AdminHelperError::Persistence(DbError::from(e))
    }
}

/// Checks admin credentials and stamps the login time on success.
pub fn verify_admin_login(pool: &DbPool, email: &str, password: &str) -> Result<bool, AdminHelperError> {
    let conn = pool.get()?;
    let email = email.trim().to_lowercase();
    if !users_db_operations::verify_admin_credentials(&conn, &email, password)? {
        return Ok(false);
    }
    users_db_operations::update_last_login_time(&conn, &email)?;
    Ok(true)
}

pub fn set_featured(pool: &DbPool, slug: &str, featured: bool) -> Result<(), AdminHelperError> {
    let conn = pool.get()?;
    if !works_db_operations::set_featured(&conn, slug, featured)? {
        return Err(AdminHelperError::NotFound);
    }
    log::info!("Work '{}' featured = {}", slug, featured);
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTagRequest {
    pub slug: Option<String>,
    pub name_en: Option<String>,
    pub name_de: Option<String>,
    pub name_ru: Option<String>,
}

fn tag_field(name: &str, value: Option<&str>) -> Result<String, AdminHelperError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AdminHelperError::Validation(format!("{} is required", name)))
}

pub fn validate_new_tag(request: &NewTagRequest) -> Result<Tag, AdminHelperError> {
    let slug = tag_field("slug", request.slug.as_deref())?.to_lowercase();
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(AdminHelperError::Validation(
            "slug may only contain letters, digits and hyphens".to_string(),
        ));
    }

    Ok(Tag {
        slug,
        name_en: tag_field("nameEn", request.name_en.as_deref())?,
        name_de: tag_field("nameDe", request.name_de.as_deref())?,
        name_ru: tag_field("nameRu", request.name_ru.as_deref())?,
    })
}

/// Adds a vocabulary entry. A slug that already exists is a validation error.
pub fn add_tag(pool: &DbPool, request: &NewTagRequest) -> Result<Tag, AdminHelperError> {
    let tag = validate_new_tag(request)?;
    let conn = pool.get()?;
    match tags_db_operations::insert_tag(&conn, &tag) {
        Ok(()) => {
            log::info!("Tag '{}' added", tag.slug);
            Ok(tag)
        }
        Err(e) if e.is_unique_violation() => {
            Err(AdminHelperError::Validation(format!("slug '{}' already exists", tag.slug)))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(slug: &str) -> NewTagRequest {
        NewTagRequest {
            slug: Some(slug.to_string()),
            name_en: Some(" Sea ".to_string()),
            name_de: Some("Meer".to_string()),
            name_ru: Some("Море".to_string()),
        }
    }

    #[test]
    fn slug_is_lowercased_and_names_trimmed() {
        let tag = validate_new_tag(&request("Sea")).unwrap();
        assert_eq!(tag.slug, "sea");
        assert_eq!(tag.name_en, "Sea");
    }

    #[test]
    fn bad_slug_and_missing_names_are_rejected() {
        assert!(matches!(validate_new_tag(&request("sea side")), Err(AdminHelperError::Validation(_))));

        let mut missing = request("sea");
        missing.name_ru = None;
        match validate_new_tag(&missing) {
            Err(AdminHelperError::Validation(msg)) => assert!(msg.contains("nameRu")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
