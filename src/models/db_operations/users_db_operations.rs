use crate::models::AdminAccount;
use crate::models::db_operations::DbError;
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// Returns the id of the submitter registered under `email`, registering one if needed.
pub fn get_or_create_submitter(conn: &Connection, email: &str) -> Result<i64, DbError> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| row.get(0))
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO users (email, role, created_at) VALUES (?1, 'submitter', ?2)",
        params![email, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_admin(conn: &Connection, email: &str, password: &str) -> Result<(), DbError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST)?;
    conn.execute(
        "INSERT INTO users (email, role, password_hash, created_at) VALUES (?1, 'admin', ?2, ?3)",
        params![email, hashed_password, Utc::now()],
    )?;
    Ok(())
}

pub fn read_all_admins(conn: &Connection) -> Result<Vec<AdminAccount>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, is_active, last_login_time FROM users WHERE role = 'admin' ORDER BY id",
    )?;
    let admins = stmt
        .query_map([], |row| {
            Ok(AdminAccount {
                id: row.get(0)?,
                email: row.get(1)?,
                is_active: row.get(2)?,
                last_login_time: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(admins)
}

/// Returns the number of rows changed, so callers can tell a missing admin apart.
pub fn change_admin_password(conn: &Connection, email: &str, new_password: &str) -> Result<usize, DbError> {
    let hashed_password = hash(new_password, bcrypt::DEFAULT_COST)?;
    Ok(conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE email = ?2 AND role = 'admin'",
        params![hashed_password, email],
    )?)
}

/// Checks an admin login. Inactive accounts and non-admin users never verify.
pub fn verify_admin_credentials(conn: &Connection, email: &str, password: &str) -> Result<bool, DbError> {
    let stored: Option<(Option<String>, bool)> = conn
        .query_row(
            "SELECT password_hash, is_active FROM users WHERE email = ?1 AND role = 'admin'",
            [email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match stored {
        Some((Some(hash), true)) => Ok(verify(password, &hash).unwrap_or(false)),
        _ => Ok(false),
    }
}

pub fn update_last_login_time(conn: &Connection, email: &str) -> Result<(), DbError> {
    conn.execute(
        "UPDATE users SET last_login_time = ?1 WHERE email = ?2",
        params![Utc::now(), email],
    )?;
    Ok(())
}
