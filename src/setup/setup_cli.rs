use clap::{Parser, Subcommand};
use inkwell_backend::config::Config;
use inkwell_backend::models::db_operations::users_db_operations;
use inkwell_backend::setup::db_setup;
use redb::Database;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the catalogue schema, the default tags and the view counter store.
    Setup,
    /// Adds a demo author with a three-chapter novel.
    SeedDemo,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        new_password: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file).expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => {
                setup_catalog_database(&config);
                setup_view_counts_database(&config);
            }
            DbAction::SeedDemo => seed_demo(&config),
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => create_admin_user(&config, email, password),
            AdminAction::List => list_admin_users(&config),
            AdminAction::ChangePassword { email, new_password } => change_admin_password(&config, email, new_password),
        },
    }
}

fn ensure_parent_dir(path: &Path) {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }
}

fn open_catalog(config: &Config) -> Option<Connection> {
    let db_path = config.catalog_db_path();
    if !db_path.exists() {
        eprintln!(
            "❌ Error: Catalogue database not found at '{}'. Please run `setup_cli db setup` first.",
            db_path.display()
        );
        return None;
    }
    match Connection::open(&db_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("❌ Error opening catalogue database: {}", e);
            None
        }
    }
}

fn setup_catalog_database(config: &Config) {
    let db_path = config.catalog_db_path();
    println!("\nSetting up catalogue database at '{}'...", db_path.display());
    ensure_parent_dir(&db_path);

    let mut conn = Connection::open(&db_path).expect("Could not create catalogue database file.");
    match db_setup::setup_catalog_db(&mut conn) {
        Ok(_) => println!("✅ Catalogue database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up catalogue database: {}", e),
    }
}

fn setup_view_counts_database(config: &Config) {
    let db_path = config.view_counts_db_path();
    println!("\nSetting up view counter database at '{}'...", db_path.display());
    ensure_parent_dir(&db_path);

    let db = Database::create(&db_path).expect("Failed to create view counter database file.");
    match db_setup::setup_view_counts_db(&db) {
        Ok(_) => println!("✅ View counter database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up view counter database: {}", e),
    }
}

fn seed_demo(config: &Config) {
    let Some(mut conn) = open_catalog(config) else { return };
    if let Err(e) = conn.execute_batch("PRAGMA foreign_keys = ON;") {
        eprintln!("❌ Error enabling foreign keys: {}", e);
        return;
    }
    match db_setup::seed_demo_content(&mut conn) {
        Ok(_) => println!("✅ Demo content seeded."),
        Err(e) => eprintln!("❌ Error seeding demo content: {}", e),
    }
}

fn create_admin_user(config: &Config, email: &str, password: &str) {
    let Some(conn) = open_catalog(config) else { return };
    let email = email.trim().to_lowercase();
    match users_db_operations::create_admin(&conn, &email, password) {
        Ok(_) => println!("✅ Admin user '{}' created successfully.", email),
        Err(e) => eprintln!("❌ Error creating admin user: {}. It might be because the email already exists.", e),
    }
}

fn list_admin_users(config: &Config) {
    let Some(conn) = open_catalog(config) else { return };
    match users_db_operations::read_all_admins(&conn) {
        Ok(admins) => {
            println!("Listing Admin Users:");
            for admin in admins {
                let last_login = admin
                    .last_login_time
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                let state = if admin.is_active { "active" } else { "inactive" };
                println!("- {} ({}, last login: {})", admin.email, state, last_login);
            }
        }
        Err(e) => eprintln!("❌ Error fetching admins: {}", e),
    }
}

fn change_admin_password(config: &Config, email: &str, new_password: &str) {
    let Some(conn) = open_catalog(config) else { return };
    let email = email.trim().to_lowercase();
    match users_db_operations::change_admin_password(&conn, &email, new_password) {
        Ok(0) => eprintln!("❌ Error: No admin user with email '{}' found.", email),
        Ok(_) => println!("✅ Password for admin user '{}' changed successfully.", email),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}
