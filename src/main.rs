use actix_cors::Cors;
use actix_session::{storage::CookieSessionStore, SessionExt, SessionMiddleware};
use actix_web::{
    cookie::Key,
    guard,
    middleware::{DefaultHeaders, Logger},
    web, App, HttpServer,
};
use clap::Parser;
use inkwell_backend::{
    config::Config,
    helper::{i18n_helpers::Dictionaries, reader_helpers},
    middleware::{admin_guard, ip_guard},
    models::db_operations::open_catalog_pool,
    routes, AppState,
};
use redb::Database;
use std::convert::TryFrom;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inkwell_server", author, version, about = "Starts the Inkwell web server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

fn build_cors(allowed_origins: &str) -> Cors {
    let cors = if allowed_origins.trim() == "*" {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allowed_methods(vec!["GET", "POST", "PATCH"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file).expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let catalog_path = config.catalog_db_path();
    if !catalog_path.exists() {
        panic!(
            "FATAL: catalogue database not found at '{}'. Run 'setup_cli --env-file <path> db setup'",
            catalog_path.display()
        );
    }
    let pool = open_catalog_pool(&catalog_path).expect("FATAL: Failed to create the SQLite connection pool.");

    let views = web::Data::new(
        Database::open(config.view_counts_db_path())
            .expect("FATAL: views.redb not found. Run 'setup_cli --env-file <path> db setup'"),
    );

    let app_state = web::Data::new(AppState {
        dictionaries: Dictionaries::load().expect("FATAL: embedded locale dictionaries are malformed."),
        templates: reader_helpers::load_templates().expect("FATAL: Tera initialization failed."),
    });

    let session_key_bytes =
        hex::decode(&config.session_secret_key).expect("FATAL: SESSION_SECRET_KEY in .env is not a valid hex string.");
    let session_key = Key::try_from(session_key_bytes.as_slice())
        .expect("FATAL: The decoded SESSION_SECRET_KEY is not long enough (minimum 64 bytes required).");

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!("Server starting at http://{}", server_address);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
            .cookie_secure(config.use_secure_cookies)
            .cookie_http_only(true)
            .cookie_same_site(actix_web::cookie::SameSite::Lax)
            .build();

        App::new()
            .wrap(build_cors(&config.allowed_origins))
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(views.clone())
            .app_data(app_state.clone())
            .configure(routes::public::config_api)
            .route("/", web::get().to(routes::reader::root_handler))
            .service(
                web::scope("/management")
                    .wrap(session_mw)
                    .service(
                        web::scope(&format!("/{}", config.admin_url_prefix))
                            .guard(ip_guard(
                                config.admin_login_accept_ip.clone(),
                                config.trusted_proxies.clone(),
                            ))
                            .configure(routes::admin::config_login)
                            .service(
                                web::scope("")
                                    .guard(guard::fn_guard(|ctx| admin_guard(&ctx.get_session())))
                                    .configure(routes::admin::config_dashboard),
                            ),
                    ),
            )
            .configure(routes::reader::config_reader)
    })
    .bind(server_address)?
    .run()
    .await
}
