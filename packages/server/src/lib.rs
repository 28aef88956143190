#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the quote vision dashboard.
//!
//! Serves the REST API for submitting contractor quotes and browsing
//! installed projects, including the aggregated dashboard statistics and
//! a CSV export. Data lives in a single `SQLite` file which is seeded with
//! demo data on first start. A built frontend can optionally be served
//! from `/app`.

mod handlers;
pub mod interactive;

pub use handlers::not_found;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, Resource, error, middleware, web};
use quote_vision_database::db::{DEFAULT_DB_PATH, open_db};
use quote_vision_database::seed::{SeedConfig, seed_if_empty};
use quote_vision_server_models::ApiError;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use switchy_database::Database;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// `SQLite` file (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Whether to seed empty tables at startup (`SEED_DATABASE`).
    pub seed_database: bool,
    /// Built frontend to serve under `/app` (`STATIC_DIR`).
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            seed_database: true,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: lookup("DATABASE_PATH").map_or(defaults.database_path, PathBuf::from),
            seed_database: lookup("SEED_DATABASE").map_or(defaults.seed_database, |v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "0" | "false" | "no" | "off"
                )
            }),
            static_dir: lookup("STATIC_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Quote and project storage.
    pub db: Arc<dyn Database>,
}

/// Registers the API routes and the JSON/query error handlers.
///
/// Unknown paths are not handled here; the caller sets
/// `default_service(web::to(not_found))` on the `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(resource("/").route(web::get().to(handlers::welcome)))
        .service(resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(
                    resource("/quotes")
                        .route(web::get().to(handlers::list_quotes))
                        .route(web::post().to(handlers::submit_quote)),
                )
                .service(
                    resource("/quotes/filter-options")
                        .route(web::get().to(handlers::filter_options)),
                )
                .service(resource("/projects").route(web::get().to(handlers::list_projects)))
                .service(
                    resource("/projects/stats").route(web::get().to(handlers::project_stats)),
                )
                .service(
                    resource("/projects/export").route(web::get().to(handlers::export_projects)),
                ),
        );
}

/// A resource whose unmatched methods get the JSON `404` rather than `405`.
fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::to(handlers::not_found))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError::new(message)),
        )
        .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError::new(message)),
        )
        .into()
    })
}

/// Opens the database and seeds it if configured to.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened or
/// seeding fails.
pub async fn prepare_database(config: &ServerConfig) -> std::io::Result<Box<dyn Database>> {
    log::info!("Opening database at {}...", config.database_path.display());
    let db = open_db(&config.database_path)
        .await
        .map_err(std::io::Error::other)?;

    if config.seed_database {
        log::info!("Checking database for existing data...");
        seed_if_empty(db.as_ref(), SeedConfig::default(), &mut StdRng::from_entropy())
            .await
            .map_err(std::io::Error::other)?;
    }

    Ok(db)
}

/// Starts the quote vision API server.
///
/// Opens (and optionally seeds) the database, then runs the Actix-Web
/// HTTP server until it is stopped. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be prepared,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let db = prepare_database(&config).await?;

    let state = web::Data::new(AppState { db: Arc::from(db) });
    let static_dir = config.static_dir.clone();

    if let Some(dir) = &static_dir {
        log::info!("Serving frontend from {} at /app", dir.display());
    }
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let static_dir = static_dir.clone();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .configure(move |cfg| {
                if let Some(dir) = &static_dir {
                    cfg.service(Files::new("/app", dir).index_file("index.html"));
                }
            })
            .default_service(web::to(not_found))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{Value, json};

    use super::*;

    struct TempDbFile(PathBuf);

    impl TempDbFile {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!(
                "quote_vision_server_test_{}.db",
                uuid::Uuid::new_v4()
            )))
        }
    }

    impl Drop for TempDbFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    async fn state(file: &TempDbFile) -> web::Data<AppState> {
        let db = open_db(&file.0).await.unwrap();
        web::Data::new(AppState { db: Arc::from(db) })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(configure)
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    fn quote_body(state: &str, roof_type: &str) -> Value {
        json!({
            "contractorName": "Jane Roofer",
            "company": "Acme Roofing",
            "roofSize": 2400,
            "roofType": roof_type,
            "projectCity": "Tucson",
            "projectState": state,
            "projectDate": "2024-06-01"
        })
    }

    fn project_body(state: &str, roof_type: &str, date: &str, installed: Option<&str>) -> Value {
        json!({
            "contractorName": "Contractor 1",
            "company": "Company 1",
            "roofSize": 1000,
            "roofType": roof_type,
            "projectCity": "Phoenix",
            "projectState": state,
            "projectDate": date,
            "completed": installed.is_some(),
            "energySavings": 200,
            "costSavings": 30,
            "temperatureReduction": 5.0,
            "installationDate": installed
        })
    }

    async fn insert_projects(state: &web::Data<AppState>, bodies: Vec<Value>) {
        let payloads = bodies
            .into_iter()
            .map(|b| serde_json::from_value(b).unwrap())
            .collect();
        quote_vision_database::queries::insert_projects(state.db.as_ref(), payloads)
            .await
            .unwrap();
    }

    #[test]
    fn config_defaults_and_overrides() {
        let defaults = ServerConfig::from_lookup(|_| None);
        assert_eq!(defaults, ServerConfig::default());
        assert_eq!(defaults.port, 5000);
        assert!(defaults.seed_database);

        let vars: HashMap<&str, &str> = [
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "8081"),
            ("DATABASE_PATH", "/tmp/qv.db"),
            ("SEED_DATABASE", "false"),
            ("STATIC_DIR", "frontend/dist"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(ToString::to_string));

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8081);
        assert_eq!(config.database_path, PathBuf::from("/tmp/qv.db"));
        assert!(!config.seed_database);
        assert_eq!(config.static_dir, Some(PathBuf::from("frontend/dist")));
    }

    #[test]
    fn unparseable_port_falls_back() {
        let config = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[actix_web::test]
    async fn welcome_and_health() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        let body: Value =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body["message"], "Welcome to EnKoat Quote Vision API");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let body: Value =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/health").to_request())
                .await;
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[actix_web::test]
    async fn unknown_paths_and_methods_are_json_404() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        for req in [
            TestRequest::get().uri("/api/nope").to_request(),
            TestRequest::get().uri("/elsewhere").to_request(),
            TestRequest::delete().uri("/api/quotes").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(
                body,
                json!({"success": false, "error": "Endpoint not found"})
            );
        }
    }

    #[actix_web::test]
    async fn submits_and_lists_quotes() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/quotes")
                .set_json(quote_body("AZ", "Metal"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["success"], true);
        assert_eq!(created["data"]["roofType"], "Metal");
        assert!(created.get("count").is_none());

        test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/quotes")
                .set_json(quote_body("TX", "TPO"))
                .to_request(),
        )
        .await;

        let all: Value =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/api/quotes").to_request())
                .await;
        assert_eq!(all["count"], 2);

        let filtered: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/quotes?state=AZ&roofType=")
                .to_request(),
        )
        .await;
        assert_eq!(filtered["count"], 1);
        assert_eq!(filtered["data"][0]["projectState"], "AZ");
    }

    #[actix_web::test]
    async fn invalid_quotes_are_rejected() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        let mut blank = quote_body("AZ", "Metal");
        blank["contractorName"] = json!("   ");
        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/quotes")
                .set_json(blank)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"success": false, "error": "Contractor name is required"})
        );

        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/quotes")
                .set_json(quote_body("AZ", "Straw"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn filter_options_list_quote_states_and_types() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        for (st, rt) in [("TX", "Tile"), ("AZ", "Metal"), ("AZ", "Tile")] {
            test::call_service(
                &app,
                TestRequest::post()
                    .uri("/api/quotes")
                    .set_json(quote_body(st, rt))
                    .to_request(),
            )
            .await;
        }

        let body: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/quotes/filter-options")
                .to_request(),
        )
        .await;
        assert_eq!(
            body["data"],
            json!({
                "states": [
                    {"code": "AZ", "name": "Arizona"},
                    {"code": "TX", "name": "Texas"}
                ],
                "roofTypes": ["Metal", "Tile"]
            })
        );
    }

    #[actix_web::test]
    async fn project_stats_follow_the_filter() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        insert_projects(
            &state,
            vec![
                project_body("AZ", "Metal", "2024-03-01", Some("2024-03-10")),
                project_body("CA", "TPO", "2024-04-01", None),
                project_body("AZ", "Foam", "2023-06-01", Some("2023-07-02")),
            ],
        )
        .await;
        let app = app!(state);

        let body: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/projects/stats?dateFrom=2024-01-01&dateTo=2024-12-31")
                .to_request(),
        )
        .await;

        assert_eq!(body["success"], true);
        let stats = &body["data"];
        assert_eq!(stats["totalProjects"], 2);
        assert_eq!(stats["completedProjects"], 1);
        assert_eq!(stats["averageRoofSize"], 1000.0);
        assert_eq!(stats["totalEnergySavings"], 400.0);
        assert_eq!(stats["projectsByState"], json!({"AZ": 1, "CA": 1}));
        assert_eq!(stats["projectsByRoofType"], json!({"Metal": 1, "TPO": 1}));
        assert_eq!(stats["projectsByMonth"], json!({"2024-03": 1}));

        let empty: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/projects/stats?state=WY")
                .to_request(),
        )
        .await;
        assert_eq!(empty["data"]["totalProjects"], 0);
        assert_eq!(empty["data"]["averageRoofSize"], 0.0);
        assert_eq!(empty["data"]["projectsByState"], json!({}));
    }

    #[actix_web::test]
    async fn five_digit_years_are_rejected_and_reads_keep_working() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        for date in ["+10000-01-01", "-0001-01-01"] {
            let mut body = quote_body("AZ", "Metal");
            body["projectDate"] = json!(date);
            let resp = test::call_service(
                &app,
                TestRequest::post()
                    .uri("/api/quotes")
                    .set_json(body)
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{date}");
        }

        let mut edge = quote_body("AZ", "Metal");
        edge["projectDate"] = json!("9999-12-31T23:59:59.999Z");
        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/quotes")
                .set_json(edge)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp =
            test::call_service(&app, TestRequest::get().uri("/api/quotes").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 1);

        let resp = test::call_service(
            &app,
            TestRequest::get()
                .uri("/api/projects?dateFrom=%2B10000-01-01")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn sub_millisecond_bounds_agree_across_list_and_stats() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        insert_projects(
            &state,
            vec![project_body(
                "AZ",
                "Metal",
                "2024-03-01T12:00:00.000Z",
                None,
            )],
        )
        .await;
        let app = app!(state);

        let query = "dateFrom=2024-03-01T12:00:00.0005Z";
        let list: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri(&format!("/api/projects?{query}"))
                .to_request(),
        )
        .await;
        let stats: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri(&format!("/api/projects/stats?{query}"))
                .to_request(),
        )
        .await;

        assert_eq!(list["count"], 1);
        assert_eq!(stats["data"]["totalProjects"], 1);
    }

    #[actix_web::test]
    async fn lists_projects_newest_first() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        insert_projects(
            &state,
            vec![
                project_body("AZ", "Metal", "2023-03-01", None),
                project_body("AZ", "Metal", "2024-03-01", None),
            ],
        )
        .await;
        let app = app!(state);

        let body: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/projects?roofType=Metal")
                .to_request(),
        )
        .await;
        assert_eq!(body["count"], 2);
        assert!(
            body["data"][0]["projectDate"]
                .as_str()
                .unwrap()
                .starts_with("2024-03-01")
        );
    }

    #[actix_web::test]
    async fn malformed_filters_are_400() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        let app = app!(state);

        for uri in [
            "/api/projects?dateFrom=yesterday",
            "/api/projects/stats?roofType=Thatch",
            "/api/projects/export?dateTo=2024-13-45",
            "/api/quotes?roofType=Thatch",
        ] {
            let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false, "{uri}");
        }
    }

    #[actix_web::test]
    async fn exports_projects_as_csv() {
        let file = TempDbFile::new();
        let state = state(&file).await;
        insert_projects(
            &state,
            vec![
                project_body("AZ", "Metal", "2024-03-01", Some("2024-03-10")),
                project_body("CA", "TPO", "2024-04-01", None),
            ],
        )
        .await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            TestRequest::get()
                .uri("/api/projects/export?state=CA")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv; charset=utf-8"
        );
        assert!(
            resp.headers()
                .get("content-disposition")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("attachment")
        );

        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Project ID\""));
        assert!(lines[1].contains("\"Phoenix, CA\""));
        assert!(lines[1].contains("\"Pending\""));
    }
}
