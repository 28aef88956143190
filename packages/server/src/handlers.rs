//! HTTP handler functions for the quote vision API.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use quote_vision_analytics::{export, stats};
use quote_vision_database::{DbError, queries};
use quote_vision_database_models::NewQuote;
use quote_vision_server_models::{
    ApiError, ApiHealth, ApiResponse, ApiWelcome, ProjectQueryParams, QuoteQueryParams,
};

use crate::AppState;

/// `GET /`
pub async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(ApiWelcome {
        message: "Welcome to EnKoat Quote Vision API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth { status: "ok" })
}

/// Fallback for unknown paths and methods.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new("Endpoint not found"))
}

/// `POST /api/quotes`
///
/// Validates and stores a quote. Responds `201` with the stored row.
pub async fn submit_quote(state: web::Data<AppState>, body: web::Json<NewQuote>) -> HttpResponse {
    match queries::insert_quote(state.db.as_ref(), body.into_inner()).await {
        Ok(quote) => {
            log::info!("Stored quote {} from {}", quote.id, quote.company);
            HttpResponse::Created().json(ApiResponse::ok(quote))
        }
        Err(DbError::Validation(e)) => HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
        Err(e) => {
            log::error!("Failed to store quote: {e}");
            internal_error("Failed to store quote")
        }
    }
}

/// `GET /api/quotes`
pub async fn list_quotes(
    state: web::Data<AppState>,
    params: web::Query<QuoteQueryParams>,
) -> HttpResponse {
    let filter = match params.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match queries::list_quotes(state.db.as_ref(), &filter).await {
        Ok(quotes) => HttpResponse::Ok().json(ApiResponse::list(quotes)),
        Err(e) => {
            log::error!("Failed to query quotes: {e}");
            internal_error("Failed to query quotes")
        }
    }
}

/// `GET /api/quotes/filter-options`
///
/// Distinct states and roof types that appear in submitted quotes.
pub async fn filter_options(state: web::Data<AppState>) -> HttpResponse {
    match queries::quote_filter_options(state.db.as_ref()).await {
        Ok(options) => HttpResponse::Ok().json(ApiResponse::ok(options)),
        Err(e) => {
            log::error!("Failed to query filter options: {e}");
            internal_error("Failed to query filter options")
        }
    }
}

/// `GET /api/projects`
pub async fn list_projects(
    state: web::Data<AppState>,
    params: web::Query<ProjectQueryParams>,
) -> HttpResponse {
    let filter = match params.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match queries::list_projects(state.db.as_ref(), &filter).await {
        Ok(projects) => HttpResponse::Ok().json(ApiResponse::list(projects)),
        Err(e) => {
            log::error!("Failed to query projects: {e}");
            internal_error("Failed to query projects")
        }
    }
}

/// `GET /api/projects/stats`
///
/// Dashboard aggregates over the projects matching the filter.
pub async fn project_stats(
    state: web::Data<AppState>,
    params: web::Query<ProjectQueryParams>,
) -> HttpResponse {
    let filter = match params.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match queries::list_projects(state.db.as_ref(), &filter).await {
        Ok(projects) => {
            HttpResponse::Ok().json(ApiResponse::ok(stats::compute_stats(&projects, &filter)))
        }
        Err(e) => {
            log::error!("Failed to compute project stats: {e}");
            internal_error("Failed to compute project stats")
        }
    }
}

/// `GET /api/projects/export`
///
/// The filtered project list as a CSV download.
pub async fn export_projects(
    state: web::Data<AppState>,
    params: web::Query<ProjectQueryParams>,
) -> HttpResponse {
    let filter = match params.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let projects = match queries::list_projects(state.db.as_ref(), &filter).await {
        Ok(projects) => projects,
        Err(e) => {
            log::error!("Failed to query projects for export: {e}");
            return internal_error("Failed to export projects");
        }
    };

    match export::projects_to_csv(&projects) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"roof-projects.csv\"",
            ))
            .body(csv),
        Err(e) => {
            log::error!("Failed to render projects CSV: {e}");
            internal_error("Failed to export projects")
        }
    }
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError::new(message))
}
