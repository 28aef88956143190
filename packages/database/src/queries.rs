//! Query functions for quotes and projects.
//!
//! Filters are pushed down to `SQLite` as a `WHERE` clause with numbered
//! parameters. Project date bounds compare the canonical RFC 3339 text,
//! which orders identically to the timestamps themselves. Timestamps are
//! truncated to milliseconds on insert so returned rows equal stored ones.

use std::str::FromStr as _;

use chrono::{DateTime, SubsecRound as _, Utc};
use moosicbox_json_utils::database::ToValue as _;
use quote_vision_analytics_models::{FilterOptions, StateOption};
use quote_vision_database_models::dates::{format_timestamp, parse_date};
use quote_vision_database_models::{
    NewProject, NewQuote, ProjectFilter, ProjectRow, QuoteFilter, QuoteRow,
};
use quote_vision_roofing_models::{RoofType, states};
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Column count of a `projects` insert, used to size batches.
const PROJECT_COLUMNS: usize = 14;

/// Column count of a `quotes` insert, used to size batches.
const QUOTE_COLUMNS: usize = 9;

/// Upper bound on bound parameters per statement (`SQLite`'s historical
/// `SQLITE_MAX_VARIABLE_NUMBER`).
const MAX_PARAMS: usize = 999;

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Validates and stores a new quote.
///
/// Assigns a fresh UUID and stamps `submitted_at` with the current time if
/// the payload didn't carry one.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if the payload is invalid, or another
/// [`DbError`] if the insert fails.
pub async fn insert_quote(db: &dyn Database, quote: NewQuote) -> Result<QuoteRow, DbError> {
    let mut rows = insert_quotes(db, vec![quote]).await?;
    rows.pop().ok_or_else(|| DbError::Conversion {
        message: "Quote insert returned no row".to_string(),
    })
}

/// Validates and stores a batch of quotes, returning the stored rows in
/// input order.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for the first invalid payload (nothing
/// is written in that case), or another [`DbError`] if an insert fails.
pub async fn insert_quotes(
    db: &dyn Database,
    quotes: Vec<NewQuote>,
) -> Result<Vec<QuoteRow>, DbError> {
    let now = Utc::now().trunc_subsecs(3);
    let rows = quotes
        .into_iter()
        .map(|quote| {
            let quote = quote.validated()?;
            Ok(QuoteRow {
                id: uuid::Uuid::new_v4().to_string(),
                contractor_name: quote.contractor_name,
                company: quote.company,
                roof_size: quote.roof_size,
                roof_type: quote.roof_type,
                project_city: quote.project_city,
                project_state: quote.project_state,
                project_date: quote.project_date.trunc_subsecs(3),
                submitted_at: quote
                    .submitted_at
                    .map_or(now, |at| at.trunc_subsecs(3)),
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    for chunk in rows.chunks(MAX_PARAMS / QUOTE_COLUMNS) {
        let mut params = Vec::with_capacity(chunk.len() * QUOTE_COLUMNS);
        for row in chunk {
            params.extend([
                DatabaseValue::String(row.id.clone()),
                DatabaseValue::String(row.contractor_name.clone()),
                DatabaseValue::String(row.company.clone()),
                DatabaseValue::Real64(row.roof_size),
                DatabaseValue::String(row.roof_type.label().to_string()),
                DatabaseValue::String(row.project_city.clone()),
                DatabaseValue::String(row.project_state.clone()),
                DatabaseValue::String(format_timestamp(&row.project_date)),
                DatabaseValue::String(format_timestamp(&row.submitted_at)),
            ]);
        }

        db.exec_raw_params(
            &format!(
                "INSERT INTO quotes (
                    id, contractor_name, company, roof_size, roof_type,
                    project_city, project_state, project_date, submitted_at
                ) VALUES {}",
                values_placeholders(chunk.len(), QUOTE_COLUMNS)
            ),
            &params,
        )
        .await?;
    }

    Ok(rows)
}

/// Lists quotes matching `filter`, most recently submitted first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_quotes(db: &dyn Database, filter: &QuoteFilter) -> Result<Vec<QuoteRow>, DbError> {
    let mut where_clause = WhereClause::default();
    if let Some(state) = &filter.state {
        where_clause.push("project_state", "=", DatabaseValue::String(state.clone()));
    }
    if let Some(roof_type) = filter.roof_type {
        where_clause.push(
            "roof_type",
            "=",
            DatabaseValue::String(roof_type.label().to_string()),
        );
    }

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT * FROM quotes{} ORDER BY submitted_at DESC, id",
                where_clause.sql()
            ),
            &where_clause.params,
        )
        .await?;

    rows.iter().map(quote_from_row).collect()
}

/// Returns the total number of stored quotes.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_quotes(db: &dyn Database) -> Result<u64, DbError> {
    count_rows(db, "quotes").await
}

/// Returns the distinct state abbreviations present in submitted quotes,
/// sorted ascending.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn distinct_quote_states(db: &dyn Database) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT DISTINCT project_state FROM quotes ORDER BY project_state",
            &[],
        )
        .await?;

    rows.iter().map(|row| text(row, "project_state")).collect()
}

/// Returns the distinct roof types present in submitted quotes, in
/// [`RoofType::all`] order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored roof type is unknown.
pub async fn distinct_quote_roof_types(db: &dyn Database) -> Result<Vec<RoofType>, DbError> {
    let rows = db
        .query_raw_params("SELECT DISTINCT roof_type FROM quotes", &[])
        .await?;

    let mut roof_types = rows
        .iter()
        .map(|row| roof_type(row, "roof_type"))
        .collect::<Result<Vec<_>, DbError>>()?;
    roof_types.sort_unstable();

    Ok(roof_types)
}

/// Returns the values for populating the dashboard filter controls.
///
/// States are labelled with their full name when known and fall back to
/// the stored abbreviation otherwise.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails.
pub async fn quote_filter_options(db: &dyn Database) -> Result<FilterOptions, DbError> {
    let states = distinct_quote_states(db)
        .await?
        .into_iter()
        .map(|code| {
            let name = states::state_name(&code).map_or_else(|| code.clone(), str::to_string);
            StateOption { code, name }
        })
        .collect();

    Ok(FilterOptions {
        states,
        roof_types: distinct_quote_roof_types(db).await?,
    })
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Validates and stores a new project.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if the payload is invalid, or another
/// [`DbError`] if the insert fails.
pub async fn insert_project(db: &dyn Database, project: NewProject) -> Result<ProjectRow, DbError> {
    let mut rows = insert_projects(db, vec![project]).await?;
    rows.pop().ok_or_else(|| DbError::Conversion {
        message: "Project insert returned no row".to_string(),
    })
}

/// Validates and stores a batch of projects, returning the stored rows in
/// input order.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for the first invalid payload (nothing
/// is written in that case), or another [`DbError`] if an insert fails.
pub async fn insert_projects(
    db: &dyn Database,
    projects: Vec<NewProject>,
) -> Result<Vec<ProjectRow>, DbError> {
    let now = Utc::now().trunc_subsecs(3);
    let rows = projects
        .into_iter()
        .map(|project| {
            let project = project.validated()?;
            Ok(ProjectRow {
                id: uuid::Uuid::new_v4().to_string(),
                contractor_name: project.contractor_name,
                company: project.company,
                roof_size: project.roof_size,
                roof_type: project.roof_type,
                project_city: project.project_city,
                project_state: project.project_state,
                project_date: project.project_date.trunc_subsecs(3),
                completed: project.completed,
                energy_savings: project.energy_savings,
                cost_savings: project.cost_savings,
                temperature_reduction: project.temperature_reduction,
                installation_date: project.installation_date.map(|d| d.trunc_subsecs(3)),
                created_at: now,
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    for chunk in rows.chunks(MAX_PARAMS / PROJECT_COLUMNS) {
        let mut params = Vec::with_capacity(chunk.len() * PROJECT_COLUMNS);
        for row in chunk {
            params.extend([
                DatabaseValue::String(row.id.clone()),
                DatabaseValue::String(row.contractor_name.clone()),
                DatabaseValue::String(row.company.clone()),
                DatabaseValue::Real64(row.roof_size),
                DatabaseValue::String(row.roof_type.label().to_string()),
                DatabaseValue::String(row.project_city.clone()),
                DatabaseValue::String(row.project_state.clone()),
                DatabaseValue::String(format_timestamp(&row.project_date)),
                DatabaseValue::Int64(i64::from(row.completed)),
                DatabaseValue::Real64(row.energy_savings),
                DatabaseValue::Real64(row.cost_savings),
                DatabaseValue::Real64(row.temperature_reduction),
                row.installation_date
                    .as_ref()
                    .map_or(DatabaseValue::Null, |d| {
                        DatabaseValue::String(format_timestamp(d))
                    }),
                DatabaseValue::String(format_timestamp(&row.created_at)),
            ]);
        }

        db.exec_raw_params(
            &format!(
                "INSERT INTO projects (
                    id, contractor_name, company, roof_size, roof_type,
                    project_city, project_state, project_date, completed,
                    energy_savings, cost_savings, temperature_reduction,
                    installation_date, created_at
                ) VALUES {}",
                values_placeholders(chunk.len(), PROJECT_COLUMNS)
            ),
            &params,
        )
        .await?;
    }

    Ok(rows)
}

/// Lists projects matching `filter`, newest project date first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_projects(
    db: &dyn Database,
    filter: &ProjectFilter,
) -> Result<Vec<ProjectRow>, DbError> {
    let mut where_clause = WhereClause::default();
    if let Some(state) = &filter.state {
        where_clause.push("project_state", "=", DatabaseValue::String(state.clone()));
    }
    if let Some(roof_type) = filter.roof_type {
        where_clause.push(
            "roof_type",
            "=",
            DatabaseValue::String(roof_type.label().to_string()),
        );
    }
    if let Some(from) = &filter.date_from {
        where_clause.push(
            "project_date",
            ">=",
            DatabaseValue::String(format_timestamp(from)),
        );
    }
    if let Some(to) = &filter.date_to {
        where_clause.push(
            "project_date",
            "<=",
            DatabaseValue::String(format_timestamp(to)),
        );
    }

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT * FROM projects{} ORDER BY project_date DESC, id",
                where_clause.sql()
            ),
            &where_clause.params,
        )
        .await?;

    rows.iter().map(project_from_row).collect()
}

/// Returns the total number of stored projects.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_projects(db: &dyn Database) -> Result<u64, DbError> {
    count_rows(db, "projects").await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accumulates `column op $n` fragments joined with `AND`.
#[derive(Default)]
struct WhereClause {
    frags: Vec<String>,
    params: Vec<DatabaseValue>,
}

impl WhereClause {
    fn push(&mut self, column: &str, op: &str, value: DatabaseValue) {
        self.params.push(value);
        self.frags
            .push(format!("{column} {op} ${}", self.params.len()));
    }

    fn sql(&self) -> String {
        if self.frags.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.frags.join(" AND "))
        }
    }
}

/// Builds `($1, $2, ...), ($n+1, ...)` for a multi-row insert.
fn values_placeholders(rows: usize, columns: usize) -> String {
    (0..rows)
        .map(|r| {
            let cols: Vec<String> = (1..=columns)
                .map(|c| format!("${}", r * columns + c))
                .collect();
            format!("({})", cols.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

async fn count_rows(db: &dyn Database, table: &str) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(&format!("SELECT COUNT(*) AS count FROM {table}"), &[])
        .await?;

    let Some(row) = rows.first() else {
        return Ok(0);
    };

    let count: i64 = row.to_value("count").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse {table} count: {e}"),
    })?;

    row_count(table, count)
}

fn row_count(table: &str, count: i64) -> Result<u64, DbError> {
    u64::try_from(count).map_err(|_| DbError::Conversion {
        message: format!("Negative {table} count: {count}"),
    })
}

fn text(row: &Row, column: &str) -> Result<String, DbError> {
    row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to read {column}: {e}"),
    })
}

fn real(row: &Row, column: &str) -> Result<f64, DbError> {
    row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to read {column}: {e}"),
    })
}

fn timestamp(row: &Row, column: &str) -> Result<DateTime<Utc>, DbError> {
    let raw = text(row, column)?;
    parse_date(&raw).ok_or_else(|| DbError::Conversion {
        message: format!("Invalid timestamp in {column}: {raw:?}"),
    })
}

fn optional_timestamp(row: &Row, column: &str) -> Result<Option<DateTime<Utc>>, DbError> {
    let raw: Option<String> = row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to read {column}: {e}"),
    })?;

    raw.map(|raw| {
        parse_date(&raw).ok_or_else(|| DbError::Conversion {
            message: format!("Invalid timestamp in {column}: {raw:?}"),
        })
    })
    .transpose()
}

fn flag(row: &Row, column: &str) -> Result<bool, DbError> {
    let value: i64 = row.to_value(column).map_err(|e| DbError::Conversion {
        message: format!("Failed to read {column}: {e}"),
    })?;
    Ok(value != 0)
}

fn roof_type(row: &Row, column: &str) -> Result<RoofType, DbError> {
    let raw = text(row, column)?;
    RoofType::from_str(&raw).map_err(|_| DbError::Conversion {
        message: format!("Unknown roof type in {column}: {raw:?}"),
    })
}

fn quote_from_row(row: &Row) -> Result<QuoteRow, DbError> {
    Ok(QuoteRow {
        id: text(row, "id")?,
        contractor_name: text(row, "contractor_name")?,
        company: text(row, "company")?,
        roof_size: real(row, "roof_size")?,
        roof_type: roof_type(row, "roof_type")?,
        project_city: text(row, "project_city")?,
        project_state: text(row, "project_state")?,
        project_date: timestamp(row, "project_date")?,
        submitted_at: timestamp(row, "submitted_at")?,
    })
}

fn project_from_row(row: &Row) -> Result<ProjectRow, DbError> {
    Ok(ProjectRow {
        id: text(row, "id")?,
        contractor_name: text(row, "contractor_name")?,
        company: text(row, "company")?,
        roof_size: real(row, "roof_size")?,
        roof_type: roof_type(row, "roof_type")?,
        project_city: text(row, "project_city")?,
        project_state: text(row, "project_state")?,
        project_date: timestamp(row, "project_date")?,
        completed: flag(row, "completed")?,
        energy_savings: real(row, "energy_savings")?,
        cost_savings: real(row, "cost_savings")?,
        temperature_reduction: real(row, "temperature_reduction")?,
        installation_date: optional_timestamp(row, "installation_date")?,
        created_at: timestamp(row, "created_at")?,
    })
}
