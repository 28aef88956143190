//! CSV export of raw project rows for the dashboard download button.

use std::io::Write;

use quote_vision_database_models::ProjectRow;

use crate::AnalyticsError;

/// Column headers of the exported CSV, in order.
pub const CSV_HEADERS: [&str; 10] = [
    "Project ID",
    "Contractor",
    "Company",
    "Location",
    "Roof Type",
    "Size (sq ft)",
    "Energy Savings (kWh)",
    "Cost Savings ($)",
    "Status",
    "Project Date",
];

/// Writes `projects` as CSV to `writer`, one row per project in the given
/// order. Every field is quoted.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization or the underlying write
/// fails.
pub fn write_projects_csv<W: Write>(
    projects: &[ProjectRow],
    writer: W,
) -> Result<(), AnalyticsError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS)?;

    for project in projects {
        csv_writer.write_record([
            project.id.clone(),
            project.contractor_name.clone(),
            project.company.clone(),
            format!("{}, {}", project.project_city, project.project_state),
            project.roof_type.label().to_string(),
            project.roof_size.to_string(),
            project.energy_savings.to_string(),
            project.cost_savings.to_string(),
            if project.completed {
                "Completed".to_string()
            } else {
                "Pending".to_string()
            },
            project.project_date.format("%Y-%m-%d").to_string(),
        ])?;
    }

    csv_writer.flush()?;
    log::debug!("Exported {} projects to CSV", projects.len());

    Ok(())
}

/// Renders `projects` as a CSV string.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization fails.
pub fn projects_to_csv(projects: &[ProjectRow]) -> Result<String, AnalyticsError> {
    let mut buf = Vec::new();
    write_projects_csv(projects, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
