//! Dashboard statistics over a filtered set of projects.

use chrono::Datelike;
use quote_vision_analytics_models::ProjectStats;
use quote_vision_database_models::{ProjectFilter, ProjectRow};

/// Rounds to the nearest integer, with ties going toward positive infinity
/// (`-2.5` rounds to `-2`, `2.5` to `3`).
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Formats the `YYYY-MM` bucket key for a timestamp.
fn month_key(date: &impl Datelike) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Computes the dashboard statistics for the projects matching `filter`.
///
/// `records` is never modified. Every aggregate is computed in a single
/// pass over the matching projects. With no matching projects all counts
/// and sums are zero, both averages are `0.0` and every breakdown is empty.
///
/// Averages are rounded with [`round_half_up`]: the roof size to a whole
/// square foot, the temperature reduction to one decimal place. Sums are
/// left unrounded.
#[must_use]
pub fn compute_stats(records: &[ProjectRow], filter: &ProjectFilter) -> ProjectStats {
    let mut stats = ProjectStats::default();
    let mut total_roof_size = 0.0;
    let mut total_temperature_reduction = 0.0;

    for project in records.iter().filter(|p| filter.matches(p)) {
        stats.total_projects += 1;
        if project.completed {
            stats.completed_projects += 1;
        }

        total_roof_size += project.roof_size;
        total_temperature_reduction += project.temperature_reduction;
        stats.total_energy_savings += project.energy_savings;
        stats.total_cost_savings += project.cost_savings;

        *stats
            .projects_by_state
            .entry(project.project_state.clone())
            .or_insert(0) += 1;
        *stats
            .projects_by_roof_type
            .entry(project.roof_type)
            .or_insert(0) += 1;
        *stats
            .energy_savings_by_roof_type
            .entry(project.roof_type)
            .or_insert(0.0) += project.energy_savings;

        if let Some(installed) = &project.installation_date {
            *stats
                .projects_by_month
                .entry(month_key(installed))
                .or_insert(0) += 1;
        }
    }

    if stats.total_projects > 0 {
        #[allow(clippy::cast_precision_loss)]
        let n = stats.total_projects as f64;
        stats.average_roof_size = round_half_up(total_roof_size / n);
        stats.average_temperature_reduction =
            round_half_up(total_temperature_reduction / n * 10.0) / 10.0;
    }

    log::debug!(
        "compute_stats: {} of {} projects matched",
        stats.total_projects,
        records.len()
    );

    stats
}
