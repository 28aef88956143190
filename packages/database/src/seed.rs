//! Demo data generation for empty databases.
//!
//! Mirrors the dashboard's demo dataset: a handful of sunbelt and mountain
//! states, 50 quotes and 1000 projects whose savings scale with the roof
//! type's energy efficiency factor.

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use quote_vision_database_models::{NewProject, NewQuote};
use quote_vision_roofing_models::RoofType;
use rand::Rng;
use rand::seq::SliceRandom as _;
use switchy_database::Database;

use crate::DbError;
use crate::queries::{count_projects, count_quotes, insert_projects, insert_quotes};

/// States and cities drawn from when generating demo rows.
pub const SEED_LOCATIONS: &[(&str, [&str; 5])] = &[
    ("AZ", ["Phoenix", "Tucson", "Scottsdale", "Mesa", "Flagstaff"]),
    (
        "CA",
        ["Los Angeles", "San Francisco", "San Diego", "Sacramento", "Fresno"],
    ),
    ("TX", ["Houston", "Austin", "Dallas", "San Antonio", "El Paso"]),
    ("FL", ["Miami", "Orlando", "Tampa", "Jacksonville", "Tallahassee"]),
    (
        "NV",
        ["Las Vegas", "Reno", "Henderson", "Carson City", "North Las Vegas"],
    ),
    (
        "NM",
        ["Albuquerque", "Santa Fe", "Las Cruces", "Roswell", "Farmington"],
    ),
    (
        "CO",
        ["Denver", "Colorado Springs", "Fort Collins", "Boulder", "Aurora"],
    ),
];

/// Number of quotes inserted into an empty `quotes` table.
pub const DEFAULT_QUOTE_COUNT: usize = 50;

/// Number of projects inserted into an empty `projects` table.
pub const DEFAULT_PROJECT_COUNT: usize = 1000;

/// How much demo data to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedConfig {
    /// Quotes to insert when the table is empty.
    pub quote_count: usize,
    /// Projects to insert when the table is empty.
    pub project_count: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            quote_count: DEFAULT_QUOTE_COUNT,
            project_count: DEFAULT_PROJECT_COUNT,
        }
    }
}

/// What [`seed_if_empty`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Quotes inserted (0 if the table already had rows).
    pub quotes_inserted: usize,
    /// Projects inserted (0 if the table already had rows).
    pub projects_inserted: usize,
}

/// Fills each empty table with generated demo rows. Tables that already
/// hold rows are left untouched.
///
/// # Errors
///
/// Returns [`DbError`] if counting or inserting fails.
pub async fn seed_if_empty<R: Rng + Send>(
    db: &dyn Database,
    config: SeedConfig,
    rng: &mut R,
) -> Result<SeedSummary, DbError> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    let existing_quotes = count_quotes(db).await?;
    if existing_quotes == 0 {
        log::info!("Seeding {} quotes...", config.quote_count);
        let quotes = generate_quotes(config.quote_count, now, rng);
        summary.quotes_inserted = insert_quotes(db, quotes).await?.len();
    } else {
        log::info!("Database already has {existing_quotes} quotes, skipping quote seeding");
    }

    let existing_projects = count_projects(db).await?;
    if existing_projects == 0 {
        log::info!("Seeding {} projects...", config.project_count);
        let projects = generate_projects(config.project_count, now, rng);
        summary.projects_inserted = insert_projects(db, projects).await?.len();
    } else {
        log::info!("Database already has {existing_projects} projects, skipping project seeding");
    }

    log::info!(
        "Seeding complete: {} quotes, {} projects inserted",
        summary.quotes_inserted,
        summary.projects_inserted
    );

    Ok(summary)
}

/// Generates `count` demo quotes with project dates between 2023-01-01
/// and `now`.
#[must_use]
pub fn generate_quotes<R: Rng>(count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<NewQuote> {
    let start = utc_date(2023, 1, 1);

    (0..count)
        .map(|i| {
            let (state, city) = pick_location(rng);
            NewQuote {
                contractor_name: format!("Contractor {}", i + 1),
                company: format!("Company {}", i + 1),
                roof_size: random_roof_size(rng),
                roof_type: pick_roof_type(rng),
                project_city: city.to_string(),
                project_state: state.to_string(),
                project_date: random_date(start, now, rng),
                submitted_at: Some(now),
            }
        })
        .collect()
}

/// Generates `count` demo projects with project dates between 2023-01-01
/// and `now`.
///
/// Roughly 80% are completed; completed projects get an installation date
/// between 2023-02-01 and `now`. Contractor and company names cycle so the
/// dataset has repeat customers.
#[must_use]
pub fn generate_projects<R: Rng>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<NewProject> {
    let start = utc_date(2023, 1, 1);
    let install_start = utc_date(2023, 2, 1);

    (0..count)
        .map(|i| {
            let (state, city) = pick_location(rng);
            let roof_type = pick_roof_type(rng);
            let roof_size = random_roof_size(rng);

            let energy_savings = (roof_size
                * roof_type.energy_efficiency_factor()
                * rng.gen_range(0.8..1.2))
            .round();
            let cost_savings = (energy_savings * 0.15 * rng.gen_range(0.9..1.1)).round();
            let temperature_reduction = (rng.gen_range(5.0..15.0_f64) * 10.0).round() / 10.0;
            let completed = rng.gen_bool(0.8);

            NewProject {
                contractor_name: format!("Contractor {}", i % 50 + 1),
                company: format!("Company {}", i % 30 + 1),
                roof_size,
                roof_type,
                project_city: city.to_string(),
                project_state: state.to_string(),
                project_date: random_date(start, now, rng),
                completed,
                energy_savings,
                cost_savings,
                temperature_reduction,
                installation_date: completed.then(|| random_date(install_start, now, rng)),
            }
        })
        .collect()
}

fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn pick_location<R: Rng>(rng: &mut R) -> (&'static str, &'static str) {
    let (state, cities) = SEED_LOCATIONS[rng.gen_range(0..SEED_LOCATIONS.len())];
    (state, cities[rng.gen_range(0..cities.len())])
}

fn pick_roof_type<R: Rng>(rng: &mut R) -> RoofType {
    RoofType::all()
        .choose(rng)
        .copied()
        .unwrap_or(RoofType::Metal)
}

/// Whole square feet in `[1000, 11000)`.
fn random_roof_size<R: Rng>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(1000_u32..11000))
}

/// Uniform instant in `[start, end)`, or `start` if the range is empty.
fn random_date<R: Rng>(start: DateTime<Utc>, end: DateTime<Utc>, rng: &mut R) -> DateTime<Utc> {
    let span = (end - start).num_milliseconds();
    if span <= 0 {
        return start;
    }
    start + Duration::milliseconds(rng.gen_range(0..span))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;
    use crate::test_support::TempDb;

    fn now() -> DateTime<Utc> {
        utc_date(2024, 6, 30)
    }

    #[test]
    fn generated_projects_follow_demo_rules() {
        let mut rng = StdRng::seed_from_u64(7);
        let projects = generate_projects(500, now(), &mut rng);
        assert_eq!(projects.len(), 500);

        for (i, p) in projects.iter().enumerate() {
            assert_eq!(p.contractor_name, format!("Contractor {}", i % 50 + 1));
            assert_eq!(p.company, format!("Company {}", i % 30 + 1));
            assert!((1000.0..11000.0).contains(&p.roof_size));
            assert!(p.roof_size.fract().abs() < f64::EPSILON);

            let (_, cities) = SEED_LOCATIONS
                .iter()
                .find(|(state, _)| *state == p.project_state)
                .unwrap();
            assert!(cities.contains(&p.project_city.as_str()));

            assert!(p.project_date >= utc_date(2023, 1, 1) && p.project_date < now());
            assert!((5.0..=15.0).contains(&p.temperature_reduction));

            let factor = p.roof_type.energy_efficiency_factor();
            assert!(p.energy_savings >= (p.roof_size * factor * 0.8).floor());
            assert!(p.energy_savings <= (p.roof_size * factor * 1.2).ceil());

            assert_eq!(p.completed, p.installation_date.is_some());
            if let Some(installed) = p.installation_date {
                assert!(installed >= utc_date(2023, 2, 1));
            }
            assert!(p.clone().validated().is_ok());
        }

        let completed = projects.iter().filter(|p| p.completed).count();
        assert!((300..=480).contains(&completed), "completed = {completed}");
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = generate_quotes(20, now(), &mut StdRng::seed_from_u64(42));
        let b = generate_quotes(20, now(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a[19].contractor_name, "Contractor 20");
        assert!(a.iter().all(|q| q.submitted_at == Some(now())));
    }

    #[test]
    fn empty_date_range_collapses_to_start() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = now();
        assert_eq!(random_date(start, start, &mut rng), start);
        assert_eq!(random_date(start, utc_date(2020, 1, 1), &mut rng), start);
    }

    #[tokio::test]
    async fn seeds_only_empty_tables() {
        let temp = TempDb::new().await;
        let db = temp.db.as_ref();
        let config = SeedConfig {
            quote_count: 5,
            project_count: 120,
        };
        let mut rng = StdRng::seed_from_u64(3);

        let first = seed_if_empty(db, config, &mut rng).await.unwrap();
        assert_eq!(
            first,
            SeedSummary {
                quotes_inserted: 5,
                projects_inserted: 120,
            }
        );

        let second = seed_if_empty(db, config, &mut rng).await.unwrap();
        assert_eq!(second, SeedSummary::default());
        assert_eq!(count_quotes(db).await.unwrap(), 5);
        assert_eq!(count_projects(db).await.unwrap(), 120);
    }
}
