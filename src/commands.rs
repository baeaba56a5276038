use std::path::{Path, PathBuf};

use careerlog::config::{self, CareerlogConfig, DEFAULT_CORS_ORIGIN, DEFAULT_PORT};
use careerlog::dates::parse_date;
use careerlog::ui::{self, Icons};
use careerlog::{DateRange, SqliteStore};
use uuid::Uuid;

fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    if !database.exists() {
        anyhow::bail!(
            "no database at {} (run `careerlog init` or `careerlog serve` first)",
            database.display()
        );
    }
    Ok(SqliteStore::open(database)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run_version() -> anyhow::Result<()> {
    ui::header(Icons::BRIEFCASE, &format!("careerlog {}", env!("CARGO_PKG_VERSION")));
    Ok(())
}

pub fn run_init(config_path: &Path, force: bool) -> anyhow::Result<()> {
    let project_root = config::config_dir(config_path);
    let database = config::default_database_path_in(Path::new(""));

    let config = CareerlogConfig {
        database: Some(database.to_string_lossy().into_owned()),
        port: Some(DEFAULT_PORT),
        cors_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
    };
    config::write_config(config_path, &config, force)?;

    let db_path = project_root.join(&database);
    config::ensure_db_dir(&db_path)?;
    SqliteStore::open(&db_path)?;
    config::ensure_gitignore(project_root)?;

    ui::success(&format!("Wrote {}", config_path.display()));
    ui::info("Database", &db_path.display().to_string());
    Ok(())
}

pub fn run_persons(database: &Path, company: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let records = match company {
        Some(company) => store.find_persons_by_company(company)?,
        None => store.list_person_records()?,
    };

    if json {
        return print_json(&records);
    }

    match company {
        Some(company) => ui::header(Icons::SEARCH, &format!("Persons who worked at {company}")),
        None => ui::header(Icons::PERSON, "Persons"),
    }
    if records.is_empty() {
        ui::warn("No persons found.");
        return Ok(());
    }
    println!("{}", ui::person_table(&records));
    println!("{}", ui::muted(&format!("{} person(s)", records.len())));
    Ok(())
}

pub fn run_jobs(database: &Path, person: &str, from: &str, to: &str, json: bool) -> anyhow::Result<()> {
    let person_id = Uuid::parse_str(person)
        .map_err(|_| anyhow::anyhow!("invalid person id: {person}"))?;
    let range = DateRange::new(parse_date(from)?, parse_date(to)?);

    let store = open_store(database)?;
    let Some(owner) = store.get_person(&person_id)? else {
        anyhow::bail!("person not found: {person_id}");
    };
    let jobs = store.find_jobs_in_range(&person_id, &range)?;

    if json {
        return print_json(&jobs);
    }

    ui::header(
        Icons::CALENDAR,
        &format!("Jobs of {} during {}", owner.full_name(), range),
    );
    if jobs.is_empty() {
        ui::warn("No jobs overlap this range.");
        return Ok(());
    }
    println!("{}", ui::job_table(&jobs));
    Ok(())
}

pub fn run_stats(database: &Path) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let stats = store.stats()?;
    tracing::debug!("{}", stats);

    ui::header(Icons::STATS, "Database statistics");
    ui::info("Database", &ui::dim(&database.display().to_string()));
    println!("{}", ui::stats_table(&stats));
    Ok(())
}

/// Database path for commands that read the store: flag, then config file, then default.
pub fn resolve_database(flag: Option<PathBuf>, config_path: &Path) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    let config = config::load_config(Some(config_path))?;
    Ok(config
        .and_then(|c| c.database_path(config_path))
        .unwrap_or_else(|| config::default_database_path_in(Path::new("."))))
}
