use tabled::{Table, Tabled, settings::Style};

use crate::job::Job;
use crate::person::PersonRecord;
use crate::storage::DbStats;

#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Birthdate")]
    birthdate: String,
    #[tabled(rename = "Jobs")]
    jobs: usize,
    #[tabled(rename = "Current")]
    current: String,
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: usize,
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn person_table(records: &[PersonRecord]) -> String {
    let rows: Vec<PersonRow> = records
        .iter()
        .map(|record| PersonRow {
            id: record.person.id.to_string(),
            name: record.person.full_name(),
            birthdate: record.person.birthdate.to_string(),
            jobs: record.jobs.len(),
            current: record
                .ongoing_jobs()
                .map(|job| format!("{} @ {}", job.position, job.company))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    render(&rows)
}

pub fn job_table(jobs: &[Job]) -> String {
    let rows: Vec<JobRow> = jobs
        .iter()
        .map(|job| JobRow {
            company: job.company.clone(),
            position: job.position.clone(),
            start: job.start_date.to_string(),
            end: job
                .end_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "ongoing".to_string()),
        })
        .collect();
    render(&rows)
}

pub fn stats_table(stats: &DbStats) -> String {
    render(&[
        StatRow { metric: "Persons", value: stats.persons },
        StatRow { metric: "Jobs", value: stats.jobs },
        StatRow { metric: "Ongoing jobs", value: stats.ongoing_jobs },
        StatRow { metric: "Companies", value: stats.companies },
    ])
}
