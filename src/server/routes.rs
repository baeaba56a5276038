use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::dates::parse_date;
use crate::server::{ApiError, AppState};
use crate::{DateRange, Error, Job, NewJob, NewPerson, Person, PersonRecord};

pub const NO_PERSONS_FOR_COMPANY: &str = "No persons found for this company.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeParams {
    /// Both bounds are mandatory; blank counts as missing.
    pub fn to_range(&self) -> Result<DateRange, ApiError> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let (Some(start), Some(end)) = (present(&self.start_date), present(&self.end_date)) else {
            return Err(ApiError::BadRequest(
                "Both startDate and endDate are required.".to_string(),
            ));
        };
        Ok(DateRange::new(parse_date(&start)?, parse_date(&end)?))
    }
}

/// Company search answers with the matches, or with a message when there are none.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CompanySearchResponse {
    Persons(Vec<PersonRecord>),
    Empty { message: String },
}

pub async fn welcome() -> &'static str {
    "Welcome to the careerlog server!"
}

pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found.".to_string())
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let Json(payload) = payload?;
    let person = payload.into_person(Utc::now())?;

    state.store.lock().await.insert_person(&person)?;
    tracing::info!(person_id = %person.id, "created person");

    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn list_persons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PersonRecord>>, ApiError> {
    let records = state.store.lock().await.list_person_records()?;
    Ok(Json(records))
}

pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PersonRecord>, ApiError> {
    // an id that is not a UUID cannot name a stored person
    let not_found = || ApiError::from(Error::PersonNotFound(id.clone()));
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let record = state.store.lock().await.get_person_record(&uuid)?;
    record.map(Json).ok_or_else(not_found)
}

pub async fn persons_by_company(
    State(state): State<Arc<AppState>>,
    Path(company): Path<String>,
) -> Result<Json<CompanySearchResponse>, ApiError> {
    let records = state.store.lock().await.find_persons_by_company(&company)?;
    tracing::debug!(%company, matches = records.len(), "company search");

    if records.is_empty() {
        return Ok(Json(CompanySearchResponse::Empty {
            message: NO_PERSONS_FOR_COMPANY.to_string(),
        }));
    }
    Ok(Json(CompanySearchResponse::Persons(records)))
}

pub async fn jobs_in_range(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let Query(params) = params?;
    let range = params.to_range()?;
    let person_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid person id: {id}")))?;

    let jobs = state.store.lock().await.find_jobs_in_range(&person_id, &range)?;
    Ok(Json(jobs))
}

pub async fn create_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let Json(payload) = payload?;
    let job = payload.into_job()?;

    state.store.lock().await.insert_job(&job)?;
    tracing::info!(job_id = %job.id, person_id = %job.person_id, "created job");

    Ok((StatusCode::CREATED, Json(job)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{AppState, error::INTERNAL_ERROR_MESSAGE, router};
    use crate::storage::SqliteStore;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tower_http::cors::CorsLayer;

    fn app() -> Router {
        let store = SqliteStore::open_in_memory().unwrap();
        router(AppState::new(store), CorsLayer::permissive())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_ada(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/persons",
            Some(json!({"firstname": "Ada", "lastname": "Lovelace", "birthdate": "1990-01-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_job_for(app: &Router, person_id: &str, company: &str, start: &str, end: Value) -> StatusCode {
        let (status, _) = send(
            app,
            Method::POST,
            "/jobs",
            Some(json!({
                "company": company,
                "position": "Engineer",
                "startDate": start,
                "endDate": end,
                "personId": person_id,
            })),
        )
        .await;
        status
    }

    #[tokio::test]
    async fn test_ada_walkthrough() {
        let app = app();
        let ada = create_ada(&app).await;

        assert_eq!(
            create_job_for(&app, &ada, "OpenAI", "2023-01-01", Value::Null).await,
            StatusCode::CREATED
        );

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/persons/{ada}/jobs?startDate=2023-06-01&endDate=2023-06-30"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let jobs = body.as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["company"], "OpenAI");
        assert!(jobs[0]["endDate"].is_null());
    }

    #[tokio::test]
    async fn test_create_person_rejects_ancient_birthdate() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/persons",
            Some(json!({"firstname": "Old", "lastname": "Timer", "birthdate": "1800-01-01"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Birth date is too far in the past.");
    }

    #[tokio::test]
    async fn test_create_person_rejects_malformed_body() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/persons", Some(json!({"firstname": "Ada"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(
            &app,
            Method::POST,
            "/persons",
            Some(json!({"firstname": "Ada", "lastname": "Lovelace", "birthdate": "soon"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_job_validation() {
        let app = app();
        let ada = create_ada(&app).await;

        assert_eq!(
            create_job_for(&app, &ada, "Acme", "2020-05-01", json!("2020-04-30")).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            create_job_for(&app, &ada, "Acme", "2020-05-01", json!("2020-05-01")).await,
            StatusCode::CREATED
        );

        // foreign key violation
        let stranger = Uuid::new_v4().to_string();
        assert_eq!(
            create_job_for(&app, &stranger, "Acme", "2020-05-01", Value::Null).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            create_job_for(&app, "not-a-uuid", "Acme", "2020-05-01", Value::Null).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_get_person() {
        let app = app();
        let ada = create_ada(&app).await;
        create_job_for(&app, &ada, "OpenAI", "2023-01-01", Value::Null).await;

        let (status, body) = send(&app, Method::GET, &format!("/persons/{ada}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["firstname"], "Ada");
        assert_eq!(body["jobs"].as_array().unwrap().len(), 1);

        let missing = Uuid::new_v4();
        let (status, body) = send(&app, Method::GET, &format!("/persons/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, Method::GET, "/persons/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_persons_nests_jobs() {
        let app = app();
        let ada = create_ada(&app).await;
        create_job_for(&app, &ada, "Acme", "2020-01-01", json!("2020-12-31")).await;
        create_job_for(&app, &ada, "OpenAI", "2023-01-01", Value::Null).await;

        let (status, body) = send(&app, Method::GET, "/persons", None).await;
        assert_eq!(status, StatusCode::OK);
        let persons = body.as_array().unwrap();
        assert_eq!(persons.len(), 1);
        let jobs = persons[0]["jobs"].as_array().unwrap();
        assert_eq!(jobs[0]["company"], "Acme");
        assert_eq!(jobs[1]["company"], "OpenAI");
    }

    #[tokio::test]
    async fn test_persons_by_company() {
        let app = app();
        let ada = create_ada(&app).await;
        create_job_for(&app, &ada, "Acme", "2020-01-01", json!("2020-12-31")).await;
        create_job_for(&app, &ada, "OpenAI", "2023-01-01", Value::Null).await;

        let (status, body) = send(&app, Method::GET, "/persons/by-company/OpenAI", None).await;
        assert_eq!(status, StatusCode::OK);
        let persons = body.as_array().unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0]["jobs"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, "/persons/by-company/Initech", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], NO_PERSONS_FOR_COMPANY);
    }

    #[tokio::test]
    async fn test_company_names_are_percent_decoded() {
        let app = app();
        let ada = create_ada(&app).await;
        create_job_for(&app, &ada, "Big Co", "2020-01-01", Value::Null).await;

        let (status, body) = send(&app, Method::GET, "/persons/by-company/Big%20Co", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_array());
    }

    #[tokio::test]
    async fn test_jobs_in_range_requires_both_dates() {
        let app = app();
        let ada = create_ada(&app).await;

        for query in ["", "?startDate=2023-01-01", "?endDate=2023-01-01", "?startDate=&endDate=2023-01-01"] {
            let (status, body) = send(&app, Method::GET, &format!("/persons/{ada}/jobs{query}"), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "query {query:?}");
            assert_eq!(body["error"], "Both startDate and endDate are required.");
        }

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/persons/{ada}/jobs?startDate=2023-01-01&endDate=whenever"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/persons/{ada}/jobs?startDate=2023-01-01&endDate=%2B10000-01-01"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::GET,
            "/persons/not-a-uuid/jobs?startDate=2023-01-01&endDate=2023-12-31",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid person id: not-a-uuid");
    }

    #[tokio::test]
    async fn test_create_job_rejects_five_digit_years() {
        let app = app();
        let ada = create_ada(&app).await;

        assert_eq!(
            create_job_for(&app, &ada, "Acme", "+10000-01-01", Value::Null).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            create_job_for(&app, &ada, "Acme", "9999-01-01", json!("+10000-01-01")).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            create_job_for(&app, &ada, "Acme", "9999-01-01", json!("9999-12-31")).await,
            StatusCode::CREATED
        );

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/persons/{ada}/jobs?startDate=2023-01-01&endDate=2023-12-31"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_jobs_in_range_boundaries() {
        let app = app();
        let ada = create_ada(&app).await;
        create_job_for(&app, &ada, "Acme", "2020-01-01", json!("2020-12-31")).await;

        let cases = [
            ("2020-06-01", "2020-06-30", 1),
            ("2019-01-01", "2020-01-01", 1),
            ("2021-01-01", "2021-12-31", 0),
        ];
        for (start, end, expected) in cases {
            let (status, body) = send(
                &app,
                Method::GET,
                &format!("/persons/{ada}/jobs?startDate={start}&endDate={end}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body.as_array().unwrap().len(), expected, "{start}..{end}");
        }
    }

    #[tokio::test]
    async fn test_root_and_unknown_routes() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found.");
        assert_ne!(body["error"], INTERNAL_ERROR_MESSAGE);
    }
}
