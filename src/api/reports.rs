//! Report endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::report::{JobStatus, JobTrigger, LibraryReport},
    AppState,
};

use super::{ApiPath, AuthenticatedUser};

#[derive(Serialize)]
#[serde(untagged)]
pub enum LatestReportResponse {
    Report(LibraryReport),
    Missing {
        #[serde(rename = "Detail")]
        detail: String,
    },
}

#[derive(Serialize)]
pub struct GenerateReportResponse {
    pub task_id: String,
    pub message: String,
}

/// Latest persisted report, or a "no report" detail on a fresh deployment
pub async fn latest_report(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<LatestReportResponse>> {
    let response = match state.services.reports.latest().await? {
        Some(report) => LatestReportResponse::Report(report),
        None => LatestReportResponse::Missing {
            detail: "No borrow report exists.".to_string(),
        },
    };
    Ok(Json(response))
}

/// Queue report generation and answer immediately with the task id
pub async fn generate_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<(StatusCode, Json<GenerateReportResponse>)> {
    let task_id = state.services.jobs.enqueue(JobTrigger::Api).await?;
    tracing::debug!(%task_id, requested_by = %claims.sub, "Report requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateReportResponse {
            task_id: task_id.to_string(),
            message: "Report generation started".to_string(),
        }),
    ))
}

/// Status of a report job
pub async fn report_task(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(task_id): ApiPath<Uuid>,
) -> AppResult<Json<JobStatus>> {
    Ok(Json(state.services.jobs.status(task_id).await?))
}
