//! Import profile handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use okazje_core::ImportProfileId;

use crate::db::ImportProfileRepository;
use crate::error::{AppError, Result};
use crate::import::ImportReport;
use crate::models::{CreateImportProfileInput, ImportProfile, ImportRun};
use crate::state::AppState;

const RECENT_RUNS: i64 = 10;

/// Profile detail with its latest runs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: ImportProfile,
    pub recent_runs: Vec<ImportRun>,
}

fn parse_profile_id(raw: &str) -> Result<ImportProfileId> {
    raw.trim()
        .parse::<i32>()
        .map(ImportProfileId::new)
        .map_err(|_| AppError::NotFound("Import profile".to_string()))
}

/// List import profiles.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ImportProfile>>> {
    let profiles = ImportProfileRepository::new(state.pool()).list().await?;
    Ok(Json(profiles))
}

/// Create an import profile.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateImportProfileInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ImportProfile>)> {
    let Json(input) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let input = input.normalize().map_err(AppError::BadRequest)?;

    let profile = ImportProfileRepository::new(state.pool())
        .create(&input)
        .await?;

    tracing::info!(profile_id = %profile.id, name = %profile.name, "Import profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Show a profile with its recent runs.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileDetail>> {
    let id = parse_profile_id(&id)?;
    let repo = ImportProfileRepository::new(state.pool());

    let profile = repo.get(id).await?;
    let recent_runs = repo.recent_runs(id, RECENT_RUNS).await?;

    Ok(Json(ProfileDetail {
        profile,
        recent_runs,
    }))
}

/// Delete a profile.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_profile_id(&id)?;
    ImportProfileRepository::new(state.pool()).delete(id).await?;

    tracing::info!(profile_id = %id, "Import profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Run an import for a profile and return its report.
///
/// Runs for the same profile are not allowed to overlap. The run continues
/// to completion if the client disconnects.
pub async fn run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImportReport>> {
    let id = parse_profile_id(&id)?;
    let profile = ImportProfileRepository::new(state.pool()).get(id).await?;

    let Some(handle) = state.spawn_import(profile) else {
        return Err(AppError::Database(crate::db::RepositoryError::Conflict(
            "import already running for this profile".to_string(),
        )));
    };

    let report = handle
        .await
        .map_err(|e| AppError::Internal(format!("import task failed: {e}")))??;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_id() {
        assert_eq!(
            parse_profile_id(" 12 ").ok(),
            Some(ImportProfileId::new(12))
        );
        assert!(matches!(parse_profile_id("abc"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_profile_detail_flattens_profile() {
        let now = chrono::Utc::now();
        let detail = ProfileDetail {
            profile: ImportProfile {
                id: ImportProfileId::new(3),
                name: "Zegarki".to_string(),
                keywords: "smartwatch".to_string(),
                category_id: None,
                target_category: "Elektronika".to_string(),
                min_rating: 4.5,
                min_discount_percent: 30,
                max_items: 50,
                quality_threshold: 60,
                auto_approve: false,
                created_at: now,
                updated_at: now,
            },
            recent_runs: Vec::new(),
        };

        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["id"], 3);
        assert_eq!(json["targetCategory"], "Elektronika");
        assert_eq!(json["recentRuns"], serde_json::json!([]));
    }
}
