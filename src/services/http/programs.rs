use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::{dispatch, AppState};
use crate::models::{
    programs::{NewProgram, ProgramUpdate},
    Paging,
};
use crate::services::{programs::ProgramRequest, ServiceError};

pub async fn get_programs(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<impl IntoResponse, ServiceError> {
    let programs = dispatch(&state.program_channel, |response| {
        ProgramRequest::GetPrograms { paging, response }
    })
    .await?;

    Ok(Json(json!({ "programs": programs })))
}

pub async fn get_program(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let program = dispatch(&state.program_channel, |response| {
        ProgramRequest::GetProgram { id, response }
    })
    .await?;

    Ok(Json(json!({ "program": program })))
}

pub async fn add_program(
    State(state): State<AppState>,
    Json(program): Json<NewProgram>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = dispatch(&state.program_channel, |response| {
        ProgramRequest::AddProgram { program, response }
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_program(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProgramUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    let program = dispatch(&state.program_channel, |response| {
        ProgramRequest::UpdateProgram {
            id,
            update,
            response,
        }
    })
    .await?;

    Ok(Json(json!({ "program": program })))
}
