use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::{dispatch, AppState};
use crate::models::{members::NewMember, Paging};
use crate::services::{members::MemberRequest, ServiceError};

pub async fn get_members(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<impl IntoResponse, ServiceError> {
    let members = dispatch(&state.member_channel, |response| MemberRequest::GetMembers {
        paging,
        response,
    })
    .await?;

    Ok(Json(json!({ "members": members })))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let member = dispatch(&state.member_channel, |response| MemberRequest::GetMember {
        id,
        response,
    })
    .await?;

    Ok(Json(json!({ "member": member })))
}

pub async fn add_member(
    State(state): State<AppState>,
    Json(member): Json<NewMember>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = dispatch(&state.member_channel, |response| MemberRequest::AddMember {
        member,
        response,
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
