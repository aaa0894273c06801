use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::{dispatch, AppState};
use crate::models::{referrals::NewReferral, Paging};
use crate::services::{referrals::ReferralRequest, ServiceError};

pub async fn get_referrals(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<impl IntoResponse, ServiceError> {
    let referrals = dispatch(&state.referral_channel, |response| {
        ReferralRequest::GetReferrals { paging, response }
    })
    .await?;

    Ok(Json(json!({ "referrals": referrals })))
}

pub async fn add_referral(
    State(state): State<AppState>,
    Json(referral): Json<NewReferral>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = dispatch(&state.referral_channel, |response| {
        ReferralRequest::AddReferral { referral, response }
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
