use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::{
    members::MemberRequest, programs::ProgramRequest, referrals::ReferralRequest, ServiceError,
};

mod members;
mod programs;
mod referrals;

#[derive(Clone)]
pub struct AppState {
    pub program_channel: mpsc::Sender<ProgramRequest>,
    pub member_channel: mpsc::Sender<MemberRequest>,
    pub referral_channel: mpsc::Sender<ReferralRequest>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ServiceError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "Timed out"),
            ServiceError::Configuration(_)
            | ServiceError::Persistence(_)
            | ServiceError::Unavailable(_) => {
                error!("Request failed: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(json!({
                "error": error,
                "details": self.to_string()
            })),
        )
            .into_response()
    }
}

/// Sends a request to a service and waits for its answer.
async fn dispatch<R, T>(
    channel: &mpsc::Sender<R>,
    request: impl FnOnce(oneshot::Sender<Result<T, ServiceError>>) -> R,
) -> Result<T, ServiceError> {
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(request(response_tx))
        .await
        .map_err(|e| ServiceError::Unavailable(format!("Failed to process request: {e}")))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Unavailable(format!("Failed to receive response: {e}")))?
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/programs",
            get(programs::get_programs).post(programs::add_program),
        )
        .route(
            "/v1/programs/{id}",
            get(programs::get_program).patch(programs::update_program),
        )
        .route(
            "/v1/members",
            get(members::get_members).post(members::add_member),
        )
        .route("/v1/members/{id}", get(members::get_member))
        .route(
            "/v1/referrals",
            get(referrals::get_referrals).post(referrals::add_referral),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(address: &str, state: AppState) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down.");
        })
        .await?;

    Ok(())
}
