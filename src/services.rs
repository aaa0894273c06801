use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::models::Paging;
use crate::repositories::{PgRepository, RepositoryError};
use crate::settings::Settings;

pub mod http;
pub mod members;
pub mod programs;
pub mod referrals;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;

const CHANNEL_CAPACITY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Database error: {0}")]
    Persistence(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Configuration(_) => ServiceError::Configuration(e.to_string()),
            RepositoryError::Persistence { .. } => ServiceError::Persistence(e.to_string()),
            RepositoryError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Runs `operation` and sends its result back, unless the deadline passes
/// or the caller drops its receiver first. Either way the operation future
/// is dropped, which rolls back any transaction it still holds.
pub(crate) async fn respond<T, F>(
    mut response: oneshot::Sender<Result<T, ServiceError>>,
    deadline: Duration,
    operation: F,
) where
    T: Send,
    F: Future<Output = Result<T, ServiceError>> + Send,
{
    let outcome = tokio::select! {
        _ = response.closed() => None,
        result = tokio::time::timeout(deadline, operation) => {
            Some(result.unwrap_or_else(|_| Err(ServiceError::Timeout(deadline))))
        }
    };

    match outcome {
        Some(result) => {
            let _ = response.send(result);
        }
        None => warn!("Caller went away, request abandoned."),
    }
}

/// Applies the listing defaults and rejects pages or sizes below 1.
pub fn resolve_paging(paging: Paging) -> Result<(i64, i64), ServiceError> {
    let page = paging.page.unwrap_or(DEFAULT_PAGE);
    let size = paging.size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ServiceError::InvalidInput(format!(
            "page must be at least 1, got {page}"
        )));
    }
    if size < 1 {
        return Err(ServiceError::InvalidInput(format!(
            "size must be at least 1, got {size}"
        )));
    }

    Ok((page, size))
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }

    Ok(())
}

pub async fn start_services(
    repository: PgRepository,
    settings: Settings,
) -> Result<(), anyhow::Error> {
    let (program_tx, mut program_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (member_tx, mut member_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (referral_tx, mut referral_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let repository = Arc::new(repository);
    let deadline = Duration::from_secs(settings.server.request_timeout_secs);

    info!("Starting program service.");
    let mut program_service = programs::ProgramService::new();
    let handler = programs::ProgramRequestHandler::new(repository.clone(), deadline);
    tokio::spawn(async move {
        program_service.run(handler, &mut program_rx).await;
    });

    info!("Starting member service.");
    let mut member_service = members::MemberService::new();
    let handler = members::MemberRequestHandler::new(repository.clone(), deadline);
    tokio::spawn(async move {
        member_service.run(handler, &mut member_rx).await;
    });

    info!("Starting referral service.");
    let mut referral_service = referrals::ReferralService::new();
    let handler = referrals::ReferralRequestHandler::new(repository, deadline);
    tokio::spawn(async move {
        referral_service.run(handler, &mut referral_rx).await;
    });

    info!("Starting HTTP server.");
    http::start_http_server(
        &settings.server.address,
        http::AppState {
            program_channel: program_tx,
            member_channel: member_tx,
            referral_channel: referral_tx,
        },
    )
    .await
}
