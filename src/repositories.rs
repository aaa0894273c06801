use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{
    members::Member,
    programs::{Program, ProgramUpdate},
    referrals::{NewReferral, Referral},
};
use crate::settings;

pub mod members;
pub mod programs;
pub mod referrals;

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Persistence error in {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ProgramRepository: Send + Sync {
    async fn add_program(&self, name: &str, title: &str, is_active: bool)
        -> RepositoryResult<String>;

    /// Touches only the fields set in `update`. Updating an unknown id
    /// affects zero rows and is not an error.
    async fn update_program(&self, id: &str, update: &ProgramUpdate) -> RepositoryResult<()>;

    async fn get_program(&self, id: &str) -> RepositoryResult<Program>;

    async fn get_programs(&self, page: i64, size: i64) -> RepositoryResult<Vec<Program>>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Generates a referral code when `referral_code` is `None`.
    async fn add_member(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        program_id: &str,
        referral_code: Option<&str>,
        is_active: bool,
    ) -> RepositoryResult<String>;

    async fn get_member(&self, id: &str) -> RepositoryResult<Member>;

    async fn get_members(&self, page: i64, size: i64) -> RepositoryResult<Vec<Member>>;
}

#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn add_referral(&self, referral: &NewReferral) -> RepositoryResult<String>;

    /// Referrals joined to the member owning their code. Referrals whose
    /// code belongs to no member are left out.
    async fn get_referrals(&self, page: i64, size: i64) -> RepositoryResult<Vec<Referral>>;
}

/// Postgres-backed store. Owns the connection pool; every write runs in
/// its own serializable transaction.
#[derive(Clone)]
pub struct PgRepository {
    conn: PgPool,
}

impl PgRepository {
    pub fn new(conn: PgPool) -> Self {
        PgRepository { conn }
    }

    pub async fn connect(settings: &settings::Postgres) -> RepositoryResult<Self> {
        settings.validate().map_err(RepositoryError::Configuration)?;
        info!(
            "Connecting to postgres: {}",
            settings.redacted_connection_string()
        );

        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings::POSTGRES_PORT)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.db_name)
            .ssl_mode(PgSslMode::Disable);

        let conn = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Could not connect to postgres: {e}");
                RepositoryError::Configuration(e.to_string())
            })?;

        Ok(Self::new(conn))
    }
}

/// Row offset for a 1-based page. Pages below 1 give a negative offset,
/// which Postgres rejects; callers validate paging before reaching here.
pub(crate) fn offset(page: i64, size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(size)
}

async fn begin(
    conn: &PgPool,
    operation: &'static str,
) -> RepositoryResult<Transaction<'static, Postgres>> {
    let mut tx = conn.begin().await.map_err(persistence(operation))?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await
        .map_err(persistence(operation))?;

    Ok(tx)
}

fn persistence(operation: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |source| {
        error!("{operation} failed: {source}");
        RepositoryError::Persistence { operation, source }
    }
}
