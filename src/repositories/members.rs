use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use uuid::Uuid;

use super::{
    begin, offset, persistence, MemberRepository, PgRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::members::Member;
use crate::utils::{generate_code, REFERRAL_CODE_LENGTH};

/// Unique constraint on `members.referral_code`.
const REFERRAL_CODE_CONSTRAINT: &str = "members_referral_code_key";

/// Inserts attempted with freshly generated codes before giving up.
const MAX_CODE_ATTEMPTS: u32 = 3;

/// Member columns other than the generated ones.
struct MemberRow<'a> {
    first_name: &'a str,
    last_name: Option<&'a str>,
    email: &'a str,
    program_id: &'a str,
    is_active: bool,
}

impl PgRepository {
    async fn insert_member(
        &self,
        row: &MemberRow<'_>,
        referral_code: &str,
    ) -> RepositoryResult<String> {
        let member_id = Uuid::new_v4().hyphenated().to_string();
        let now = Utc::now().timestamp();
        let mut tx = begin(&self.conn, "add_member").await?;

        sqlx::query(
            r#"
                INSERT INTO members
                (id, first_name, last_name, email, program_id, referral_code, is_active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(&member_id)
        .bind(row.first_name)
        .bind(row.last_name)
        .bind(row.email)
        .bind(row.program_id)
        .bind(referral_code)
        .bind(row.is_active)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(persistence("add_member"))?;

        tx.commit().await.map_err(persistence("add_member"))?;

        Ok(member_id)
    }

    /// Inserts with `referral_code`, or with codes drawn from `next_code`
    /// when none is supplied. A drawn code that is already taken is
    /// replaced, up to `MAX_CODE_ATTEMPTS` inserts in total.
    async fn add_member_with(
        &self,
        row: &MemberRow<'_>,
        referral_code: Option<&str>,
        mut next_code: impl FnMut() -> String + Send,
    ) -> RepositoryResult<String> {
        let mut attempt = 1;

        loop {
            let code = match referral_code {
                Some(code) => code.to_string(),
                None => next_code(),
            };

            match self.insert_member(row, &code).await {
                Err(RepositoryError::Persistence { ref source, .. })
                    if referral_code.is_none()
                        && attempt < MAX_CODE_ATTEMPTS
                        && is_referral_code_conflict(source) =>
                {
                    warn!("Generated referral code {code} is taken, regenerating (attempt {attempt})");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

fn is_referral_code_conflict(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => {
            e.is_unique_violation() && e.constraint() == Some(REFERRAL_CODE_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait]
impl MemberRepository for PgRepository {
    async fn add_member(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        program_id: &str,
        referral_code: Option<&str>,
        is_active: bool,
    ) -> RepositoryResult<String> {
        let row = MemberRow {
            first_name,
            last_name,
            email,
            program_id,
            is_active,
        };

        self.add_member_with(&row, referral_code, || {
            generate_code(REFERRAL_CODE_LENGTH)
        })
        .await
    }

    async fn get_member(&self, id: &str) -> RepositoryResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
                SELECT id, first_name, last_name, email, program_id, referral_code, is_active, created_at, updated_at
                FROM members
                WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.conn)
        .await
        .map_err(persistence("get_member"))?
        .ok_or_else(|| RepositoryError::NotFound {
            entity: "member",
            id: id.to_string(),
        })
    }

    async fn get_members(&self, page: i64, size: i64) -> RepositoryResult<Vec<Member>> {
        sqlx::query_as::<_, Member>(
            r#"
                SELECT id, first_name, last_name, email, program_id, referral_code, is_active, created_at, updated_at
                FROM members
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind(offset(page, size))
        .fetch_all(&self.conn)
        .await
        .map_err(persistence("get_members"))
    }
}
