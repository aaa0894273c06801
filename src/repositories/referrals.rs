use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{begin, offset, persistence, PgRepository, ReferralRepository, RepositoryResult};
use crate::models::referrals::{NewReferral, Referral, STATUS_PENDING};

#[async_trait]
impl ReferralRepository for PgRepository {
    async fn add_referral(&self, referral: &NewReferral) -> RepositoryResult<String> {
        let referral_id = Uuid::new_v4().hyphenated().to_string();
        let now = Utc::now().timestamp();
        let mut tx = begin(&self.conn, "add_referral").await?;

        sqlx::query(
            r#"
                INSERT INTO referrals
                (id, first_name, last_name, email, phone, referral_code, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(&referral_id)
        .bind(&referral.first_name)
        .bind(&referral.last_name)
        .bind(&referral.email)
        .bind(&referral.phone)
        .bind(&referral.referral_code)
        .bind(STATUS_PENDING)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(persistence("add_referral"))?;

        tx.commit().await.map_err(persistence("add_referral"))?;

        Ok(referral_id)
    }

    async fn get_referrals(&self, page: i64, size: i64) -> RepositoryResult<Vec<Referral>> {
        sqlx::query_as::<_, Referral>(
            r#"
                SELECT r.id, r.first_name, r.last_name, r.email, r.phone, r.referral_code,
                       r.status, r.created_at, r.updated_at,
                       m.program_id, m.id AS member_id
                FROM referrals r
                JOIN members m ON r.referral_code = m.referral_code
                ORDER BY r.created_at, r.id
                LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind(offset(page, size))
        .fetch_all(&self.conn)
        .await
        .map_err(persistence("get_referrals"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::testing::test_pool;
    use crate::repositories::{MemberRepository, ProgramRepository};

    #[tokio::test]
    async fn referral_is_linked_to_the_code_owner() {
        let Some(pool) = test_pool().await else { return };
        let repository = PgRepository::new(pool);
        let program_id = repository
            .add_program("P1", "T1", true)
            .await
            .expect("insert program");
        let member_id = repository
            .add_member("A", None, "a@x.com", &program_id, None, true)
            .await
            .expect("insert member");
        let code = repository
            .get_member(&member_id)
            .await
            .expect("read member")
            .referral_code;

        let referral_id = repository
            .add_referral(&NewReferral {
                email: Some("r@x.com".to_string()),
                referral_code: code.clone(),
                ..Default::default()
            })
            .await
            .expect("insert referral");
        let referrals = repository.get_referrals(1, 10).await.expect("list referrals");

        assert_eq!(referrals.len(), 1);
        let referral = &referrals[0];
        assert_eq!(referral.id, referral_id);
        assert_eq!(referral.referral_code, code);
        assert_eq!(referral.status, STATUS_PENDING);
        assert_eq!(referral.member_id, member_id);
        assert_eq!(referral.program_id, program_id);
        assert_eq!(referral.email.as_deref(), Some("r@x.com"));
        assert_eq!(referral.phone, None);
    }

    #[tokio::test]
    async fn unmatched_code_is_left_out_of_listing() {
        let Some(pool) = test_pool().await else { return };
        let repository = PgRepository::new(pool);

        repository
            .add_referral(&NewReferral {
                email: Some("r@x.com".to_string()),
                referral_code: "zzzzz".to_string(),
                ..Default::default()
            })
            .await
            .expect("orphan referral is still stored");

        for (page, size) in [(1, 1), (1, 10), (2, 10)] {
            let referrals = repository
                .get_referrals(page, size)
                .await
                .expect("list referrals");
            assert!(referrals.is_empty());
        }
    }
}
