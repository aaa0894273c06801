use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    begin, offset, persistence, PgRepository, ProgramRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::programs::{Program, ProgramUpdate};

#[async_trait]
impl ProgramRepository for PgRepository {
    async fn add_program(
        &self,
        name: &str,
        title: &str,
        is_active: bool,
    ) -> RepositoryResult<String> {
        let program_id = Uuid::new_v4().hyphenated().to_string();
        let now = Utc::now().timestamp();
        let mut tx = begin(&self.conn, "add_program").await?;

        sqlx::query(
            r#"
                INSERT INTO programs (id, name, title, is_active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(&program_id)
        .bind(name)
        .bind(title)
        .bind(is_active)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(persistence("add_program"))?;

        tx.commit().await.map_err(persistence("add_program"))?;

        Ok(program_id)
    }

    async fn update_program(&self, id: &str, update: &ProgramUpdate) -> RepositoryResult<()> {
        let mut tx = begin(&self.conn, "update_program").await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE programs SET ");
        {
            let mut sets = query.separated(", ");
            if let Some(name) = &update.name {
                sets.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(title) = &update.title {
                sets.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(active) = update.active {
                sets.push("is_active = ").push_bind_unseparated(active);
            }
            sets.push("updated_at = GREATEST(updated_at, ")
                .push_bind_unseparated(Utc::now().timestamp())
                .push_unseparated(")");
        }
        query.push(" WHERE id = ").push_bind(id.to_string());

        let result = query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(persistence("update_program"))?;

        tx.commit().await.map_err(persistence("update_program"))?;

        if result.rows_affected() == 0 {
            debug!("update_program matched no program with id {id}");
        }

        Ok(())
    }

    async fn get_program(&self, id: &str) -> RepositoryResult<Program> {
        sqlx::query_as::<_, Program>(
            "SELECT id, name, title, is_active, created_at, updated_at FROM programs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.conn)
        .await
        .map_err(persistence("get_program"))?
        .ok_or_else(|| RepositoryError::NotFound {
            entity: "program",
            id: id.to_string(),
        })
    }

    async fn get_programs(&self, page: i64, size: i64) -> RepositoryResult<Vec<Program>> {
        sqlx::query_as::<_, Program>(
            r#"
                SELECT id, name, title, is_active, created_at, updated_at
                FROM programs
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind(offset(page, size))
        .fetch_all(&self.conn)
        .await
        .map_err(persistence("get_programs"))
    }
}
