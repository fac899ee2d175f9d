//! Member domain methods on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::member::{Member, MemberInput},
};

impl Repository {
    /// List all members
    pub async fn members_list(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, Member>(
            "SELECT id, name, email, phone FROM members ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a member
    pub async fn members_create(&self, data: &MemberInput) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Update a member
    pub async fn members_update(&self, id: i32, data: &MemberInput) -> AppResult<Option<Member>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET name = $1,
                email = $2,
                phone = $3
            WHERE id = $4
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}
