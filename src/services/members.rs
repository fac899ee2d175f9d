//! Members service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, MemberInput},
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct MembersService {
    store: Arc<dyn LibraryStore>,
}

impl MembersService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.store.list_members().await
    }

    pub async fn create_member(&self, data: MemberInput) -> AppResult<Member> {
        let data = data.normalized();
        data.validate()?;

        let member = self.store.create_member(&data).await?;
        tracing::debug!(member_id = member.id, "member created");
        Ok(member)
    }

    pub async fn update_member(&self, id: i32, data: MemberInput) -> AppResult<Member> {
        if id <= 0 {
            return Err(AppError::Validation("member id is required".to_string()));
        }
        let data = data.normalized();
        data.validate()?;

        self.store
            .update_member(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound("member not found".to_string()))
    }
}
