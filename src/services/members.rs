//! Member management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::LoanDetails,
        member::{CreateMember, Member},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new member
    pub async fn register(&self, member: CreateMember) -> AppResult<Member> {
        member
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let created = self.repository.members.create(&member).await?;
        tracing::info!(member_id = created.member_id, "Member registered: {}", created.full_name());
        Ok(created)
    }

    /// Get member by ID
    pub async fn get_member(&self, member_id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(member_id).await
    }

    /// Currently borrowed books for a member
    pub async fn get_current_loans(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.members.get_current_loans(member_id).await
    }
}
