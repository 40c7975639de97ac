//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
///
/// `available_copies` is mutated only by the circulation engine: decremented
/// on borrow, incremented on return. The schema enforces
/// `0 <= available_copies <= total_copies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub added_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[validate(range(min = 1, message = "at least one copy is required"))]
    pub total_copies: i32,
}
