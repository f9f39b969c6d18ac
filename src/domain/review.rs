//! Product reviews, embedded in the product row.

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Rating and comment are required")]
    Missing,
    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,
    #[error("Product already reviewed")]
    AlreadyReviewed,
    #[error("Review not found")]
    NotFound,
    #[error("Not authorized to {0} this review")]
    NotAuthor(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Reviews(pub Vec<Review>);

/// Who is acting on a review.
#[derive(Debug, Clone, Copy)]
pub struct Reviewer {
    pub user_id: Uuid,
    pub is_admin: bool,
}

fn validate(rating: i32, comment: &str) -> Result<(), ReviewError> {
    if comment.trim().is_empty() {
        return Err(ReviewError::Missing);
    }
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::RatingOutOfRange);
    }
    Ok(())
}

impl Reviews {
    /// Average rating and review count. An empty list rates 0.
    pub fn summarize(&self) -> (f64, i32) {
        let count = self.0.len();
        if count == 0 {
            return (0.0, 0);
        }
        let total: i32 = self.0.iter().map(|r| r.rating).sum();
        (f64::from(total) / count as f64, count as i32)
    }

    pub fn add(
        &mut self,
        user_id: Uuid,
        name: &str,
        rating: i32,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<&Review, ReviewError> {
        validate(rating, comment)?;
        if self.0.iter().any(|r| r.user_id == user_id) {
            return Err(ReviewError::AlreadyReviewed);
        }
        self.0.push(Review {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            rating,
            comment: comment.trim().to_string(),
            created_at: now,
            updated_at: now,
        });
        let last = self.0.len() - 1;
        Ok(&self.0[last])
    }

    pub fn edit(
        &mut self,
        review_id: Uuid,
        by: Reviewer,
        rating: i32,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<&Review, ReviewError> {
        validate(rating, comment)?;
        let review = self
            .0
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(ReviewError::NotFound)?;
        if review.user_id != by.user_id && !by.is_admin {
            return Err(ReviewError::NotAuthor("edit"));
        }
        review.rating = rating;
        review.comment = comment.trim().to_string();
        review.updated_at = now;
        Ok(review)
    }

    pub fn remove(&mut self, review_id: Uuid, by: Reviewer) -> Result<(), ReviewError> {
        let index = self
            .0
            .iter()
            .position(|r| r.id == review_id)
            .ok_or(ReviewError::NotFound)?;
        if self.0[index].user_id != by.user_id && !by.is_admin {
            return Err(ReviewError::NotAuthor("delete"));
        }
        self.0.remove(index);
        Ok(())
    }
}
