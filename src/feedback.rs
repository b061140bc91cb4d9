use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::catalog::{new_id, Id};

/// A single feedback entry in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Id,

    /// The submitter's name.
    pub name: String,

    /// The submitter's email address. Not verified.
    pub email: String,

    /// An optional score; any integer is accepted.
    pub rating: Option<i64>,

    pub message: String,

    /// When the entry was stored. Never changes afterwards.
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// The fields a visitor submits.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub rating: Option<i64>,
    pub message: String,
}

impl Feedback {
    /// Assigns an ID and a creation time to a submission.
    pub fn create(new: NewFeedback) -> Self {
        let NewFeedback {
            name,
            email,
            rating,
            message,
        } = new;

        Feedback {
            id: new_id(),
            name,
            email,
            rating,
            message,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
