use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::catalog::{new_id, Id};

/// A trip a visitor chose to keep. The figures are whatever the client
/// sent, normally a previous estimate; they are not recomputed.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Trip {
    pub id: Id,
    pub name: String,
    pub site_ids: Vec<Id>,
    pub total_cost: i64,
    pub total_time_mins: i64,
    pub guide_id: Option<Id>,

    /// When the trip was stored.
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTrip {
    pub name: String,
    pub site_ids: Vec<Id>,
    pub total_cost: i64,
    pub total_time_mins: i64,
    #[serde(default)]
    pub guide_id: Option<Id>,
}

impl Trip {
    /// Assigns an ID and a creation time to a trip being saved.
    pub fn create(new: NewTrip) -> Self {
        let NewTrip {
            name,
            site_ids,
            total_cost,
            total_time_mins,
            guide_id,
        } = new;

        Trip {
            id: new_id(),
            name,
            site_ids,
            total_cost,
            total_time_mins,
            guide_id,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
