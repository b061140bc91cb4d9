use serde::{Deserialize, Serialize};

/// Entry fee assumed for a site that doesn't record one.
pub const DEFAULT_ENTRY_FEE: i64 = 0;

/// Visit length assumed for a site that doesn't record one.
pub const DEFAULT_VISIT_MINUTES: i64 = 120;

/// An opaque record identifier.
pub type Id = String;

/// A geographic region grouping several sites.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Region {
    pub id: Id,
    pub name: String,

    /// Unique, URL-safe name used in region URLs.
    pub slug: String,

    pub short_description: String,
    pub description: String,
    pub banner_image: String,
}

/// A single historical site.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Site {
    pub id: Id,

    /// The region the site belongs to.
    pub region_id: Id,

    pub name: String,

    /// Unique, URL-safe name used in site URLs.
    pub slug: String,

    /// Category label such as “Temple” or “Fort”.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,

    pub short_description: String,
    pub full_description: String,

    /// Degrees north.
    pub latitude: f64,

    /// Degrees east.
    pub longitude: f64,

    /// Entry fee in rupees. See [`Site::entry_fee`].
    #[serde(rename = "entry_fee")]
    #[sqlx(rename = "entry_fee")]
    pub stored_entry_fee: Option<i64>,

    /// Typical visit duration. See [`Site::visit_minutes`].
    #[serde(rename = "avg_visit_time_mins")]
    #[sqlx(rename = "avg_visit_time_mins")]
    pub stored_visit_minutes: Option<i64>,

    pub image: String,
}

impl Site {
    /// The entry fee, or [`DEFAULT_ENTRY_FEE`] if none is recorded.
    pub fn entry_fee(&self) -> i64 {
        self.stored_entry_fee.unwrap_or(DEFAULT_ENTRY_FEE)
    }

    /// The average visit time in minutes, or [`DEFAULT_VISIT_MINUTES`]
    /// if none is recorded.
    pub fn visit_minutes(&self) -> i64 {
        self.stored_visit_minutes.unwrap_or(DEFAULT_VISIT_MINUTES)
    }

    /// `[latitude, longitude]`, the order used for route coordinates.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// A guide who can accompany a trip for a flat daily fee.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Guide {
    pub id: Id,
    pub name: String,
    pub certification: String,
    pub fee_per_day: i64,
    pub languages: Vec<String>,
    pub bio: String,
    pub image: String,
}

/// A curated bundle of sites with a fixed price. The price is set by
/// hand, not by the estimator.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct PresetPackage {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub site_ids: Vec<Id>,
    pub days: i64,
    pub estimated_cost: i64,
    pub features: Vec<String>,
}

/// Records that are stored together or not at all. See
/// [`Db::insert_catalog`](crate::db::Db::insert_catalog).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub regions: Vec<Region>,
    pub sites: Vec<Site>,
    pub guides: Vec<Guide>,
    pub packages: Vec<PresetPackage>,
}

/// Generates an identifier for a new record.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_hyphenated().to_string()
}
