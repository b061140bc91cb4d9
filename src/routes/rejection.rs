use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

/// What the failed request was asking for. Rendered next to the error
/// message in the response body.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Estimate { site_ids: Vec<String> },
    Feedback,
    Feedbacks,
    Guides,
    PresetPackages,
    Region { slug: String },
    Regions,
    Site { slug: String },
    Sites { region_id: Option<String> },
    Trip { name: String },
}

impl Context {
    pub fn estimate(site_ids: Vec<String>) -> Context {
        Context::Estimate { site_ids }
    }

    pub fn feedback() -> Context {
        Context::Feedback
    }

    pub fn feedbacks() -> Context {
        Context::Feedbacks
    }

    pub fn guides() -> Context {
        Context::Guides
    }

    pub fn preset_packages() -> Context {
        Context::PresetPackages
    }

    pub fn region(slug: String) -> Context {
        Context::Region { slug }
    }

    pub fn regions() -> Context {
        Context::Regions
    }

    pub fn site(slug: String) -> Context {
        Context::Site { slug }
    }

    pub fn sites(region_id: Option<String>) -> Context {
        Context::Sites { region_id }
    }

    pub fn trip(name: String) -> Context {
        Context::Trip { name }
    }
}
