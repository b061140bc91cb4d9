//! Trip cost and time estimation.
//!
//! An estimate prices every requested site occurrence with its entry fee
//! plus flat food, transport and activity costs, adds a guide's daily fee
//! when one is chosen, and attaches advice about budget, pacing and
//! coverage. Nothing is stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Guide, Id, Site};
use crate::db::Db;
use crate::errors::BackendError;

/// Food cost per site visit, in rupees.
pub const FOOD_COST: i64 = 300;

/// Transport cost per site visit, in rupees.
pub const TRANSPORT_COST: i64 = 200;

/// Activity cost per site visit, in rupees.
pub const ACTIVITY_COST: i64 = 150;

/// Usable sightseeing minutes in one day (eight hours).
pub const MINUTES_PER_DAY: i64 = 480;

pub const FLAGSHIP_SUGGESTION: &str =
    "Consider adding Bateshwar Temples nearby for a complete heritage experience!";

pub const MORE_DAYS_SUGGESTION: &str = "Consider adding more days for a relaxed itinerary.";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TripEstimateRequest {
    /// Sites to visit. Order is kept and repeats are priced again.
    pub site_ids: Vec<Id>,
    pub budget: i64,
    pub days: i64,
    #[serde(default)]
    pub guide_id: Option<Id>,
}

/// The price of one site visit.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub site_name: String,
    pub entry_fee: i64,
    pub food_cost: i64,
    pub transport_cost: i64,
    pub activity_cost: i64,
    pub total: i64,
}

impl CostBreakdown {
    fn for_site(site: &Site) -> Self {
        let entry_fee = site.entry_fee();

        CostBreakdown {
            site_name: site.name.clone(),
            entry_fee,
            food_cost: FOOD_COST,
            transport_cost: TRANSPORT_COST,
            activity_cost: ACTIVITY_COST,
            total: entry_fee
                .saturating_add(FOOD_COST)
                .saturating_add(TRANSPORT_COST)
                .saturating_add(ACTIVITY_COST),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TripEstimate {
    /// Every site visit plus the guide, if any.
    pub total_cost: i64,
    pub total_time_mins: i64,
    pub cost_breakdown: Vec<CostBreakdown>,

    /// `[latitude, longitude]` per visit in request order. Not optimized.
    pub route_coordinates: Vec<[f64; 2]>,
    pub guide_cost: i64,
    pub suggestions: Vec<String>,
}

/// Looks up the requested sites and guide and prices the trip.
///
/// Unknown site IDs are skipped; if none are known the whole request
/// fails with [`BackendError::SitesNotFound`]. An unknown guide costs
/// nothing.
pub async fn estimate_trip(
    db: &(dyn Db + Send + Sync),
    request: &TripEstimateRequest,
) -> Result<TripEstimate, BackendError> {
    let sites = db.retrieve_sites_by_ids(&request.site_ids);
    let guide = async {
        match &request.guide_id {
            Some(id) => db.retrieve_guide(id).await,
            None => Ok(None),
        }
    };

    let (sites, guide) = futures::try_join!(sites, guide)?;

    build_estimate(request, &sites, guide.as_ref())
}

/// Prices a trip from already-fetched records. `sites` may be in any
/// order and needn't contain every requested ID.
///
/// Sums and the guide fee saturate at the bounds of `i64` instead of
/// overflowing.
pub fn build_estimate(
    request: &TripEstimateRequest,
    sites: &[Site],
    guide: Option<&Guide>,
) -> Result<TripEstimate, BackendError> {
    let by_id = sites
        .iter()
        .map(|s| (s.id.as_str(), s))
        .collect::<HashMap<_, _>>();

    let visits = request
        .site_ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect::<Vec<_>>();

    if visits.is_empty() {
        return Err(BackendError::SitesNotFound);
    }

    let mut total_cost: i64 = 0;
    let mut total_time_mins: i64 = 0;
    let mut cost_breakdown = Vec::with_capacity(visits.len());
    let mut route_coordinates = Vec::with_capacity(visits.len());

    for site in visits {
        let line = CostBreakdown::for_site(site);

        total_cost = total_cost.saturating_add(line.total);
        total_time_mins = total_time_mins.saturating_add(site.visit_minutes());
        cost_breakdown.push(line);
        route_coordinates.push(site.coordinates());
    }

    let guide_cost = guide.map_or(0, |g| g.fee_per_day.saturating_mul(request.days));
    total_cost = total_cost.saturating_add(guide_cost);

    let suggestions = suggest(request, total_cost, total_time_mins);

    Ok(TripEstimate {
        total_cost,
        total_time_mins,
        cost_breakdown,
        route_coordinates,
        guide_cost,
        suggestions,
    })
}

fn suggest(request: &TripEstimateRequest, total_cost: i64, total_time_mins: i64) -> Vec<String> {
    let mut suggestions = vec![];

    if request.site_ids.len() == 1 {
        suggestions.push(FLAGSHIP_SUGGESTION.to_owned());
    }

    if request.budget < total_cost {
        suggestions.push(format!(
            "Your budget is ₹{}, but estimated cost is ₹{}. Consider reducing days or sites.",
            request.budget, total_cost
        ));
    }

    if needs_more_days(request.days, total_time_mins) {
        suggestions.push(MORE_DAYS_SUGGESTION.to_owned());
    }

    suggestions
}

/// `days < minutes / 480` over the reals, compared without division so
/// that exact equality never counts as too short.
fn needs_more_days(days: i64, total_time_mins: i64) -> bool {
    i128::from(days) * i128::from(MINUTES_PER_DAY) < i128::from(total_time_mins)
}
