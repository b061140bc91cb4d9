use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{self, BoxFuture, FutureExt};

use crate::catalog::{Catalog, Guide, Id, PresetPackage, Region, Site};
use crate::errors::BackendError;
use crate::feedback::{Feedback, NewFeedback};
use crate::trip::{NewTrip, Trip};

use super::Db;

const CATALOG_LIMIT: usize = 100;
const FEEDBACK_LIMIT: usize = 1000;

/// A [`Db`] that keeps every collection in memory, in insertion order.
/// Used by the tests and for running the server without Postgres.
#[derive(Debug, Default)]
pub struct MemoryDb {
    regions: RwLock<Vec<Region>>,
    sites: RwLock<Vec<Site>>,
    guides: RwLock<Vec<Guide>>,
    packages: RwLock<Vec<PresetPackage>>,
    feedbacks: RwLock<Vec<Feedback>>,
    trips: RwLock<Vec<Trip>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every saved trip, oldest first. There's no route for this; it
    /// exists so tests can see what was stored.
    pub fn trips(&self) -> Vec<Trip> {
        read(&self.trips).clone()
    }
}

// a panic while holding a lock can't leave a `Vec` half-pushed, so
// poisoned locks are still usable
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, Result<T, BackendError>> {
    future::ready(Ok(value)).boxed()
}

fn first_duplicate<'a>(mut slugs: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut seen = HashSet::new();

    slugs.find(|&slug| !seen.insert(slug)).map(str::to_owned)
}

fn first_n<T: Clone>(items: &[T], limit: usize, keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|i| keep(i)).take(limit).cloned().collect()
}

impl Db for MemoryDb {
    fn count_regions(&self) -> BoxFuture<Result<i64, BackendError>> {
        let count = read(&self.regions).len();

        ready(count as i64)
    }

    fn retrieve_regions(&self) -> BoxFuture<Result<Vec<Region>, BackendError>> {
        ready(first_n(&read(&self.regions), CATALOG_LIMIT, |_| true))
    }

    fn retrieve_region(&self, slug: &str) -> BoxFuture<Result<Option<Region>, BackendError>> {
        let region = read(&self.regions).iter().find(|r| r.slug == slug).cloned();

        ready(region)
    }

    fn retrieve_sites(
        &self,
        region_id: Option<&str>,
    ) -> BoxFuture<Result<Vec<Site>, BackendError>> {
        let sites = first_n(&read(&self.sites), CATALOG_LIMIT, |s| {
            region_id.map_or(true, |r| s.region_id == r)
        });

        ready(sites)
    }

    fn retrieve_site(&self, slug: &str) -> BoxFuture<Result<Option<Site>, BackendError>> {
        let site = read(&self.sites).iter().find(|s| s.slug == slug).cloned();

        ready(site)
    }

    fn retrieve_sites_by_ids(&self, ids: &[Id]) -> BoxFuture<Result<Vec<Site>, BackendError>> {
        let sites = first_n(&read(&self.sites), CATALOG_LIMIT, |s| ids.contains(&s.id));

        ready(sites)
    }

    fn retrieve_guides(&self) -> BoxFuture<Result<Vec<Guide>, BackendError>> {
        ready(first_n(&read(&self.guides), CATALOG_LIMIT, |_| true))
    }

    fn retrieve_guide(&self, id: &str) -> BoxFuture<Result<Option<Guide>, BackendError>> {
        let guide = read(&self.guides).iter().find(|g| g.id == id).cloned();

        ready(guide)
    }

    fn retrieve_preset_packages(&self) -> BoxFuture<Result<Vec<PresetPackage>, BackendError>> {
        ready(first_n(&read(&self.packages), CATALOG_LIMIT, |_| true))
    }

    fn insert_feedback(&self, feedback: NewFeedback) -> BoxFuture<Result<Feedback, BackendError>> {
        let feedback = Feedback::create(feedback);
        write(&self.feedbacks).push(feedback.clone());

        ready(feedback)
    }

    fn retrieve_feedbacks(&self) -> BoxFuture<Result<Vec<Feedback>, BackendError>> {
        ready(first_n(&read(&self.feedbacks), FEEDBACK_LIMIT, |_| true))
    }

    fn insert_trip(&self, trip: NewTrip) -> BoxFuture<Result<Trip, BackendError>> {
        let trip = Trip::create(trip);
        write(&self.trips).push(trip.clone());

        ready(trip)
    }

    fn insert_catalog(&self, catalog: &Catalog) -> BoxFuture<Result<(), BackendError>> {
        let mut regions = write(&self.regions);
        let mut sites = write(&self.sites);
        let mut guides = write(&self.guides);
        let mut packages = write(&self.packages);

        let region_slugs = regions.iter().chain(&catalog.regions).map(|r| r.slug.as_str());
        let site_slugs = sites.iter().chain(&catalog.sites).map(|s| s.slug.as_str());

        if let Some(slug) = first_duplicate(region_slugs).or_else(|| first_duplicate(site_slugs)) {
            return future::ready(Err(BackendError::DuplicateSlug { slug })).boxed();
        }

        regions.extend_from_slice(&catalog.regions);
        sites.extend_from_slice(&catalog.sites);
        guides.extend_from_slice(&catalog.guides);
        packages.extend_from_slice(&catalog.packages);

        ready(())
    }
}
