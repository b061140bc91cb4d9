use futures::future::BoxFuture;

use crate::catalog::{Catalog, Guide, Id, PresetPackage, Region, Site};
use crate::errors::BackendError;
use crate::feedback::{Feedback, NewFeedback};
use crate::trip::{NewTrip, Trip};

pub mod memory;

/// The document store behind every route. Lookups that find nothing
/// return `Ok(None)` or an empty list; only store failures are errors.
pub trait Db {
    fn count_regions(&self) -> BoxFuture<Result<i64, BackendError>>;

    fn retrieve_regions(&self) -> BoxFuture<Result<Vec<Region>, BackendError>>;

    fn retrieve_region(&self, slug: &str) -> BoxFuture<Result<Option<Region>, BackendError>>;

    /// All sites, or only those of `region_id` when given.
    fn retrieve_sites(
        &self,
        region_id: Option<&str>,
    ) -> BoxFuture<Result<Vec<Site>, BackendError>>;

    fn retrieve_site(&self, slug: &str) -> BoxFuture<Result<Option<Site>, BackendError>>;

    /// Every stored site whose ID appears in `ids`, each at most once and
    /// in no particular order.
    fn retrieve_sites_by_ids(&self, ids: &[Id]) -> BoxFuture<Result<Vec<Site>, BackendError>>;

    fn retrieve_guides(&self) -> BoxFuture<Result<Vec<Guide>, BackendError>>;

    fn retrieve_guide(&self, id: &str) -> BoxFuture<Result<Option<Guide>, BackendError>>;

    fn retrieve_preset_packages(&self) -> BoxFuture<Result<Vec<PresetPackage>, BackendError>>;

    fn insert_feedback(&self, feedback: NewFeedback) -> BoxFuture<Result<Feedback, BackendError>>;

    fn retrieve_feedbacks(&self) -> BoxFuture<Result<Vec<Feedback>, BackendError>>;

    fn insert_trip(&self, trip: NewTrip) -> BoxFuture<Result<Trip, BackendError>>;

    /// Stores every record of `catalog`, or none of them if any record
    /// can't be stored. A region or site slug that is already taken fails
    /// with [`BackendError::DuplicateSlug`].
    fn insert_catalog(&self, catalog: &Catalog) -> BoxFuture<Result<(), BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{self, postgres::PgPool, Postgres, Transaction};

    use crate::catalog::{Catalog, Guide, Id, PresetPackage, Region, Site};
    use crate::errors::BackendError;
    use crate::feedback::{Feedback, NewFeedback};
    use crate::trip::{NewTrip, Trip};

    const UNIQUE_VIOLATION: &str = "23505";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }

        /// Waits for every connection to be returned and closes them.
        pub async fn close(&self) {
            self.pool.close().await
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn count_regions(&self) -> BoxFuture<Result<i64, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, (i64,)>(include_str!("queries/count_regions.sql"));

                let (count,) = query.fetch_one(&self.pool).await?;

                Ok(count)
            }
            .boxed()
        }

        fn retrieve_regions(&self) -> BoxFuture<Result<Vec<Region>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, Region>(include_str!("queries/retrieve_regions.sql"));

                Ok(query.fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_region(&self, slug: &str) -> BoxFuture<Result<Option<Region>, BackendError>> {
            let slug = slug.to_owned();

            async move {
                let query =
                    sqlx::query_as::<_, Region>(include_str!("queries/retrieve_region.sql"));

                Ok(query.bind(slug).fetch_optional(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_sites(
            &self,
            region_id: Option<&str>,
        ) -> BoxFuture<Result<Vec<Site>, BackendError>> {
            let region_id = region_id.map(str::to_owned);

            async move {
                let query = sqlx::query_as::<_, Site>(include_str!("queries/retrieve_sites.sql"));

                Ok(query.bind(region_id).fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_site(&self, slug: &str) -> BoxFuture<Result<Option<Site>, BackendError>> {
            let slug = slug.to_owned();

            async move {
                let query = sqlx::query_as::<_, Site>(include_str!("queries/retrieve_site.sql"));

                Ok(query.bind(slug).fetch_optional(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_sites_by_ids(
            &self,
            ids: &[Id],
        ) -> BoxFuture<Result<Vec<Site>, BackendError>> {
            let ids = ids.to_vec();

            async move {
                let query =
                    sqlx::query_as::<_, Site>(include_str!("queries/retrieve_sites_by_ids.sql"));

                Ok(query.bind(ids).fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_guides(&self) -> BoxFuture<Result<Vec<Guide>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, Guide>(include_str!("queries/retrieve_guides.sql"));

                Ok(query.fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_guide(&self, id: &str) -> BoxFuture<Result<Option<Guide>, BackendError>> {
            let id = id.to_owned();

            async move {
                let query = sqlx::query_as::<_, Guide>(include_str!("queries/retrieve_guide.sql"));

                Ok(query.bind(id).fetch_optional(&self.pool).await?)
            }
            .boxed()
        }

        fn retrieve_preset_packages(
            &self,
        ) -> BoxFuture<Result<Vec<PresetPackage>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, PresetPackage>(include_str!(
                    "queries/retrieve_preset_packages.sql"
                ));

                Ok(query.fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn insert_feedback(
            &self,
            feedback: NewFeedback,
        ) -> BoxFuture<Result<Feedback, BackendError>> {
            async move {
                let feedback = Feedback::create(feedback);
                let query = sqlx::query(include_str!("queries/create_feedback.sql"));

                query
                    .bind(&feedback.id)
                    .bind(&feedback.name)
                    .bind(&feedback.email)
                    .bind(feedback.rating)
                    .bind(&feedback.message)
                    .bind(feedback.created_at)
                    .execute(&self.pool)
                    .await?;

                Ok(feedback)
            }
            .boxed()
        }

        fn retrieve_feedbacks(&self) -> BoxFuture<Result<Vec<Feedback>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, Feedback>(include_str!("queries/retrieve_feedbacks.sql"));

                Ok(query.fetch_all(&self.pool).await?)
            }
            .boxed()
        }

        fn insert_trip(&self, trip: NewTrip) -> BoxFuture<Result<Trip, BackendError>> {
            async move {
                let trip = Trip::create(trip);
                let query = sqlx::query(include_str!("queries/create_trip.sql"));

                query
                    .bind(&trip.id)
                    .bind(&trip.name)
                    .bind(&trip.site_ids)
                    .bind(trip.total_cost)
                    .bind(trip.total_time_mins)
                    .bind(&trip.guide_id)
                    .bind(trip.created_at)
                    .execute(&self.pool)
                    .await?;

                Ok(trip)
            }
            .boxed()
        }

        fn insert_catalog(&self, catalog: &Catalog) -> BoxFuture<Result<(), BackendError>> {
            let catalog = catalog.clone();

            async move {
                // dropping the transaction before `commit` rolls it back
                let mut tx = self.pool.begin().await?;

                for region in &catalog.regions {
                    insert_region(&mut tx, region).await?;
                }

                for site in &catalog.sites {
                    insert_site(&mut tx, site).await?;
                }

                for guide in &catalog.guides {
                    insert_guide(&mut tx, guide).await?;
                }

                for package in &catalog.packages {
                    insert_preset_package(&mut tx, package).await?;
                }

                tx.commit().await?;

                Ok(())
            }
            .boxed()
        }
    }

    async fn insert_region(
        tx: &mut Transaction<'_, Postgres>,
        region: &Region,
    ) -> Result<(), BackendError> {
        let query = sqlx::query(include_str!("queries/create_region.sql"));

        query
            .bind(&region.id)
            .bind(&region.name)
            .bind(&region.slug)
            .bind(&region.short_description)
            .bind(&region.description)
            .bind(&region.banner_image)
            .execute(&mut *tx)
            .await
            .map_err(|e| slug_conflict(e, &region.slug))?;

        Ok(())
    }

    async fn insert_site(
        tx: &mut Transaction<'_, Postgres>,
        site: &Site,
    ) -> Result<(), BackendError> {
        let query = sqlx::query(include_str!("queries/create_site.sql"));

        query
            .bind(&site.id)
            .bind(&site.region_id)
            .bind(&site.name)
            .bind(&site.slug)
            .bind(&site.kind)
            .bind(&site.short_description)
            .bind(&site.full_description)
            .bind(site.latitude)
            .bind(site.longitude)
            .bind(site.stored_entry_fee)
            .bind(site.stored_visit_minutes)
            .bind(&site.image)
            .execute(&mut *tx)
            .await
            .map_err(|e| slug_conflict(e, &site.slug))?;

        Ok(())
    }

    async fn insert_guide(
        tx: &mut Transaction<'_, Postgres>,
        guide: &Guide,
    ) -> Result<(), BackendError> {
        let query = sqlx::query(include_str!("queries/create_guide.sql"));

        query
            .bind(&guide.id)
            .bind(&guide.name)
            .bind(&guide.certification)
            .bind(guide.fee_per_day)
            .bind(&guide.languages)
            .bind(&guide.bio)
            .bind(&guide.image)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }

    async fn insert_preset_package(
        tx: &mut Transaction<'_, Postgres>,
        package: &PresetPackage,
    ) -> Result<(), BackendError> {
        let query = sqlx::query(include_str!("queries/create_preset_package.sql"));

        query
            .bind(&package.id)
            .bind(&package.name)
            .bind(&package.description)
            .bind(&package.site_ids)
            .bind(package.days)
            .bind(package.estimated_cost)
            .bind(&package.features)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }

    /// Turns a unique-constraint violation into [`BackendError::DuplicateSlug`].
    fn slug_conflict(e: sqlx::Error, slug: &str) -> BackendError {
        let is_unique_violation = matches!(
            &e,
            sqlx::Error::Database(d) if d.code().as_deref() == Some(UNIQUE_VIOLATION)
        );

        if is_unique_violation {
            BackendError::DuplicateSlug {
                slug: slug.to_owned(),
            }
        } else {
            e.into()
        }
    }
}
