use log::{info, Logger};

use crate::catalog::{new_id, Catalog, Guide, PresetPackage, Region, Site};
use crate::db::Db;
use crate::errors::BackendError;

const RAVINES_IMAGE: &str = "https://images.unsplash.com/photo-1583043550616-ac6e0a1b9574?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Nzd8MHwxfHNlYXJjaHwxfHxDaGFtYmFsJTIwcmF2aW5lcyUyMGxhbmRzY2FwZXxlbnwwfHx8fDE3NjM1ODgwODh8MA&ixlib=rb-4.1.0&q=85";
const TEMPLE_IMAGE: &str = "https://images.unsplash.com/photo-1681054559674-7e80aad3d2ff?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njl8MHwxfHNlYXJjaHwxfHxhbmNpZW50JTIwSW5kaWFuJTIwdGVtcGxlfGVufDB8fHx8MTc2MzU4ODA4OHww&ixlib=rb-4.1.0&q=85";
const ROCK_ART_IMAGE: &str = "https://images.unsplash.com/photo-1715790357004-81af9a3b1967?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2NzR8MHwxfHNlYXJjaHwxfHxJbmRpYW4lMjByb2NrJTIwYXJ0JTIwcGV0cm9nbHlwaHN8ZW58MHx8fHwxNzYzNTg4MDg5fDA&ixlib=rb-4.1.0&q=85";
const FORT_IMAGE: &str = "https://images.unsplash.com/photo-1663997943673-9c679560f5a5?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njl8MHwxfHNlYXJjaHwyfHxhbmNpZW50JTIwSW5kaWFuJTIwdGVtcGxlfGVufDB8fHx8MTc2MzU4ODA4OHww&ixlib=rb-4.1.0&q=85";
const YOGINI_IMAGE: &str = "https://images.unsplash.com/photo-1606498438291-8d420fdae11c?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njl8MHwxfHNlYXJjaHwzfHxhbmNpZW50JTIwSW5kaWFuJTIwdGVtcGxlfGVufDB8fHx8MTc2MzU4ODA4OHww&ixlib=rb-4.1.0&q=85";
const GUIDE_IMAGE: &str = "https://images.unsplash.com/photo-1675388545634-83d816322c83?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Nzh8MHwxfHNlYXJjaHwyfHxjdWx0dXJhbCUyMGd1aWRlJTIwcG9ydHJhaXR8ZW58MHx8fHwxNzYzNTg4MDkwfDA&ixlib=rb-4.1.0&q=85";
const ECO_GUIDE_IMAGE: &str = "https://images.unsplash.com/photo-1697510364485-e900c2fe7524?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Nzh8MHwxfHNlYXJjaHwzfHxjdWx0dXJhbCUyMGd1aWRlJTIwcG9ydHJhaXR8ZW58MHx8fHwxNzYzNTg4MDkwfDA&ixlib=rb-4.1.0&q=85";

/// Loads the Chambal catalogue unless a region already exists. Returns
/// whether anything was inserted. The catalogue goes in as one batch, so
/// a failed seed leaves the store empty and the next start retries.
pub async fn seed_if_empty(
    logger: &Logger,
    db: &(dyn Db + Send + Sync),
) -> Result<bool, BackendError> {
    let existing = db.count_regions().await?;

    if existing > 0 {
        info!(logger, "Database already seeded"; "regions" => existing);
        return Ok(false);
    }

    info!(logger, "Seeding database");

    let region = chambal();
    let sites = chambal_sites(&region.id);
    let packages = packages(&sites);
    let catalog = Catalog {
        regions: vec![region],
        sites,
        guides: guides(),
        packages,
    };

    db.insert_catalog(&catalog).await?;

    info!(
        logger, "Database seeded";
        "sites" => catalog.sites.len(),
        "guides" => catalog.guides.len(),
        "packages" => catalog.packages.len()
    );

    Ok(true)
}

fn chambal() -> Region {
    Region {
        id: new_id(),
        name: "Chambal Region".to_owned(),
        slug: "chambal".to_owned(),
        short_description: "Ancient ravines, forgotten temples, and timeless heritage".to_owned(),
        description: "The Chambal region is a land of mystery and forgotten heritage. Known for its dramatic ravines, ancient temples, and rich history, this region offers a unique journey through time. From the sacred Bateshwar temples to prehistoric rock art, Chambal holds secrets waiting to be discovered. Experience the raw beauty of nature intertwined with centuries-old cultural treasures.".to_owned(),
        banner_image: RAVINES_IMAGE.to_owned(),
    }
}

struct SiteSeed {
    name: &'static str,
    slug: &'static str,
    kind: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    latitude: f64,
    longitude: f64,
    entry_fee: i64,
    visit_minutes: i64,
    image: &'static str,
}

const SITES: [SiteSeed; 6] = [
    SiteSeed {
        name: "Bateshwar Temples",
        slug: "bateshwar-temples",
        kind: "Temple",
        short_description: "A stunning complex of 200+ ancient temples dating back to 8th-10th century CE",
        full_description: "The Bateshwar Temples are a magnificent archaeological complex consisting of over 200 sandstone temples dedicated to Lord Shiva. Built between the 8th and 10th centuries, these temples showcase exquisite Gurjara-Pratihara architecture. The site was lost to the ravages of time and was rediscovered and restored in recent years. Walking through this ancient complex feels like stepping back in time, with intricate carvings and spiritual energy permeating the atmosphere.",
        latitude: 26.3833,
        longitude: 78.4167,
        entry_fee: 50,
        visit_minutes: 180,
        image: TEMPLE_IMAGE,
    },
    SiteSeed {
        name: "Chambal Ravines",
        slug: "chambal-ravines",
        kind: "Natural Wonder",
        short_description: "Dramatic geological formations carved by erosion over millennia",
        full_description: "The Chambal Ravines are a spectacular natural wonder formed by severe soil erosion over thousands of years. These badlands create a surreal landscape of deep gorges, steep cliffs, and maze-like formations. Historically, these ravines were home to dacoits (bandits) and remain largely unexplored. Today, they offer adventure seekers and nature lovers a chance to witness raw, untouched beauty. The ravines are also home to diverse wildlife including gharials, dolphins, and numerous bird species.",
        latitude: 26.5,
        longitude: 78.5,
        entry_fee: 0,
        visit_minutes: 240,
        image: RAVINES_IMAGE,
    },
    SiteSeed {
        name: "Bhimbetka Rock Shelters",
        slug: "bhimbetka-rock-art",
        kind: "Rock Art",
        short_description: "UNESCO World Heritage Site featuring prehistoric cave paintings dating back 30,000 years",
        full_description: "Bhimbetka Rock Shelters are a UNESCO World Heritage Site containing some of the oldest cave paintings in India, dating back to the Paleolithic era. These natural rock formations house over 500 caves with paintings depicting scenes of hunting, dancing, religious rituals, and daily life of ancient humans. The art spans multiple periods showing the evolution of human civilization in the region. The site offers a rare glimpse into prehistoric life and artistic expression.",
        latitude: 22.9392,
        longitude: 77.6102,
        entry_fee: 100,
        visit_minutes: 150,
        image: ROCK_ART_IMAGE,
    },
    SiteSeed {
        name: "Garhi Padavali Fort",
        slug: "garhi-padavali",
        kind: "Fort",
        short_description: "Ancient hilltop fort offering panoramic views and historical significance",
        full_description: "Garhi Padavali is a historic fort perched atop a hill, offering breathtaking views of the surrounding landscape. The fort complex includes ancient temples and structures dating back to the 10th century. The architecture reflects the military and religious importance of the site. Visitors can explore the ruins while enjoying spectacular sunsets over the ravines. The site is less crowded, offering a peaceful exploration experience.",
        latitude: 25.9833,
        longitude: 78.3167,
        entry_fee: 30,
        visit_minutes: 120,
        image: FORT_IMAGE,
    },
    SiteSeed {
        name: "Mitawali Temple",
        slug: "mitawali-temple",
        kind: "Temple",
        short_description: "Unique circular temple complex with 64 shrines dedicated to yoginis",
        full_description: "Mitawali Temple, also known as Chausath Yogini Temple, is a stunning circular temple complex featuring 64 shrines dedicated to the yoginis (female mystic deities). Built in the 11th century, the temple's circular architecture is believed to have inspired the design of the Indian Parliament. The temple sits atop a hill, providing panoramic views. It's an important site for understanding tantric practices and ancient architectural innovation.",
        latitude: 25.85,
        longitude: 78.4,
        entry_fee: 40,
        visit_minutes: 90,
        image: YOGINI_IMAGE,
    },
    SiteSeed {
        name: "Dholpur Palace",
        slug: "dholpur-palace",
        kind: "Palace",
        short_description: "Majestic red sandstone palace showcasing Rajput architecture",
        full_description: "Dholpur Palace is a magnificent structure built with red sandstone, showcasing the grandeur of Rajput architecture. The palace complex includes beautiful courtyards, intricate jharokhas (overhanging balconies), and stunning frescoes. Built in the 19th century, it served as a royal residence and hunting lodge. The palace is surrounded by lush gardens and offers insights into the lifestyle of Indian royalty. It's a photographer's paradise with its stunning architecture and scenic location.",
        latitude: 26.703,
        longitude: 77.8921,
        entry_fee: 80,
        visit_minutes: 120,
        image: FORT_IMAGE,
    },
];

fn chambal_sites(region_id: &str) -> Vec<Site> {
    SITES
        .iter()
        .map(|s| Site {
            id: new_id(),
            region_id: region_id.to_owned(),
            name: s.name.to_owned(),
            slug: s.slug.to_owned(),
            kind: s.kind.to_owned(),
            short_description: s.short_description.to_owned(),
            full_description: s.full_description.to_owned(),
            latitude: s.latitude,
            longitude: s.longitude,
            stored_entry_fee: Some(s.entry_fee),
            stored_visit_minutes: Some(s.visit_minutes),
            image: s.image.to_owned(),
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_owned()).collect()
}

fn guides() -> Vec<Guide> {
    vec![
        Guide {
            id: new_id(),
            name: "Rajesh Kumar".to_owned(),
            certification: "Archaeological Survey of India Certified".to_owned(),
            fee_per_day: 2000,
            languages: strings(&["Hindi", "English", "Bundelkhandi"]),
            bio: "Rajesh has been guiding heritage tours in Chambal for over 15 years. With deep knowledge of local history, archaeology, and folklore, he brings ancient sites to life through captivating storytelling.".to_owned(),
            image: GUIDE_IMAGE.to_owned(),
        },
        Guide {
            id: new_id(),
            name: "Priya Sharma".to_owned(),
            certification: "Tourism & Hospitality Management Degree".to_owned(),
            fee_per_day: 1800,
            languages: strings(&["Hindi", "English", "German"]),
            bio: "Priya specializes in eco-tourism and wildlife experiences in Chambal. She combines cultural heritage with nature walks, offering a holistic experience of the region's biodiversity and history.".to_owned(),
            image: ECO_GUIDE_IMAGE.to_owned(),
        },
        Guide {
            id: new_id(),
            name: "Vikram Singh".to_owned(),
            certification: "Heritage Conservation Expert".to_owned(),
            fee_per_day: 2500,
            languages: strings(&["Hindi", "English", "French"]),
            bio: "Vikram is a heritage conservation expert who has worked on restoration projects across Chambal. His tours focus on architectural details and conservation efforts, perfect for architecture enthusiasts.".to_owned(),
            image: GUIDE_IMAGE.to_owned(),
        },
    ]
}

/// `sites` must be the output of [`chambal_sites`].
fn packages(sites: &[Site]) -> Vec<PresetPackage> {
    let pick = |indices: &[usize]| {
        indices
            .iter()
            .map(|&i| sites[i].id.clone())
            .collect::<Vec<_>>()
    };

    vec![
        PresetPackage {
            id: new_id(),
            name: "Budget Explorer".to_owned(),
            description: "Perfect for budget travelers wanting to experience Chambal's highlights"
                .to_owned(),
            site_ids: pick(&[0, 1, 3]),
            days: 2,
            estimated_cost: 4000,
            features: strings(&[
                "Basic accommodation",
                "Local transport",
                "Entry fees included",
                "Local food experiences",
            ]),
        },
        PresetPackage {
            id: new_id(),
            name: "Comfort Heritage Trail".to_owned(),
            description: "Balanced experience with comfort and comprehensive site coverage"
                .to_owned(),
            site_ids: pick(&[0, 1, 2, 4]),
            days: 3,
            estimated_cost: 8500,
            features: strings(&[
                "Comfortable hotels",
                "AC transport",
                "Professional guide",
                "All meals",
                "Photography spots",
            ]),
        },
        PresetPackage {
            id: new_id(),
            name: "Premium Cultural Immersion".to_owned(),
            description: "Luxury experience covering all major sites with expert guidance"
                .to_owned(),
            site_ids: pick(&[0, 1, 2, 3, 4, 5]),
            days: 5,
            estimated_cost: 18000,
            features: strings(&[
                "Luxury accommodation",
                "Private vehicle",
                "Expert guide",
                "All meals & snacks",
                "Cultural performances",
                "Sunrise/sunset tours",
                "Wildlife safari",
            ]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures::future::{self, BoxFuture, FutureExt};

    use super::seed_if_empty;
    use crate::catalog::{Catalog, Guide, Id, PresetPackage, Region, Site};
    use crate::db::memory::MemoryDb;
    use crate::db::Db;
    use crate::errors::BackendError;
    use crate::feedback::{Feedback, NewFeedback};
    use crate::trip::{NewTrip, Trip};

    /// A [`MemoryDb`] whose next catalogue insert fails once.
    #[derive(Default)]
    struct FailOnce {
        inner: MemoryDb,
        failed: AtomicBool,
    }

    impl Db for FailOnce {
        fn count_regions(&self) -> BoxFuture<Result<i64, BackendError>> {
            self.inner.count_regions()
        }

        fn retrieve_regions(&self) -> BoxFuture<Result<Vec<Region>, BackendError>> {
            self.inner.retrieve_regions()
        }

        fn retrieve_region(&self, slug: &str) -> BoxFuture<Result<Option<Region>, BackendError>> {
            self.inner.retrieve_region(slug)
        }

        fn retrieve_sites(
            &self,
            region_id: Option<&str>,
        ) -> BoxFuture<Result<Vec<Site>, BackendError>> {
            self.inner.retrieve_sites(region_id)
        }

        fn retrieve_site(&self, slug: &str) -> BoxFuture<Result<Option<Site>, BackendError>> {
            self.inner.retrieve_site(slug)
        }

        fn retrieve_sites_by_ids(
            &self,
            ids: &[Id],
        ) -> BoxFuture<Result<Vec<Site>, BackendError>> {
            self.inner.retrieve_sites_by_ids(ids)
        }

        fn retrieve_guides(&self) -> BoxFuture<Result<Vec<Guide>, BackendError>> {
            self.inner.retrieve_guides()
        }

        fn retrieve_guide(&self, id: &str) -> BoxFuture<Result<Option<Guide>, BackendError>> {
            self.inner.retrieve_guide(id)
        }

        fn retrieve_preset_packages(
            &self,
        ) -> BoxFuture<Result<Vec<PresetPackage>, BackendError>> {
            self.inner.retrieve_preset_packages()
        }

        fn insert_feedback(
            &self,
            feedback: NewFeedback,
        ) -> BoxFuture<Result<Feedback, BackendError>> {
            self.inner.insert_feedback(feedback)
        }

        fn retrieve_feedbacks(&self) -> BoxFuture<Result<Vec<Feedback>, BackendError>> {
            self.inner.retrieve_feedbacks()
        }

        fn insert_trip(&self, trip: NewTrip) -> BoxFuture<Result<Trip, BackendError>> {
            self.inner.insert_trip(trip)
        }

        fn insert_catalog(&self, catalog: &Catalog) -> BoxFuture<Result<(), BackendError>> {
            if self.failed.swap(true, Ordering::SeqCst) {
                self.inner.insert_catalog(catalog)
            } else {
                future::ready(Err(sqlx::Error::PoolTimedOut.into())).boxed()
            }
        }
    }

    #[tokio::test]
    async fn failed_seed_leaves_nothing_behind_and_is_retried() {
        let logger = log::discard();
        let db = FailOnce::default();

        assert!(seed_if_empty(&logger, &db).await.is_err());
        assert_eq!(db.count_regions().await.expect("count"), 0);
        assert!(db.retrieve_sites(None).await.expect("sites").is_empty());
        assert!(db.retrieve_guides().await.expect("guides").is_empty());

        assert!(seed_if_empty(&logger, &db).await.expect("retried seed"));
        assert_eq!(db.count_regions().await.expect("count"), 1);
        assert_eq!(db.retrieve_sites(None).await.expect("sites").len(), 6);
        assert_eq!(db.retrieve_guides().await.expect("guides").len(), 3);
    }

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let logger = log::discard();
        let db = MemoryDb::new();

        assert!(seed_if_empty(&logger, &db).await.expect("first seed"));
        assert!(!seed_if_empty(&logger, &db).await.expect("second seed"));

        assert_eq!(db.count_regions().await.expect("count"), 1);
        assert_eq!(db.retrieve_sites(None).await.expect("sites").len(), 6);
        assert_eq!(db.retrieve_guides().await.expect("guides").len(), 3);
        assert_eq!(
            db.retrieve_preset_packages().await.expect("packages").len(),
            3
        );
    }

    #[tokio::test]
    async fn packages_point_at_seeded_sites() {
        let logger = log::discard();
        let db = MemoryDb::new();
        seed_if_empty(&logger, &db).await.expect("seed");

        let sites = db.retrieve_sites(None).await.expect("sites");
        let packages = db.retrieve_preset_packages().await.expect("packages");

        for package in &packages {
            for id in &package.site_ids {
                assert!(sites.iter().any(|s| &s.id == id), "{} is unknown", id);
            }
        }

        let premium = packages
            .iter()
            .find(|p| p.name == "Premium Cultural Immersion")
            .expect("premium package");
        assert_eq!(premium.site_ids.len(), sites.len());
    }

    #[tokio::test]
    async fn every_seeded_site_belongs_to_chambal() {
        let logger = log::discard();
        let db = MemoryDb::new();
        seed_if_empty(&logger, &db).await.expect("seed");

        let region = db
            .retrieve_region("chambal")
            .await
            .expect("retrieve")
            .expect("chambal exists");
        let sites = db.retrieve_sites(Some(region.id.as_str())).await.expect("sites");

        assert_eq!(sites.len(), 6);
        assert_eq!(sites[0].slug, "bateshwar-temples");
    }
}
