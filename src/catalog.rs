// 🗂️ NEO Catalog - Linker + lookups + streaming query
//
// Takes ownership of the loaded NEOs and close approaches, links them once,
// and is read-only afterwards.
//
// Link model:
// - designation → NeoId is the single primary index
// - CloseApproach.neo holds the NeoId of its NEO (None when unmatched)
// - NearEarthObject.approaches holds ApproachIds in storage order

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::entities::{ApproachId, CloseApproach, NearEarthObject, NeoId};
use crate::error::LookupError;
use crate::filters::AttributeFilter;
use crate::parser::{load_approaches, load_neos};

// ============================================================================
// APPROACH RECORD (approach + resolved NEO)
// ============================================================================

/// A close approach together with its linked NEO, as yielded by [`Catalog::query`]
#[derive(Debug, Clone, Copy)]
pub struct ApproachRecord<'a> {
    pub approach: &'a CloseApproach,
    pub neo: Option<&'a NearEarthObject>,
}

impl<'a> ApproachRecord<'a> {
    /// Designation of the linked NEO, or the approach's own designation when unlinked
    pub fn designation(&self) -> &'a str {
        match self.neo {
            Some(neo) => neo.designation(),
            None => self.approach.designation(),
        }
    }
}

impl fmt::Display for ApproachRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.neo {
            Some(neo) => neo.fullname(),
            None => self.approach.designation().to_string(),
        };
        write!(
            f,
            "On {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.approach.time_str(),
            who,
            self.approach.distance,
            self.approach.velocity
        )
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// In-memory catalog of NEOs and their close approaches
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    by_designation: HashMap<String, NeoId>,
}

impl Catalog {
    /// Link NEOs and close approaches into a catalog
    ///
    /// Every approach whose designation matches an NEO gets that NEO as its
    /// link and is appended to the NEO's approaches in input order. Approaches
    /// with no match stay unlinked; they are still stored and queryable.
    ///
    /// A repeated designation replaces the earlier NEO (last writer wins),
    /// keeping the earlier storage position.
    pub fn new(neos: Vec<NearEarthObject>, mut approaches: Vec<CloseApproach>) -> Self {
        let mut stored: Vec<NearEarthObject> = Vec::with_capacity(neos.len());
        let mut by_designation: HashMap<String, NeoId> = HashMap::with_capacity(neos.len());

        for mut neo in neos {
            // Links from a previous catalog point into foreign storage
            neo.approaches.clear();

            let existing = by_designation.get(neo.designation()).copied();
            match existing {
                Some(NeoId(slot)) => {
                    warn!(
                        designation = neo.designation(),
                        "Duplicate NEO designation; keeping the later record"
                    );
                    stored[slot] = neo;
                }
                None => {
                    by_designation.insert(neo.designation().to_string(), NeoId(stored.len()));
                    stored.push(neo);
                }
            }
        }

        let mut unlinked = 0usize;
        for (slot, approach) in approaches.iter_mut().enumerate() {
            let link = by_designation.get(approach.designation()).copied();
            approach.neo = link;
            match link {
                Some(NeoId(index)) => stored[index].approaches.push(ApproachId(slot)),
                None => unlinked += 1,
            }
        }

        info!(
            neos = stored.len(),
            approaches = approaches.len(),
            unlinked,
            "Catalog linked"
        );

        Catalog {
            neos: stored,
            approaches,
            by_designation,
        }
    }

    /// Load both data files and link them
    pub fn from_files(neo_path: &Path, cad_path: &Path) -> anyhow::Result<Self> {
        let neos = load_neos(neo_path)?;
        let approaches = load_approaches(cad_path)?;
        Ok(Catalog::new(neos, approaches))
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    /// Find an NEO by primary designation
    pub fn find_by_designation(&self, designation: &str) -> Result<&NearEarthObject, LookupError> {
        if designation.is_empty() {
            return Err(LookupError::EmptyDesignation);
        }

        self.by_designation
            .get(designation)
            .map(|id| &self.neos[id.0])
            .ok_or_else(|| LookupError::DesignationNotFound(designation.to_string()))
    }

    /// Find an NEO by exact (case-sensitive) name; first match in storage order wins
    pub fn find_by_name(&self, name: &str) -> Result<&NearEarthObject, LookupError> {
        if name.is_empty() {
            return Err(LookupError::EmptyName);
        }

        self.neos
            .iter()
            .find(|neo| neo.name.as_deref() == Some(name))
            .ok_or_else(|| LookupError::NameNotFound(name.to_string()))
    }

    /// Like [`find_by_designation`](Self::find_by_designation), but reports the
    /// failure through the log and returns `None`
    pub fn get_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        match self.find_by_designation(designation) {
            Ok(neo) => Some(neo),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    /// Like [`find_by_name`](Self::find_by_name), but reports the failure
    /// through the log and returns `None`
    pub fn get_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        match self.find_by_name(name) {
            Ok(neo) => Some(neo),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// The NEO linked to an approach from this catalog
    pub fn neo_for(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo_id().and_then(|id| self.neos.get(id.0))
    }

    /// Close approaches linked to an NEO from this catalog, in storage order
    pub fn approaches_for<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approach_ids()
            .iter()
            .filter_map(move |id| self.approaches.get(id.0))
    }

    /// All NEOs in storage order
    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    /// All close approaches in storage order
    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }

    pub fn neo_count(&self) -> usize {
        self.neos.len()
    }

    pub fn approach_count(&self) -> usize {
        self.approaches.len()
    }

    /// Approaches whose designation matched no NEO
    pub fn unlinked_count(&self) -> usize {
        self.approaches.iter().filter(|a| !a.is_linked()).count()
    }

    fn record<'a>(&'a self, approach: &'a CloseApproach) -> ApproachRecord<'a> {
        ApproachRecord {
            approach,
            neo: self.neo_for(approach),
        }
    }

    // ========================================================================
    // QUERY
    // ========================================================================

    /// Stream the close approaches that satisfy every filter
    ///
    /// Results come in storage order. An empty filter slice yields every
    /// stored approach. The returned [`Query`] is single-pass.
    pub fn query<'a>(&'a self, filters: &'a [AttributeFilter]) -> Query<'a> {
        Query {
            catalog: self,
            approaches: self.approaches.iter(),
            filters,
        }
    }

    /// Summary counts
    pub fn stats(&self) -> CatalogStats {
        let unlinked_approaches = self.unlinked_count();
        CatalogStats {
            neo_count: self.neos.len(),
            named_neos: self.neos.iter().filter(|n| n.name.is_some()).count(),
            hazardous_neos: self.neos.iter().filter(|n| n.hazardous).count(),
            approach_count: self.approaches.len(),
            linked_approaches: self.approaches.len() - unlinked_approaches,
            unlinked_approaches,
        }
    }
}

// ============================================================================
// QUERY STREAM
// ============================================================================

/// Lazy, pull-based stream of matching approaches
///
/// Not restartable: once consumed, call [`Catalog::query`] again.
/// Filters are evaluated in order and stop at the first one that fails.
pub struct Query<'a> {
    catalog: &'a Catalog,
    approaches: std::slice::Iter<'a, CloseApproach>,
    filters: &'a [AttributeFilter],
}

impl<'a> Iterator for Query<'a> {
    type Item = ApproachRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let catalog = self.catalog;
        let filters = self.filters;

        self.approaches
            .by_ref()
            .map(|approach| catalog.record(approach))
            .find(|record| filters.iter().all(|filter| filter.matches(record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.approaches.size_hint();
        if self.filters.is_empty() {
            (lower, upper)
        } else {
            (0, upper)
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub neo_count: usize,
    pub named_neos: usize,
    pub hazardous_neos: usize,
    pub approach_count: usize,
    pub linked_approaches: usize,
    pub unlinked_approaches: usize,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Comparator;

    fn neo(designation: &str, name: Option<&str>, diameter: Option<f64>, hazardous: bool) -> NearEarthObject {
        NearEarthObject::new(designation, name.map(|n| n.to_string()), diameter, hazardous)
    }

    fn approach(designation: &str, cd: &str, distance: f64, velocity: f64) -> CloseApproach {
        CloseApproach::from_calendar_date(designation, cd, distance, velocity).unwrap()
    }

    fn sample_catalog() -> Catalog {
        let neos = vec![
            neo("433", Some("Eros"), Some(16.84), false),
            neo("1036", Some("Ganymed"), Some(37.675), false),
            neo("2020 AB", None, None, true),
        ];
        let approaches = vec![
            approach("433", "2020-Jan-01 00:00", 0.15, 5.2),
            approach("2020 AB", "2020-Jan-02 10:00", 0.02, 12.0),
            approach("433", "2021-Mar-15 04:30", 0.30, 6.1),
            approach("9999", "2021-Apr-01 00:00", 0.05, 3.0),
        ];
        Catalog::new(neos, approaches)
    }

    #[test]
    fn test_eros_example() {
        let catalog = Catalog::new(
            vec![neo("433", Some("Eros"), Some(16.84), false)],
            vec![approach("433", "2020-Jan-01 00:00", 0.15, 5.2)],
        );

        let eros = catalog.get_by_designation("433").unwrap();
        assert_eq!(eros.name.as_deref(), Some("Eros"));

        let near = [AttributeFilter::Distance(Comparator::Le, 0.2)];
        assert_eq!(catalog.query(&near).count(), 1);

        let nearer = [AttributeFilter::Distance(Comparator::Le, 0.1)];
        assert_eq!(catalog.query(&nearer).count(), 0);
    }

    #[test]
    fn test_linking_is_bidirectional() {
        let catalog = sample_catalog();

        for neo in catalog.neos() {
            for approach in catalog.approaches_for(neo) {
                assert_eq!(catalog.neo_for(approach).unwrap().designation(), neo.designation());
            }
        }

        // Each matching approach appears exactly once, in input order
        let eros = catalog.get_by_designation("433").unwrap();
        let times: Vec<String> = catalog.approaches_for(eros).map(|a| a.time_str()).collect();
        assert_eq!(times, vec!["2020-01-01 00:00", "2021-03-15 04:30"]);

        let ganymed = catalog.get_by_name("Ganymed").unwrap();
        assert_eq!(ganymed.approach_count(), 0);
    }

    #[test]
    fn test_unmatched_approach_stays_unlinked() {
        let catalog = sample_catalog();

        let orphan = catalog
            .approaches()
            .iter()
            .find(|a| a.designation() == "9999")
            .unwrap();
        assert!(!orphan.is_linked());
        assert!(catalog.neo_for(orphan).is_none());
        assert_eq!(catalog.unlinked_count(), 1);

        // Still queryable without NEO filters
        assert_eq!(catalog.query(&[]).count(), 4);

        // But never admitted by NEO-attribute filters
        let not_hazardous = [AttributeFilter::Hazardous(Comparator::Eq, false)];
        assert!(catalog
            .query(&not_hazardous)
            .all(|r| r.approach.designation() != "9999"));
    }

    #[test]
    fn test_get_by_designation() {
        let catalog = sample_catalog();

        for designation in ["433", "1036", "2020 AB"] {
            assert_eq!(catalog.get_by_designation(designation).unwrap().designation(), designation);
        }

        assert!(catalog.get_by_designation("404").is_none());
        assert!(catalog.get_by_designation("").is_none());
        assert_eq!(
            catalog.find_by_designation("404"),
            Err(LookupError::DesignationNotFound("404".to_string()))
        );
        assert_eq!(catalog.find_by_designation(""), Err(LookupError::EmptyDesignation));
    }

    #[test]
    fn test_get_by_name_is_case_sensitive() {
        let catalog = sample_catalog();

        assert_eq!(catalog.get_by_name("Eros").unwrap().designation(), "433");
        assert!(catalog.get_by_name("eros").is_none());
        assert!(catalog.get_by_name("Halley").is_none());
        assert_eq!(catalog.find_by_name(""), Err(LookupError::EmptyName));
    }

    #[test]
    fn test_get_by_name_first_match_wins() {
        let catalog = Catalog::new(
            vec![
                neo("A1", Some("Twin"), None, false),
                neo("A2", Some("Twin"), None, true),
            ],
            vec![],
        );

        assert_eq!(catalog.get_by_name("Twin").unwrap().designation(), "A1");
    }

    #[test]
    fn test_duplicate_designation_last_writer_wins() {
        let catalog = Catalog::new(
            vec![
                neo("433", Some("Old"), None, false),
                neo("1036", None, None, false),
                neo("433", Some("Eros"), Some(16.84), false),
            ],
            vec![approach("433", "2020-Jan-01 00:00", 0.15, 5.2)],
        );

        assert_eq!(catalog.neo_count(), 2);
        assert_eq!(catalog.neos()[0].name.as_deref(), Some("Eros"));
        assert_eq!(catalog.get_by_designation("433").unwrap().approach_count(), 1);
        assert!(catalog.get_by_name("Old").is_none());
    }

    #[test]
    fn test_rebuild_from_cloned_records_relinks_from_scratch() {
        let first = Catalog::new(
            vec![neo("433", Some("Eros"), Some(16.84), false)],
            vec![
                approach("433", "2020-Jan-01 00:00", 0.15, 5.2),
                approach("433", "2021-Mar-15 04:30", 0.30, 6.1),
            ],
        );
        assert_eq!(first.neos()[0].approach_count(), 2);

        let second = Catalog::new(first.neos().to_vec(), vec![first.approaches()[1].clone()]);

        let eros = second.get_by_designation("433").unwrap();
        assert_eq!(eros.approach_count(), 1);
        let times: Vec<String> = second.approaches_for(eros).map(|a| a.time_str()).collect();
        assert_eq!(times, vec!["2021-03-15 04:30"]);

        // An approach cloned from a linked catalog gets relinked, not trusted
        let orphaned = Catalog::new(vec![], first.approaches().to_vec());
        assert_eq!(orphaned.unlinked_count(), 2);
        assert!(orphaned.approaches().iter().all(|a| orphaned.neo_for(a).is_none()));
    }

    #[test]
    fn test_query_without_filters_yields_everything_in_order() {
        let catalog = sample_catalog();

        let all: Vec<&CloseApproach> = catalog.query(&[]).map(|r| r.approach).collect();
        let stored: Vec<&CloseApproach> = catalog.approaches().iter().collect();
        assert_eq!(all, stored);
    }

    #[test]
    fn test_query_ands_filters() {
        let catalog = sample_catalog();

        // One always-true and one always-false predicate never admit anything
        let filters = [
            AttributeFilter::Distance(Comparator::Ge, 0.0),
            AttributeFilter::Velocity(Comparator::Le, -1.0),
        ];
        assert_eq!(catalog.query(&filters).count(), 0);

        let filters = [
            AttributeFilter::Distance(Comparator::Le, 0.2),
            AttributeFilter::Velocity(Comparator::Ge, 5.0),
        ];
        let hits: Vec<&str> = catalog.query(&filters).map(|r| r.designation()).collect();
        assert_eq!(hits, vec!["433", "2020 AB"]);
    }

    #[test]
    fn test_query_is_subset_of_full_set() {
        let catalog = sample_catalog();
        let filters = [AttributeFilter::Hazardous(Comparator::Eq, true)];

        let all: Vec<&CloseApproach> = catalog.query(&[]).map(|r| r.approach).collect();
        for record in catalog.query(&filters) {
            assert!(all.contains(&record.approach));
            assert!(record.neo.unwrap().hazardous);
        }
    }

    #[test]
    fn test_query_is_lazy() {
        let catalog = sample_catalog();
        let mut stream = catalog.query(&[]);

        assert_eq!(stream.next().unwrap().designation(), "433");
        assert_eq!(stream.next().unwrap().designation(), "2020 AB");
        assert_eq!(stream.count(), 2);
    }

    #[test]
    fn test_record_display_uses_fullname() {
        let catalog = sample_catalog();
        let lines: Vec<String> = catalog.query(&[]).map(|r| r.to_string()).collect();

        assert_eq!(
            lines[0],
            "On 2020-01-01 00:00, '433 (Eros)' approaches Earth at a distance of 0.15 au and a velocity of 5.20 km/s."
        );
        assert!(lines[3].contains("'9999'"));
    }

    #[test]
    fn test_stats() {
        let stats = sample_catalog().stats();

        assert_eq!(stats.neo_count, 3);
        assert_eq!(stats.named_neos, 2);
        assert_eq!(stats.hazardous_neos, 1);
        assert_eq!(stats.approach_count, 4);
        assert_eq!(stats.linked_approaches, 3);
        assert_eq!(stats.unlinked_approaches, 1);
    }
}
