//! Reference Catalog
//!
//! Read-only reference data for the portal: careers, colleges, scholarships,
//! courses, government jobs and wellbeing resources. Consumers receive the
//! data through the [`CatalogProvider`] trait instead of reaching for global
//! tables, so the quiz and tests can run against any dataset.
//!
//! # Usage
//!
//! ```ignore
//! use guidance_core::catalog::{query::CollegeFilter, CatalogProvider, StaticCatalog};
//!
//! let catalog = StaticCatalog::builtin()?;
//! let filter = CollegeFilter { state: Some("karnataka".into()), ..Default::default() };
//! for college in guidance_core::catalog::query::search(catalog.colleges(), &filter) {
//!     println!("{}", college.name);
//! }
//! ```

pub mod favorites;
pub mod query;
mod records;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::CareerTag;

pub use records::{
    Career, CareerCategory, College, CollegeType, Course, CourseLevel, CourseMode, EducationLevel,
    GovernmentJob, JobSector, ResourceKind, Scholarship, WellbeingResource,
};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Errors from loading or querying the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read a catalog file
    #[error("failed to read catalog: {0}")]
    Read(#[from] std::io::Error),

    /// Catalog JSON was malformed
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records of one collection share an id
    #[error("duplicate {kind} id {id:?}")]
    DuplicateId {
        /// Collection with the clash
        kind: CatalogKind,
        /// Repeated id
        id: String,
    },

    /// A filter key that the collection does not support
    #[error("unknown filter {key:?} for {kind}")]
    UnknownFilter {
        /// Collection being filtered
        kind: CatalogKind,
        /// Key that was given
        key: String,
    },

    /// A filter value that does not parse
    #[error("invalid {field} filter value: {value:?}")]
    InvalidFilterValue {
        /// Field being filtered
        field: &'static str,
        /// Value that was given
        value: String,
    },
}

/// The browsable collections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    /// Career profiles
    Career,
    /// Colleges
    College,
    /// Scholarships
    Scholarship,
    /// Courses
    Course,
    /// Government jobs
    GovernmentJob,
    /// Wellbeing resources
    Wellbeing,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Career => "career",
            Self::College => "college",
            Self::Scholarship => "scholarship",
            Self::Course => "course",
            Self::GovernmentJob => "government job",
            Self::Wellbeing => "wellbeing resource",
        };
        f.write_str(name)
    }
}

/// Read-only access to the reference data
pub trait CatalogProvider: Send + Sync {
    /// Career profiles
    fn careers(&self) -> &[Career];

    /// Colleges
    fn colleges(&self) -> &[College];

    /// Scholarships
    fn scholarships(&self) -> &[Scholarship];

    /// Courses
    fn courses(&self) -> &[Course];

    /// Government job notifications
    fn government_jobs(&self) -> &[GovernmentJob];

    /// Mental-health self-help resources
    fn wellbeing(&self) -> &[WellbeingResource];

    /// Career profile for a tag
    fn career(&self, tag: CareerTag) -> Option<&Career> {
        self.careers().iter().find(|c| c.tag == tag)
    }

    /// Whether a record with this id exists in the collection
    fn contains(&self, kind: CatalogKind, id: &str) -> bool {
        match kind {
            CatalogKind::Career => CareerTag::from_str(id)
                .ok()
                .and_then(|tag| self.career(tag))
                .is_some(),
            CatalogKind::College => self.colleges().iter().any(|r| r.id == id),
            CatalogKind::Scholarship => self.scholarships().iter().any(|r| r.id == id),
            CatalogKind::Course => self.courses().iter().any(|r| r.id == id),
            CatalogKind::GovernmentJob => self.government_jobs().iter().any(|r| r.id == id),
            CatalogKind::Wellbeing => self.wellbeing().iter().any(|r| r.id == id),
        }
    }
}

/// An in-memory catalog, built once and never mutated
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCatalog {
    /// Career profiles
    pub careers: Vec<Career>,
    /// Colleges
    pub colleges: Vec<College>,
    /// Scholarships
    pub scholarships: Vec<Scholarship>,
    /// Courses
    pub courses: Vec<Course>,
    /// Government jobs
    pub government_jobs: Vec<GovernmentJob>,
    /// Wellbeing resources
    pub wellbeing: Vec<WellbeingResource>,
}

impl StaticCatalog {
    /// The dataset shipped with the portal
    ///
    /// # Errors
    ///
    /// Only fails if the embedded content is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog from JSON
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or duplicate ids.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        check_unique(CatalogKind::Career, self.careers.iter().map(Career::id))?;
        check_unique(
            CatalogKind::College,
            self.colleges.iter().map(|r| r.id.as_str()),
        )?;
        check_unique(
            CatalogKind::Scholarship,
            self.scholarships.iter().map(|r| r.id.as_str()),
        )?;
        check_unique(
            CatalogKind::Course,
            self.courses.iter().map(|r| r.id.as_str()),
        )?;
        check_unique(
            CatalogKind::GovernmentJob,
            self.government_jobs.iter().map(|r| r.id.as_str()),
        )?;
        check_unique(
            CatalogKind::Wellbeing,
            self.wellbeing.iter().map(|r| r.id.as_str()),
        )
    }
}

fn check_unique<'a>(
    kind: CatalogKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl CatalogProvider for StaticCatalog {
    fn careers(&self) -> &[Career] {
        &self.careers
    }

    fn colleges(&self) -> &[College] {
        &self.colleges
    }

    fn scholarships(&self) -> &[Scholarship] {
        &self.scholarships
    }

    fn courses(&self) -> &[Course] {
        &self.courses
    }

    fn government_jobs(&self) -> &[GovernmentJob] {
        &self.government_jobs
    }

    fn wellbeing(&self) -> &[WellbeingResource] {
        &self.wellbeing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = StaticCatalog::builtin().unwrap();
        assert!(!catalog.colleges().is_empty());
        assert!(!catalog.scholarships().is_empty());
        assert!(!catalog.courses().is_empty());
        assert!(!catalog.government_jobs().is_empty());
        assert!(!catalog.wellbeing().is_empty());
    }

    #[test]
    fn test_builtin_catalog_covers_every_career_tag() {
        let catalog = StaticCatalog::builtin().unwrap();
        for tag in CareerTag::ALL {
            assert!(catalog.career(tag).is_some(), "missing career {tag}");
        }
    }

    #[test]
    fn test_contains_by_kind() {
        let catalog = StaticCatalog::builtin().unwrap();
        assert!(catalog.contains(CatalogKind::Career, "doctor"));
        assert!(!catalog.contains(CatalogKind::Career, "astronaut"));
        let college = catalog.colleges()[0].id.clone();
        assert!(catalog.contains(CatalogKind::College, &college));
        assert!(!catalog.contains(CatalogKind::Course, &college));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"{
            "wellbeing": [
                {"id": "w1", "title": "A", "kind": "article", "summary": "", "contact": null},
                {"id": "w1", "title": "B", "kind": "article", "summary": "", "contact": null}
            ]
        }"#;
        let err = StaticCatalog::from_json_str(json).unwrap_err();
        assert_eq!(err.to_string(), "duplicate wellbeing resource id \"w1\"");
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let catalog = StaticCatalog::from_json_str("{}").unwrap();
        assert_eq!(catalog, StaticCatalog::default());
    }
}
