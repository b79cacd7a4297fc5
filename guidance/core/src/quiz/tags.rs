//! Career Tags
//!
//! The closed set of career identifiers a quiz option can point at. Using an
//! enum instead of free-form strings means an authored question bank with a
//! misspelled tag fails to load instead of silently never matching.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A career a quiz answer can count towards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareerTag {
    /// Builds and maintains software systems
    SoftwareEngineer,
    /// Turns data into models and insight
    DataScientist,
    /// Diagnoses and treats patients
    Doctor,
    /// Provides clinical patient care
    Nurse,
    /// Prepares and dispenses medicines
    Pharmacist,
    /// Designs roads, bridges and buildings' structure
    CivilEngineer,
    /// Designs machines and thermal systems
    MechanicalEngineer,
    /// Designs buildings and spaces
    Architect,
    /// Teaches in schools or colleges
    Teacher,
    /// Practices law
    Lawyer,
    /// Audits, taxes and corporate finance
    CharteredAccountant,
    /// Visual communication and branding
    GraphicDesigner,
    /// Reports and writes the news
    Journalist,
    /// Studies and supports mental health
    Psychologist,
    /// Starts and runs businesses
    Entrepreneur,
    /// Works in public administration
    CivilServant,
}

impl CareerTag {
    /// Every tag, in declaration order
    pub const ALL: [CareerTag; 16] = [
        Self::SoftwareEngineer,
        Self::DataScientist,
        Self::Doctor,
        Self::Nurse,
        Self::Pharmacist,
        Self::CivilEngineer,
        Self::MechanicalEngineer,
        Self::Architect,
        Self::Teacher,
        Self::Lawyer,
        Self::CharteredAccountant,
        Self::GraphicDesigner,
        Self::Journalist,
        Self::Psychologist,
        Self::Entrepreneur,
        Self::CivilServant,
    ];

    /// The kebab-case identifier used in content files and URLs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SoftwareEngineer => "software-engineer",
            Self::DataScientist => "data-scientist",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Pharmacist => "pharmacist",
            Self::CivilEngineer => "civil-engineer",
            Self::MechanicalEngineer => "mechanical-engineer",
            Self::Architect => "architect",
            Self::Teacher => "teacher",
            Self::Lawyer => "lawyer",
            Self::CharteredAccountant => "chartered-accountant",
            Self::GraphicDesigner => "graphic-designer",
            Self::Journalist => "journalist",
            Self::Psychologist => "psychologist",
            Self::Entrepreneur => "entrepreneur",
            Self::CivilServant => "civil-servant",
        }
    }
}

impl fmt::Display for CareerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no known career
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown career tag: {0:?}")]
pub struct UnknownCareerTag(pub String);

impl FromStr for CareerTag {
    type Err = UnknownCareerTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCareerTag(s.to_string()))
    }
}
