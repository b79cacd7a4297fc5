//! Catalog Records
//!
//! Plain data types for the portal's browsable collections. Every record has
//! a stable string id so favorites and links can refer to it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::quiz::CareerTag;

/// Implements `FromStr` and `Display` over a unit enum's kebab-case names
macro_rules! kebab_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// The kebab-case name used in data files and filters
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(CatalogError::InvalidFilterValue {
                        field: stringify!($ty),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Broad field a career belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareerCategory {
    /// Software, data and computing
    Technology,
    /// Medicine and care
    Healthcare,
    /// Core engineering and the built environment
    Engineering,
    /// Teaching and research
    Education,
    /// Law and public service
    LawAndGovernance,
    /// Accounting and business
    Business,
    /// Design and media
    CreativeArts,
    /// Psychology and social work
    SocialScience,
}

kebab_enum!(CareerCategory {
    Technology => "technology",
    Healthcare => "healthcare",
    Engineering => "engineering",
    Education => "education",
    LawAndGovernance => "law-and-governance",
    Business => "business",
    CreativeArts => "creative-arts",
    SocialScience => "social-science",
});

/// Highest qualification level, ordered from lowest to highest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    /// Class 10
    Secondary,
    /// Class 12
    HigherSecondary,
    /// Bachelor's degree
    Undergraduate,
    /// Master's degree
    Postgraduate,
    /// PhD
    Doctoral,
}

kebab_enum!(EducationLevel {
    Secondary => "secondary",
    HigherSecondary => "higher-secondary",
    Undergraduate => "undergraduate",
    Postgraduate => "postgraduate",
    Doctoral => "doctoral",
});

/// Ownership of a college
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollegeType {
    /// Publicly funded
    Government,
    /// Privately run
    Private,
    /// Deemed-to-be university
    Deemed,
}

kebab_enum!(CollegeType {
    Government => "government",
    Private => "private",
    Deemed => "deemed",
});

/// How a course is delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseMode {
    /// Fully online
    Online,
    /// In a classroom
    Offline,
    /// Mix of both
    Hybrid,
}

kebab_enum!(CourseMode {
    Online => "online",
    Offline => "offline",
    Hybrid => "hybrid",
});

/// Difficulty of a course
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseLevel {
    /// No prior knowledge needed
    Beginner,
    /// Some background expected
    Intermediate,
    /// For experienced learners
    Advanced,
}

kebab_enum!(CourseLevel {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

/// Government recruitment sector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobSector {
    /// Public sector banks
    Banking,
    /// Indian Railways
    Railways,
    /// Armed forces
    Defence,
    /// Administrative services
    CivilServices,
    /// Government schools
    Teaching,
    /// Public hospitals
    Healthcare,
}

kebab_enum!(JobSector {
    Banking => "banking",
    Railways => "railways",
    Defence => "defence",
    CivilServices => "civil-services",
    Teaching => "teaching",
    Healthcare => "healthcare",
});

/// Kind of self-help resource
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Reading material
    Article,
    /// Guided breathing
    BreathingExercise,
    /// Guided meditation
    Meditation,
    /// Phone or chat support line
    Helpline,
}

kebab_enum!(ResourceKind {
    Article => "article",
    BreathingExercise => "breathing-exercise",
    Meditation => "meditation",
    Helpline => "helpline",
});

/// A career profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Career {
    /// Career identifier, doubles as the record id
    pub tag: CareerTag,
    /// Display title
    pub title: String,
    /// Broad field
    pub category: CareerCategory,
    /// Short description
    pub description: String,
    /// Typical qualification route
    pub education_path: String,
    /// Key skills
    #[serde(default)]
    pub skills: Vec<String>,
    /// Typical starting salary in lakh rupees per year
    pub starting_salary_lpa: f32,
}

impl Career {
    /// Record id
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.tag.as_str()
    }
}

/// A college or university
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct College {
    /// Record id
    pub id: String,
    /// College name
    pub name: String,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Ownership
    pub college_type: CollegeType,
    /// Streams offered (engineering, medicine, ...)
    #[serde(default)]
    pub streams: Vec<String>,
    /// Year founded
    pub established: u16,
}

/// A scholarship programme
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    /// Record id
    pub id: String,
    /// Scholarship name
    pub name: String,
    /// Awarding body
    pub provider: String,
    /// Level of study it funds
    pub level: EducationLevel,
    /// Award per year in rupees
    pub amount_inr: u32,
    /// Family income ceiling in rupees, if any
    pub max_family_income_inr: Option<u32>,
    /// Application deadline
    pub deadline: NaiveDate,
    /// Short description
    pub description: String,
}

/// A skill course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Record id
    pub id: String,
    /// Course title
    pub title: String,
    /// Platform or institute
    pub provider: String,
    /// Delivery mode
    pub mode: CourseMode,
    /// Difficulty
    pub level: CourseLevel,
    /// Length in weeks
    pub duration_weeks: u16,
    /// Careers the course prepares for
    #[serde(default)]
    pub careers: Vec<CareerTag>,
    /// Whether it costs nothing
    pub free: bool,
}

/// A government job notification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernmentJob {
    /// Record id
    pub id: String,
    /// Post title
    pub title: String,
    /// Recruiting body
    pub organization: String,
    /// Sector
    pub sector: JobSector,
    /// Minimum qualification
    pub qualification: EducationLevel,
    /// Number of posts
    pub vacancies: u32,
    /// Last date to apply
    pub last_date: NaiveDate,
    /// Upper age limit in years
    pub max_age: u8,
}

/// A mental-health self-help resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellbeingResource {
    /// Record id
    pub id: String,
    /// Title
    pub title: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// One-paragraph summary
    pub summary: String,
    /// Ordered steps for exercises
    #[serde(default)]
    pub steps: Vec<String>,
    /// Phone number or link for helplines
    pub contact: Option<String>,
}
