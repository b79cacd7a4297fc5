//! Catalog Search
//!
//! Free-text search plus typed filters over catalog collections. Each
//! collection has a filter struct whose fields are all optional; set fields
//! combine with AND. Text matching is a case-insensitive substring match
//! over a record's names and descriptions.
//!
//! Filters can also be built from `key=value` pairs (see
//! [`RecordFilter::set`]) so front ends can pass them through verbatim.

use std::str::FromStr;

use super::records::{
    Career, CareerCategory, College, CollegeType, Course, CourseLevel, CourseMode,
    EducationLevel, GovernmentJob, JobSector, ResourceKind, Scholarship, WellbeingResource,
};
use super::{CatalogError, CatalogKind};
use crate::quiz::CareerTag;

/// A predicate over records of type `T`
pub trait RecordFilter<T>: Default {
    /// Collection this filter applies to
    const KIND: CatalogKind;

    /// Whether `record` passes every set condition
    fn matches(&self, record: &T) -> bool;

    /// Set the free-text query
    fn set_text(&mut self, text: &str);

    /// Set one condition from a `key=value` pair
    ///
    /// # Errors
    ///
    /// Returns an error for keys the collection does not support or values
    /// that do not parse.
    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
}

/// Records passing `filter`, in catalog order
pub fn search<'a, T, F: RecordFilter<T>>(records: &'a [T], filter: &F) -> Vec<&'a T> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Build a filter from an optional query and `key=value` pairs
///
/// # Errors
///
/// Returns an error if any pair lacks `=` or is rejected by the filter.
pub fn build_filter<T, F: RecordFilter<T>>(
    text: Option<&str>,
    pairs: &[String],
) -> Result<F, CatalogError> {
    let mut filter = F::default();
    if let Some(text) = text {
        filter.set_text(text);
    }
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CatalogError::UnknownFilter {
                kind: F::KIND,
                key: pair.clone(),
            })?;
        filter.set(key.trim(), value.trim())?;
    }
    Ok(filter)
}

fn text_matches(query: Option<&String>, fields: &[&str]) -> bool {
    let Some(query) = query else {
        return true;
    };
    let needle = query.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

fn parse<T: FromStr<Err = CatalogError>>(value: &str) -> Result<T, CatalogError> {
    value.parse()
}

fn parse_plain<T: FromStr>(field: &'static str, value: &str) -> Result<T, CatalogError> {
    value
        .parse()
        .map_err(|_| CatalogError::InvalidFilterValue {
            field,
            value: value.to_string(),
        })
}

fn unknown(kind: CatalogKind, key: &str) -> CatalogError {
    CatalogError::UnknownFilter {
        kind,
        key: key.to_string(),
    }
}

/// Career filter
#[derive(Clone, Debug, Default)]
pub struct CareerFilter {
    /// Free text over title, description and skills
    pub text: Option<String>,
    /// Broad field
    pub category: Option<CareerCategory>,
}

impl RecordFilter<Career> for CareerFilter {
    const KIND: CatalogKind = CatalogKind::Career;

    fn matches(&self, record: &Career) -> bool {
        let mut fields = vec![record.title.as_str(), record.description.as_str()];
        fields.extend(record.skills.iter().map(String::as_str));
        text_matches(self.text.as_ref(), &fields)
            && self.category.map_or(true, |c| record.category == c)
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "category" => self.category = Some(parse(value)?),
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}

/// College filter
#[derive(Clone, Debug, Default)]
pub struct CollegeFilter {
    /// Free text over name and city
    pub text: Option<String>,
    /// State, case-insensitive
    pub state: Option<String>,
    /// Ownership
    pub college_type: Option<CollegeType>,
    /// Stream offered, case-insensitive
    pub stream: Option<String>,
}

impl RecordFilter<College> for CollegeFilter {
    const KIND: CatalogKind = CatalogKind::College;

    fn matches(&self, record: &College) -> bool {
        text_matches(self.text.as_ref(), &[record.name.as_str(), record.city.as_str()])
            && self
                .state
                .as_ref()
                .map_or(true, |s| record.state.eq_ignore_ascii_case(s))
            && self.college_type.map_or(true, |t| record.college_type == t)
            && self.stream.as_ref().map_or(true, |s| {
                record.streams.iter().any(|r| r.eq_ignore_ascii_case(s))
            })
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "state" => self.state = Some(value.to_string()),
            "type" | "college_type" => self.college_type = Some(parse(value)?),
            "stream" => self.stream = Some(value.to_string()),
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}

/// Scholarship filter
#[derive(Clone, Debug, Default)]
pub struct ScholarshipFilter {
    /// Free text over name, provider and description
    pub text: Option<String>,
    /// Level of study
    pub level: Option<EducationLevel>,
    /// Student's family income; keeps scholarships whose ceiling allows it
    pub family_income_inr: Option<u32>,
}

impl RecordFilter<Scholarship> for ScholarshipFilter {
    const KIND: CatalogKind = CatalogKind::Scholarship;

    fn matches(&self, record: &Scholarship) -> bool {
        text_matches(
            self.text.as_ref(),
            &[
                record.name.as_str(),
                record.provider.as_str(),
                record.description.as_str(),
            ],
        ) && self.level.map_or(true, |l| record.level == l)
            && match (self.family_income_inr, record.max_family_income_inr) {
                (Some(income), Some(ceiling)) => income <= ceiling,
                _ => true,
            }
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "level" => self.level = Some(parse(value)?),
            "income" | "family_income" => {
                self.family_income_inr = Some(parse_plain("family_income", value)?);
            }
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}

/// Course filter
#[derive(Clone, Debug, Default)]
pub struct CourseFilter {
    /// Free text over title and provider
    pub text: Option<String>,
    /// Delivery mode
    pub mode: Option<CourseMode>,
    /// Difficulty
    pub level: Option<CourseLevel>,
    /// Career the course prepares for
    pub career: Option<CareerTag>,
    /// Only free courses
    pub free_only: bool,
}

impl RecordFilter<Course> for CourseFilter {
    const KIND: CatalogKind = CatalogKind::Course;

    fn matches(&self, record: &Course) -> bool {
        text_matches(self.text.as_ref(), &[record.title.as_str(), record.provider.as_str()])
            && self.mode.map_or(true, |m| record.mode == m)
            && self.level.map_or(true, |l| record.level == l)
            && self.career.map_or(true, |c| record.careers.contains(&c))
            && (!self.free_only || record.free)
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "mode" => self.mode = Some(parse(value)?),
            "level" => self.level = Some(parse(value)?),
            "career" => {
                self.career = Some(value.parse().map_err(|_| {
                    CatalogError::InvalidFilterValue {
                        field: "career",
                        value: value.to_string(),
                    }
                })?);
            }
            "free" => self.free_only = parse_plain("free", value)?,
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}

/// Government job filter
#[derive(Clone, Debug, Default)]
pub struct JobFilter {
    /// Free text over title and organization
    pub text: Option<String>,
    /// Sector
    pub sector: Option<JobSector>,
    /// Student's qualification; keeps posts requiring at most this
    pub qualification: Option<EducationLevel>,
    /// Student's age; keeps posts whose age limit allows it
    pub age: Option<u8>,
}

impl RecordFilter<GovernmentJob> for JobFilter {
    const KIND: CatalogKind = CatalogKind::GovernmentJob;

    fn matches(&self, record: &GovernmentJob) -> bool {
        text_matches(self.text.as_ref(), &[record.title.as_str(), record.organization.as_str()])
            && self.sector.map_or(true, |s| record.sector == s)
            && self
                .qualification
                .map_or(true, |q| record.qualification <= q)
            && self.age.map_or(true, |a| a <= record.max_age)
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "sector" => self.sector = Some(parse(value)?),
            "qualification" => self.qualification = Some(parse(value)?),
            "age" => self.age = Some(parse_plain("age", value)?),
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}

/// Wellbeing resource filter
#[derive(Clone, Debug, Default)]
pub struct WellbeingFilter {
    /// Free text over title and summary
    pub text: Option<String>,
    /// Resource kind
    pub kind: Option<ResourceKind>,
}

impl RecordFilter<WellbeingResource> for WellbeingFilter {
    const KIND: CatalogKind = CatalogKind::Wellbeing;

    fn matches(&self, record: &WellbeingResource) -> bool {
        text_matches(self.text.as_ref(), &[record.title.as_str(), record.summary.as_str()])
            && self.kind.map_or(true, |k| record.kind == k)
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match key {
            "kind" => self.kind = Some(parse(value)?),
            _ => return Err(unknown(Self::KIND, key)),
        }
        Ok(())
    }
}
