//! Catalog browsing

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use guidance_core::catalog::query::{
    build_filter, search, CareerFilter, CollegeFilter, CourseFilter, JobFilter, RecordFilter,
    ScholarshipFilter, WellbeingFilter,
};
use guidance_core::{
    CatalogProvider, Career, College, Course, GovernmentJob, Scholarship, WellbeingResource,
};

/// Browsable collections
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    /// Career profiles
    Careers,
    /// Colleges and universities
    Colleges,
    /// Scholarships
    Scholarships,
    /// Skill courses
    Courses,
    /// Government job notifications
    Jobs,
    /// Wellbeing and mental-health resources
    Wellbeing,
}

/// What to search for
pub struct Query<'a> {
    /// Collection to search
    pub collection: Collection,
    /// Free-text search
    pub text: Option<&'a str>,
    /// `key=value` filters
    pub filters: &'a [String],
    /// Print JSON instead of one line per match
    pub json: bool,
}

/// Print matches; returns how many there were
pub fn run<W: Write>(catalog: &dyn CatalogProvider, query: &Query<'_>, mut out: W) -> Result<usize> {
    match query.collection {
        Collection::Careers => {
            emit::<_, CareerFilter, _>(catalog.careers(), query, &mut out, career_line)
        }
        Collection::Colleges => {
            emit::<_, CollegeFilter, _>(catalog.colleges(), query, &mut out, college_line)
        }
        Collection::Scholarships => emit::<_, ScholarshipFilter, _>(
            catalog.scholarships(),
            query,
            &mut out,
            scholarship_line,
        ),
        Collection::Courses => {
            emit::<_, CourseFilter, _>(catalog.courses(), query, &mut out, course_line)
        }
        Collection::Jobs => {
            emit::<_, JobFilter, _>(catalog.government_jobs(), query, &mut out, job_line)
        }
        Collection::Wellbeing => {
            emit::<_, WellbeingFilter, _>(catalog.wellbeing(), query, &mut out, wellbeing_line)
        }
    }
}

fn emit<T, F, W>(
    records: &[T],
    query: &Query<'_>,
    out: &mut W,
    line: fn(&T) -> String,
) -> Result<usize>
where
    T: Serialize,
    F: RecordFilter<T>,
    W: Write,
{
    let filter: F = build_filter(query.text, query.filters)?;
    let matches = search(records, &filter);

    if query.json {
        serde_json::to_writer_pretty(&mut *out, &matches)?;
        writeln!(out)?;
    } else if matches.is_empty() {
        writeln!(out, "No matches.")?;
    } else {
        for record in &matches {
            writeln!(out, "{}", line(record))?;
        }
    }
    Ok(matches.len())
}

fn career_line(career: &Career) -> String {
    format!(
        "{:<22} {:<20} {:>5.1} LPA  {}",
        career.id(),
        career.category.as_str(),
        career.starting_salary_lpa,
        career.title
    )
}

fn college_line(college: &College) -> String {
    format!(
        "{:<16} {} ({}, {}), {}, est. {}",
        college.id,
        college.name,
        college.city,
        college.state,
        college.college_type,
        college.established
    )
}

fn scholarship_line(scholarship: &Scholarship) -> String {
    let income = scholarship
        .max_family_income_inr
        .map(|limit| format!(", family income up to Rs {limit}"))
        .unwrap_or_default();
    format!(
        "{:<24} {}: Rs {}/year, {}{}, apply by {}",
        scholarship.id,
        scholarship.name,
        scholarship.amount_inr,
        scholarship.level,
        income,
        scholarship.deadline
    )
}

fn course_line(course: &Course) -> String {
    format!(
        "{:<20} {} by {} ({}, {}, {} weeks{})",
        course.id,
        course.title,
        course.provider,
        course.mode,
        course.level,
        course.duration_weeks,
        if course.free { ", free" } else { "" }
    )
}

fn job_line(job: &GovernmentJob) -> String {
    format!(
        "{:<18} {}, {}: {} posts, age up to {}, apply by {}",
        job.id, job.title, job.organization, job.vacancies, job.max_age, job.last_date
    )
}

fn wellbeing_line(resource: &WellbeingResource) -> String {
    match resource.contact {
        Some(ref contact) => format!(
            "{:<16} {} [{}] {}",
            resource.id, resource.title, resource.kind, contact
        ),
        None => format!("{:<16} {} [{}]", resource.id, resource.title, resource.kind),
    }
}
