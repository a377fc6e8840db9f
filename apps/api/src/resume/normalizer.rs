//! Resume Normalizer: turns the model's JSON into a `ResumeRecord` whose derived
//! fields are computed here rather than trusted from the model.
//!
//! Flow: deserialize → sort entries by parsed date → apply internship policy →
//!       normalize education years → merge employment intervals → resolve status →
//!       fill convenience fields.

use std::cmp::Reverse;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::resume::classify::{EmploymentClassifier, InternshipPolicy};
use crate::resume::dates::{
    parse_date, parse_graduation_year, DatePoint, DateRole, MonthIndex, ProcessingClock,
};
use crate::resume::intervals::{merge_intervals, DateInterval, DurationFormat, MergedSpan};
use crate::resume::models::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeRecord};
use crate::resume::status::resolve_status;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("completion JSON is not an object")]
    NotAnObject,

    #[error("completion JSON does not match the resume schema: {0}")]
    Schema(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub duration_format: DurationFormat,
    pub internship_policy: InternshipPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeNormalizer {
    classifier: EmploymentClassifier,
    options: NormalizeOptions,
}

impl ResumeNormalizer {
    pub fn new(classifier: EmploymentClassifier, options: NormalizeOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Builds the finished record from a sanitized completion.
    /// `clock` is captured once by the caller for the whole pass.
    pub fn normalize(
        &self,
        value: Value,
        clock: &ProcessingClock,
    ) -> Result<ResumeRecord, NormalizeError> {
        if !value.is_object() {
            return Err(NormalizeError::NotAnObject);
        }
        let mut record: ResumeRecord = serde_json::from_value(value)?;

        sort_experience(&mut record.experience_details, &self.classifier, clock);
        sort_education(&mut record.education_details, clock);

        if self.options.internship_policy == InternshipPolicy::Drop {
            let before = record.experience_details.len();
            record
                .experience_details
                .retain(|e| !self.is_internship(e));
            debug!(
                "Dropped {} internship entries from experienceDetails",
                before - record.experience_details.len()
            );
        }

        for entry in &mut record.education_details {
            normalize_education_year(entry);
        }

        let span = self.experience_span(&record.experience_details, clock);
        record.work.experience_in_years = span.total.format(self.options.duration_format);

        let status = resolve_status(
            &record.notice_period,
            record.experience_details.first_mut(),
            record.education_details.first_mut(),
            &self.classifier,
            clock,
        );
        record.work.current_status = status.to_string();

        self.fill_current_role(&mut record);
        fill_names(&mut record.personal_info);

        info!(
            "Normalized resume: {} experience entries, {} education entries, experience={} ({} months), status={}",
            record.experience_details.len(),
            record.education_details.len(),
            record.work.experience_in_years,
            span.total.total_months(),
            status
        );
        Ok(record)
    }

    fn is_internship(&self, entry: &ExperienceEntry) -> bool {
        self.classifier
            .is_internship(&entry.designation, &entry.employee_type)
    }

    /// Merged tenure over non-internship entries whose dates both parse.
    /// Entries that fail are logged and skipped; they stay in the record.
    pub fn experience_span(
        &self,
        entries: &[ExperienceEntry],
        clock: &ProcessingClock,
    ) -> MergedSpan {
        let intervals: Vec<DateInterval> = entries
            .iter()
            .filter(|e| !self.is_internship(e))
            .filter_map(|e| experience_interval(e, clock))
            .collect();
        merge_intervals(&intervals, clock)
    }

    /// Fills `currentEmployer` / `designation` from the latest non-internship entry
    /// when the model left them blank.
    fn fill_current_role(&self, record: &mut ResumeRecord) {
        let Some(latest) = record
            .experience_details
            .iter()
            .find(|e| !self.is_internship(e))
        else {
            return;
        };
        if record.work.current_employer.is_empty() {
            record.work.current_employer = latest.organization.clone();
        }
        if record.work.designation.is_empty() {
            record.work.designation = latest.designation.clone();
        }
    }
}

fn experience_interval(entry: &ExperienceEntry, clock: &ProcessingClock) -> Option<DateInterval> {
    let start = match parse_date(&entry.from_date, DateRole::Start) {
        Ok(DatePoint::Month(start)) => start,
        Ok(DatePoint::Open) => {
            warn!(
                "Skipping '{}' in experience total: fromDate '{}' is open-ended",
                entry.organization, entry.from_date
            );
            return None;
        }
        Err(e) => {
            warn!("Skipping '{}' in experience total: fromDate {e}", entry.organization);
            return None;
        }
    };
    let end = match parse_date(&entry.to_date, DateRole::End) {
        Ok(end) => end,
        Err(e) => {
            warn!("Skipping '{}' in experience total: toDate {e}", entry.organization);
            return None;
        }
    };
    if start > end.resolve(clock) {
        warn!(
            "Skipping '{}' in experience total: fromDate '{}' is after toDate '{}'",
            entry.organization, entry.from_date, entry.to_date
        );
        return None;
    }
    Some(DateInterval { start, end })
}

/// Sort key for "most recent": end month first, then employment over internship,
/// then start month. Entries with no parseable date sort last.
fn experience_recency(
    entry: &ExperienceEntry,
    classifier: &EmploymentClassifier,
    clock: &ProcessingClock,
) -> Option<(MonthIndex, bool, MonthIndex)> {
    let end = parse_date(&entry.to_date, DateRole::End)
        .ok()
        .map(|d| d.resolve(clock));
    let start = parse_date(&entry.from_date, DateRole::Start)
        .ok()
        .map(|d| d.resolve(clock));
    let employed = !classifier.is_internship(&entry.designation, &entry.employee_type);
    match (end, start) {
        (Some(end), Some(start)) => Some((end, employed, start)),
        (Some(only), None) | (None, Some(only)) => Some((only, employed, only)),
        (None, None) => None,
    }
}

fn sort_experience(
    entries: &mut [ExperienceEntry],
    classifier: &EmploymentClassifier,
    clock: &ProcessingClock,
) {
    // stable: ties keep the model's order
    entries.sort_by_key(|e| Reverse(experience_recency(e, classifier, clock)));
}

fn sort_education(entries: &mut [EducationEntry], clock: &ProcessingClock) {
    entries.sort_by_key(|e| {
        Reverse(
            parse_graduation_year(&e.year)
                .ok()
                .map(|d| d.resolve(clock)),
        )
    });
}

/// Rewrites a concrete education year to bare `YYYY`. Open and unparseable
/// values are left for the status resolver and the client respectively.
fn normalize_education_year(entry: &mut EducationEntry) {
    if let Ok(DatePoint::Month(m)) = parse_graduation_year(&entry.year) {
        entry.year = m.year().to_string();
    }
}

fn fill_names(info: &mut PersonalInfo) {
    if info.full_name.is_empty() {
        info.full_name = [&info.first_name, &info.middle_name, &info.last_name]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        return;
    }

    if info.first_name.is_empty() && info.last_name.is_empty() {
        let parts: Vec<&str> = info.full_name.split_whitespace().collect();
        if let Some((first, rest)) = parts.split_first() {
            info.first_name = first.to_string();
            if let Some((last, middle)) = rest.split_last() {
                info.last_name = last.to_string();
                if info.middle_name.is_empty() {
                    info.middle_name = middle.join(" ");
                }
            }
        }
    }
}
