//! Status Resolver: derives `work.currentStatus` from a strict priority chain.
//!
//! 1. non-empty notice period                         → NoticePeriod
//! 2. latest job open-ended ("Present"), not internship → Employed
//! 3. latest education open-ended or in a future year   → Graduating
//! 4. otherwise                                         → Unemployed
//!
//! Rules 2 and 3 materialize the open sentinel they matched, so callers never see
//! "Present" after resolution. The entry's `ongoing` flag keeps a second pass stable.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resume::classify::EmploymentClassifier;
use crate::resume::dates::{parse_date, parse_graduation_year, DatePoint, DateRole, ProcessingClock};
use crate::resume::models::{EducationEntry, ExperienceEntry};

/// Notice-period values that mean "not mentioned".
const EMPTY_NOTICE_MARKERS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "nil",
    "-",
    "not mentioned",
    "not specified",
    "not available",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrentStatus {
    NoticePeriod,
    Employed,
    Graduating,
    Unemployed,
}

impl CurrentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentStatus::NoticePeriod => "NoticePeriod",
            CurrentStatus::Employed => "Employed",
            CurrentStatus::Graduating => "Graduating",
            CurrentStatus::Unemployed => "Unemployed",
        }
    }
}

impl fmt::Display for CurrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when the notice period carries real content.
pub fn has_notice_period(notice_period: &str) -> bool {
    let trimmed = notice_period.trim();
    !trimmed.is_empty() && !EMPTY_NOTICE_MARKERS.contains(&trimmed.to_lowercase().as_str())
}

/// Applies the priority chain. `latest_experience` / `latest_education` must already
/// be the most recent entries of their lists.
pub fn resolve_status(
    notice_period: &str,
    latest_experience: Option<&mut ExperienceEntry>,
    latest_education: Option<&mut EducationEntry>,
    classifier: &EmploymentClassifier,
    clock: &ProcessingClock,
) -> CurrentStatus {
    if has_notice_period(notice_period) {
        return CurrentStatus::NoticePeriod;
    }

    if let Some(entry) = latest_experience {
        let open = entry.ongoing
            || parse_date(&entry.to_date, DateRole::End) == Ok(DatePoint::Open);
        if open && !classifier.is_internship(&entry.designation, &entry.employee_type) {
            if !entry.ongoing {
                entry.to_date = clock.current_month().to_string();
                entry.ongoing = true;
                debug!(
                    "Materialized open toDate for '{}' as {}",
                    entry.organization, entry.to_date
                );
            }
            return CurrentStatus::Employed;
        }
    }

    if let Some(entry) = latest_education {
        match parse_graduation_year(&entry.year) {
            Ok(DatePoint::Open) => {
                entry.year = clock.year().to_string();
                entry.ongoing = true;
                return CurrentStatus::Graduating;
            }
            _ if entry.ongoing => return CurrentStatus::Graduating,
            Ok(DatePoint::Month(m)) if m.year() > clock.year() => {
                return CurrentStatus::Graduating;
            }
            _ => {}
        }
    }

    CurrentStatus::Unemployed
}
