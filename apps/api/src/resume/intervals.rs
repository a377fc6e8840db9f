//! Interval Merger: total tenure across possibly overlapping employment periods.
//!
//! Algorithm:
//! 1. Resolve open ends against the processing clock, drop inverted ranges.
//! 2. Sort by start month.
//! 3. Sweep: extend the current run while `next.start <= run.end + 1` (adjacent
//!    months merge), otherwise close the run.
//! 4. Sum `end - start + 1` over the runs.

use std::fmt;
use std::str::FromStr;

use crate::resume::dates::{DatePoint, MonthIndex, ProcessingClock};

/// One employment period. `end` may be the open sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: MonthIndex,
    pub end: DatePoint,
}

/// A closed, resolved run of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRun {
    pub start: MonthIndex,
    pub end: MonthIndex,
}

impl MonthRun {
    pub fn months(&self) -> u32 {
        self.start.months_through(self.end)
    }
}

/// Output of a merge: disjoint runs in ascending order plus their covered total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSpan {
    pub runs: Vec<MonthRun>,
    pub total: ExperienceDuration,
}

pub fn merge_intervals(intervals: &[DateInterval], clock: &ProcessingClock) -> MergedSpan {
    let mut resolved: Vec<MonthRun> = intervals
        .iter()
        .map(|i| MonthRun {
            start: i.start,
            end: i.end.resolve(clock),
        })
        .filter(|run| run.start <= run.end)
        .collect();
    resolved.sort_by_key(|run| run.start);

    let mut runs: Vec<MonthRun> = Vec::with_capacity(resolved.len());
    for next in resolved {
        if let Some(current) = runs.last_mut() {
            if next.start <= current.end.next() {
                current.end = current.end.max(next.end);
                continue;
            }
        }
        runs.push(next);
    }

    let months = runs.iter().map(MonthRun::months).sum();
    MergedSpan {
        runs,
        total: ExperienceDuration::from_months(months),
    }
}

/// Canonical tenure representation: whole months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExperienceDuration {
    months: u32,
}

impl ExperienceDuration {
    pub fn from_months(months: u32) -> Self {
        Self { months }
    }

    pub fn total_months(&self) -> u32 {
        self.months
    }

    pub fn whole_years(&self) -> u32 {
        self.months / 12
    }

    pub fn remaining_months(&self) -> u32 {
        self.months % 12
    }

    /// Renders the duration in the requested presentational format.
    /// Months are truncated in both formats, never rounded up to a year.
    pub fn format(&self, format: DurationFormat) -> String {
        match format {
            DurationFormat::YearsMonths => {
                format!("{}Y-{}M", self.whole_years(), self.remaining_months())
            }
            DurationFormat::Decimal => {
                // hundredths of a year, truncated
                let hundredths = self.months * 100 / 12;
                let (whole, frac) = (hundredths / 100, hundredths % 100);
                match frac {
                    0 => whole.to_string(),
                    f if f % 10 == 0 => format!("{whole}.{}", f / 10),
                    f => format!("{whole}.{f:02}"),
                }
            }
        }
    }
}

/// How `experienceInYears` is presented in the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationFormat {
    /// "2Y-3M"
    #[default]
    YearsMonths,
    /// "2.25"
    Decimal,
}

impl FromStr for DurationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "years-months" | "years_months" | "ym" => Ok(Self::YearsMonths),
            "decimal" => Ok(Self::Decimal),
            other => Err(format!(
                "unknown duration format '{other}' (expected 'years-months' or 'decimal')"
            )),
        }
    }
}

impl fmt::Display for ExperienceDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DurationFormat::YearsMonths))
    }
}
