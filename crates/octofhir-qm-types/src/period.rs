//! Measurement periods
//!
//! A period is either an explicit inclusive date range or the "Real Time"
//! sentinel, which tracks the current calendar year up to today. Periods are
//! resolved to concrete dates at the call site that issues a request.

use chrono::{Datelike, NaiveDate, Utc};
use octofhir_qm_diagnostics::{QmError, Result, QM0004, QM0101};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The date range a measure is evaluated over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MeasurementPeriod {
    /// Inclusive range; `start <= end`
    Range { start: NaiveDate, end: NaiveDate },
    /// January 1 of the current year through today
    RealTime,
}

impl MeasurementPeriod {
    /// Create an explicit range, rejecting `start > end`
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(QmError::config(
                QM0101,
                format!("period start {} is after period end {}", start, end),
            ));
        }
        Ok(Self::Range { start, end })
    }

    /// Parse `YYYY-MM-DD` bounds
    pub fn parse_range(start: &str, end: &str) -> Result<Self> {
        Self::range(parse_date(start)?, parse_date(end)?)
    }

    /// The whole of one calendar year
    pub fn calendar_year(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| QmError::config(QM0101, format!("year {} is out of range", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| QmError::config(QM0101, format!("year {} is out of range", year)))?;
        Self::range(start, end)
    }

    pub fn is_real_time(&self) -> bool {
        matches!(self, Self::RealTime)
    }

    /// Resolve against an explicit "today"
    pub fn resolve(&self, today: NaiveDate) -> ResolvedPeriod {
        match *self {
            Self::Range { start, end } => ResolvedPeriod { start, end },
            Self::RealTime => {
                // January 1 always exists for a year chrono could represent
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                ResolvedPeriod { start, end: today }
            }
        }
    }

    /// Resolve against the current UTC date
    pub fn resolve_now(&self) -> ResolvedPeriod {
        self.resolve(Utc::now().date_naive())
    }
}

impl Default for MeasurementPeriod {
    fn default() -> Self {
        Self::RealTime
    }
}

impl fmt::Display for MeasurementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { start, end } => write!(f, "{} to {}", start, end),
            Self::RealTime => write!(f, "Real Time"),
        }
    }
}

/// A period with concrete bounds, ready to be sent to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedPeriod {
    /// `periodStart` query value
    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// `periodEnd` query value
    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| QmError::input(QM0004, format!("'{}' is not a YYYY-MM-DD date: {}", text, e)))
}
