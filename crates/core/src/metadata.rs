use crate::error::ArgumentError;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use std::path::PathBuf;

/// Layout accepted by `--from` / `--to`.
pub const RANGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub taken: DateTime<FixedOffset>,
}

/// Inclusive bounds on the photo-taken timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    from: Option<DateTime<FixedOffset>>,
    to: Option<DateTime<FixedOffset>>,
}

impl TimeRange {
    pub fn new(
        from: Option<DateTime<FixedOffset>>,
        to: Option<DateTime<FixedOffset>>,
    ) -> Result<Self, ArgumentError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ArgumentError::InvertedRange {
                    from: from.to_rfc3339(),
                    to: to.to_rfc3339(),
                });
            }
        }
        Ok(Self { from, to })
    }

    /// Parses both bounds as local time.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, ArgumentError> {
        let from = from.map(parse_local_timestamp).transpose()?;
        let to = to.map(parse_local_timestamp).transpose()?;
        Self::new(from, to)
    }

    pub fn from(&self) -> Option<DateTime<FixedOffset>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<FixedOffset>> {
        self.to
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, taken: &DateTime<FixedOffset>) -> bool {
        if let Some(from) = self.from {
            if *taken < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if *taken > to {
                return false;
            }
        }
        true
    }
}

pub fn parse_local_timestamp(input: &str) -> Result<DateTime<FixedOffset>, ArgumentError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), RANGE_TIMESTAMP_FORMAT).map_err(
        |_| ArgumentError::InvalidTimestamp {
            value: input.to_string(),
        },
    )?;
    Ok(resolve_local(naive))
}

/// Pins a wall-clock value to the local zone. Ambiguous values take the
/// earlier instant; values inside a DST gap keep their wall clock at UTC+0.
pub(crate) fn resolve_local(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
        .unwrap_or_else(|| naive.and_utc().fixed_offset())
}
