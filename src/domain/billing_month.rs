use chrono::{Datelike, NaiveDate};
use std::fmt;

const WIRE_FORMAT_LEN: usize = 7;

/// A calendar month, stored as the first day of that month.
///
/// On the wire a month is always written as `MM-YYYY` (two-digit month, four-digit year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BillingMonth(NaiveDate);

impl BillingMonth {
    pub fn parse(value: &str) -> Result<BillingMonth, String> {
        let invalid = || format!("{} is not a valid MM-YYYY date", value);
        let bytes = value.as_bytes();

        if bytes.len() != WIRE_FORMAT_LEN || bytes[2] != b'-' {
            return Err(invalid());
        }

        let (month, year) = (&value[..2], &value[3..]);

        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn from_date(date: NaiveDate) -> BillingMonth {
        // Day 1 exists in every month, so this never falls back.
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.0.month(), self.0.year())
    }
}

impl From<BillingMonth> for NaiveDate {
    fn from(month: BillingMonth) -> Self {
        month.0
    }
}
