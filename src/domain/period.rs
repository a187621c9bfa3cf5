use chrono::NaiveDate;

use crate::domain::billing_month::BillingMonth;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("end_date must be >= start_date")]
    EndBeforeStart,
    #[error("to must be >= from")]
    ToBeforeFrom,
}

/// Months during which a subscription is billed. `end == None` means still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePeriod {
    start: BillingMonth,
    end: Option<BillingMonth>,
}

impl ActivePeriod {
    pub fn new(
        start: BillingMonth,
        end: Option<BillingMonth>,
    ) -> Result<ActivePeriod, DateRangeError> {
        if matches!(end, Some(end) if end < start) {
            return Err(DateRangeError::EndBeforeStart);
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> BillingMonth {
        self.start
    }

    pub fn end(&self) -> Option<BillingMonth> {
        self.end
    }
}

/// Inclusive range of months the total cost is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    from: BillingMonth,
    to: BillingMonth,
}

impl CostWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<CostWindow, DateRangeError> {
        let from = BillingMonth::from_date(from);
        let to = BillingMonth::from_date(to);

        if to < from {
            return Err(DateRangeError::ToBeforeFrom);
        }

        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from.as_date()
    }

    pub fn to(&self) -> NaiveDate {
        self.to.as_date()
    }
}
