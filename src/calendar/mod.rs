//! Trading-day gate consulted once before a run

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// Answers whether a market trades on a given date
pub trait TradingCalendar: Send + Sync {
    fn is_trading_day(&self, market: &str, date: NaiveDate) -> bool;
}

/// Monday to Friday, minus a configured holiday list
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl WeekdayCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn is_trading_day(&self, _market: &str, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}
