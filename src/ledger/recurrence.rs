//! Recurrence expansion
//!
//! Turns a template's rule into the dates it occurs on within a half-open
//! window `[from, to)`. Every occurrence is computed from its index in the
//! series rather than from the previous date, so month-end clamping never
//! drifts (anchor 31 gives Jan 31, Feb 28, Mar 31) and the iterator can jump
//! straight to the window instead of walking the series from its start.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{EndCondition, Frequency, RecurrenceRule, RecurrenceTemplate, Transaction, YearMonth};

/// Lazy, finite iterator over occurrence dates inside a window
#[derive(Debug, Clone)]
pub struct Occurrences {
    series: Series,
    index: u64,
    from: NaiveDate,
    to: NaiveDate,
    done: bool,
}

impl Occurrences {
    /// Occurrences of `rule` starting at `start_date`, limited to `[from, to)`
    ///
    /// The rule is assumed valid (see [`RecurrenceRule::validate`]); an
    /// interval of zero yields nothing rather than repeating forever.
    pub fn new(rule: RecurrenceRule, start_date: NaiveDate, from: NaiveDate, to: NaiveDate) -> Self {
        let series = Series::new(rule, start_date);
        let done = from >= to || rule.interval == 0;
        let index = if done { 0 } else { series.first_index_on_or_before(from) };
        Self {
            series,
            index,
            from,
            to,
            done,
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.done {
            if let EndCondition::AfterCount(count) = self.series.rule.end {
                if self.index >= count as u64 {
                    self.done = true;
                    break;
                }
            }

            let Some(date) = self.series.date_at(self.index) else {
                self.done = true;
                break;
            };

            if let EndCondition::UntilDate(until) = self.series.rule.end {
                if date > until {
                    self.done = true;
                    break;
                }
            }

            if date >= self.to {
                self.done = true;
                break;
            }

            self.index += 1;
            if date >= self.from {
                return Some(date);
            }
        }
        None
    }
}

/// Dates a template occurs on within `[from, to)`
pub fn expand(template: &RecurrenceTemplate, from: NaiveDate, to: NaiveDate) -> Occurrences {
    Occurrences::new(template.rule, template.start_date, from, to)
}

/// Projected transactions for a template within `[from, to)`
pub fn project(
    template: &RecurrenceTemplate,
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = Transaction> + '_ {
    expand(template, from, to).map(move |date| template.occurrence(date))
}

/// First occurrence on or after `date`, if the series reaches that far
pub fn next_occurrence(template: &RecurrenceTemplate, date: NaiveDate) -> Option<NaiveDate> {
    let mut occurrences = expand(template, date, NaiveDate::MAX);
    occurrences.next()
}

/// Index arithmetic for one rule anchored at a start date
#[derive(Debug, Clone)]
struct Series {
    rule: RecurrenceRule,
    /// Date of occurrence 0
    first: Option<NaiveDate>,
    /// Month of occurrence 0 and the day anchor, for calendar-month rules
    month_anchor: Option<(YearMonth, u32)>,
}

impl Series {
    fn new(rule: RecurrenceRule, start: NaiveDate) -> Self {
        match rule.frequency {
            Frequency::Daily => Self {
                rule,
                first: Some(start),
                month_anchor: None,
            },
            Frequency::Weekly { weekday } => {
                let ahead = (7 + weekday.num_days_from_monday()
                    - start.weekday().num_days_from_monday())
                    % 7;
                Self {
                    rule,
                    first: start.checked_add_days(Days::new(ahead as u64)),
                    month_anchor: None,
                }
            }
            Frequency::Monthly { day } => {
                let month = YearMonth::of(start);
                let month = if month.day_clamped(day) < start {
                    month.next()
                } else {
                    Some(month)
                };
                let anchor = month.map(|m| (m, day));
                Self {
                    rule,
                    first: anchor.map(|(m, d)| m.day_clamped(d)),
                    month_anchor: anchor,
                }
            }
            Frequency::Yearly => Self {
                rule,
                first: Some(start),
                month_anchor: Some((YearMonth::of(start), start.day())),
            },
        }
    }

    /// Months between consecutive occurrences, for calendar-month rules
    fn month_step(&self) -> i64 {
        match self.rule.frequency {
            Frequency::Yearly => self.rule.interval as i64 * 12,
            _ => self.rule.interval as i64,
        }
    }

    /// Days between consecutive occurrences, for fixed-length rules
    fn day_step(&self) -> u64 {
        match self.rule.frequency {
            Frequency::Weekly { .. } => self.rule.interval as u64 * 7,
            _ => self.rule.interval as u64,
        }
    }

    fn date_at(&self, index: u64) -> Option<NaiveDate> {
        match self.month_anchor {
            Some((month, day)) => {
                let offset = i64::try_from(index).ok()?.checked_mul(self.month_step())?;
                Some(month.add_months(offset)?.day_clamped(day))
            }
            None => {
                let offset = index.checked_mul(self.day_step())?;
                self.first?.checked_add_days(Days::new(offset))
            }
        }
    }

    /// Largest index whose date is not after `date` (0 if none)
    fn first_index_on_or_before(&self, date: NaiveDate) -> u64 {
        let Some(first) = self.first else {
            return 0;
        };
        if date <= first {
            return 0;
        }

        match self.month_anchor {
            Some((month, _)) => {
                let target = YearMonth::of(date);
                let months = (target.year() as i64 - month.year() as i64) * 12
                    + (target.month() as i64 - month.month() as i64);
                (months.max(0) / self.month_step()) as u64
            }
            None => {
                let days = (date - first).num_days().max(0) as u64;
                days / self.day_step()
            }
        }
    }
}
