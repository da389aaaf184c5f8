//! Recurrence evaluation.
//!
//! Every function here is pure: it takes the task and an explicit reference
//! time and never reads the wall clock. "Done" for recurring tasks is derived
//! from `done_at` falling inside the current occurrence period, so a
//! completion lapses on its own once the period is over.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

use crate::locale::Locale;
use crate::models::{Recurrence, Task};

/// How far ahead `next_occurrence` searches for a monthly day that exists.
const MONTHLY_LOOKAHEAD: u32 = 12;

/// Weekday index of a date, 0 = Sunday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// An inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn day(date: NaiveDate) -> Period {
        Period { start: date, end: date }
    }

    /// Monday through Sunday of the week containing `date`.
    pub fn week(date: NaiveDate) -> Period {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Period { start, end: start + Duration::days(6) }
    }

    /// First through last calendar day of the month containing `date`.
    pub fn month(date: NaiveDate) -> Period {
        let start = date - Duration::days(date.day0() as i64);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Period { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Whether the task falls due on `date`, ignoring completion state.
pub fn is_due_on(task: &Task, date: NaiveDate) -> bool {
    match task.recurrence {
        Recurrence::Once => task.due_date.map_or(true, |due| due == date),
        Recurrence::Daily => true,
        Recurrence::Weekly => task.recurrence_days.contains(&weekday_index(date)),
        Recurrence::Monthly => task.recurrence_day_of_month == Some(date.day()),
    }
}

/// Whether the task belongs in today's list.
///
/// A one-off task without a date stays due until it is completed on an
/// earlier day. Completing it today keeps it visible as done until the store
/// purges it.
pub fn is_due_today<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    let today = now.date_naive();
    if task.recurrence == Recurrence::Once && task.due_date.is_none() {
        return !task.done || is_done_today(task, now);
    }
    is_due_on(task, today)
}

/// True iff the task is marked done and `done_at`, seen in `tz`, falls
/// inside `period`.
pub fn is_done_in_period<Tz: TimeZone>(task: &Task, period: &Period, tz: &Tz) -> bool {
    if !task.done {
        return false;
    }
    match task.done_at {
        Some(at) => period.contains(at.with_timezone(tz).date_naive()),
        None => false,
    }
}

pub fn is_done_today<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    is_done_in_period(task, &Period::day(now.date_naive()), &now.timezone())
}

pub fn is_done_this_week<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    is_done_in_period(task, &Period::week(now.date_naive()), &now.timezone())
}

pub fn is_done_this_month<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    is_done_in_period(task, &Period::month(now.date_naive()), &now.timezone())
}

/// Forward distance in days to the soonest configured weekday, where today
/// counts as 0. `None` when the task has no valid weekday.
pub fn next_weekly_offset(task: &Task, today: NaiveDate) -> Option<(i64, u8)> {
    let dow = weekday_index(today) as i64;
    task.recurrence_days
        .iter()
        .filter(|&&d| d <= 6)
        .map(|&d| (((d as i64) - dow + 7) % 7, d))
        .min()
}

/// The next date, on or after `today`, on which the task is due.
pub fn next_occurrence(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    match task.recurrence {
        Recurrence::Once => task.due_date.filter(|due| *due >= today),
        Recurrence::Daily => Some(today),
        Recurrence::Weekly => {
            next_weekly_offset(task, today).map(|(offset, _)| today + Duration::days(offset))
        }
        Recurrence::Monthly => {
            let day = task.recurrence_day_of_month.filter(|d| (1..=31).contains(d))?;
            let first = Period::month(today).start;
            (0..=MONTHLY_LOOKAHEAD)
                .filter_map(|m| first.checked_add_months(Months::new(m)))
                .filter_map(|month_start| month_start.with_day(day))
                .find(|date| *date >= today)
        }
    }
}

/// Renders a day offset as "today", "tomorrow" or "on <weekday>".
fn relative_day_label(locale: Locale, offset: i64, weekday: u8) -> String {
    match offset {
        0 => locale.today().to_string(),
        1 => locale.tomorrow().to_string(),
        _ => locale.on_weekday(weekday),
    }
}

/// Human-readable description of when the task is next due.
pub fn next_due_label<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>, locale: Locale) -> String {
    let today = now.date_naive();
    match task.recurrence {
        Recurrence::Once => match task.due_date {
            Some(due) => {
                let diff = (due - today).num_days();
                if (0..7).contains(&diff) {
                    relative_day_label(locale, diff, weekday_index(due))
                } else {
                    locale.short_date(due)
                }
            }
            None => locale.one_time().to_string(),
        },
        Recurrence::Daily => locale.every_day().to_string(),
        Recurrence::Weekly => locale.weekly(task.recurrence_days.iter().copied()),
        Recurrence::Monthly => task
            .recurrence_day_of_month
            .map(|day| locale.monthly(day))
            .unwrap_or_default(),
    }
}

/// For a weekly task, the label of the soonest upcoming configured day.
pub fn weekly_day_label<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>, locale: Locale) -> Option<String> {
    if task.recurrence != Recurrence::Weekly {
        return None;
    }
    next_weekly_offset(task, now.date_naive())
        .map(|(offset, weekday)| relative_day_label(locale, offset, weekday))
}

/// "hoy 14:30", "ayer 09:05" or "16 oct 14:30".
pub fn format_done_time<Tz: TimeZone>(done_at: &DateTime<Utc>, now: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = done_at.with_timezone(&now.timezone());
    let date = local.date_naive();
    let time = local.format("%H:%M");
    let days_ago = (now.date_naive() - date).num_days();
    match days_ago {
        0 => format!("{} {}", locale.today(), time),
        1 => format!("{} {}", locale.yesterday(), time),
        _ => format!("{} {}", locale.short_date(date), time),
    }
}
