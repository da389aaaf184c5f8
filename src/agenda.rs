//! Groups tasks into the buckets the dashboard shows: today, this week,
//! this month and upcoming one-off tasks.

use chrono::{DateTime, Duration, TimeZone};

use crate::models::{Recurrence, Task};
use crate::schedule::{
    is_done_this_month, is_done_this_week, is_done_today, is_due_on, is_due_today, next_weekly_offset,
    weekday_index,
};

/// Maximum number of entries `upcoming_week` returns.
pub const UPCOMING_WEEK_LIMIT: usize = 5;

/// Days after today scanned by `upcoming_week`.
const UPCOMING_WEEK_DAYS: i64 = 6;

/// Tasks due today, split by completion.
#[derive(Debug, Default)]
pub struct TodayTasks<'a> {
    pub pending: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

/// A weekly task with its soonest next weekday.
#[derive(Debug)]
pub struct WeekEntry<'a> {
    pub task: &'a Task,
    /// Days until the next configured weekday, 0 meaning today.
    pub days_until: Option<i64>,
    pub next_weekday: Option<u8>,
    pub done_this_week: bool,
}

#[derive(Debug)]
pub struct MonthEntry<'a> {
    pub task: &'a Task,
    pub day_of_month: Option<u32>,
    pub done_this_month: bool,
}

/// One occurrence inside the short look-ahead window.
#[derive(Debug)]
pub struct UpcomingEntry<'a> {
    pub task: &'a Task,
    pub weekday: u8,
    pub days_from: i64,
}

/// All four buckets, computed against the same reference time.
#[derive(Debug)]
pub struct Agenda<'a> {
    pub today: TodayTasks<'a>,
    pub week: Vec<WeekEntry<'a>>,
    pub month: Vec<MonthEntry<'a>>,
    pub upcoming: Vec<&'a Task>,
}

impl<'a> Agenda<'a> {
    pub fn build<Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Agenda<'a> {
        Agenda {
            today: today_tasks(tasks, now),
            week: week_tasks(tasks, now),
            month: month_tasks(tasks, now),
            upcoming: upcoming_tasks(tasks, now),
        }
    }
}

pub fn today_tasks<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> TodayTasks<'a> {
    let mut bucket = TodayTasks::default();
    for task in tasks.iter().filter(|t| is_due_today(t, now)) {
        if is_done_today(task, now) {
            bucket.done.push(task);
        } else {
            bucket.pending.push(task);
        }
    }
    bucket
}

/// Every weekly task, soonest next occurrence first. Tasks with no valid
/// weekday sort last.
pub fn week_tasks<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<WeekEntry<'a>> {
    let today = now.date_naive();
    let mut entries: Vec<WeekEntry> = tasks
        .iter()
        .filter(|t| t.recurrence == Recurrence::Weekly)
        .map(|task| {
            let next = next_weekly_offset(task, today);
            WeekEntry {
                task,
                days_until: next.map(|(offset, _)| offset),
                next_weekday: next.map(|(_, day)| day),
                done_this_week: is_done_this_week(task, now),
            }
        })
        .collect();
    entries.sort_by_key(|e| e.days_until.unwrap_or(i64::MAX));
    entries
}

/// Every monthly task ordered by day of month.
pub fn month_tasks<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<MonthEntry<'a>> {
    let mut entries: Vec<MonthEntry> = tasks
        .iter()
        .filter(|t| t.recurrence == Recurrence::Monthly)
        .map(|task| MonthEntry {
            task,
            day_of_month: task.recurrence_day_of_month,
            done_this_month: is_done_this_month(task, now),
        })
        .collect();
    entries.sort_by_key(|e| e.day_of_month.unwrap_or(u32::MAX));
    entries
}

/// Open one-off tasks dated after today, earliest first.
pub fn upcoming_tasks<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<&'a Task> {
    let today = now.date_naive();
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.recurrence == Recurrence::Once && !t.done)
        .filter(|t| t.due_date.is_some_and(|due| due > today))
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming
}

/// Occurrences over the next six days: weekly tasks not already done today,
/// then one-off tasks dated that day. Capped at `UPCOMING_WEEK_LIMIT`.
pub fn upcoming_week<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<UpcomingEntry<'a>> {
    let today = now.date_naive();
    let mut upcoming = Vec::new();
    for days_from in 1..=UPCOMING_WEEK_DAYS {
        let date = today + Duration::days(days_from);
        let weekday = weekday_index(date);
        let weekly = tasks
            .iter()
            .filter(|t| t.recurrence == Recurrence::Weekly && is_due_on(t, date) && !is_done_today(t, now));
        let once = tasks
            .iter()
            .filter(|t| t.recurrence == Recurrence::Once && t.due_date == Some(date));
        upcoming.extend(weekly.chain(once).map(|task| UpcomingEntry { task, weekday, days_from }));
    }
    upcoming.truncate(UPCOMING_WEEK_LIMIT);
    upcoming
}
