use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{debug, info, warn};

use crate::activity::{activity_text, group_by_day, new_entry, ACTIVITY_LIMIT};
use crate::agenda::{month_tasks, today_tasks, upcoming_tasks, upcoming_week, week_tasks};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::models::{ActivityKind, Assignee, Recurrence, Task, User};
use crate::schedule::{format_done_time, next_due_label, weekly_day_label};
use crate::storage::TaskStore;

/// The store plus who is acting and how to render labels.
pub struct Session {
    pub store: TaskStore,
    pub user: User,
    pub locale: Locale,
    pub completion_delay: Duration,
}

impl Session {
    pub fn new(store: TaskStore, config: &Config) -> Session {
        Session {
            store,
            user: config.user.clone(),
            locale: config.locale,
            completion_delay: config.completion_delay(),
        }
    }

    /// Opens the configured store and wraps it in a session.
    pub fn open<Tz: TimeZone>(config: &Config, now: &DateTime<Tz>) -> Result<Session> {
        Ok(Session::new(TaskStore::open(config, now)?, config))
    }

    fn log<Tz: TimeZone>(&mut self, kind: ActivityKind, item_name: &str, now: &DateTime<Tz>) {
        let entry = new_entry(kind, item_name, &self.user, now.with_timezone(&Utc));
        self.store.log(entry);
    }
}

/// Parses a date in `YYYY-MM-DD` form.
pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

fn check_day_of_month(day: u32) -> Result<u32> {
    if (1..=31).contains(&day) {
        Ok(day)
    } else {
        Err(Error::InvalidDayOfMonth(day))
    }
}

/// Everything needed to create a task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub recurrence: Recurrence,
    pub days: Vec<u8>,
    pub day_of_month: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Assignee,
    pub note: Option<String>,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, recurrence: Recurrence) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            recurrence,
            days: Vec::new(),
            day_of_month: None,
            due_date: None,
            assigned_to: Assignee::Both,
            note: None,
        }
    }
}

/// Field changes for an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub days: Option<Vec<u8>>,
    pub day_of_month: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Assignee>,
    pub note: Option<String>,
}

/// Adds a new task and records it in the activity feed.
pub fn cmd_add<Tz: TimeZone>(session: &mut Session, draft: TaskDraft, now: &DateTime<Tz>, silent: bool) -> Result<u64> {
    let mut task = Task::new(draft.name, draft.recurrence, now.with_timezone(&Utc));
    task.recurrence_days = draft.days.into_iter().collect();
    task.recurrence_day_of_month = draft.day_of_month.map(check_day_of_month).transpose()?;
    task.due_date = draft.due_date;
    task.assigned_to = draft.assigned_to;
    task.note = draft.note.filter(|n| !n.trim().is_empty());
    task.created_by = Some(session.user.name.clone());
    task.normalize();

    if task.recurrence == Recurrence::Weekly && task.recurrence_days.is_empty() {
        warn!(name = %task.name, "weekly task has no days and will never be due");
    }
    if task.recurrence == Recurrence::Monthly && task.recurrence_day_of_month.is_none() {
        warn!(name = %task.name, "monthly task has no day of month and will never be due");
    }

    let name = task.name.clone();
    let id = session.store.insert(task);
    session.log(ActivityKind::TaskAdd, &name, now);
    session.store.save()?;
    info!(id, name = %name, "task added");
    if !silent { println!("Task added (id = {})", id); }
    Ok(id)
}

/// Marks a task done by the session user.
///
/// One-off tasks stay listed as done until the completion delay passes and
/// the store purges them. Recurring tasks count as done only for the
/// current period. Returns `false` if the id is unknown.
pub fn cmd_complete<Tz: TimeZone>(session: &mut Session, id: u64, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let user_name = session.user.name.clone();
    let Some(task) = session.store.task_mut(id) else {
        debug!(id, "complete: task not found");
        if !silent { eprintln!("Task {} not found.", id); }
        return Ok(false);
    };
    task.mark_done(&user_name, now.with_timezone(&Utc));
    let name = task.name.clone();
    let once = task.recurrence == Recurrence::Once;

    session.log(ActivityKind::TaskDone, &name, now);
    session.store.save()?;
    info!(id, name = %name, "task completed");
    if !silent {
        if once {
            println!("Task {} done. It will be removed.", id);
        } else {
            println!("Task {} done.", id);
        }
    }
    Ok(true)
}

/// Clears the completion state unconditionally.
pub fn cmd_uncomplete<Tz: TimeZone>(session: &mut Session, id: u64, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let Some(task) = session.store.task_mut(id) else {
        debug!(id, "uncomplete: task not found");
        if !silent { eprintln!("Task {} not found.", id); }
        return Ok(false);
    };
    task.clear_done();
    let name = task.name.clone();

    session.log(ActivityKind::TaskUndone, &name, now);
    session.store.save()?;
    info!(id, name = %name, "task marked pending");
    if !silent { println!("Task {} marked as pending.", id); }
    Ok(true)
}

/// Edits an existing task's details.
pub fn cmd_edit<Tz: TimeZone>(session: &mut Session, id: u64, edit: TaskEdit, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let day_of_month = edit.day_of_month.map(check_day_of_month).transpose()?;
    let Some(t) = session.store.task_mut(id) else {
        debug!(id, "edit: task not found");
        if !silent { eprintln!("Task {} not found.", id); }
        return Ok(false);
    };
    if let Some(n) = edit.name { t.name = n; }
    if let Some(r) = edit.recurrence { t.recurrence = r; }
    if let Some(d) = edit.days { t.recurrence_days = d.into_iter().collect(); }
    if let Some(d) = day_of_month { t.recurrence_day_of_month = Some(d); }
    if let Some(d) = edit.due_date { t.due_date = Some(d); }
    if let Some(a) = edit.assigned_to { t.assigned_to = a; }
    if let Some(n) = edit.note { t.note = Some(n).filter(|n| !n.trim().is_empty()); }
    t.normalize();
    let name = t.name.clone();

    session.log(ActivityKind::TaskEdit, &name, now);
    session.store.save()?;
    info!(id, name = %name, "task edited");
    if !silent { println!("Task {} updated.", id); }
    Ok(true)
}

/// Removes a task from the store by ID.
pub fn cmd_remove<Tz: TimeZone>(session: &mut Session, id: u64, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let Some(task) = session.store.remove(id) else {
        debug!(id, "remove: task not found");
        if !silent { eprintln!("Task {} not found.", id); }
        return Ok(false);
    };
    session.log(ActivityKind::TaskDelete, &task.name, now);
    session.store.save()?;
    info!(id, name = %task.name, "task removed");
    if !silent { println!("Task {} removed.", id); }
    Ok(true)
}

pub fn assignee_label(assignee: &Assignee, locale: Locale) -> String {
    match assignee {
        Assignee::Both => locale.both().to_string(),
        Assignee::Person(name) => name.clone(),
    }
}

pub(crate) fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

fn done_cell<Tz: TimeZone>(task: &Task, done: bool, now: &DateTime<Tz>, locale: Locale) -> Cell
where
    Tz::Offset: std::fmt::Display,
{
    match (done, task.done_at) {
        (true, Some(at)) => {
            let by = task.done_by.clone().unwrap_or_default();
            Cell::new(format!("✓ {} {}", by, format_done_time(&at, now, locale)).trim().to_string()).fg(Color::Green)
        }
        _ => Cell::new("·").fg(Color::Yellow),
    }
}

/// Tasks due today, pending first.
pub fn today_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table
where
    Tz::Offset: std::fmt::Display,
{
    let bucket = today_tasks(tasks, now);
    let mut table = new_table(&["ID", "Task", "When", "Assigned", "Done"]);
    let rows = bucket.pending.iter().map(|t| (*t, false)).chain(bucket.done.iter().map(|t| (*t, true)));
    for (t, done) in rows {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(next_due_label(t, now, locale)),
            Cell::new(assignee_label(&t.assigned_to, locale)),
            done_cell(t, done, now, locale),
        ]);
    }
    table
}

/// Weekly tasks, soonest first, with this week's completion.
pub fn week_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table
where
    Tz::Offset: std::fmt::Display,
{
    let mut table = new_table(&["ID", "Task", "Days", "Next", "Assigned", "This week"]);
    for entry in week_tasks(tasks, now) {
        let t = entry.task;
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(next_due_label(t, now, locale)),
            Cell::new(weekly_day_label(t, now, locale).unwrap_or_else(|| "-".into())),
            Cell::new(assignee_label(&t.assigned_to, locale)),
            done_cell(t, entry.done_this_week, now, locale),
        ]);
    }
    table
}

/// Monthly tasks ordered by day of month.
pub fn month_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table
where
    Tz::Offset: std::fmt::Display,
{
    let mut table = new_table(&["ID", "Task", "Day", "Assigned", "This month"]);
    for entry in month_tasks(tasks, now) {
        let t = entry.task;
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(next_due_label(t, now, locale)),
            Cell::new(assignee_label(&t.assigned_to, locale)),
            done_cell(t, entry.done_this_month, now, locale),
        ]);
    }
    table
}

/// Dated one-off tasks after today.
pub fn upcoming_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table {
    let mut table = new_table(&["ID", "Task", "Due", "When", "Assigned"]);
    for t in upcoming_tasks(tasks, now) {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(t.due_date.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(next_due_label(t, now, locale)),
            Cell::new(assignee_label(&t.assigned_to, locale)),
        ]);
    }
    table
}

/// Weekly and one-off occurrences over the next six days.
pub fn next_days_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table {
    let mut table = new_table(&["ID", "Task", "Day", "In"]);
    for entry in upcoming_week(tasks, now) {
        table.add_row(vec![
            Cell::new(entry.task.id),
            Cell::new(&entry.task.name),
            Cell::new(locale.weekday_short(entry.weekday).unwrap_or_default()),
            Cell::new(format!("{}d", entry.days_from)),
        ]);
    }
    table
}

/// Every task with its schedule.
pub fn list_table<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, locale: Locale) -> Table {
    let mut table = new_table(&["ID", "Task", "Recurrence", "Schedule", "Assigned", "Note"]);
    for t in tasks {
        let recurrence = Cell::new(t.recurrence.as_str());
        let recurrence = if t.recurrence.is_recurring() { recurrence.fg(Color::Cyan) } else { recurrence };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            recurrence,
            Cell::new(next_due_label(t, now, locale)),
            Cell::new(assignee_label(&t.assigned_to, locale)),
            Cell::new(t.note.clone().unwrap_or_default()),
        ]);
    }
    table
}

fn print_table(table: Table, empty_message: &str) {
    if table.row_count() == 0 {
        println!("{}", empty_message);
    } else {
        println!("{table}");
    }
}

pub fn cmd_today<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    print_table(today_table(session.store.tasks(), now, session.locale), "Nothing due today.");
}

pub fn cmd_week<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    print_table(week_table(session.store.tasks(), now, session.locale), "No weekly tasks.");
}

pub fn cmd_month<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    print_table(month_table(session.store.tasks(), now, session.locale), "No monthly tasks.");
}

pub fn cmd_upcoming<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>) {
    let tasks = session.store.tasks();
    print_table(upcoming_table(tasks, now, session.locale), "No upcoming one-off tasks.");
    let next_days = next_days_table(tasks, now, session.locale);
    if next_days.row_count() > 0 {
        println!("Next days");
        println!("{next_days}");
    }
}

pub fn cmd_list<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>) {
    print_table(list_table(session.store.tasks(), now, session.locale), "No tasks found.");
}

/// Prints the most recent activity grouped by day.
pub fn cmd_activity<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    let all = session.store.activity();
    if all.is_empty() {
        println!("No activity yet.");
        return;
    }

    let tz = now.timezone();
    for group in group_by_day(all, now, session.locale, ACTIVITY_LIMIT) {
        println!("{}", group.header.to_uppercase());
        for entry in group.entries {
            let time = entry.created_at.with_timezone(&tz).format("%H:%M");
            println!("  {} {}  {}", entry.user_emoji, activity_text(entry, session.locale), time);
        }
    }
}
