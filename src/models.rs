use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Repetition rule governing when a task is due.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Once => "once",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::Once)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(Recurrence::Once),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            _ => Err(Error::InvalidRecurrence(s.to_string())),
        }
    }
}

/// Who a task is assigned to: everyone in the household, or one person.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    #[default]
    Both,
    Person(String),
}

impl From<String> for Assignee {
    fn from(s: String) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("both") {
            Assignee::Both
        } else {
            Assignee::Person(s)
        }
    }
}

impl From<Assignee> for String {
    fn from(a: Assignee) -> Self {
        match a {
            Assignee::Both => "both".to_string(),
            Assignee::Person(name) => name,
        }
    }
}

/// A schedulable household chore.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// Display name.
    pub name: String,
    pub recurrence: Recurrence,
    /// Weekday indices, 0 = Sunday through 6 = Saturday. Weekly tasks only.
    #[serde(default)]
    pub recurrence_days: BTreeSet<u8>,
    /// Day of the month, 1 to 31. Monthly tasks only.
    #[serde(default)]
    pub recurrence_day_of_month: Option<u32>,
    /// Calendar date the task is due. One-off tasks only.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Assignee,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_by: Option<String>,
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a not-yet-completed task. The id is assigned by the store.
    pub fn new(name: impl Into<String>, recurrence: Recurrence, created_at: DateTime<Utc>) -> Task {
        Task {
            id: 0,
            name: name.into(),
            recurrence,
            recurrence_days: BTreeSet::new(),
            recurrence_day_of_month: None,
            due_date: None,
            assigned_to: Assignee::Both,
            note: None,
            done: false,
            done_by: None,
            done_at: None,
            created_by: None,
            created_at,
        }
    }

    /// Clears the schedule fields the recurrence does not use, so only one
    /// of days / day-of-month / due date is ever set.
    pub fn normalize(&mut self) {
        match self.recurrence {
            Recurrence::Once => {
                self.recurrence_days.clear();
                self.recurrence_day_of_month = None;
            }
            Recurrence::Daily => {
                self.recurrence_days.clear();
                self.recurrence_day_of_month = None;
                self.due_date = None;
            }
            Recurrence::Weekly => {
                self.recurrence_day_of_month = None;
                self.due_date = None;
            }
            Recurrence::Monthly => {
                self.recurrence_days.clear();
                self.due_date = None;
            }
        }
    }

    pub fn mark_done(&mut self, by: &str, at: DateTime<Utc>) {
        self.done = true;
        self.done_by = Some(by.to_string());
        self.done_at = Some(at);
    }

    pub fn clear_done(&mut self) {
        self.done = false;
        self.done_by = None;
        self.done_at = None;
    }
}

/// The person operating the app.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub emoji: String,
}

impl Default for User {
    fn default() -> Self {
        User {
            name: "Yo".to_string(),
            emoji: "🌿".to_string(),
        }
    }
}

/// Accent color of a place.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaceColor {
    #[default]
    Blue,
    Green,
    Amber,
    Gray,
    Red,
}

impl PlaceColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceColor::Blue => "blue",
            PlaceColor::Green => "green",
            PlaceColor::Amber => "amber",
            PlaceColor::Gray => "gray",
            PlaceColor::Red => "red",
        }
    }
}

impl fmt::Display for PlaceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Ok(PlaceColor::Blue),
            "green" => Ok(PlaceColor::Green),
            "amber" => Ok(PlaceColor::Amber),
            "gray" | "grey" => Ok(PlaceColor::Gray),
            "red" => Ok(PlaceColor::Red),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

/// A shop or market the household buys things at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Place {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub color: PlaceColor,
    /// Free text shown at the top of the place, e.g. opening days.
    #[serde(default)]
    pub note: String,
    /// Display order; new places go last.
    #[serde(default)]
    pub position: u32,
}

impl Place {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>, color: PlaceColor) -> Place {
        Place {
            id: 0,
            name: name.into(),
            emoji: emoji.into(),
            color,
            note: String::new(),
            position: 0,
        }
    }

    /// "🛒 Coto", or just the name without an emoji.
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

/// A shopping list entry. It can be bought at any of several places.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub unit: String,
    pub place_ids: Vec<u64>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_by: Option<String>,
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_by_emoji: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(name: impl Into<String>, place_ids: Vec<u64>, created_at: DateTime<Utc>) -> Item {
        Item {
            id: 0,
            name: name.into(),
            qty: String::new(),
            unit: String::new(),
            place_ids,
            note: String::new(),
            done: false,
            done_by: None,
            done_at: None,
            created_by: None,
            created_by_emoji: None,
            created_at,
        }
    }

    pub fn is_at(&self, place_id: u64) -> bool {
        self.place_ids.contains(&place_id)
    }

    /// Quantity and unit joined, skipping empty parts: "2 L", "6", "".
    pub fn quantity_label(&self) -> String {
        [self.qty.trim(), self.unit.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn check(&mut self, by: &str, at: DateTime<Utc>) {
        self.done = true;
        self.done_by = Some(by.to_string());
        self.done_at = Some(at);
    }

    pub fn uncheck(&mut self) {
        self.done = false;
        self.done_by = None;
        self.done_at = None;
    }
}

/// Transitions recorded in the activity feed.
///
/// Task transitions carry a `task_` prefix. The shopping list kinds keep
/// their short names: `add`, `check`, `delete`, `note`, `new_place`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TaskAdd,
    TaskDone,
    TaskUndone,
    TaskEdit,
    TaskDelete,
    /// An item was added to the list.
    Add,
    /// An item was checked off.
    Check,
    /// An item was deleted.
    Delete,
    /// A place note was edited.
    Note,
    NewPlace,
}

/// One line of the household activity feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub item_name: String,
    /// Place an item was checked off at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    /// Places a new item was added to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub place_names: Vec<String>,
    pub user_name: String,
    pub user_emoji: String,
    pub created_at: DateTime<Utc>,
}
