use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::demo::{demo_items, demo_places, demo_tasks};
use crate::error::{Error, Result};
use crate::models::{ActivityEntry, Item, Place, Recurrence, Task};

/// Returns the path to the tasks file (`tasks.json`) inside `dir`.
pub fn tasks_path(dir: &Path) -> PathBuf {
    dir.join("tasks.json")
}

/// Returns the path to the activity feed file (`activity.json`) inside `dir`.
pub fn activity_path(dir: &Path) -> PathBuf {
    dir.join("activity.json")
}

pub fn places_path(dir: &Path) -> PathBuf {
    dir.join("places.json")
}

pub fn items_path(dir: &Path) -> PathBuf {
    dir.join("items.json")
}

/// Reads a JSON array from `path`.
///
/// A missing file is an empty list. A file that exists but does not parse is
/// an error so that it never gets overwritten by an empty save.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut f = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&s).map_err(|source| Error::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `items` as pretty JSON, creating the parent directory if needed.
fn write_json<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(items)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Loads all tasks stored in `dir`.
pub fn load_tasks(dir: &Path) -> Result<Vec<Task>> {
    read_json(&tasks_path(dir))
}

/// Saves the given tasks to `dir`, overwriting the existing file.
pub fn save_tasks(dir: &Path, tasks: &[Task]) -> Result<()> {
    write_json(&tasks_path(dir), tasks)
}

pub fn load_activity(dir: &Path) -> Result<Vec<ActivityEntry>> {
    read_json(&activity_path(dir))
}

pub fn save_activity(dir: &Path, entries: &[ActivityEntry]) -> Result<()> {
    write_json(&activity_path(dir), entries)
}

pub fn load_places(dir: &Path) -> Result<Vec<Place>> {
    read_json(&places_path(dir))
}

pub fn save_places(dir: &Path, places: &[Place]) -> Result<()> {
    write_json(&places_path(dir), places)
}

pub fn load_items(dir: &Path) -> Result<Vec<Item>> {
    read_json(&items_path(dir))
}

pub fn save_items(dir: &Path, items: &[Item]) -> Result<()> {
    write_json(&items_path(dir), items)
}

/// Where a `TaskStore` persists to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    /// JSON files inside a data directory.
    Files(PathBuf),
    /// Demo data held in memory only; saving is a no-op.
    Demo,
}

/// Everything the household keeps for one session: chores, the shopping
/// list and the activity feed.
#[derive(Debug)]
pub struct TaskStore {
    backend: Backend,
    tasks: Vec<Task>,
    places: Vec<Place>,
    items: Vec<Item>,
    activity: Vec<ActivityEntry>,
}

impl TaskStore {
    /// Opens the store described by `config`, falling back to demo data when
    /// no data directory is configured. Expired one-off completions are
    /// purged right away.
    pub fn open<Tz: TimeZone>(config: &Config, now: &DateTime<Tz>) -> Result<TaskStore> {
        let mut store = match &config.data_dir {
            Some(dir) => TaskStore::open_dir(dir)?,
            None => {
                warn!("no data directory configured, using demo data");
                TaskStore::demo(now)
            }
        };
        store.purge_completed_once(now, config.completion_delay());
        Ok(store)
    }

    pub fn open_dir(dir: &Path) -> Result<TaskStore> {
        let tasks = load_tasks(dir)?;
        let places = load_places(dir)?;
        let items = load_items(dir)?;
        let activity = load_activity(dir)?;
        debug!(
            dir = %dir.display(),
            tasks = tasks.len(),
            places = places.len(),
            items = items.len(),
            activity = activity.len(),
            "store opened"
        );
        Ok(TaskStore {
            backend: Backend::Files(dir.to_path_buf()),
            tasks,
            places,
            items,
            activity,
        })
    }

    pub fn demo<Tz: TimeZone>(now: &DateTime<Tz>) -> TaskStore {
        TaskStore {
            backend: Backend::Demo,
            tasks: demo_tasks(now),
            places: demo_places(),
            items: demo_items(now),
            activity: Vec::new(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.backend == Backend::Demo
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Adds a task under the next free id and returns that id.
    pub fn insert(&mut self, mut task: Task) -> u64 {
        let next_id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        task.id = next_id;
        self.tasks.push(task);
        next_id
    }

    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    /// Appends an activity entry, assigning it the next free id.
    pub fn log(&mut self, mut entry: ActivityEntry) {
        entry.id = self.activity.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        self.activity.push(entry);
    }

    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }

    /// Places in display order.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn place(&self, id: u64) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn place_mut(&mut self, id: u64) -> Option<&mut Place> {
        self.places.iter_mut().find(|p| p.id == id)
    }

    /// Finds a place by id ("2") or by case-insensitive name ("coto").
    pub fn find_place(&self, key: &str) -> Option<&Place> {
        let key = key.trim();
        if let Ok(id) = key.parse::<u64>() {
            if let Some(place) = self.place(id) {
                return Some(place);
            }
        }
        self.places.iter().find(|p| p.name.eq_ignore_ascii_case(key))
    }

    /// Appends a place after the existing ones and returns its id.
    pub fn insert_place(&mut self, mut place: Place) -> u64 {
        let next_id = self.places.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        place.id = next_id;
        place.position = self.places.iter().map(|p| p.position + 1).max().unwrap_or(0);
        self.places.push(place);
        next_id
    }

    /// Removes a place together with every item listed at it, even items
    /// that are also listed elsewhere. Returns the place and the number of
    /// items removed.
    pub fn remove_place(&mut self, id: u64) -> Option<(Place, usize)> {
        let pos = self.places.iter().position(|p| p.id == id)?;
        let place = self.places.remove(pos);
        let before = self.items.len();
        self.items.retain(|item| !item.is_at(id));
        Some((place, before - self.items.len()))
    }

    /// Names of the given places, skipping unknown ids.
    pub fn place_names(&self, ids: &[u64]) -> Vec<String> {
        ids.iter().filter_map(|id| self.place(*id)).map(|p| p.name.clone()).collect()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: u64) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn insert_item(&mut self, mut item: Item) -> u64 {
        let next_id = self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        item.id = next_id;
        self.items.push(item);
        next_id
    }

    pub fn remove_item(&mut self, id: u64) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Drops the checked-off items listed at `place_id`. Returns how many
    /// were removed.
    pub fn clear_done(&mut self, place_id: u64) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !(item.done && item.is_at(place_id)));
        before - self.items.len()
    }

    /// Removes one-off tasks whose completion is at least `delay` old.
    /// Returns how many were removed.
    pub fn purge_completed_once<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, delay: Duration) -> usize {
        let now = now.with_timezone(&Utc);
        let before = self.tasks.len();
        self.tasks.retain(|t| !is_expired_once(t, now, delay));
        let purged = before - self.tasks.len();
        if purged > 0 {
            debug!(purged, "removed completed one-off tasks");
        }
        purged
    }

    /// Persists tasks and activity. Does nothing for the demo backend.
    pub fn save(&self) -> Result<()> {
        match &self.backend {
            Backend::Files(dir) => {
                save_tasks(dir, &self.tasks)?;
                save_places(dir, &self.places)?;
                save_items(dir, &self.items)?;
                save_activity(dir, &self.activity)
            }
            Backend::Demo => Ok(()),
        }
    }
}

fn is_expired_once(task: &Task, now: DateTime<Utc>, delay: Duration) -> bool {
    task.recurrence == Recurrence::Once
        && task.done
        && task
            .done_at
            .and_then(|at| at.checked_add_signed(delay))
            .is_some_and(|expires| expires <= now)
}
