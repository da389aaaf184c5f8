//! Shopping list commands: places and the items bought at them.
//!
//! Items can be listed at several places. Checking one off is recorded in
//! the activity feed together with the first place it is listed at.

use chrono::{DateTime, TimeZone, Utc};
use comfy_table::{Cell, Color};
use tracing::{debug, info};

use crate::activity::new_entry;
use crate::commands::{new_table, Session};
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::models::{ActivityKind, Item, Place, PlaceColor};
use crate::schedule::format_done_time;
use crate::storage::TaskStore;

/// Everything needed to create a place.
#[derive(Debug, Clone)]
pub struct PlaceDraft {
    pub name: String,
    pub emoji: String,
    pub color: PlaceColor,
}

impl PlaceDraft {
    pub fn new(name: impl Into<String>) -> PlaceDraft {
        PlaceDraft { name: name.into(), emoji: String::new(), color: PlaceColor::default() }
    }
}

/// Place field changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PlaceEdit {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub color: Option<PlaceColor>,
}

/// Everything needed to add an item to the list.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub qty: String,
    pub unit: String,
    pub place_ids: Vec<u64>,
    pub note: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, place_ids: Vec<u64>) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            qty: String::new(),
            unit: String::new(),
            place_ids,
            note: String::new(),
        }
    }
}

/// Resolves a comma separated list of place ids or names ("1,Feria").
pub fn parse_places(store: &TaskStore, s: &str) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for key in s.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let place = store.find_place(key).ok_or_else(|| Error::UnknownPlace(key.to_string()))?;
        if !ids.contains(&place.id) {
            ids.push(place.id);
        }
    }
    Ok(ids)
}

/// Splits "2 kg" into quantity and unit. A lone word is the quantity.
pub fn split_quantity(s: &str) -> (String, String) {
    match s.trim().split_once(char::is_whitespace) {
        Some((qty, unit)) => (qty.to_string(), unit.trim().to_string()),
        None => (s.trim().to_string(), String::new()),
    }
}

fn not_found(what: &str, id: u64, silent: bool) {
    debug!(id, what, "not found");
    if !silent { eprintln!("{} {} not found.", what, id); }
}

pub fn cmd_place_add<Tz: TimeZone>(session: &mut Session, draft: PlaceDraft, now: &DateTime<Tz>, silent: bool) -> Result<u64> {
    let name = draft.name.trim().to_string();
    let id = session.store.insert_place(Place::new(name.clone(), draft.emoji, draft.color));
    let entry = new_entry(ActivityKind::NewPlace, &name, &session.user, now.with_timezone(&Utc));
    session.store.log(entry);
    session.store.save()?;
    info!(id, name = %name, "place added");
    if !silent { println!("Place added (id = {})", id); }
    Ok(id)
}

/// Renames or restyles a place. Not recorded in the activity feed.
pub fn cmd_place_edit(session: &mut Session, id: u64, edit: PlaceEdit, silent: bool) -> Result<bool> {
    let Some(place) = session.store.place_mut(id) else {
        not_found("Place", id, silent);
        return Ok(false);
    };
    if let Some(n) = edit.name { place.name = n; }
    if let Some(e) = edit.emoji { place.emoji = e; }
    if let Some(c) = edit.color { place.color = c; }
    session.store.save()?;
    info!(id, "place edited");
    if !silent { println!("Place {} updated.", id); }
    Ok(true)
}

/// Replaces the note of a place. An empty note clears it.
pub fn cmd_place_note<Tz: TimeZone>(session: &mut Session, id: u64, note: &str, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let Some(place) = session.store.place_mut(id) else {
        not_found("Place", id, silent);
        return Ok(false);
    };
    place.note = note.trim().to_string();
    let name = place.name.clone();

    let entry = new_entry(ActivityKind::Note, &name, &session.user, now.with_timezone(&Utc));
    session.store.log(entry);
    session.store.save()?;
    info!(id, name = %name, "place note edited");
    if !silent { println!("Note for {} saved.", name); }
    Ok(true)
}

/// Removes a place and every item listed at it.
pub fn cmd_place_remove(session: &mut Session, id: u64, silent: bool) -> Result<bool> {
    let Some((place, items)) = session.store.remove_place(id) else {
        not_found("Place", id, silent);
        return Ok(false);
    };
    session.store.save()?;
    info!(id, name = %place.name, items, "place removed");
    if !silent { println!("Place {} removed with {} item(s).", id, items); }
    Ok(true)
}

/// Adds an item. Every place id must exist and at least one is required.
pub fn cmd_item_add<Tz: TimeZone>(session: &mut Session, draft: ItemDraft, now: &DateTime<Tz>, silent: bool) -> Result<u64> {
    if draft.place_ids.is_empty() {
        return Err(Error::NoPlace);
    }
    if let Some(missing) = draft.place_ids.iter().find(|id| session.store.place(**id).is_none()) {
        return Err(Error::UnknownPlace(missing.to_string()));
    }

    let now_utc = now.with_timezone(&Utc);
    let place_names = session.store.place_names(&draft.place_ids);
    let mut item = Item::new(draft.name.trim(), draft.place_ids, now_utc);
    item.qty = draft.qty.trim().to_string();
    item.unit = draft.unit.trim().to_string();
    item.note = draft.note.trim().to_string();
    item.created_by = Some(session.user.name.clone());
    item.created_by_emoji = Some(session.user.emoji.clone());
    let name = item.name.clone();
    let id = session.store.insert_item(item);

    let mut entry = new_entry(ActivityKind::Add, &name, &session.user, now_utc);
    entry.place_names = place_names;
    session.store.log(entry);
    session.store.save()?;
    info!(id, name = %name, "item added");
    if !silent { println!("Item added (id = {})", id); }
    Ok(id)
}

/// Checks an item off, or puts it back on the list. Only checking off is
/// recorded in the activity feed.
pub fn cmd_item_toggle<Tz: TimeZone>(session: &mut Session, id: u64, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let user_name = session.user.name.clone();
    let Some(item) = session.store.item_mut(id) else {
        not_found("Item", id, silent);
        return Ok(false);
    };
    let now_utc = now.with_timezone(&Utc);
    let checked = !item.done;
    if checked {
        item.check(&user_name, now_utc);
    } else {
        item.uncheck();
    }
    let name = item.name.clone();
    let first_place = item.place_ids.first().copied();

    if checked {
        let mut entry = new_entry(ActivityKind::Check, &name, &session.user, now_utc);
        entry.place_name = first_place.and_then(|p| session.store.place(p)).map(|p| p.name.clone());
        session.store.log(entry);
    }
    session.store.save()?;
    info!(id, name = %name, checked, "item toggled");
    if !silent {
        if checked { println!("Item {} checked off.", id); } else { println!("Item {} back on the list.", id); }
    }
    Ok(true)
}

pub fn cmd_item_remove<Tz: TimeZone>(session: &mut Session, id: u64, now: &DateTime<Tz>, silent: bool) -> Result<bool> {
    let Some(item) = session.store.remove_item(id) else {
        not_found("Item", id, silent);
        return Ok(false);
    };
    let entry = new_entry(ActivityKind::Delete, &item.name, &session.user, now.with_timezone(&Utc));
    session.store.log(entry);
    session.store.save()?;
    info!(id, name = %item.name, "item removed");
    if !silent { println!("Item {} removed.", id); }
    Ok(true)
}

/// Removes the checked-off items of one place. Returns how many went.
pub fn cmd_clear_done(session: &mut Session, place_id: u64, silent: bool) -> Result<usize> {
    if session.store.place(place_id).is_none() {
        not_found("Place", place_id, silent);
        return Ok(0);
    }
    let removed = session.store.clear_done(place_id);
    if removed > 0 {
        session.store.save()?;
    }
    info!(place_id, removed, "checked items cleared");
    if !silent { println!("Cleared {} item(s).", removed); }
    Ok(removed)
}

/// Items listed at `place_id`, or all items, pending first. Within each
/// half the newest come first.
pub fn list_items(items: &[Item], place_id: Option<u64>) -> Vec<&Item> {
    let mut list: Vec<&Item> = items
        .iter()
        .filter(|i| place_id.map_or(true, |p| i.is_at(p)))
        .collect();
    list.sort_by(|a, b| a.done.cmp(&b.done).then(b.created_at.cmp(&a.created_at)));
    list
}

/// Places with their pending and checked-off counts.
pub fn places_table(store: &TaskStore) -> comfy_table::Table {
    let mut table = new_table(&["ID", "Place", "Color", "Pending", "Done", "Note"]);
    for place in store.places() {
        let at_place = store.items().iter().filter(|i| i.is_at(place.id));
        let (done, pending): (Vec<&Item>, Vec<&Item>) = at_place.partition(|i| i.done);
        table.add_row(vec![
            Cell::new(place.id),
            Cell::new(place.label()),
            Cell::new(place.color.as_str()),
            Cell::new(pending.len()),
            Cell::new(done.len()).fg(Color::Green),
            Cell::new(&place.note),
        ]);
    }
    table
}

pub fn items_table<Tz: TimeZone>(store: &TaskStore, place_id: Option<u64>, now: &DateTime<Tz>, locale: Locale) -> comfy_table::Table
where
    Tz::Offset: std::fmt::Display,
{
    let mut table = new_table(&["ID", "Item", "Qty", "Places", "Done"]);
    for item in list_items(store.items(), place_id) {
        let done = match (item.done, item.done_at) {
            (true, Some(at)) => {
                let by = item.done_by.clone().unwrap_or_default();
                Cell::new(format!("✓ {} {}", by, format_done_time(&at, now, locale)).trim().to_string()).fg(Color::Green)
            }
            (true, None) => Cell::new("✓").fg(Color::Green),
            _ => Cell::new("·").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(&item.name),
            Cell::new(item.quantity_label()),
            Cell::new(store.place_names(&item.place_ids).join(", ")),
            done,
        ]);
    }
    table
}

pub fn cmd_places(session: &Session) {
    if session.store.places().is_empty() {
        println!("No places yet.");
    } else {
        println!("{}", places_table(&session.store));
    }
}

pub fn cmd_items<Tz: TimeZone>(session: &Session, place_id: Option<u64>, now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    if let Some(place) = place_id.and_then(|id| session.store.place(id)) {
        println!("{}", place.label());
        if !place.note.is_empty() {
            println!("{}", place.note);
        }
    }
    let table = items_table(&session.store, place_id, now, session.locale);
    if table.row_count() == 0 {
        println!("The list is empty.");
    } else {
        println!("{table}");
    }
}
