//! Seed data used when no data directory is configured.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{Assignee, Item, Place, PlaceColor, Recurrence, Task};

/// Household tasks anchored relative to `now`, so the demo always shows a
/// daily chore, a weekly one, a monthly one and a one-off due tomorrow.
pub fn demo_tasks<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<Task> {
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let mut bathroom = Task::new("Limpiar baño", Recurrence::Weekly, now_utc - Duration::days(3));
    bathroom.recurrence_days.insert(1);
    bathroom.created_by = Some("Delfi".into());

    let mut dog = Task::new("Sacar a Kali", Recurrence::Daily, now_utc - Duration::days(7));
    dog.note = Some("mínimo 20 min".into());
    dog.created_by = Some("Cande".into());

    let mut rent = Task::new("Pagar expensas", Recurrence::Monthly, now_utc - Duration::days(10));
    rent.recurrence_day_of_month = Some(10);
    rent.assigned_to = Assignee::Person("Delfi".into());
    rent.created_by = Some("Delfi".into());

    let mut plumber = Task::new("Llamar al plomero", Recurrence::Once, now_utc - Duration::hours(1));
    plumber.due_date = Some(today + Duration::days(1));
    plumber.assigned_to = Assignee::Person("Cande".into());
    plumber.created_by = Some("Cande".into());

    let mut tasks = vec![bathroom, dog, rent, plumber];
    for (i, task) in tasks.iter_mut().enumerate() {
        task.id = i as u64 + 1;
    }
    tasks
}

pub fn demo_places() -> Vec<Place> {
    let seed = [
        ("Coto", "🛒", PlaceColor::Blue, "Los martes con Modo: descuento en carne."),
        ("Feria del barrio", "🥦", PlaceColor::Green, "Solo va los sábados a la mañana."),
        ("Bazar chino", "🏮", PlaceColor::Amber, ""),
        ("Pedidos Ya", "📦", PlaceColor::Gray, "Para días de lluvia."),
    ];
    seed.into_iter()
        .enumerate()
        .map(|(i, (name, emoji, color, note))| {
            let mut place = Place::new(name, emoji, color);
            place.id = i as u64 + 1;
            place.position = i as u32;
            place.note = note.to_string();
            place
        })
        .collect()
}

/// Shopping list for the demo places, one item already checked off.
pub fn demo_items<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<Item> {
    let now_utc = now.with_timezone(&Utc);
    let seed: [(&str, &str, &str, &[u64], &str, i64); 9] = [
        ("Leche", "2", "L", &[1], "Cande", 1),
        ("Pollo", "1", "kg", &[1], "Cande", 2),
        ("Huevos", "1", "docena", &[1, 2], "Delfi", 24),
        ("Limones", "6", "", &[1, 2], "Delfi", 25),
        ("Tomates", "1", "kg", &[2], "Cande", 27),
        ("Lechuga", "", "", &[2], "Cande", 28),
        ("Velas", "", "", &[3], "Cande", 48),
        ("Detergente", "", "", &[3], "Cande", 49),
        ("Yogur", "2", "", &[1], "Delfi", 55),
    ];
    let mut items: Vec<Item> = seed
        .iter()
        .enumerate()
        .map(|(i, (name, qty, unit, places, by, hours_ago))| {
            let mut item = Item::new(*name, places.to_vec(), now_utc - Duration::hours(*hours_ago));
            item.id = i as u64 + 1;
            item.qty = qty.to_string();
            item.unit = unit.to_string();
            item.created_by = Some(by.to_string());
            item
        })
        .collect();
    if let Some(yogurt) = items.last_mut() {
        yogurt.check("Cande", now_utc - Duration::minutes(30));
    }
    items
}
