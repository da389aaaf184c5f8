//! Activity feed: one entry per task lifecycle transition.

use chrono::{DateTime, TimeZone, Utc};

use crate::locale::Locale;
use crate::models::{ActivityEntry, ActivityKind, User};

/// Number of entries shown in the feed.
pub const ACTIVITY_LIMIT: usize = 50;

pub fn new_entry(kind: ActivityKind, item_name: &str, user: &User, at: DateTime<Utc>) -> ActivityEntry {
    ActivityEntry {
        id: 0,
        kind,
        item_name: item_name.to_string(),
        place_name: None,
        place_names: Vec::new(),
        user_name: user.name.clone(),
        user_emoji: user.emoji.clone(),
        created_at: at,
    }
}

/// `Delfi completó «Sacar a Kali»`, `Cande tachó «Yogur» en Coto`.
pub fn activity_text(entry: &ActivityEntry, locale: Locale) -> String {
    let places = match entry.kind {
        ActivityKind::Add if !entry.place_names.is_empty() => {
            format!(" {} {}", locale.added_to(), locale.join_places(&entry.place_names))
        }
        ActivityKind::Check => entry
            .place_name
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!(" {} {}", locale.checked_at(), p))
            .unwrap_or_default(),
        _ => String::new(),
    };
    format!(
        "{} {} «{}»{}",
        entry.user_name,
        locale.activity_verb(entry.kind),
        entry.item_name,
        places
    )
}

/// A run of entries that happened on the same local day.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub header: String,
    pub entries: Vec<&'a ActivityEntry>,
}

/// Keeps the `limit` newest entries and groups them under day headers,
/// newest first.
pub fn group_by_day<'a, Tz: TimeZone>(
    entries: &'a [ActivityEntry],
    now: &DateTime<Tz>,
    locale: Locale,
    limit: usize,
) -> Vec<DayGroup<'a>> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut sorted: Vec<&ActivityEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);

    let mut groups: Vec<DayGroup> = Vec::new();
    for entry in sorted {
        let date = entry.created_at.with_timezone(&tz).date_naive();
        let header = locale.day_header((date - today).num_days(), date);
        match groups.last_mut() {
            Some(group) if group.header == header => group.entries.push(entry),
            _ => groups.push(DayGroup { header, entries: vec![entry] }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User { name: "Delfi".into(), emoji: "🌿".into() }
    }

    #[test]
    fn renders_entry_text_per_locale() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let entry = new_entry(ActivityKind::TaskDone, "Sacar a Kali", &user(), at);
        assert_eq!(activity_text(&entry, Locale::EsAr), "Delfi completó «Sacar a Kali»");
        assert_eq!(activity_text(&entry, Locale::En), "Delfi completed «Sacar a Kali»");
    }

    #[test]
    fn groups_newest_first_under_day_headers() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap();
        let entries = vec![
            new_entry(ActivityKind::TaskAdd, "Velas", &user(), now - Duration::days(3)),
            new_entry(ActivityKind::TaskDone, "Yogur", &user(), now - Duration::minutes(5)),
            new_entry(ActivityKind::TaskDelete, "Cebollas", &user(), now - Duration::hours(20)),
            new_entry(ActivityKind::TaskEdit, "Coto", &user(), now - Duration::hours(2)),
        ];
        let groups = group_by_day(&entries, &now, Locale::EsAr, ACTIVITY_LIMIT);
        let headers: Vec<&str> = groups.iter().map(|g| g.header.as_str()).collect();
        assert_eq!(headers, vec!["Hoy", "Ayer", "martes, 13 de octubre"]);
        assert_eq!(groups[0].entries[0].item_name, "Yogur");
        assert_eq!(groups[0].entries[1].item_name, "Coto");

        let newest_two = group_by_day(&entries, &now, Locale::En, 2);
        assert_eq!(newest_two.len(), 1);
        assert_eq!(newest_two[0].header, "Today");
        assert_eq!(newest_two[0].entries.len(), 2);
    }

    #[test]
    fn shopping_entries_name_their_places() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let mut added = new_entry(ActivityKind::Add, "Huevos", &user(), at);
        added.place_names = vec!["Coto".into(), "Feria".into()];
        assert_eq!(activity_text(&added, Locale::EsAr), "Delfi agregó «Huevos» a Coto y Feria");
        assert_eq!(activity_text(&added, Locale::En), "Delfi added «Huevos» to Coto and Feria");

        let mut checked = new_entry(ActivityKind::Check, "Yogur", &user(), at);
        assert_eq!(activity_text(&checked, Locale::EsAr), "Delfi tachó «Yogur»");
        checked.place_name = Some("Coto".into());
        assert_eq!(activity_text(&checked, Locale::EsAr), "Delfi tachó «Yogur» en Coto");

        let place = new_entry(ActivityKind::NewPlace, "Pedidos Ya", &user(), at);
        assert_eq!(activity_text(&place, Locale::En), "Delfi created the place «Pedidos Ya»");
    }
}
