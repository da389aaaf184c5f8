use chrono::{DateTime, Duration, TimeZone, Utc};
use madriguera::activity::activity_text;
use madriguera::commands::Session;
use madriguera::config::Config;
use madriguera::error::Error;
use madriguera::locale::Locale;
use madriguera::models::{ActivityKind, PlaceColor, User};
use madriguera::shopping::*;
use madriguera::storage::{items_path, load_activity, load_items, load_places, places_path};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn with_test_dir<F>(f: F)
where
    F: FnOnce(&TempDir, Session),
{
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: Some(dir.path().to_path_buf()),
        user: User { name: "Cande".into(), emoji: "🐰".into() },
        ..Config::default()
    };
    let session = Session::open(&config, &now()).unwrap();
    f(&dir, session);
}

/// Adds Coto and Feria, in that order.
fn two_places(session: &mut Session) -> (u64, u64) {
    let mut coto = PlaceDraft::new("Coto");
    coto.emoji = "🛒".into();
    let coto = cmd_place_add(session, coto, &now(), true).unwrap();
    let mut feria = PlaceDraft::new(" Feria ");
    feria.color = PlaceColor::Green;
    let feria = cmd_place_add(session, feria, &now(), true).unwrap();
    (coto, feria)
}

fn kinds(session: &Session) -> Vec<ActivityKind> {
    session.store.activity().iter().map(|a| a.kind).collect()
}

#[test]
fn test_place_add_persists_and_logs() {
    with_test_dir(|dir, mut session| {
        assert!(!places_path(dir.path()).exists());
        let (coto, feria) = two_places(&mut session);
        assert_eq!((coto, feria), (1, 2));

        let places = load_places(dir.path()).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].label(), "🛒 Coto");
        assert_eq!(places[1].name, "Feria");
        assert_eq!(places[1].color, PlaceColor::Green);
        assert_eq!(places[1].position, places[0].position + 1);
        assert!(items_path(dir.path()).exists());
        assert_eq!(kinds(&session), vec![ActivityKind::NewPlace, ActivityKind::NewPlace]);
    });
}

#[test]
fn test_item_add_requires_known_places() {
    with_test_dir(|dir, mut session| {
        let (coto, _) = two_places(&mut session);

        let err = cmd_item_add(&mut session, ItemDraft::new("Leche", vec![]), &now(), true).unwrap_err();
        assert!(matches!(err, Error::NoPlace));
        let err = cmd_item_add(&mut session, ItemDraft::new("Leche", vec![coto, 9]), &now(), true).unwrap_err();
        assert!(matches!(err, Error::UnknownPlace(ref id) if id == "9"));

        assert!(load_items(dir.path()).unwrap().is_empty());
        assert_eq!(session.store.activity().len(), 2);
    });
}

#[test]
fn test_item_add_records_places_and_author() {
    with_test_dir(|dir, mut session| {
        let (coto, feria) = two_places(&mut session);
        let mut draft = ItemDraft::new(" Huevos ", parse_places(&session.store, "coto, 2").unwrap());
        (draft.qty, draft.unit) = split_quantity("1 docena");
        let id = cmd_item_add(&mut session, draft, &now(), true).unwrap();

        let items = load_items(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].name, "Huevos");
        assert_eq!(items[0].place_ids, vec![coto, feria]);
        assert_eq!(items[0].quantity_label(), "1 docena");
        assert_eq!(items[0].created_by.as_deref(), Some("Cande"));
        assert_eq!(items[0].created_by_emoji.as_deref(), Some("🐰"));

        let entry = session.store.activity().last().unwrap();
        assert_eq!(entry.kind, ActivityKind::Add);
        assert_eq!(activity_text(entry, Locale::EsAr), "Cande agregó «Huevos» a Coto y Feria");
    });
}

#[test]
fn test_only_checking_off_is_logged() {
    with_test_dir(|dir, mut session| {
        let (_, feria) = two_places(&mut session);
        let id = cmd_item_add(&mut session, ItemDraft::new("Tomates", vec![feria]), &now(), true).unwrap();

        assert!(cmd_item_toggle(&mut session, id, &now(), true).unwrap());
        let item = session.store.item(id).unwrap();
        assert!(item.done);
        assert_eq!(item.done_by.as_deref(), Some("Cande"));
        let entry = session.store.activity().last().unwrap();
        assert_eq!(entry.kind, ActivityKind::Check);
        assert_eq!(entry.place_name.as_deref(), Some("Feria"));

        let later = now() + Duration::minutes(5);
        assert!(cmd_item_toggle(&mut session, id, &later, true).unwrap());
        let item = session.store.item(id).unwrap();
        assert!(!item.done);
        assert_eq!(item.done_at, None);
        assert_eq!(kinds(&session).last(), Some(&ActivityKind::Check));
        assert_eq!(load_activity(dir.path()).unwrap().len(), 4);
    });
}

#[test]
fn test_item_remove_logs_delete() {
    with_test_dir(|dir, mut session| {
        let (coto, _) = two_places(&mut session);
        let id = cmd_item_add(&mut session, ItemDraft::new("Yogur", vec![coto]), &now(), true).unwrap();
        assert!(cmd_item_remove(&mut session, id, &now(), true).unwrap());
        assert!(!cmd_item_remove(&mut session, id, &now(), true).unwrap());
        assert!(load_items(dir.path()).unwrap().is_empty());
        assert_eq!(kinds(&session).last(), Some(&ActivityKind::Delete));
    });
}

#[test]
fn test_place_note_is_logged_but_edit_is_not() {
    with_test_dir(|dir, mut session| {
        let (coto, _) = two_places(&mut session);
        let edit = PlaceEdit { name: Some("Coto Palermo".into()), ..PlaceEdit::default() };
        assert!(cmd_place_edit(&mut session, coto, edit, true).unwrap());
        assert_eq!(session.store.activity().len(), 2);

        assert!(cmd_place_note(&mut session, coto, " pedir factura ", &now(), true).unwrap());
        let places = load_places(dir.path()).unwrap();
        assert_eq!(places[0].name, "Coto Palermo");
        assert_eq!(places[0].note, "pedir factura");
        let entry = session.store.activity().last().unwrap();
        assert_eq!(entry.kind, ActivityKind::Note);
        assert_eq!(entry.item_name, "Coto Palermo");
    });
}

#[test]
fn test_place_remove_takes_its_items() {
    with_test_dir(|dir, mut session| {
        let (coto, feria) = two_places(&mut session);
        cmd_item_add(&mut session, ItemDraft::new("Leche", vec![coto]), &now(), true).unwrap();
        cmd_item_add(&mut session, ItemDraft::new("Huevos", vec![coto, feria]), &now(), true).unwrap();
        let lechuga = cmd_item_add(&mut session, ItemDraft::new("Lechuga", vec![feria]), &now(), true).unwrap();
        let logged = session.store.activity().len();

        assert!(cmd_place_remove(&mut session, coto, true).unwrap());
        assert!(!cmd_place_remove(&mut session, coto, true).unwrap());

        let items = load_items(dir.path()).unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![lechuga]);
        assert_eq!(load_places(dir.path()).unwrap().len(), 1);
        assert_eq!(session.store.activity().len(), logged);
    });
}

#[test]
fn test_clear_done_keeps_pending_items() {
    with_test_dir(|dir, mut session| {
        let (coto, feria) = two_places(&mut session);
        let leche = cmd_item_add(&mut session, ItemDraft::new("Leche", vec![coto]), &now(), true).unwrap();
        let pollo = cmd_item_add(&mut session, ItemDraft::new("Pollo", vec![coto]), &now(), true).unwrap();
        let tomates = cmd_item_add(&mut session, ItemDraft::new("Tomates", vec![feria]), &now(), true).unwrap();
        cmd_item_toggle(&mut session, leche, &now(), true).unwrap();
        cmd_item_toggle(&mut session, tomates, &now(), true).unwrap();

        assert_eq!(cmd_clear_done(&mut session, coto, true).unwrap(), 1);
        assert_eq!(cmd_clear_done(&mut session, 42, true).unwrap(), 0);

        let ids: Vec<u64> = load_items(dir.path()).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![pollo, tomates]);
    });
}

#[test]
fn test_list_items_by_place() {
    with_test_dir(|_dir, mut session| {
        let (coto, feria) = two_places(&mut session);
        let leche = cmd_item_add(&mut session, ItemDraft::new("Leche", vec![coto]), &now(), true).unwrap();
        let later = now() + Duration::minutes(1);
        let pollo = cmd_item_add(&mut session, ItemDraft::new("Pollo", vec![coto]), &later, true).unwrap();
        cmd_item_add(&mut session, ItemDraft::new("Tomates", vec![feria]), &now(), true).unwrap();
        cmd_item_toggle(&mut session, pollo, &later, true).unwrap();

        let at_coto: Vec<u64> = list_items(session.store.items(), Some(coto)).iter().map(|i| i.id).collect();
        assert_eq!(at_coto, vec![leche, pollo]);
        assert_eq!(list_items(session.store.items(), None).len(), 3);
        assert_eq!(places_table(&session.store).row_count(), 2);
        assert_eq!(items_table(&session.store, Some(feria), &now(), Locale::En).row_count(), 1);
    });
}
