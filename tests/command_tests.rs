use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use madriguera::agenda::Agenda;
use madriguera::commands::*;
use madriguera::config::Config;
use madriguera::locale::Locale;
use madriguera::models::{ActivityKind, Assignee, Recurrence, User};
use madriguera::schedule::is_done_today;
use madriguera::storage::{load_activity, load_tasks, tasks_path, TaskStore};
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
        user: User { name: "Delfi".into(), emoji: "🦊".into() },
        ..Config::default()
    };
    let session = Session::open(&config, &now()).unwrap();
    f(&dir, session);
}

fn kinds(session: &Session) -> Vec<ActivityKind> {
    session.store.activity().iter().map(|a| a.kind).collect()
}

#[test]
fn test_add_persists_task_and_activity() {
    with_test_dir(|dir, mut session| {
        let mut draft = TaskDraft::new("Limpiar baño", Recurrence::Weekly);
        draft.days = vec![4, 1, 9];
        draft.assigned_to = Assignee::Person("Cande".into());
        draft.note = Some("  ".into());
        let id = cmd_add(&mut session, draft, &now(), true).unwrap();
        assert_eq!(id, 1);

        let tasks = load_tasks(dir.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].recurrence_days.iter().copied().collect::<Vec<_>>(), vec![1, 4, 9]);
        assert_eq!(tasks[0].created_by.as_deref(), Some("Delfi"));
        assert_eq!(tasks[0].note, None);

        let activity = load_activity(dir.path()).unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, ActivityKind::TaskAdd);
        assert_eq!(activity[0].user_emoji, "🦊");
        assert_eq!(activity[0].item_name, "Limpiar baño");
    });
}

#[test]
fn test_add_rejects_bad_day_of_month() {
    with_test_dir(|dir, mut session| {
        let mut draft = TaskDraft::new("Pagar luz", Recurrence::Monthly);
        draft.day_of_month = Some(32);
        assert!(cmd_add(&mut session, draft, &now(), true).is_err());
        assert!(!tasks_path(dir.path()).exists());
    });
}

#[test]
fn test_add_drops_fields_the_recurrence_ignores() {
    with_test_dir(|_dir, mut session| {
        let mut draft = TaskDraft::new("Sacar a Kali", Recurrence::Daily);
        draft.days = vec![1];
        draft.day_of_month = Some(10);
        draft.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        let id = cmd_add(&mut session, draft, &now(), true).unwrap();
        let task = session.store.task(id).unwrap();
        assert!(task.recurrence_days.is_empty());
        assert_eq!(task.recurrence_day_of_month, None);
        assert_eq!(task.due_date, None);
    });
}

#[test]
fn test_complete_and_undo_lifecycle() {
    with_test_dir(|dir, mut session| {
        let id = cmd_add(&mut session, TaskDraft::new("Sacar a Kali", Recurrence::Daily), &now(), true).unwrap();

        assert!(cmd_complete(&mut session, id, &now(), true).unwrap());
        let task = session.store.task(id).unwrap();
        assert_eq!(task.done_by.as_deref(), Some("Delfi"));
        assert!(is_done_today(task, &now()));
        assert!(!is_done_today(task, &(now() + Duration::days(1))));

        assert!(cmd_uncomplete(&mut session, id, &now(), true).unwrap());
        let task = session.store.task(id).unwrap();
        assert!(!task.done);
        assert_eq!(task.done_at, None);

        assert_eq!(
            kinds(&session),
            vec![ActivityKind::TaskAdd, ActivityKind::TaskDone, ActivityKind::TaskUndone]
        );
        assert_eq!(load_activity(dir.path()).unwrap().len(), 3);
    });
}

#[test]
fn test_edit_changes_only_given_fields() {
    with_test_dir(|dir, mut session| {
        let mut draft = TaskDraft::new("Pagar expensas", Recurrence::Monthly);
        draft.day_of_month = Some(10);
        draft.note = Some("transferencia".into());
        let id = cmd_add(&mut session, draft, &now(), true).unwrap();

        let edit = TaskEdit { day_of_month: Some(15), ..TaskEdit::default() };
        assert!(cmd_edit(&mut session, id, edit, &now(), true).unwrap());
        let edit = TaskEdit { note: Some(String::new()), ..TaskEdit::default() };
        assert!(cmd_edit(&mut session, id, edit, &now(), true).unwrap());

        let tasks = load_tasks(dir.path()).unwrap();
        assert_eq!(tasks[0].name, "Pagar expensas");
        assert_eq!(tasks[0].recurrence_day_of_month, Some(15));
        assert_eq!(tasks[0].note, None);
        assert_eq!(kinds(&session).last(), Some(&ActivityKind::TaskEdit));
    });
}

#[test]
fn test_edit_switching_recurrence_normalizes() {
    with_test_dir(|_dir, mut session| {
        let mut draft = TaskDraft::new("Limpiar baño", Recurrence::Weekly);
        draft.days = vec![1];
        let id = cmd_add(&mut session, draft, &now(), true).unwrap();

        let edit = TaskEdit {
            recurrence: Some(Recurrence::Monthly),
            day_of_month: Some(1),
            ..TaskEdit::default()
        };
        cmd_edit(&mut session, id, edit, &now(), true).unwrap();
        let task = session.store.task(id).unwrap();
        assert_eq!(task.recurrence, Recurrence::Monthly);
        assert!(task.recurrence_days.is_empty());
        assert_eq!(task.recurrence_day_of_month, Some(1));
    });
}

#[test]
fn test_remove_logs_and_persists() {
    with_test_dir(|dir, mut session| {
        let id = cmd_add(&mut session, TaskDraft::new("Comprar focos", Recurrence::Once), &now(), true).unwrap();
        assert!(cmd_remove(&mut session, id, &now(), true).unwrap());
        assert!(load_tasks(dir.path()).unwrap().is_empty());
        assert_eq!(kinds(&session), vec![ActivityKind::TaskAdd, ActivityKind::TaskDelete]);
    });
}

#[test]
fn test_unknown_id_is_a_no_op() {
    with_test_dir(|dir, mut session| {
        assert!(!cmd_complete(&mut session, 42, &now(), true).unwrap());
        assert!(!cmd_uncomplete(&mut session, 42, &now(), true).unwrap());
        assert!(!cmd_remove(&mut session, 42, &now(), true).unwrap());
        let edit = TaskEdit { name: Some("x".into()), ..TaskEdit::default() };
        assert!(!cmd_edit(&mut session, 42, edit, &now(), true).unwrap());
        assert!(session.store.activity().is_empty());
        assert!(!tasks_path(dir.path()).exists());
    });
}

#[test]
fn test_completed_once_task_is_purged_on_reopen() {
    with_test_dir(|dir, mut session| {
        let id = cmd_add(&mut session, TaskDraft::new("Llamar al plomero", Recurrence::Once), &now(), true).unwrap();
        cmd_complete(&mut session, id, &now(), true).unwrap();

        let config = Config { data_dir: Some(dir.path().to_path_buf()), ..Config::default() };
        let soon = Session::open(&config, &(now() + Duration::milliseconds(500))).unwrap();
        assert!(soon.store.task(id).is_some());

        let later = Session::open(&config, &(now() + Duration::seconds(2))).unwrap();
        assert!(later.store.task(id).is_none());
        // Activity is kept.
        assert_eq!(later.store.activity().len(), 2);
    });
}

#[test]
fn test_once_task_due_today_leaves_every_bucket_after_purge() {
    with_test_dir(|dir, mut session| {
        let mut draft = TaskDraft::new("Llamar al plomero", Recurrence::Once);
        draft.due_date = Some(now().date_naive());
        let id = cmd_add(&mut session, draft, &now(), true).unwrap();
        cmd_complete(&mut session, id, &now(), true).unwrap();

        let agenda = Agenda::build(session.store.tasks(), &now());
        assert!(agenda.today.pending.is_empty());
        assert_eq!(agenda.today.done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![id]);

        let config = Config { data_dir: Some(dir.path().to_path_buf()), ..Config::default() };
        let later = now() + Duration::seconds(2);
        let reopened = Session::open(&config, &later).unwrap();
        let agenda = Agenda::build(reopened.store.tasks(), &later);
        assert!(agenda.today.pending.is_empty());
        assert!(agenda.today.done.is_empty());
        assert!(agenda.week.is_empty());
        assert!(agenda.month.is_empty());
        assert!(agenda.upcoming.is_empty());
    });
}

#[test]
fn test_huge_completion_delay_does_not_panic_on_open() {
    with_test_dir(|dir, mut session| {
        let id = cmd_add(&mut session, TaskDraft::new("Comprar focos", Recurrence::Once), &now(), true).unwrap();
        cmd_complete(&mut session, id, &now(), true).unwrap();

        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            completion_delay_ms: u64::MAX,
            ..Config::default()
        };
        let reopened = Session::open(&config, &(now() + Duration::seconds(2))).unwrap();
        assert!(reopened.store.task(id).is_some());
    });
}

#[test]
fn test_demo_session_never_writes() {
    let config = Config::default();
    let mut session = Session::new(TaskStore::demo(&now()), &config);
    assert!(session.store.is_demo());
    assert!(cmd_complete(&mut session, 2, &now(), true).unwrap());
    assert_eq!(session.store.activity().len(), 1);
    assert_eq!(session.locale, Locale::EsAr);
}

#[test]
fn test_parse_due_date() {
    assert_eq!(parse_due_date(" 2026-10-20 ").unwrap(), NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    assert!(parse_due_date("20/10/2026").is_err());
}

#[test]
fn test_assignee_label_uses_locale() {
    assert_eq!(assignee_label(&Assignee::Both, Locale::EsAr), "ambos");
    assert_eq!(assignee_label(&Assignee::Both, Locale::En), "both");
    assert_eq!(assignee_label(&Assignee::Person("Cande".into()), Locale::En), "Cande");
}

#[test]
fn test_tables_have_one_row_per_task() {
    let store = TaskStore::demo(&now());
    let tasks = store.tasks();
    assert_eq!(list_table(tasks, &now(), Locale::EsAr).row_count(), 4);
    assert_eq!(today_table(tasks, &now(), Locale::EsAr).row_count(), 1);
    assert_eq!(week_table(tasks, &now(), Locale::EsAr).row_count(), 1);
    assert_eq!(month_table(tasks, &now(), Locale::EsAr).row_count(), 1);
    assert_eq!(upcoming_table(tasks, &now(), Locale::EsAr).row_count(), 1);
}
