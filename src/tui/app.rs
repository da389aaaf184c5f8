use chrono::{DateTime, Local};
use ratatui::widgets::TableState;

use crate::agenda::{month_tasks, today_tasks, week_tasks};
use crate::commands::{
    assignee_label, cmd_add, cmd_complete, cmd_edit, cmd_remove, cmd_uncomplete, parse_due_date, Session,
    TaskDraft, TaskEdit,
};
use crate::error::{Error, Result};
use crate::locale::parse_weekdays;
use crate::models::{Assignee, Recurrence, Task};
use crate::schedule::{format_done_time, next_due_label, weekly_day_label};
use crate::shopping::{cmd_item_add, cmd_item_remove, cmd_item_toggle, list_items, parse_places, split_quantity, ItemDraft};

#[derive(PartialEq, Debug)]
pub enum InputMode {
    Normal,
    Renaming,
    Adding,
    AddingItem,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Today,
    Week,
    Month,
    Upcoming,
    Shopping,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Today, Tab::Week, Tab::Month, Tab::Upcoming, Tab::Shopping];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::Week => "Week",
            Tab::Month => "Month",
            Tab::Upcoming => "Upcoming",
            Tab::Shopping => "Shopping",
        }
    }

    fn next(&self) -> Tab {
        match self {
            Tab::Today => Tab::Week,
            Tab::Week => Tab::Month,
            Tab::Month => Tab::Upcoming,
            Tab::Upcoming => Tab::Shopping,
            Tab::Shopping => Tab::Today,
        }
    }
}

/// What a row's id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Task,
    Item,
}

/// One rendered row of the current tab.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub kind: RowKind,
    pub id: u64,
    pub name: String,
    pub when: String,
    pub assigned: String,
    /// Done within the period the tab is about.
    pub done: bool,
    pub done_label: String,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default, Debug)]
pub struct AddState {
    pub name: String,
    pub recurrence: Option<Recurrence>,
    pub days: Vec<u8>,
    pub day_of_month: Option<u32>,
    pub due: Option<chrono::NaiveDate>,
    /// Places of a new shopping item.
    pub places: Vec<u64>,
    pub step: usize, // Tasks: name, recurrence, schedule, assignee. Items: name, places, quantity.
}

pub struct App {
    pub session: Session,
    pub tab: Tab,
    pub items: Vec<DisplayItem>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub target_id: Option<u64>,
    pub add_state: AddState,
    /// Last error or notice shown under the table.
    pub message: Option<String>,
}

impl App {
    /// Creates a new App around an opened session.
    pub fn new(session: Session, now: &DateTime<Local>) -> App {
        let mut app = App {
            session,
            tab: Tab::Today,
            items: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            message: None,
        };
        app.reload(now);
        app
    }

    /// Rebuilds the rows for the current tab.
    pub fn reload(&mut self, now: &DateTime<Local>) {
        let locale = self.session.locale;
        let tasks = self.session.store.tasks();
        let done_label = |by: &Option<String>, at: &Option<DateTime<chrono::Utc>>| {
            at.map(|at| {
                let by = by.clone().unwrap_or_default();
                format!("{} {}", by, format_done_time(&at, now, locale)).trim().to_string()
            })
            .unwrap_or_default()
        };
        let item = |task: &Task, when: String, done: bool| DisplayItem {
            kind: RowKind::Task,
            id: task.id,
            name: task.name.clone(),
            when,
            assigned: assignee_label(&task.assigned_to, locale),
            done,
            done_label: if done { done_label(&task.done_by, &task.done_at) } else { String::new() },
        };

        self.items = match self.tab {
            Tab::Today => {
                let bucket = today_tasks(tasks, now);
                bucket
                    .pending
                    .iter()
                    .map(|&t| item(t, next_due_label(t, now, locale), false))
                    .chain(bucket.done.iter().map(|&t| item(t, next_due_label(t, now, locale), true)))
                    .collect()
            }
            Tab::Week => week_tasks(tasks, now)
                .into_iter()
                .map(|e| {
                    let when = weekly_day_label(e.task, now, locale).unwrap_or_default();
                    item(e.task, when, e.done_this_week)
                })
                .collect(),
            Tab::Month => month_tasks(tasks, now)
                .into_iter()
                .map(|e| item(e.task, next_due_label(e.task, now, locale), e.done_this_month))
                .collect(),
            Tab::Upcoming => {
                // Completed one-off tasks stay visible until they are purged.
                let today = now.date_naive();
                let mut upcoming: Vec<&Task> = tasks
                    .iter()
                    .filter(|t| t.recurrence == Recurrence::Once && t.due_date.is_some_and(|d| d > today))
                    .collect();
                upcoming.sort_by_key(|t| t.due_date);
                upcoming
                    .into_iter()
                    .map(|t| item(t, next_due_label(t, now, locale), t.done))
                    .collect()
            }
            Tab::Shopping => {
                let store = &self.session.store;
                list_items(store.items(), None)
                    .into_iter()
                    .map(|i| {
                        let qty = i.quantity_label();
                        DisplayItem {
                            kind: RowKind::Item,
                            id: i.id,
                            name: if qty.is_empty() { i.name.clone() } else { format!("{} ({})", i.name, qty) },
                            when: store.place_names(&i.place_ids).join(", "),
                            assigned: i.created_by.clone().unwrap_or_default(),
                            done: i.done,
                            done_label: if i.done { done_label(&i.done_by, &i.done_at) } else { String::new() },
                        }
                    })
                    .collect()
            }
        };

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Purges expired one-off completions. Reloads only if something went.
    pub fn tick(&mut self, now: &DateTime<Local>) {
        let delay = self.session.completion_delay;
        if self.session.store.purge_completed_once(now, delay) > 0 {
            let result = self.session.store.save();
            self.report(result);
            self.reload(now);
        }
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i >= self.items.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn next_tab(&mut self, now: &DateTime<Local>) {
        self.tab = self.tab.next();
        self.state.select(None);
        self.reload(now);
    }

    fn selected(&self) -> Option<&DisplayItem> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    fn report<T>(&mut self, result: Result<T>) {
        if let Err(e) = result {
            self.message = Some(e.to_string());
        }
    }

    /// Completes the selected row, or reopens it if it is already done.
    pub fn toggle_selected(&mut self, now: &DateTime<Local>) {
        let Some((kind, id, done)) = self.selected().map(|item| (item.kind, item.id, item.done)) else { return };
        let result = match (kind, done) {
            (RowKind::Item, _) => cmd_item_toggle(&mut self.session, id, now, true),
            (RowKind::Task, true) => cmd_uncomplete(&mut self.session, id, now, true),
            (RowKind::Task, false) => cmd_complete(&mut self.session, id, now, true),
        };
        self.report(result);
        self.reload(now);
    }

    pub fn delete_selected(&mut self, now: &DateTime<Local>) {
        let Some((kind, id)) = self.selected().map(|item| (item.kind, item.id)) else { return };
        let result = match kind {
            RowKind::Task => cmd_remove(&mut self.session, id, now, true),
            RowKind::Item => cmd_item_remove(&mut self.session, id, now, true),
        };
        self.report(result);
        self.reload(now);
    }

    /// Initiates the add wizard for the current tab: items on the
    /// shopping tab, tasks everywhere else.
    pub fn start_add(&mut self) {
        self.input_mode = if self.tab == Tab::Shopping { InputMode::AddingItem } else { InputMode::Adding };
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.message = None;
    }

    /// Starts renaming the selected task. Items keep their names.
    pub fn start_rename(&mut self) {
        let Some((id, name)) = self
            .selected()
            .filter(|item| item.kind == RowKind::Task)
            .map(|item| (item.id, item.name.clone()))
        else {
            return;
        };
        self.target_id = Some(id);
        self.input_mode = InputMode::Renaming;
        self.input_buffer = name;
        self.message = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self, now: &DateTime<Local>) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(now),
            InputMode::AddingItem => self.handle_item_input(now),
            InputMode::Renaming => self.handle_rename_input(now),
            InputMode::Normal => {}
        }
    }

    fn handle_rename_input(&mut self, now: &DateTime<Local>) {
        if let Some(id) = self.target_id.take() {
            if !self.input_buffer.trim().is_empty() {
                let edit = TaskEdit { name: Some(self.input_buffer.trim().to_string()), ..TaskEdit::default() };
                let result = cmd_edit(&mut self.session, id, edit, now, true);
                self.report(result);
            }
        }
        self.cancel_input();
        self.reload(now);
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self, now: &DateTime<Local>) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Name
                if !input.is_empty() {
                    self.add_state.name = input;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Recurrence
                let parsed = if input.is_empty() { Ok(Recurrence::Once) } else { input.parse::<Recurrence>() };
                match parsed {
                    Ok(r) => {
                        self.add_state.recurrence = Some(r);
                        // Daily tasks have no schedule to ask for.
                        self.add_state.step += if r == Recurrence::Daily { 2 } else { 1 };
                        self.input_buffer.clear();
                        self.message = None;
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            2 => { // Schedule
                let parsed = match self.add_state.recurrence.unwrap_or(Recurrence::Once) {
                    Recurrence::Once if input.is_empty() => Ok(()),
                    Recurrence::Once => parse_due_date(&input).map(|d| self.add_state.due = Some(d)),
                    Recurrence::Weekly => parse_weekdays(&input).map(|d| self.add_state.days = d),
                    Recurrence::Monthly => match input.parse::<u32>() {
                        Ok(d) if (1..=31).contains(&d) => {
                            self.add_state.day_of_month = Some(d);
                            Ok(())
                        }
                        _ => Err(Error::InvalidDayOfMonth(input.parse().unwrap_or(0))),
                    },
                    Recurrence::Daily => Ok(()),
                };
                match parsed {
                    Ok(()) => {
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                        self.message = None;
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            3 => { // Assignee, then finish
                let state = std::mem::take(&mut self.add_state);
                let mut draft = TaskDraft::new(state.name, state.recurrence.unwrap_or(Recurrence::Once));
                draft.days = state.days;
                draft.day_of_month = state.day_of_month;
                draft.due_date = state.due;
                draft.assigned_to = Assignee::from(input);
                let result = cmd_add(&mut self.session, draft, now, true);
                self.report(result);
                self.cancel_input();
                self.reload(now);
            }
            _ => {}
        }
    }

    /// Handles input for the "Add Item" wizard.
    fn handle_item_input(&mut self, now: &DateTime<Local>) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Name
                if !input.is_empty() {
                    self.add_state.name = input;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Places
                let parsed = parse_places(&self.session.store, &input)
                    .and_then(|ids| if ids.is_empty() { Err(Error::NoPlace) } else { Ok(ids) });
                match parsed {
                    Ok(ids) => {
                        self.add_state.places = ids;
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                        self.message = None;
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            2 => { // Quantity, then finish
                let state = std::mem::take(&mut self.add_state);
                let mut draft = ItemDraft::new(state.name, state.places);
                (draft.qty, draft.unit) = split_quantity(&input);
                let result = cmd_item_add(&mut self.session, draft, now, true);
                self.report(result);
                self.cancel_input();
                self.reload(now);
            }
            _ => {}
        }
    }

    /// Title of the input popup for the current wizard step.
    pub fn input_title(&self) -> &'static str {
        match self.input_mode {
            InputMode::Renaming => "Rename Task",
            InputMode::Adding => match self.add_state.step {
                0 => "Add Task: Enter Name",
                1 => "Add Task: Recurrence (once, daily, weekly, monthly)",
                2 => match self.add_state.recurrence {
                    Some(Recurrence::Weekly) => "Add Task: Weekdays (e.g. lun,jue)",
                    Some(Recurrence::Monthly) => "Add Task: Day of Month (1-31)",
                    _ => "Add Task: Due Date (YYYY-MM-DD, Optional)",
                },
                3 => "Add Task: Assigned To (Optional, default both)",
                _ => "Add Task",
            },
            InputMode::AddingItem => match self.add_state.step {
                0 => "Add Item: Enter Name",
                1 => "Add Item: Places (names or ids, e.g. coto,feria del barrio)",
                2 => "Add Item: Quantity (e.g. 2 kg, Optional)",
                _ => "Add Item",
            },
            InputMode::Normal => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::TaskStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).earliest().unwrap()
    }

    fn app() -> App {
        let config = Config::default();
        let session = Session::new(TaskStore::demo(&now()), &config);
        App::new(session, &now())
    }

    fn type_line(app: &mut App, text: &str, now: &DateTime<Local>) {
        app.input_buffer = text.to_string();
        app.handle_input(now);
    }

    #[test]
    fn today_tab_lists_due_tasks() {
        let app = app();
        // Friday the 16th: only the daily demo task is due.
        let names: Vec<&str> = app.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Sacar a Kali"]);
    }

    #[test]
    fn toggling_twice_restores_pending() {
        let mut app = app();
        app.toggle_selected(&now());
        assert!(app.items[0].done);
        app.toggle_selected(&now());
        assert!(!app.items[0].done);
    }

    #[test]
    fn add_wizard_creates_weekly_task() {
        let mut app = app();
        let now = now();
        app.start_add();
        type_line(&mut app, "Regar plantas", &now);
        type_line(&mut app, "weekly", &now);
        type_line(&mut app, "vie", &now);
        type_line(&mut app, "Cande", &now);
        assert_eq!(app.input_mode, InputMode::Normal);
        let task = app.session.store.tasks().iter().find(|t| t.name == "Regar plantas").unwrap();
        assert_eq!(task.recurrence_days.iter().copied().collect::<Vec<_>>(), vec![5]);
        assert_eq!(task.assigned_to, Assignee::Person("Cande".into()));
        assert!(app.items.iter().any(|i| i.name == "Regar plantas"));
    }

    #[test]
    fn bad_schedule_input_keeps_the_step() {
        let mut app = app();
        let now = now();
        app.start_add();
        type_line(&mut app, "Pagar luz", &now);
        type_line(&mut app, "monthly", &now);
        type_line(&mut app, "40", &now);
        assert_eq!(app.add_state.step, 2);
        assert!(app.message.is_some());
    }

    #[test]
    fn tick_purges_completed_one_off_tasks() {
        let mut app = app();
        let now = now();
        app.next_tab(&now);
        app.next_tab(&now);
        app.next_tab(&now);
        assert_eq!(app.tab, Tab::Upcoming);
        assert_eq!(app.items.len(), 1);
        app.toggle_selected(&now);
        // Still listed, shown as done, until the delay passes.
        assert_eq!(app.items.len(), 1);
        assert!(app.items[0].done);
        app.tick(&(now + Duration::milliseconds(500)));
        assert_eq!(app.items.len(), 1);
        app.tick(&(now + Duration::seconds(2)));
        assert!(app.session.store.task(4).is_none());
        assert!(app.items.is_empty());
    }

    fn shopping_app(now: &DateTime<Local>) -> App {
        let mut app = app();
        while app.tab != Tab::Shopping {
            app.next_tab(now);
        }
        app
    }

    #[test]
    fn shopping_tab_lists_items_pending_first() {
        let now = now();
        let app = shopping_app(&now);
        assert_eq!(app.items.len(), 9);
        assert!(app.items.iter().all(|i| i.kind == RowKind::Item));
        assert_eq!(app.items[0].name, "Leche (2 L)");
        assert_eq!(app.items[0].when, "Coto");
        assert!(app.items[8].done);
    }

    #[test]
    fn toggling_an_item_checks_it_off() {
        let now = now();
        let mut app = shopping_app(&now);
        let id = app.items[0].id;
        app.toggle_selected(&now);
        assert!(app.session.store.item(id).unwrap().done);
        assert!(app.items[8].done);
        assert_eq!(app.session.store.activity().last().map(|a| a.kind), Some(crate::models::ActivityKind::Check));
    }

    #[test]
    fn item_wizard_adds_to_named_places() {
        let now = now();
        let mut app = shopping_app(&now);
        app.start_add();
        assert_eq!(app.input_mode, InputMode::AddingItem);
        type_line(&mut app, "Harina", &now);
        type_line(&mut app, "Jumbo", &now);
        assert_eq!(app.add_state.step, 1);
        assert!(app.message.is_some());
        type_line(&mut app, "coto, bazar chino", &now);
        type_line(&mut app, "1 kg", &now);
        assert_eq!(app.input_mode, InputMode::Normal);
        let item = app.session.store.items().iter().find(|i| i.name == "Harina").unwrap();
        assert_eq!(item.place_ids, vec![1, 3]);
        assert_eq!(item.quantity_label(), "1 kg");
        assert!(app.items.iter().any(|i| i.name == "Harina (1 kg)"));
    }

    #[test]
    fn items_cannot_be_renamed() {
        let now = now();
        let mut app = shopping_app(&now);
        app.start_rename();
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
