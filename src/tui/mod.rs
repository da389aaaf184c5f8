pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputMode};
use ui::ui;
use crate::commands::Session;

/// How often the dashboard wakes up to purge finished one-off tasks.
const TICK: Duration = Duration::from_millis(250);

pub fn run_tui(session: Session) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(session, &Local::now());
    let res = run_app(&mut terminal, &mut app);

    // Restore the terminal before reporting anything.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            app.tick(&Local::now());
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let now = Local::now();
            match app.input_mode {
                InputMode::Normal => {
                    app.message = None;
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        KeyCode::Tab | KeyCode::Char('v') => app.next_tab(&now),
                        KeyCode::Char(' ') => app.toggle_selected(&now),
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(&now),
                        KeyCode::Char('a') => app.start_add(),
                        KeyCode::Char('n') => app.start_rename(),
                        _ => {}
                    }
                }
                InputMode::Renaming | InputMode::Adding | InputMode::AddingItem => match key.code {
                    KeyCode::Enter => app.handle_input(&now),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                }
            }
        }
        app.tick(&Local::now());
    }
}
