use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
    Frame,
};

use super::app::{App, InputMode, Tab};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help / message
        ].as_ref())
        .split(f.area());

    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
    let title = if app.session.store.is_demo() { "Madriguera (demo)" } else { "Madriguera" };
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let rows: Vec<Row> = app
        .items
        .iter()
        .map(|item| {
            let style = if item.done {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if item.done { "[x]" } else { "[ ]" }),
                Cell::from(item.name.clone()),
                Cell::from(item.when.clone()),
                Cell::from(item.assigned.clone()),
                Cell::from(item.done_label.clone()),
            ]).style(style)
        })
        .collect();

    let header = if app.tab == Tab::Shopping {
        vec!["", "Item", "Places", "Added by", "Checked"]
    } else {
        vec!["", "Task", "When", "Assigned", "Done"]
    };

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(24),
        Constraint::Length(10),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(header)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(app.tab.title()))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let (help_text, help_style) = match (&app.message, &app.input_mode) {
        (Some(msg), _) => (msg.as_str(), Style::default().fg(Color::Red)),
        (None, InputMode::Normal) if app.tab == Tab::Shopping => (
            "q: Quit | Tab/v: Next View | Space: Check/Uncheck | a: Add Item | d: Del",
            Style::default().fg(Color::Gray),
        ),
        (None, InputMode::Normal) => (
            "q: Quit | Tab/v: Next View | Space: Done/Undo | a: Add | n: Rename | d: Del",
            Style::default().fg(Color::Gray),
        ),
        (None, InputMode::Renaming) => ("Enter: Save | Esc: Cancel", Style::default().fg(Color::Gray)),
        (None, InputMode::Adding | InputMode::AddingItem) => {
            ("Enter: Next Step | Esc: Cancel", Style::default().fg(Color::Gray))
        }
    };

    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
        f.render_widget(Clear, area);

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(app.input_title()));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
