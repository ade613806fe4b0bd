//! TUI rendering — orchestrates all panes.

pub mod dashboard;
pub mod form;
pub mod table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::Span,
  widgets::Paragraph,
};

use moisson_core::memory::FormMemory;

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<M: FormMemory>(f: &mut Frame, app: &App<M>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Form => form::draw(f, rows[1], app),
    Screen::Watch => draw_watch(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

fn draw_watch<M: FormMemory>(f: &mut Frame, area: Rect, app: &App<M>) {
  let dashboard_state = app.dashboard_out.snapshot();
  let table_state = app.table_out.snapshot();

  // Dashboard on top, table below; the detail pane appears once the
  // selected row is open.
  let dashboard_height = dashboard_state.widgets.len().max(1) as u16 + 3;
  let selected_open = table_state
    .rows
    .get(app.table_cursor)
    .is_some_and(|row| row.open);

  let constraints = if selected_open {
    vec![
      Constraint::Length(dashboard_height),
      Constraint::Min(5),
      Constraint::Percentage(45),
    ]
  } else {
    vec![Constraint::Length(dashboard_height), Constraint::Min(5)]
  };
  let panes = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  dashboard::draw(f, panes[0], &dashboard_state);
  table::draw(f, panes[1], &table_state, app.table_cursor);
  if selected_open {
    table::draw_detail(
      f,
      panes[2],
      &table_state,
      app.table_cursor,
      app.detail_tab,
    );
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<M: FormMemory>(f: &mut Frame, area: Rect, app: &App<M>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let keys = match app.screen {
    Screen::Form => " moisson  [Enter] submit  [Esc] quit",
    Screen::Watch => {
      " moisson  [Enter] expand  [Tab] tabs  [c] cancel  [n] new  [q] quit"
    }
  };
  let left = Span::styled(
    keys,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);
  let line = ratatui::text::Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<M: FormMemory>(f: &mut Frame, area: Rect, app: &App<M>) {
  let (text, style) = if app.running {
    (
      format!("{}  (polling…)", app.status_msg),
      Style::default().fg(Color::Yellow),
    )
  } else if app.status_msg.starts_with("Error") {
    (app.status_msg.clone(), Style::default().fg(Color::Red))
  } else {
    (app.status_msg.clone(), Style::default().fg(Color::DarkGray))
  };
  f.render_widget(Paragraph::new(text).style(style), area);
}
