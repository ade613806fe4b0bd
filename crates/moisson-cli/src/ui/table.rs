//! References table pane and the detail pane for the selected open row.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use moisson_client::{
  detail::{DetailPane, NO_PREVIOUS_DATA},
  table::{RowDetail, TableState},
};

use crate::app::DetailTab;

/// Render the flattened references table into `area`.
pub fn draw(f: &mut Frame, area: Rect, state: &TableState, cursor: usize) {
  let block = Block::default()
    .title(format!(" References ({}) ", state.rows.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let header = Row::new(vec![
    Cell::from(""),
    Cell::from("Source"),
    Cell::from("Identifier"),
    Cell::from("Status"),
    Cell::from("Title"),
  ])
  .style(Style::default().add_modifier(Modifier::BOLD));

  let rows: Vec<Row> = state
    .rows
    .iter()
    .enumerate()
    .map(|(index, row)| {
      let disclosure = if row.open { "▾" } else { "▸" };
      let style = if index == cursor {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      Row::new(vec![
        Cell::from(disclosure),
        Cell::from(row.source.clone()),
        Cell::from(row.source_identifier.clone()),
        Cell::from(row.status.clone()),
        Cell::from(row.title.clone()),
      ])
      .style(style)
    })
    .collect();

  let table = Table::new(
    rows,
    [
      Constraint::Length(2),
      Constraint::Length(8),
      Constraint::Length(18),
      Constraint::Length(12),
      Constraint::Min(20),
    ],
  )
  .header(header)
  .block(block);

  f.render_widget(table, area);
}

/// Render the detail pane for the row under the cursor.
pub fn draw_detail(
  f: &mut Frame,
  area: Rect,
  state: &TableState,
  cursor: usize,
  tab: DetailTab,
) {
  let Some(row) = state.rows.get(cursor) else { return };

  let (title, body) = match &row.detail {
    RowDetail::Collapsed => return,
    RowDetail::Loading => (" Detail ".to_owned(), "Loading…".to_owned()),
    RowDetail::Failed(message) => (
      " Detail (failed) ".to_owned(),
      format!("{message}\n\nCollapse and re-expand the row to retry."),
    ),
    RowDetail::Loaded(pane) => detail_body(pane, tab),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(body).wrap(Wrap { trim: false }).block(block),
    area,
  );
}

fn detail_body(pane: &DetailPane, tab: DetailTab) -> (String, String) {
  let tabs = match &pane.versions {
    Some(_) => {
      let marker = |t: DetailTab| if t == tab { "●" } else { "○" };
      format!(
        " Detail  {} current  {} previous  {} diff ",
        marker(DetailTab::Current),
        marker(DetailTab::Previous),
        marker(DetailTab::Diff),
      )
    }
    None => " Detail ".to_owned(),
  };

  let body = match (&pane.versions, tab) {
    (None, _) | (Some(_), DetailTab::Current) => pretty(&pane.current),
    (Some(versions), DetailTab::Previous) => match &versions.previous {
      Some(previous) => pretty(previous),
      None => NO_PREVIOUS_DATA.to_owned(),
    },
    (Some(versions), DetailTab::Diff) => match &versions.annotated {
      Some(annotated) => annotated.clone(),
      None => NO_PREVIOUS_DATA.to_owned(),
    },
  };

  (tabs, body)
}

fn pretty(value: &serde_json::Value) -> String {
  serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
