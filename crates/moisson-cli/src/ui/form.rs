//! Operator form pane.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem},
};

use moisson_core::memory::FormMemory;

use crate::app::App;

/// Render the form into `area`.
pub fn draw<M: FormMemory>(f: &mut Frame, area: Rect, app: &App<M>) {
  let block = Block::default()
    .title(" New retrieval ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let cursor_style = Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);
  let label_style = Style::default().fg(Color::DarkGray);

  let mut items: Vec<ListItem> = Vec::with_capacity(app.form_rows());

  // Name row.
  items.push(text_row(
    "name",
    &app.form.name,
    app.form_cursor == 0,
    cursor_style,
    label_style,
  ));

  // One row per identifier type.
  for (index, field) in app.form.fields.iter().enumerate() {
    let mut row = text_row(
      &field.kind,
      &field.value,
      app.form_cursor == index + 1,
      cursor_style,
      label_style,
    );
    if field.prefilled && !field.value.is_empty() {
      row = row.style(Style::default().fg(Color::Cyan));
    }
    items.push(row);
  }

  // Event-type selection row.
  let events: Vec<Span> = app
    .form
    .events
    .iter()
    .enumerate()
    .map(|(index, (event, selected))| {
      Span::raw(format!(
        "{}:[{}] {}  ",
        index + 1,
        if *selected { "x" } else { " " },
        event.as_str()
      ))
    })
    .collect();
  items.push(selectable_row(
    "events",
    events,
    app.form_cursor == app.events_row(),
    cursor_style,
    label_style,
  ));

  // Harvester selection row.
  let harvesters: Vec<Span> = app
    .form
    .harvesters
    .iter()
    .enumerate()
    .map(|(index, (name, selected))| {
      Span::raw(format!(
        "{}:[{}] {}  ",
        index + 1,
        if *selected { "x" } else { " " },
        name
      ))
    })
    .collect();
  items.push(selectable_row(
    "harvesters",
    harvesters,
    app.form_cursor == app.harvesters_row(),
    cursor_style,
    label_style,
  ));

  let list = List::new(items).block(block);
  f.render_widget(list, area);
}

fn text_row<'a>(
  label: &str,
  value: &str,
  is_cursor: bool,
  cursor_style: Style,
  label_style: Style,
) -> ListItem<'a> {
  let value_span = if is_cursor {
    Span::styled(format!("{value}_"), cursor_style)
  } else {
    Span::raw(value.to_owned())
  };
  ListItem::new(Line::from(vec![
    Span::styled(format!("{label:>14}: "), label_style),
    value_span,
  ]))
}

fn selectable_row<'a>(
  label: &str,
  mut spans: Vec<Span<'a>>,
  is_cursor: bool,
  cursor_style: Style,
  label_style: Style,
) -> ListItem<'a> {
  let mut line = vec![Span::styled(format!("{label:>14}: "), label_style)];
  if is_cursor {
    spans = spans
      .into_iter()
      .map(|span| Span::styled(span.content, cursor_style))
      .collect();
  }
  line.extend(spans);
  ListItem::new(Line::from(line))
}
