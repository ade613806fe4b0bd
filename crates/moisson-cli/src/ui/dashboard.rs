//! Per-harvester progress widgets pane.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem},
};

use moisson_client::dashboard::DashboardState;
use moisson_core::harvesting::HarvestingState;

/// Render the dashboard widgets into `area`.
pub fn draw(f: &mut Frame, area: Rect, state: &DashboardState) {
  let title = if state.identifiers.is_empty() {
    " Harvesting ".to_owned()
  } else {
    let idents: Vec<String> = state
      .identifiers
      .iter()
      .map(|i| format!("{}({})", i.kind, i.value))
      .collect();
    format!(" Harvesting — {} ", idents.join(" OR "))
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = state
    .widgets
    .iter()
    .map(|widget| {
      let (glyph, style) = state_glyph(widget.state);
      let mut spans = vec![
        Span::styled(format!(" {glyph} "), style),
        Span::styled(
          format!("{:<10}", widget.harvester),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
          format!(
            "{} ({} results)",
            widget.state.label(),
            widget.event_count
          ),
          style,
        ),
      ];
      for error in &widget.errors {
        spans.push(Span::styled(
          format!("  {}: {}", error.name, error.message),
          Style::default().fg(Color::Red),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let items = if items.is_empty() {
    vec![ListItem::new(Line::from(Span::styled(
      " waiting for first poll…",
      Style::default().fg(Color::DarkGray),
    )))]
  } else {
    items
  };

  f.render_widget(List::new(items).block(block), area);
}

fn state_glyph(state: HarvestingState) -> (&'static str, Style) {
  match state {
    HarvestingState::Pending => ("…", Style::default().fg(Color::DarkGray)),
    HarvestingState::Running => ("⟳", Style::default().fg(Color::Yellow)),
    HarvestingState::Completed => ("✓", Style::default().fg(Color::Green)),
    HarvestingState::Failed => ("✗", Style::default().fg(Color::Red)),
    HarvestingState::Canceled => ("⊘", Style::default().fg(Color::DarkGray)),
  }
}
