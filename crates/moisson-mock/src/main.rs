//! Standalone mock retrieval service.
//!
//! Serves a small demo world (two harvesters, a handful of events, one
//! record with a previous version) so the `moisson` TUI can be exercised
//! without the real harvesting backend:
//!
//! ```
//! moisson-mock --port 8000
//! moisson --api-url http://127.0.0.1:8000
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use moisson_core::{
  event::{EventType, ReferenceEvent},
  harvesting::HarvestingState::*,
  reference::{
    Contribution, Contributor, DocumentType, Identifier, LiteralField,
    Reference,
  },
};
use moisson_mock::{HarvesterScript, MockWorld, ScriptStep, router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moisson-mock", about = "Mock retrieval service for moisson")]
struct Cli {
  /// Address to bind.
  #[arg(long, default_value = "127.0.0.1")]
  host: String,

  /// Port to bind.
  #[arg(long, default_value_t = 8000)]
  port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let address = format!("{}:{}", cli.host, cli.port);

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("binding {address}"))?;
  let world = demo_world(format!("http://{address}"));
  let app = router(Arc::new(world)).layer(TraceLayer::new_for_http());

  tracing::info!("Mock retrieval service on http://{address}");
  axum::serve(listener, app).await.context("serving")?;
  Ok(())
}

// ─── Demo world ──────────────────────────────────────────────────────────────

fn demo_world(base_url: String) -> MockWorld {
  let created = demo_event(1, EventType::Created, "hal", "hal-04113744", 0);
  let updated = demo_event(2, EventType::Updated, "hal", "hal-03912337", 1);
  let unchanged = demo_event(3, EventType::Unchanged, "idref", "268X-1991", 0);

  // Previous version of the updated record, with a different title and one
  // fewer contribution so the diff tab has something to show.
  let mut previous = updated.reference.clone();
  previous.version = 0;
  previous.titles = vec![LiteralField {
    value:    "Premiers résultats (preprint)".to_owned(),
    language: Some("fr".to_owned()),
  }];
  previous.contributions.pop();

  let mut world = MockWorld::new().with_base_url(base_url);
  world.add_script(HarvesterScript::new(
    "hal",
    vec![
      ScriptStep::new(Pending),
      ScriptStep::new(Running).with_events(vec![created.clone()]),
      ScriptStep::new(Running)
        .with_events(vec![created.clone(), updated.clone()]),
      ScriptStep::new(Completed)
        .with_events(vec![created.clone(), updated.clone()]),
    ],
  ));
  world.add_script(HarvesterScript::new(
    "idref",
    vec![
      ScriptStep::new(Pending),
      ScriptStep::new(Running).with_events(vec![unchanged.clone()]),
      ScriptStep::new(Failed)
        .with_events(vec![unchanged.clone()])
        .with_error(
          "SPARQLTimeout",
          "the idref endpoint did not answer within 30s",
        ),
    ],
  ));

  world.add_event(created);
  world.add_event(updated);
  world.add_event(unchanged);
  world.add_previous(previous);
  world
}

fn demo_event(
  id: i64,
  kind: EventType,
  harvester: &str,
  source_identifier: &str,
  version: i64,
) -> ReferenceEvent {
  ReferenceEvent {
    id,
    kind,
    enhanced: false,
    reference: Reference {
      harvester: harvester.to_owned(),
      source_identifier: source_identifier.to_owned(),
      version,
      titles: vec![LiteralField {
        value:    format!("Résultats expérimentaux {source_identifier}"),
        language: Some("fr".to_owned()),
      }],
      subtitles: vec![],
      document_type: vec![DocumentType {
        uri:   "http://purl.org/ontology/bibo/Article".to_owned(),
        label: Some("Article".to_owned()),
      }],
      contributions: vec![
        Contribution {
          rank:         Some(1),
          role:         Some("Author".to_owned()),
          contributor:  Contributor {
            source_identifier: Some("059793937".to_owned()),
            name:              Some("M. Dupont".to_owned()),
          },
          affiliations: vec![],
        },
        Contribution {
          rank:         Some(2),
          role:         Some("Author".to_owned()),
          contributor:  Contributor {
            source_identifier: Some("070569788".to_owned()),
            name:              Some("A. Martin".to_owned()),
          },
          affiliations: vec![],
        },
      ],
      identifiers: vec![Identifier {
        kind:  "hal".to_owned(),
        value: source_identifier.to_owned(),
      }],
      issued: None,
    },
  }
}
