//! Operator form state: identifier fields, event types, harvester selection.
//!
//! The form builds the retrieval request with the nullify split: an
//! identifier field that previously held a value and is now empty submits
//! its type in `nullify` (the operator explicitly cleared it); fields with
//! both type and value submit as entity identifiers.

use moisson_core::{
  event::EventType,
  memory::{FormMemory, keys},
  reference::Identifier,
  retrieval::{Person, RetrievalRequest},
};

/// One identifier input row.
#[derive(Debug, Clone)]
pub struct IdentifierField {
  /// Identifier type, e.g. `idref`, `orcid`.
  pub kind:      String,
  pub value:     String,
  /// Whether form memory prefilled this field — a prefillled field cleared
  /// by the operator is submitted in `nullify`.
  pub prefilled: bool,
}

/// The whole operator form.
#[derive(Debug, Clone)]
pub struct FormState {
  pub name:       String,
  pub fields:     Vec<IdentifierField>,
  /// Event types to request; defaults to created/updated/deleted.
  pub events:     Vec<(EventType, bool)>,
  /// Configured harvesters with their selection flag.
  pub harvesters: Vec<(String, bool)>,
}

impl FormState {
  pub fn new(harvesters: &[String]) -> Self {
    Self {
      name:       String::new(),
      fields:     keys::IDENTIFIER_TYPES
        .iter()
        .map(|kind| IdentifierField {
          kind:      (*kind).to_owned(),
          value:     String::new(),
          prefilled: false,
        })
        .collect(),
      events:     vec![
        (EventType::Created, true),
        (EventType::Updated, true),
        (EventType::Deleted, true),
        (EventType::Unchanged, false),
      ],
      harvesters: harvesters
        .iter()
        .map(|name| (name.clone(), true))
        .collect(),
    }
  }

  /// Prefill the form from the injected form memory.
  pub async fn load<M: FormMemory>(&mut self, memory: &M) -> Result<(), M::Error> {
    for field in &mut self.fields {
      if let Some(value) = memory.get(&field.kind).await? {
        field.value = value;
        field.prefilled = true;
      }
    }
    if let Some(name) = memory.get(keys::NAME).await? {
      self.name = name;
    }
    if let Some(csv) = memory.get(keys::EVENT_TYPES).await? {
      let stored: Vec<EventType> = csv
        .split(',')
        .filter_map(|s| s.parse().ok())
        .collect();
      for (event, selected) in &mut self.events {
        *selected = stored.contains(event);
      }
    }
    if let Some(csv) = memory.get(keys::HARVESTERS).await? {
      let stored: Vec<&str> = csv.split(',').collect();
      for (harvester, selected) in &mut self.harvesters {
        *selected = stored.contains(&harvester.as_str());
      }
    }
    Ok(())
  }

  /// Persist the current form values, deleting keys the operator cleared.
  pub async fn save<M: FormMemory>(&self, memory: &M) -> Result<(), M::Error> {
    for field in &self.fields {
      if field.value.is_empty() {
        memory.delete(&field.kind).await?;
      } else {
        memory.set(&field.kind, &field.value).await?;
      }
    }
    if self.name.is_empty() {
      memory.delete(keys::NAME).await?;
    } else {
      memory.set(keys::NAME, &self.name).await?;
    }
    memory
      .set(keys::EVENT_TYPES, &csv(self.selected_events().iter().map(|e| e.as_str())))
      .await?;
    memory
      .set(keys::HARVESTERS, &csv(self.selected_harvesters().iter().map(String::as_str)))
      .await?;
    Ok(())
  }

  pub fn selected_events(&self) -> Vec<EventType> {
    self
      .events
      .iter()
      .filter(|(_, selected)| *selected)
      .map(|(event, _)| *event)
      .collect()
  }

  pub fn selected_harvesters(&self) -> Vec<String> {
    self
      .harvesters
      .iter()
      .filter(|(_, selected)| *selected)
      .map(|(name, _)| name.clone())
      .collect()
  }

  /// Build the submission request from the current field contents.
  pub fn to_request(&self) -> RetrievalRequest {
    let identifiers: Vec<Identifier> = self
      .fields
      .iter()
      .filter(|field| !field.value.is_empty())
      .map(|field| Identifier {
        kind:  field.kind.clone(),
        value: field.value.clone(),
      })
      .collect();
    let nullify: Vec<String> = self
      .fields
      .iter()
      .filter(|field| field.prefilled && field.value.is_empty())
      .map(|field| field.kind.clone())
      .collect();
    RetrievalRequest {
      person: Person {
        identifiers,
        name: (!self.name.is_empty()).then(|| self.name.clone()),
      },
      nullify,
      events: self.selected_events(),
      harvesters: self.selected_harvesters(),
    }
  }

  /// A request is submittable once it identifies the entity somehow.
  pub fn is_submittable(&self) -> bool {
    self.fields.iter().any(|field| !field.value.is_empty())
      || !self.name.is_empty()
  }
}

fn csv<'a>(parts: impl Iterator<Item = &'a str>) -> String {
  parts.collect::<Vec<_>>().join(",")
}
