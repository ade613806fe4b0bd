//! Canonical ordering of a reference's repeating substructures.
//!
//! The service assembles lists (identifiers, contributions, affiliations,
//! document types) in whatever order the harvester produced them, so two
//! otherwise-equivalent records can differ only in list order. Canonicalizing
//! both sides first makes comparison and diffing see semantic changes only.
//!
//! All comparisons are ordinal (byte-wise) string comparisons; no locale is
//! consulted. Every sort is stable, so canonicalization is idempotent.

use std::cmp::Ordering;

use crate::reference::{Contribution, Reference};

/// Sort all repeating substructures of `reference` in place, in order:
///
/// 1. `document_type` by URI;
/// 2. `contributions` by `(rank, contributor.source_identifier)`, with a
///    missing rank sorting after any present rank;
/// 3. `identifiers` by type;
/// 4. each contribution's `affiliations` by source identifier, and each
///    affiliation's own `identifiers` by `(type, value)`.
pub fn canonicalize(reference: &mut Reference) {
  reference.document_type.sort_by(|a, b| a.uri.cmp(&b.uri));
  reference.contributions.sort_by(compare_contributions);
  reference.identifiers.sort_by(|a, b| a.kind.cmp(&b.kind));

  for contribution in &mut reference.contributions {
    contribution
      .affiliations
      .sort_by(|a, b| a.source_identifier.cmp(&b.source_identifier));
    for affiliation in &mut contribution.affiliations {
      affiliation
        .identifiers
        .sort_by(|a, b| (&a.kind, &a.value).cmp(&(&b.kind, &b.value)));
    }
  }
}

/// Owned variant of [`canonicalize`].
pub fn canonicalized(mut reference: Reference) -> Reference {
  canonicalize(&mut reference);
  reference
}

fn compare_contributions(a: &Contribution, b: &Contribution) -> Ordering {
  compare_ranks(a.rank, b.rank).then_with(|| {
    contributor_key(a).cmp(contributor_key(b))
  })
}

/// Ranked contributions come first, in rank order; unranked ones last.
fn compare_ranks(a: Option<i64>, b: Option<i64>) -> Ordering {
  match (a, b) {
    (Some(x), Some(y)) => x.cmp(&y),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

fn contributor_key(c: &Contribution) -> &str {
  c.contributor.source_identifier.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reference::{
    Affiliation, Contributor, DocumentType, Identifier, LiteralField,
  };

  fn identifier(kind: &str, value: &str) -> Identifier {
    Identifier {
      kind:  kind.to_owned(),
      value: value.to_owned(),
    }
  }

  fn contribution(rank: Option<i64>, source_identifier: &str) -> Contribution {
    Contribution {
      rank,
      role: Some("Author".to_owned()),
      contributor: Contributor {
        source_identifier: Some(source_identifier.to_owned()),
        name:              None,
      },
      affiliations: vec![],
    }
  }

  fn sample() -> Reference {
    Reference {
      harvester: "hal".to_owned(),
      source_identifier: "hal-01".to_owned(),
      version: 1,
      titles: vec![LiteralField {
        value:    "A title".to_owned(),
        language: None,
      }],
      subtitles: vec![],
      document_type: vec![
        DocumentType {
          uri:   "uri:b".to_owned(),
          label: None,
        },
        DocumentType {
          uri:   "uri:a".to_owned(),
          label: None,
        },
      ],
      contributions: vec![
        contribution(Some(2), "c2"),
        contribution(None, "c9"),
        contribution(Some(1), "c1"),
      ],
      identifiers: vec![identifier("doi", "y"), identifier("arxiv", "x")],
      issued: None,
    }
  }

  #[test]
  fn sorts_every_repeating_structure() {
    let r = canonicalized(sample());

    let uris: Vec<_> = r.document_type.iter().map(|d| d.uri.as_str()).collect();
    assert_eq!(uris, ["uri:a", "uri:b"]);

    let ranks: Vec<_> = r.contributions.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, [Some(1), Some(2), None]);

    let kinds: Vec<_> = r.identifiers.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, ["arxiv", "doi"]);
  }

  #[test]
  fn missing_rank_sorts_after_any_present_rank() {
    let mut r = sample();
    r.contributions = vec![contribution(None, "cx"), contribution(Some(2), "cy")];
    canonicalize(&mut r);
    assert_eq!(r.contributions[0].rank, Some(2));
    assert_eq!(r.contributions[1].rank, None);
  }

  #[test]
  fn rank_ties_break_on_contributor_identifier() {
    let mut r = sample();
    r.contributions = vec![
      contribution(Some(1), "zzz"),
      contribution(Some(1), "aaa"),
    ];
    canonicalize(&mut r);
    let ids: Vec<_> = r
      .contributions
      .iter()
      .map(|c| c.contributor.source_identifier.clone().unwrap())
      .collect();
    assert_eq!(ids, ["aaa", "zzz"]);
  }

  #[test]
  fn affiliations_and_their_identifiers_are_sorted() {
    let mut r = sample();
    r.contributions = vec![Contribution {
      rank: Some(1),
      role: None,
      contributor: Contributor {
        source_identifier: Some("c1".to_owned()),
        name:              None,
      },
      affiliations: vec![
        Affiliation {
          source_identifier: "org-b".to_owned(),
          name:              None,
          identifiers:       vec![
            identifier("ror", "2"),
            identifier("ror", "1"),
            identifier("idref", "3"),
          ],
        },
        Affiliation {
          source_identifier: "org-a".to_owned(),
          name:              None,
          identifiers:       vec![],
        },
      ],
    }];
    canonicalize(&mut r);

    let affiliation_ids: Vec<_> = r.contributions[0]
      .affiliations
      .iter()
      .map(|a| a.source_identifier.as_str())
      .collect();
    assert_eq!(affiliation_ids, ["org-a", "org-b"]);

    let pairs: Vec<_> = r.contributions[0].affiliations[1]
      .identifiers
      .iter()
      .map(|i| (i.kind.as_str(), i.value.as_str()))
      .collect();
    assert_eq!(pairs, [("idref", "3"), ("ror", "1"), ("ror", "2")]);
  }

  #[test]
  fn canonicalization_is_idempotent() {
    let once = canonicalized(sample());
    let twice = canonicalized(once.clone());
    assert_eq!(once, twice);
  }

  #[test]
  fn canonicalization_is_order_invariant() {
    let canonical = canonicalized(sample());

    let mut shuffled = sample();
    shuffled.document_type.reverse();
    shuffled.contributions.reverse();
    shuffled.identifiers.reverse();
    assert_eq!(canonicalized(shuffled), canonical);
  }
}
