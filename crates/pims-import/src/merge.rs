//! Collapse candidates sharing an entry key down to the most complete one.

use indexmap::IndexMap;
use pims_core::{EntryCandidate, EntryKey};
use serde::Serialize;

/// Whether an incoming summary should displace the one already kept: a
/// non-empty summary beats an empty one, and a longer one beats a shorter
/// one. Ties keep the existing row.
pub fn prefer_incoming(existing: &str, incoming: &str) -> bool {
    if incoming.is_empty() {
        return false;
    }
    if existing.is_empty() {
        return true;
    }
    incoming.chars().count() > existing.chars().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeDecision {
    Inserted,
    Replaced,
    KeptExisting,
}

/// The candidate kept for one key, the row it came from, and every row that
/// collapsed onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSlot {
    pub candidate: EntryCandidate,
    pub winner_id: String,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EntryMerger {
    slots: IndexMap<EntryKey, MergeSlot>,
    merged: usize,
}

impl EntryMerger {
    /// Offer one row's candidate. The winner's content replaces the loser's
    /// as a whole; no field-by-field merge.
    pub fn offer(&mut self, source_id: &str, candidate: EntryCandidate) -> MergeDecision {
        match self.slots.get_mut(&candidate.key) {
            None => {
                self.slots.insert(
                    candidate.key.clone(),
                    MergeSlot {
                        candidate,
                        winner_id: source_id.to_string(),
                        member_ids: vec![source_id.to_string()],
                    },
                );
                MergeDecision::Inserted
            }
            Some(slot) => {
                self.merged += 1;
                slot.member_ids.push(source_id.to_string());
                if prefer_incoming(
                    &slot.candidate.content.summary,
                    &candidate.content.summary,
                ) {
                    slot.candidate = candidate;
                    slot.winner_id = source_id.to_string();
                    MergeDecision::Replaced
                } else {
                    MergeDecision::KeptExisting
                }
            }
        }
    }

    /// Number of offered rows that collapsed onto an existing key.
    pub fn merged(&self) -> usize {
        self.merged
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &MergeSlot> {
        self.slots.values()
    }

    pub fn get(&self, key: &EntryKey) -> Option<&MergeSlot> {
        self.slots.get(key)
    }
}

pub fn merge_candidates<I>(candidates: I) -> EntryMerger
where
    I: IntoIterator<Item = (String, EntryCandidate)>,
{
    candidates
        .into_iter()
        .fold(EntryMerger::default(), |mut acc, (source_id, candidate)| {
            acc.offer(&source_id, candidate);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pims_core::EntryContent;

    fn gala(summary: &str, source_link: &str, has_photos: bool) -> EntryCandidate {
        EntryCandidate {
            key: EntryKey {
                title: "Gala".into(),
                organization_id: Some(5),
                location_id: Some(2),
                date: NaiveDate::from_ymd_opt(2021, 6, 1),
            },
            content: EntryContent {
                summary: summary.into(),
                source_link: source_link.into(),
                has_photos,
                event_type: None,
            },
        }
    }

    #[test]
    fn summary_preference_rules() {
        assert!(prefer_incoming("", "text"));
        assert!(!prefer_incoming("text", ""));
        assert!(!prefer_incoming("", ""));
        assert!(prefer_incoming("short", "much longer"));
        assert!(!prefer_incoming("much longer", "short"));
        assert!(!prefer_incoming("same", "size"));
        assert!(prefer_incoming("abc", "éééé"));
    }

    #[test]
    fn non_empty_summary_wins_in_either_order() {
        let merged = merge_candidates(vec![
            ("10".to_string(), gala("", "a", false)),
            ("11".to_string(), gala("A full description", "b", false)),
        ]);
        let slot = merged.slots().next().expect("slot");
        assert_eq!(slot.winner_id, "11");
        assert_eq!(slot.member_ids, vec!["10", "11"]);

        let merged = merge_candidates(vec![
            ("11".to_string(), gala("A full description", "b", false)),
            ("10".to_string(), gala("", "a", false)),
        ]);
        let slot = merged.slots().next().expect("slot");
        assert_eq!(slot.winner_id, "11");
        assert_eq!(merged.merged(), 1);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn longer_summary_wins_and_ties_keep_first() {
        let mut merger = EntryMerger::default();
        assert_eq!(merger.offer("1", gala("short", "", false)), MergeDecision::Inserted);
        assert_eq!(
            merger.offer("2", gala("a longer summary", "", false)),
            MergeDecision::Replaced
        );
        assert_eq!(
            merger.offer("3", gala("same length sum.", "", false)),
            MergeDecision::KeptExisting
        );
        let slot = merger.slots().next().expect("slot");
        assert_eq!(slot.winner_id, "2");
        assert_eq!(slot.candidate.content.summary, "a longer summary");
    }

    #[test]
    fn losing_row_fields_are_discarded_even_when_winner_is_blank() {
        let merged = merge_candidates(vec![
            ("10".to_string(), gala("", "https://example.org/10", true)),
            ("11".to_string(), gala("A full description", "", false)),
        ]);
        let slot = merged.slots().next().expect("slot");
        assert_eq!(slot.candidate.content.source_link, "");
        assert!(!slot.candidate.content.has_photos);
    }

    #[test]
    fn distinct_keys_keep_separate_slots_in_first_seen_order() {
        let mut other = gala("x", "", false);
        other.key.date = None;
        let merged = merge_candidates(vec![
            ("1".to_string(), gala("x", "", false)),
            ("2".to_string(), other.clone()),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.merged(), 0);
        assert_eq!(merged.get(&other.key).map(|s| s.winner_id.as_str()), Some("2"));
    }
}
