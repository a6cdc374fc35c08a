//! Line grouping and variation selection
//!
//! A conversation's flat line list is partitioned by `part`; one variation per
//! part is selected, and the active sequence is recomputed from scratch
//! whenever the lines or the selection change.

use convo_common::ConversationLine;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lines partitioned by part number, each group in dataset order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGroups {
    parts: BTreeMap<u32, Vec<ConversationLine>>,
}

impl LineGroups {
    /// Lines of `part`, in dataset order
    pub fn get(&self, part: u32) -> Option<&[ConversationLine]> {
        self.parts.get(&part).map(Vec::as_slice)
    }

    /// Part numbers, ascending
    pub fn parts(&self) -> impl Iterator<Item = u32> + '_ {
        self.parts.keys().copied()
    }

    /// `(part, lines)` pairs, ascending by part
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[ConversationLine])> + '_ {
        self.parts.iter().map(|(part, lines)| (*part, lines.as_slice()))
    }

    /// Whether a line with this `(part, variation)` exists
    pub fn contains(&self, part: u32, variation: u32) -> bool {
        self.parts
            .get(&part)
            .is_some_and(|lines| lines.iter().any(|l| l.variation == variation))
    }

    /// Distinct variation numbers of `part`, first-seen order
    pub fn variations_for(&self, part: u32) -> Vec<u32> {
        let mut variations = Vec::new();
        for line in self.parts.get(&part).into_iter().flatten() {
            if !variations.contains(&line.variation) {
                variations.push(line.variation);
            }
        }
        variations
    }

    /// Number of distinct parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of lines across all parts
    pub fn total_lines(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }
}

/// Partition lines by part, preserving insertion order within each part
pub fn group_by_part(lines: &[ConversationLine]) -> LineGroups {
    let mut parts: BTreeMap<u32, Vec<ConversationLine>> = BTreeMap::new();
    for line in lines {
        parts.entry(line.part).or_default().push(line.clone());
    }
    LineGroups { parts }
}

/// Chosen variation per part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariationSelection {
    chosen: BTreeMap<u32, u32>,
}

impl VariationSelection {
    pub fn get(&self, part: u32) -> Option<u32> {
        self.chosen.get(&part).copied()
    }

    /// Select `variation` for `part`.
    ///
    /// Returns false, leaving the selection untouched, when the pair does
    /// not exist in `groups`.
    pub fn set_variation(&mut self, groups: &LineGroups, part: u32, variation: u32) -> bool {
        if !groups.contains(part, variation) {
            return false;
        }
        self.chosen.insert(part, variation);
        true
    }

    /// `(part, variation)` pairs, ascending by part
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.chosen.iter().map(|(p, v)| (*p, *v))
    }
}

/// Default selection: the variation of the first line seen for each part.
///
/// First seen wins, which is not necessarily the lowest variation number.
pub fn default_selection(groups: &LineGroups) -> VariationSelection {
    let chosen = groups
        .iter()
        .filter_map(|(part, lines)| lines.first().map(|line| (part, line.variation)))
        .collect();
    VariationSelection { chosen }
}

/// Lines matching the selection, ascending by part, at most one per part
pub fn active_sequence(
    lines: &[ConversationLine],
    selection: &VariationSelection,
) -> Vec<ConversationLine> {
    let mut active: Vec<ConversationLine> = lines
        .iter()
        .filter(|line| selection.get(line.part) == Some(line.variation))
        .cloned()
        .collect();

    // Stable: duplicate (part, variation) entries keep the first one
    active.sort_by_key(|line| line.part);
    active.dedup_by_key(|line| line.part);
    active
}
