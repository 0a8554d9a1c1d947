// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cross-highlighting between rendered message labels and grid rows.
//!
//! The renderer's element order is not trusted: elements are ranked by vertical position and
//! the k-th ranked element is paired with the k-th message item.

use serde::{Deserialize, Serialize};

use crate::model::SequenceModel;

/// A rendered message label, as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub top: f64,
}

/// Indices into `elements`, ordered top to bottom. Ties keep reported order.
fn visual_order(elements: &[VisualElement]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..elements.len()).collect();
    order.sort_by(|&a, &b| elements[a].top.total_cmp(&elements[b].top));
    order
}

/// Item index for a click on `elements[visual_index]`.
pub fn item_for_visual(
    model: &SequenceModel,
    visual_index: usize,
    elements: &[VisualElement],
) -> Option<usize> {
    let rank = visual_order(elements).iter().position(|&idx| idx == visual_index)?;
    model.item_index_of_message(rank)
}

/// Which of `elements` to highlight for the item at `item_index` (`None` for notes).
pub fn visual_for_item(
    model: &SequenceModel,
    item_index: usize,
    elements: &[VisualElement],
) -> Option<usize> {
    let rank = model.message_ordinal(item_index)?;
    visual_order(elements).get(rank).copied()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{item_for_visual, visual_for_item, VisualElement};
    use crate::format::mermaid::parse_sequence_diagram;

    const WITH_NOTE: &str = "A->>B: one\nNote over A: aside\nB->>A: two\nA->>B: three";

    fn elements(tops: &[f64]) -> Vec<VisualElement> {
        tops.iter().map(|&top| VisualElement { top }).collect()
    }

    #[rstest]
    #[case(0, Some(0))]
    #[case(1, Some(2))]
    #[case(2, Some(3))]
    #[case(3, None)]
    fn in_order_elements_skip_notes(#[case] visual: usize, #[case] item: Option<usize>) {
        let model = parse_sequence_diagram(WITH_NOTE);
        assert_eq!(item_for_visual(&model, visual, &elements(&[10.0, 40.0, 70.0])), item);
    }

    #[test]
    fn elements_are_ranked_by_vertical_position() {
        let model = parse_sequence_diagram(WITH_NOTE);
        // Reported order: "three", "one", "two".
        let shuffled = elements(&[70.0, 10.0, 40.0]);

        assert_eq!(item_for_visual(&model, 0, &shuffled), Some(3));
        assert_eq!(item_for_visual(&model, 1, &shuffled), Some(0));
        assert_eq!(visual_for_item(&model, 2, &shuffled), Some(2));
        assert_eq!(visual_for_item(&model, 3, &shuffled), Some(0));
    }

    #[test]
    fn notes_and_missing_elements_have_no_visual() {
        let model = parse_sequence_diagram(WITH_NOTE);
        assert_eq!(visual_for_item(&model, 1, &elements(&[1.0, 2.0, 3.0])), None);
        assert_eq!(visual_for_item(&model, 3, &elements(&[1.0])), None);
        assert_eq!(item_for_visual(&model, 0, &[]), None);
    }
}
