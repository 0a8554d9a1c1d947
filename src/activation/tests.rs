// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use super::{
    activation_brackets, auto_correct, brackets_at, can_apply_override, first_violation,
    invariant_holds, is_active_at, ActivationBracket, ActivationOverride, ActivationViolation,
};
use crate::model::{
    Activation, ArrowKind, DiagramConfig, Item, MessageItem, NoteItem, NotePosition, Participant,
    ParticipantKind, SequenceModel,
};

const ACTIVATE: Activation = Activation { activate: true, deactivate: false };
const DEACTIVATE: Activation = Activation { activate: false, deactivate: true };
const BOTH: Activation = Activation { activate: true, deactivate: true };

fn msg(source: &str, target: &str, activation: Activation) -> Item {
    MessageItem::new(source, target, ArrowKind::SolidArrow, format!("{source}->{target}"))
        .with_activation(activation)
        .into()
}

fn note(target: &str) -> Item {
    NoteItem::new(NotePosition::Over, target, "note").into()
}

fn model(items: Vec<Item>) -> SequenceModel {
    SequenceModel::new(
        ["A", "B", "C"]
            .into_iter()
            .map(|id| Participant::new(id, id, ParticipantKind::Participant))
            .collect(),
        items,
        DiagramConfig::default(),
    )
}

fn activation_at(model: &SequenceModel, row: usize) -> Activation {
    model.items()[row].as_message().expect("message row").activation()
}

/// call/return pair: `A ->> +B` then `B -->> -A`.
#[fixture]
fn call_and_return() -> SequenceModel {
    model(vec![msg("A", "B", ACTIVATE), msg("B", "A", DEACTIVATE)])
}

#[rstest]
fn return_after_call_is_valid(call_and_return: SequenceModel) {
    assert!(is_active_at(&call_and_return, 1, "B"));
    assert!(!is_active_at(&call_and_return, 0, "B"));
    assert!(!is_active_at(&call_and_return, 1, "A"));
    assert!(!is_active_at(&call_and_return, 2, "B"));
    assert!(invariant_holds(&call_and_return));
}

#[rstest]
fn deleting_the_call_clears_the_orphaned_return(mut call_and_return: SequenceModel) {
    call_and_return.items_mut().remove(0);
    assert_eq!(
        first_violation(&call_and_return),
        Some(ActivationViolation { row: 0, participant: "B".into() })
    );

    assert!(auto_correct(&mut call_and_return));
    assert_eq!(activation_at(&call_and_return, 0), Activation::NONE);
    assert!(invariant_holds(&call_and_return));
}

#[rstest]
fn disabling_an_activate_that_a_later_deactivate_needs_is_unsafe(call_and_return: SequenceModel) {
    assert!(!can_apply_override(&call_and_return, 0, ActivationOverride::activate(false), "B"));
    // The stream of a participant the override does not touch stays balanced.
    assert!(can_apply_override(&call_and_return, 0, ActivationOverride::activate(false), "A"));
}

#[rstest]
fn disabling_the_deactivate_is_always_safe(call_and_return: SequenceModel) {
    assert!(can_apply_override(&call_and_return, 1, ActivationOverride::deactivate(false), "B"));
}

#[test]
fn later_deactivate_can_be_matched_by_another_activate() {
    let m = model(vec![
        msg("A", "B", ACTIVATE),
        msg("C", "B", ACTIVATE),
        msg("B", "A", DEACTIVATE),
    ]);
    assert!(can_apply_override(&m, 0, ActivationOverride::activate(false), "B"));
    assert!(can_apply_override(&m, 1, ActivationOverride::activate(false), "B"));
}

#[test]
fn enabling_deactivate_needs_an_open_activation() {
    let m = model(vec![msg("A", "B", Activation::NONE), msg("B", "A", Activation::NONE)]);
    assert!(!can_apply_override(&m, 1, ActivationOverride::deactivate(true), "B"));

    let m = model(vec![msg("A", "B", ACTIVATE), msg("B", "A", Activation::NONE)]);
    assert!(can_apply_override(&m, 1, ActivationOverride::deactivate(true), "B"));
}

#[test]
fn override_on_a_note_row_changes_nothing() {
    let m = model(vec![note("A"), msg("B", "A", DEACTIVATE)]);
    assert!(!can_apply_override(&m, 0, ActivationOverride::activate(true), "B"));
}

#[test]
fn deactivate_is_applied_before_activate_within_one_message() {
    let m = model(vec![msg("A", "A", BOTH)]);
    assert!(!invariant_holds(&m));

    let m = model(vec![msg("B", "A", ACTIVATE), msg("A", "A", BOTH), msg("A", "B", DEACTIVATE)]);
    assert!(invariant_holds(&m));
    assert!(is_active_at(&m, 2, "A"));
}

#[test]
fn notes_do_not_affect_balance() {
    let m = model(vec![msg("A", "B", ACTIVATE), note("B"), note("A,B"), msg("B", "A", DEACTIVATE)]);
    assert!(is_active_at(&m, 3, "B"));
    assert!(invariant_holds(&m));
}

#[test]
fn auto_correct_only_clears_deactivates() {
    let mut m = model(vec![
        msg("A", "B", ACTIVATE),
        msg("C", "A", DEACTIVATE),
        msg("B", "C", BOTH),
        msg("B", "A", DEACTIVATE),
    ]);

    assert!(auto_correct(&mut m));
    assert_eq!(activation_at(&m, 0), ACTIVATE);
    assert_eq!(activation_at(&m, 1), Activation::NONE);
    assert_eq!(activation_at(&m, 2), BOTH);
    assert_eq!(activation_at(&m, 3), Activation::NONE);
    assert!(!auto_correct(&mut m));
}

/// Every flag combination over a small sequence: auto_correct restores the invariant and is
/// idempotent.
#[test]
fn auto_correct_converges_for_every_flag_combination() {
    let endpoints = [("A", "B"), ("B", "A"), ("B", "C"), ("C", "B"), ("B", "B")];
    let flags = [Activation::NONE, ACTIVATE, DEACTIVATE, BOTH];

    let combos = flags.len().pow(endpoints.len() as u32);
    for mut combo in 0..combos {
        let items = endpoints
            .iter()
            .map(|(source, target)| {
                let activation = flags[combo % flags.len()];
                combo /= flags.len();
                msg(source, target, activation)
            })
            .collect();
        let mut m = model(items);
        let was_valid = invariant_holds(&m);

        let changed = auto_correct(&mut m);
        assert_eq!(changed, !was_valid);
        assert!(invariant_holds(&m), "{m:?}");
        assert!(!auto_correct(&mut m));
    }
}

#[test]
fn brackets_follow_a_single_stack() {
    let m = model(vec![
        msg("A", "B", ACTIVATE),
        note("B"),
        msg("B", "C", ACTIVATE),
        msg("C", "B", DEACTIVATE),
        msg("B", "A", DEACTIVATE),
        msg("A", "A", ACTIVATE),
    ]);

    let brackets = activation_brackets(&m);
    assert_eq!(
        brackets,
        vec![
            ActivationBracket { start: 2, end: 3, level: 1, closed: true },
            ActivationBracket { start: 0, end: 4, level: 0, closed: true },
            ActivationBracket { start: 5, end: 5, level: 0, closed: false },
        ]
    );

    assert_eq!(
        brackets_at(&brackets, 3),
        vec![
            ActivationBracket { start: 0, end: 4, level: 0, closed: true },
            ActivationBracket { start: 2, end: 3, level: 1, closed: true },
        ]
    );
    assert_eq!(brackets_at(&brackets, 1).len(), 1);
    assert!(brackets_at(&brackets, 5).is_empty());
}

#[test]
fn unmatched_deactivate_does_not_open_or_close_a_bracket() {
    let m = model(vec![msg("B", "A", DEACTIVATE), msg("A", "B", ACTIVATE)]);
    assert_eq!(
        activation_brackets(&m),
        vec![ActivationBracket { start: 1, end: 1, level: 0, closed: false }]
    );
    assert!(activation_brackets(&model(Vec::new())).is_empty());
}
