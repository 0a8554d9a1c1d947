// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use thalassa::activation::{
    auto_correct, can_apply_override, first_violation, invariant_holds, is_active_at,
    ActivationOverride,
};
use thalassa::config::EditorConfig;
use thalassa::format::mermaid::{
    generate_sequence_diagram, parse_sequence_diagram, parse_sequence_diagram_with_report,
    sanitize_markup,
};
use thalassa::grid::{project_grid, HINT_ACTIVATE_REQUIRED};
use thalassa::model::{
    ArrowKind, DiagramConfig, Participant, ParticipantKind, SequenceModel,
};
use thalassa::ops::{apply_grid_op, GridOp, MessagePatch};
use thalassa::store::{MemoryBackend, Repository};
use thalassa::sync::SyncController;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("editor_flow")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
}

#[test]
fn declared_participants_and_a_message_parse() {
    let model = parse_sequence_diagram(
        "sequenceDiagram\nparticipant A as Alice\nparticipant B as Bob\nA->>B: Hello",
    );

    let names: Vec<(&str, &str)> =
        model.participants().iter().map(|p| (p.id().as_str(), p.name())).collect();
    assert_eq!(names, vec![("A", "Alice"), ("B", "Bob")]);

    assert_eq!(model.items().len(), 1);
    let message = model.items()[0].as_message().expect("message");
    assert_eq!(message.source().as_str(), "A");
    assert_eq!(message.target().as_str(), "B");
    assert_eq!(message.arrow_kind(), ArrowKind::SolidArrow);
    assert_eq!(message.content(), "Hello");
}

#[test]
fn over_dashed_arrows_are_collapsed() {
    assert_eq!(sanitize_markup("A---->>B: hi"), "A-->>B: hi");
}

#[test]
fn removing_an_opener_clears_the_dependent_deactivate() {
    let mut model = parse_sequence_diagram("A->>+B: call\nB-->>-A: done");
    assert!(invariant_holds(&model));
    assert!(is_active_at(&model, 1, "B"));

    let outcome = apply_grid_op(&mut model, &GridOp::RemoveItem { index: 0 }).expect("apply");
    assert!(outcome.autocorrected);
    let survivor = model.items()[0].as_message().expect("message");
    assert!(!survivor.activation().deactivate);
    assert!(invariant_holds(&model));
}

#[test]
fn aliases_with_spaces_are_quoted() {
    let model = SequenceModel::new(
        vec![Participant::new("U", "Ana Lopez", ParticipantKind::Participant)],
        Vec::new(),
        DiagramConfig::default(),
    );
    let text = generate_sequence_diagram(&model);
    assert!(text.contains("    participant U as \"Ana Lopez\"\n"), "{text}");
}

#[test]
fn an_activate_needed_later_cannot_be_cleared() {
    let model = parse_sequence_diagram("A->>+B: call\nB-->>-A: done");
    assert!(!can_apply_override(&model, 0, ActivationOverride::activate(false), "B"));
    assert!(can_apply_override(&model, 1, ActivationOverride::deactivate(false), "B"));
}

#[test]
fn checkout_fixture_survives_text_grid_text() {
    let src = read_fixture("checkout.mmd");
    let model = parse_sequence_diagram(&sanitize_markup(&src));

    assert_eq!(model.participants().len(), 3);
    assert_eq!(model.participants()[1].name(), "Shop Server");
    assert_eq!(model.participants()[2].kind(), ParticipantKind::Actor);
    assert_eq!(model.items().len(), 5);
    assert!(invariant_holds(&model));

    let grid = project_grid(&model);
    assert_eq!(grid.rows.len(), 5);
    let opener = grid.rows[0].as_message().expect("message row");
    assert!(opener.activate.active);
    assert!(!opener.activate.enabled);
    assert_eq!(opener.activate.hint, HINT_ACTIVATE_REQUIRED);

    let text = generate_sequence_diagram(&model);
    assert!(text.contains("    participant S as \"Shop Server\"\n"), "{text}");
    assert!(text.contains("    actor P as Payments\n"), "{text}");
    assert!(text.contains("    S -->> +P: charge\n"), "{text}");
    assert_eq!(parse_sequence_diagram(&text), model);
    assert_eq!(generate_sequence_diagram(&parse_sequence_diagram(&text)), text);
}

#[test]
fn grid_edits_keep_the_checkout_balanced() {
    let mut model = parse_sequence_diagram(&sanitize_markup(&read_fixture("checkout.mmd")));

    let outcome = apply_grid_op(&mut model, &GridOp::RemoveItem { index: 0 }).expect("apply");
    assert!(outcome.autocorrected);
    assert!(invariant_holds(&model));

    apply_grid_op(
        &mut model,
        &GridOp::UpdateMessage {
            index: 0,
            patch: MessagePatch { content: Some("charge card".to_owned()), ..MessagePatch::default() },
        },
    )
    .expect("apply");
    let text = generate_sequence_diagram(&model);
    assert!(text.contains("    S -->> +P: charge card\n"), "{text}");
    assert!(!text.contains("-C:"), "{text}");
}

#[test]
fn messy_fixture_reports_skips_and_can_be_repaired() {
    let src = read_fixture("messy.mmd");
    let report = parse_sequence_diagram_with_report(&sanitize_markup(&src));

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line_no, 5);
    let mut model = report.model;
    assert!(model.config().autonumber);
    let contents: Vec<&str> =
        model.messages().map(|message| message.content()).collect();
    assert_eq!(contents, vec!["hello", "unmatched close"]);

    let violation = first_violation(&model).expect("unmatched deactivate");
    assert_eq!(violation.row, 1);
    assert_eq!(violation.participant.as_str(), "B");
    assert!(auto_correct(&mut model));
    assert!(invariant_holds(&model));
    assert!(!auto_correct(&mut model));
}

#[test]
fn edits_saved_through_the_controller_reload_identically() {
    let repo = Repository::new(MemoryBackend::new());
    let mut editor = SyncController::new(EditorConfig::default(), &read_fixture("checkout.mmd"));
    editor.apply_grid_op(&GridOp::SetAutonumber { enabled: true }).expect("apply");
    let id = editor.save(&repo, None, "Ana", "Checkout").expect("saved");

    let mut reopened = SyncController::new_diagram(EditorConfig::default());
    reopened.open(&repo, &id).expect("opened");
    assert_eq!(reopened.text(), editor.text());
    assert_eq!(reopened.model(), editor.model());
    assert_eq!(repo.list_versions(&id).expect("versions")[0].note, "Initial creation");
}
