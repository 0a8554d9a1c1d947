// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use thalassa::activation::{activation_brackets, auto_correct, invariant_holds};
use thalassa::format::mermaid::{generate_sequence_diagram, parse_sequence_diagram, sanitize_markup};
use thalassa::grid::project_grid;
use thalassa::model::SequenceModel;
use thalassa::ops::{apply_grid_op, GridOp};

// Benchmark identity (keep stable):
// - Groups: `sync.parse`, `sync.generate`, `sync.grid`, `sync.activation`, `sync.ops`.
// - Case IDs (`small`, `medium`, `large`) must not be renamed so results stay comparable.
const CASES: [(&str, usize, usize); 3] = [("small", 3, 12), ("medium", 8, 120), ("large", 16, 1200)];

// Call/return pairs with activations, a note every seventh row, and some over-dashed arrows.
fn fixture_text(participants: usize, messages: usize) -> String {
    let mut out = String::from("sequenceDiagram\n    autonumber\n");
    for p in 0..participants {
        let _ = writeln!(out, "    participant P{p} as \"Lane {p}\"");
    }
    for m in 0..messages {
        let from = m % participants;
        let to = (m + 1) % participants;
        if m % 7 == 6 {
            let _ = writeln!(out, "    Note over P{from}: checkpoint {m}");
        } else if m % 2 == 0 {
            let arrow = if m % 5 == 0 { "---->>" } else { "->>" };
            let _ = writeln!(out, "    P{from}{arrow}+P{to}: request {m}");
        } else {
            let _ = writeln!(out, "    P{from}-->>-P{to}: reply {m}");
        }
    }
    out
}

fn fixture_model(participants: usize, messages: usize) -> SequenceModel {
    parse_sequence_diagram(&sanitize_markup(&fixture_text(participants, messages)))
}

fn benches_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync.parse");
    for (case_id, participants, messages) in CASES {
        let text = fixture_text(participants, messages);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(case_id, move |b| {
            b.iter(|| {
                let model = parse_sequence_diagram(&sanitize_markup(black_box(&text)));
                black_box(model.items().len())
            })
        });
    }
    group.finish();
}

fn benches_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync.generate");
    for (case_id, participants, messages) in CASES {
        let model = fixture_model(participants, messages);
        group.throughput(Throughput::Elements(model.items().len() as u64));
        group.bench_function(case_id, move |b| {
            b.iter(|| black_box(generate_sequence_diagram(black_box(&model)).len()))
        });
    }
    group.finish();
}

fn benches_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync.grid");
    for (case_id, participants, messages) in CASES {
        let model = fixture_model(participants, messages);
        group.throughput(Throughput::Elements(model.items().len() as u64));
        group.bench_function(case_id, move |b| {
            b.iter(|| black_box(project_grid(black_box(&model)).rows.len()))
        });
    }
    group.finish();
}

fn benches_activation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync.activation");
    for (case_id, participants, messages) in CASES {
        let model = fixture_model(participants, messages);
        group.throughput(Throughput::Elements(model.items().len() as u64));
        group.bench_function(case_id, move |b| {
            b.iter(|| {
                let mut working = black_box(&model).clone();
                let changed = auto_correct(&mut working);
                black_box((changed, invariant_holds(&working), activation_brackets(&working).len()))
            })
        });
    }
    group.finish();
}

fn benches_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync.ops");
    for (case_id, participants, messages) in CASES {
        let model = fixture_model(participants, messages);
        group.bench_function(case_id, move |b| {
            b.iter(|| {
                let mut working = black_box(&model).clone();
                let outcome = apply_grid_op(&mut working, &GridOp::RemoveItem { index: 0 })
                    .expect("remove first row");
                black_box((outcome, generate_sequence_diagram(&working).len()))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benches_parse,
    benches_generate,
    benches_grid,
    benches_activation,
    benches_ops
);
criterion_main!(benches);
