// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for scan-target expansion and the keyword
// classification run on every probe answer.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use printsync_core::classify::{identify_color, is_printer_description, match_manufacturer};
use printsync_scan::expand_targets;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A /24, a full last-octet range, and a handful of single hosts: the shape
/// of a typical office target file.
fn bench_expand_targets(c: &mut Criterion) {
    let targets = [
        "192.168.1.0/24",
        "192.168.2.1-254",
        "10.0.0.5",
        "10.0.0.6",
        "10.0.0.7",
    ];

    c.bench_function("expand_targets (office mix, ~512 hosts)", |b| {
        b.iter(|| {
            let addresses = expand_targets(black_box(&targets));
            assert_eq!(addresses.len(), 511);
        });
    });

    let wide = ["10.20.0.0/16"];
    c.bench_function("expand_targets (/16)", |b| {
        b.iter(|| black_box(expand_targets(black_box(&wide))));
    });
}

/// Classification of realistic sysDescr and supply strings.
fn bench_classification(c: &mut Criterion) {
    let descriptions = [
        "HP ETHERNET MULTI-ENVIRONMENT,ROM none,JETDIRECT,JD153",
        "Linux gw 5.15.0-91-generic #101-Ubuntu SMP x86_64",
        "FUJI XEROX DocuCentre-VI C2271",
        "Cisco IOS Software, C2960 Software",
    ];
    let supplies = [
        "Black Toner Cartridge HP CF410A",
        "Toner BK",
        "Waste Toner Box",
        "Cyan Drum Unit",
    ];

    c.bench_function("is_printer_description (4 strings)", |b| {
        b.iter(|| {
            for d in &descriptions {
                black_box(is_printer_description(black_box(d)));
            }
        });
    });

    c.bench_function("identify_color (4 supplies)", |b| {
        b.iter(|| {
            for s in &supplies {
                black_box(identify_color(black_box(s)));
            }
        });
    });

    c.bench_function("match_manufacturer (4 strings)", |b| {
        b.iter(|| {
            for d in &descriptions {
                black_box(match_manufacturer(black_box(d)));
            }
        });
    });
}

criterion_group!(benches, bench_expand_targets, bench_classification);
criterion_main!(benches);
