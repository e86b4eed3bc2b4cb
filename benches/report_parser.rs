//! Benchmark for lsvg/lslv report parsing and action planning

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lvol_reconciler::{parse_logical_volume, parse_volume_group, plan, DesiredState};

const LSVG: &str = "\
VOLUME GROUP:       datavg                   VG IDENTIFIER:  00f6f5d000004c000000016d3c3e0a3d
VG STATE:           active                   PP SIZE:        64 megabyte(s)
VG PERMISSION:      read/write               TOTAL PPs:      1599 (102336 megabytes)
MAX LVs:            256                      FREE PPs:       1023 (65472 megabytes)
LVs:                4                        USED PPs:       576 (36864 megabytes)
OPEN LVs:           4                        QUORUM:         2 (Enabled)
TOTAL PVs:          1                        VG DESCRIPTORS: 2
STALE PVs:          0                        STALE PPs:      0
ACTIVE PVs:         1                        AUTO ON:        yes
";

const LSLV: &str = "\
LOGICAL VOLUME:     applv                  VOLUME GROUP:   datavg
LV IDENTIFIER:      00f6f5d000004c000000016d3c3e0a3d.2 PERMISSION:     read/write
VG STATE:           active/complete        LV STATE:       opened/syncd
TYPE:               jfs2                   WRITE VERIFY:   off
MAX LPs:            512                    PP SIZE:        64 megabyte(s)
COPIES:             1                      SCHED POLICY:   parallel
LPs:                160                    PPs:            160
STALE PPs:          0                      BB POLICY:      relocatable
INTER-POLICY:       maximum                RELOCATABLE:    yes
INTRA-POLICY:       middle                 UPPER BOUND:    32
MOUNT POINT:        /app                   LABEL:          /app
";

fn bench_parse_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_parser");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_volume_group", |b| {
        b.iter(|| parse_volume_group(black_box(LSVG)))
    });

    group.bench_function("parse_logical_volume", |b| {
        b.iter(|| parse_logical_volume(black_box(LSLV)))
    });

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(1));

    let vg = parse_volume_group(LSVG).ok().flatten();
    let lv = parse_logical_volume(LSLV).ok().flatten();
    let mut desired = DesiredState::new("datavg", "applv");
    desired.size = Some("20G".into());

    if let Some(vg) = vg {
        group.bench_function("plan_resize", |b| {
            b.iter(|| plan(black_box(&desired), &vg, lv.as_ref()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_reports, bench_plan);
criterion_main!(benches);
