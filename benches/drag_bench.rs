// Benchmarks for the per-frame drag path
// Measures preview recomputation and ordered-list key placement

use chrono::{Duration, Local, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use egui::Pos2;
use schedule_drag::drag::{
    ColumnLayout, DragSession, GestureMode, LabelClock, OrderedListPositioner, OriginVisual,
    SiblingKey, TimeGrid,
};
use schedule_drag::models::item::ScheduledItem;

fn bench_preview_frames(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    let start = Local.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
    let item = ScheduledItem::timed("Client call", start, start + Duration::hours(1))
        .unwrap()
        .with_id(1);
    let origin = OriginVisual {
        top_px: 540.0,
        height_px: 60.0,
        column_index: 3,
    };

    let mut group = c.benchmark_group("preview_frames");

    for frames in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(frames), frames, |b, &frames| {
            b.iter(|| {
                let mut session = DragSession::begin(
                    &item,
                    GestureMode::Move,
                    Pos2::new(350.0, 560.0),
                    origin,
                    ColumnLayout::new(700.0, 7),
                    TimeGrid::default(),
                )
                .unwrap();
                for frame in 0..frames {
                    let offset = frame as f32 * 0.7;
                    session.update(black_box(Pos2::new(350.0 + offset, 560.0 + offset)));
                    black_box(session.preview_state(LabelClock::TwentyFourHour));
                }
            });
        });
    }

    group.finish();
}

fn bench_positioner(c: &mut Criterion) {
    let mut group = c.benchmark_group("positioner_place");
    let positioner = OrderedListPositioner::default();

    for size in [10, 100, 1000].iter() {
        let siblings: Vec<SiblingKey> = (0..*size)
            .map(|i| SiblingKey::new(i as i64, i as f64))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &siblings, |b, siblings| {
            b.iter(|| positioner.place(black_box(siblings), black_box(siblings.len() / 2)));
        });
    }

    // Worst case: every insert lands in a crowded gap and renumbers the bucket
    let crowded: Vec<SiblingKey> = (0..1000)
        .map(|i| SiblingKey::new(i as i64, i as f64 * 1e-7))
        .collect();
    group.bench_function("renormalize_1000", |b| {
        b.iter(|| positioner.place(black_box(&crowded), black_box(500)));
    });

    group.finish();
}

criterion_group!(benches, bench_preview_frames, bench_positioner);
criterion_main!(benches);
