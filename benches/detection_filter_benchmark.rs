use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use personcrop::crop;
use personcrop::detector::{BBox, Detection};
use personcrop::filter;

// Spread of classes, confidences, and partially out-of-frame boxes so the
// filter exercises every branch.
fn mock_detections(count: usize) -> Vec<Detection> {
    (0..count)
        .map(|i| {
            let offset = (i % 16) as f32 * 120.0 - 60.0;
            Detection {
                class_id: i % 3,
                confidence: 0.30 + (i % 7) as f32 * 0.10,
                bbox: BBox::new(offset, 40.0, offset + 90.0, 340.0),
            }
        })
        .collect()
}

fn benchmark_detection_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection_filter");

    for detection_count in [1, 10, 50, 200].iter() {
        let detections = mock_detections(*detection_count);

        group.bench_with_input(
            BenchmarkId::new("filter_detections", detection_count),
            &detections,
            |b, detections| {
                b.iter(|| {
                    let survivors = filter::filter_detections(
                        black_box(detections),
                        black_box(0),
                        black_box(0.5),
                        black_box(1920.0),
                        black_box(1080.0),
                    );
                    black_box(survivors)
                })
            },
        );
    }

    group.finish();
}

fn benchmark_crop_filename(c: &mut Criterion) {
    c.bench_function("crop_filename", |b| {
        b.iter(|| {
            let name = crop::crop_filename(black_box(123456), black_box(4), black_box(0.87));
            black_box(name)
        })
    });
}

criterion_group!(benches, benchmark_detection_filter, benchmark_crop_filename);
criterion_main!(benches);
