use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use celltrack::{
    extract_regions, gradient_magnitude, nearest_region, segment_frame, Frame, Region,
    SegmentConfig, SeedPoint, Tracker,
};

/// Dark cells with bright halos scattered over a noisy mid-gray field.
fn make_cell_field(width: u32, height: u32, n_cells: usize, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::from_fn(width, height, |_, _| {
        Luma([(128i32 + rng.gen_range(-6..=6)) as u8])
    });

    for _ in 0..n_cells {
        let cx = rng.gen_range(12.0f32..(width as f32 - 12.0));
        let cy = rng.gen_range(12.0f32..(height as f32 - 12.0));
        let body = rng.gen_range(5.0f32..8.0);
        let halo = body + 2.0;
        let x0 = (cx - halo - 1.0).floor().max(0.0) as u32;
        let x1 = (cx + halo + 1.0).ceil().min((width - 1) as f32) as u32;
        let y0 = (cy - halo - 1.0).floor().max(0.0) as u32;
        let y1 = (cy + halo + 1.0).ceil().min((height - 1) as f32) as u32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if d <= body {
                    img.put_pixel(x, y, Luma([50]));
                } else if d <= halo {
                    img.put_pixel(x, y, Luma([230]));
                }
            }
        }
    }
    img
}

fn segment_config() -> SegmentConfig {
    SegmentConfig {
        edge_threshold_factor: 0.5,
        first_dilation_radius: 5,
        first_erosion_radius: 2,
        halo_brightness_threshold: 200,
        second_dilation_radius: 5,
        second_erosion_radius: 2,
        min_region_area: 20,
    }
}

fn random_regions(n: usize, seed: u64) -> Vec<Region> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| Region {
            label: i as u32 + 1,
            area: rng.gen_range(80..400),
            centroid: [rng.gen_range(0.0..1024.0), rng.gen_range(0.0..1024.0)],
        })
        .collect()
}

fn bench_segmentation(c: &mut Criterion) {
    let cfg = segment_config();
    let frame_512 = Frame::from_gray8(1, &make_cell_field(512, 512, 60, 7));
    let frame_1024 = Frame::from_gray8(1, &make_cell_field(1024, 1024, 240, 9));

    c.bench_function("gradient_magnitude_1024", |b| {
        b.iter(|| black_box(gradient_magnitude(black_box(&frame_1024)).len()))
    });

    c.bench_function("segment_512", |b| {
        b.iter(|| {
            let mask = segment_frame(black_box(&frame_512), black_box(&cfg));
            black_box(extract_regions(&mask).len())
        })
    });

    c.bench_function("segment_1024", |b| {
        b.iter(|| {
            let mask = segment_frame(black_box(&frame_1024), black_box(&cfg));
            black_box(extract_regions(&mask).len())
        })
    });
}

fn bench_tracking(c: &mut Criterion) {
    let regions = random_regions(500, 3);
    let next = random_regions(500, 4);
    let mut rng = StdRng::seed_from_u64(5);
    let seeds: Vec<SeedPoint> = (0..100)
        .map(|_| SeedPoint::new(rng.gen_range(0.0..1024.0), rng.gen_range(0.0..1024.0)))
        .collect();

    c.bench_function("nearest_region_500", |b| {
        b.iter(|| {
            let point = black_box([512.0, 300.0]);
            black_box(nearest_region(point, black_box(regions.as_slice())))
        })
    });

    c.bench_function("advance_100_tracks_500_regions", |b| {
        b.iter(|| {
            let mut tracker = Tracker::initialize(&regions, &seeds, (1024, 1024))
                .expect("fixture seeds are in bounds");
            tracker
                .advance(black_box(next.as_slice()))
                .expect("fixture frame has regions");
            black_box(tracker.frames_processed())
        })
    });
}

criterion_group!(hotpaths, bench_segmentation, bench_tracking);
criterion_main!(hotpaths);
