use criterion::{black_box, criterion_group, criterion_main, Criterion};
use election_map::color::margin_color;
use election_map::election::aggregate::{derive_result, filter_candidates, AggregationPolicy, Tally};
use election_map::election::{Party, Winner};
use election_map::map::{Layer, Polygon, Region};
use election_map::geo::CountyFips;
use glam::DVec2;

fn bench_margin_color(c: &mut Criterion) {
    c.bench_function("margin_color sweep", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for m in -500..=500 {
                let winner = if m > 0 { Winner::Dem } else { Winner::Rep };
                acc += margin_color(Some(black_box(m as f64 / 10.0)), Some(winner)).r as u32;
            }
            acc
        })
    });
}

fn bench_derive_result(c: &mut Criterion) {
    let policy = AggregationPolicy::default();
    let rows = vec![
        Tally::new("DINA TITUS", Party::Dem, 191_304),
        Tally::new("MARK ROBERTSON", Party::Rep, 162_755),
        Tally::new("KEN CAVANAUGH", Party::Lib, 7_000),
        Tally::new("UNDERVOTES", Party::Other(String::new()), 4_000),
        Tally::new("SCATTERING", Party::Other(String::new()), 600),
    ];
    c.bench_function("filter + derive_result", |b| {
        b.iter(|| {
            let tallies = filter_candidates(black_box(rows.clone()), &policy);
            derive_result(&tallies, 365_659, &policy)
        })
    });
}

fn bench_hit_test(c: &mut Criterion) {
    // 50x50 grid of one-degree county squares
    let regions: Vec<Region<CountyFips>> = (0..2500u32)
        .filter_map(|i| {
            let x = -125.0 + (i % 50) as f64;
            let y = 24.0 + (i / 50) as f64 * 0.5;
            let exterior = vec![
                DVec2::new(x, y),
                DVec2::new(x + 1.0, y),
                DVec2::new(x + 1.0, y + 0.5),
                DVec2::new(x, y + 0.5),
                DVec2::new(x, y),
            ];
            let fips = CountyFips::new(6000 + i)?;
            Some(Region::new(fips, format!("c{i}"), vec![Polygon { exterior, holes: Vec::new() }]))
        })
        .collect();
    let layer = Layer::new(regions);

    c.bench_function("county hit test", |b| {
        b.iter(|| layer.hit(black_box(-100.3), black_box(30.2), |_| true).map(|r| r.key))
    });
}

criterion_group!(benches, bench_margin_color, bench_derive_result, bench_hit_test);
criterion_main!(benches);
