// Criterion benchmarks for Seba Match

use chrono::{NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seba_match::core::{compute_stats, distance::haversine_distance, scoring::{skill_score, skill_set}, Matcher};
use seba_match::models::{
    BookingStatus, BookingWindow, CareRequest, CaregiverRecord, Commitment, Gender, GenderPreference, GeoPoint,
    Origin,
};

const SERVICES: [&str; 8] = [
    "Diabetes Care",
    "Blood Pressure Monitoring",
    "Dementia Care",
    "Palliative Care",
    "Post-Surgery Care",
    "Mobility Assistance",
    "Nursing",
    "Companionship",
];

fn create_candidate(id: usize, lat: f64, lon: f64) -> CaregiverRecord {
    let date = NaiveDate::from_ymd_opt(2025, 11, 22).unwrap();

    CaregiverRecord {
        id: format!("cg-{}", id),
        name: format!("Caregiver {}", id),
        name_bn: None,
        location: Some(GeoPoint::new(lat, lon)),
        skills: SERVICES.iter().skip(id % 5).take(2 + id % 3).map(|s| s.to_string()).collect(),
        rating: 3.0 + (id % 20) as f64 / 10.0,
        review_count: (id % 120) as u32,
        experience_years: (id % 25) as u32,
        gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
        hourly_rate: 200.0 + (id % 10) as f64 * 25.0,
        area: Some(if id % 4 == 0 { "Mirpur" } else { "Gulshan" }.to_string()),
        district: Some("Dhaka".to_string()),
        phone: None,
        email: None,
        commitments: (0..id % 3)
            .map(|k| Commitment {
                booking_date: date,
                start_time: NaiveTime::from_hms_opt(8 + 3 * k as u32, 0, 0).unwrap(),
                duration_hours: 2.0,
                status: BookingStatus::Confirmed,
            })
            .collect(),
    }
}

fn create_request() -> CareRequest {
    CareRequest {
        origin: Origin::Point(GeoPoint::new(23.7639, 90.3709)),
        required_skills: ["Diabetes Care", "Companionship", "Medication Management"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        preferred_gender: Some(GenderPreference::Female),
        preferred_area: Some("Mirpur".to_string()),
        booking_window: BookingWindow {
            date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            duration_hours: 4.0,
        },
        top_n: 5,
        require_candidates: false,
    }
}

fn create_pool(count: usize) -> Vec<CaregiverRecord> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.0007) % 0.2;
            let lon_offset = (i as f64 * 0.0011) % 0.2;
            create_candidate(i, 23.70 + lat_offset, 90.33 + lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(23.7639),
                black_box(90.3709),
                black_box(23.8759),
                black_box(90.3795),
            )
        });
    });
}

fn bench_skill_score(c: &mut Criterion) {
    let required = skill_set(["Diabetes Care", "Companionship", "Medication Management"]);
    let offered: Vec<String> = SERVICES.iter().take(5).map(|s| s.to_string()).collect();

    c.bench_function("skill_score", |b| {
        b.iter(|| skill_score(black_box(&required), black_box(&offered), 25.0));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_weights();
    let request = create_request();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let pool = create_pool(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| matcher.find_matches(black_box(&request), black_box(&pool)));
            },
        );
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let pool = create_pool(1000);

    c.bench_function("compute_stats_1000_caregivers", |b| {
        b.iter(|| compute_stats(black_box(&pool)));
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_skill_score,
    bench_matching,
    bench_stats
);

criterion_main!(benches);
