use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pollination_scorer::feature::SiteProperties;
use pollination_scorer::scoring::{pollination_chance, score_breakdown};
use serde_json::json;

fn sample_properties() -> SiteProperties {
    serde_json::from_value(json!({
        "siteId": 252455,
        "siteName": "ESCOLA MUNICIPAL CHICO MENDES:Site 1",
        "countryName": "Brazil",
        "elevation": 16.4,
        "landcoversNorthClassifications": "60% Trees, Closed Forest, Evergreen MUC 1, 40% Herbaceous MUC 43",
        "landcoversSouthClassifications": "100% Urban, Residential MUC 91",
        "landcoversEastClassifications": "25% Shrubland MUC 32, 75% Herbaceous, Tall Grass MUC 43",
        "landcoversWestClassifications": "garbage no pattern here"
    }))
    .expect("static sample properties")
}

fn bench_scoring(c: &mut Criterion) {
    let properties = sample_properties();

    c.bench_function("pollination_chance", |b| {
        b.iter(|| pollination_chance(black_box(&properties)))
    });

    c.bench_function("score_breakdown", |b| {
        b.iter(|| score_breakdown(black_box(&properties)))
    });
}

criterion_group!(benches, bench_scoring);
criterion_main!(benches);
