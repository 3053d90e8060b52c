//! Offline performance benchmarks - no live network access, unlike the
//! teacher's version which benched against real DNS servers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use esd_core::dictionary::{expand_dictionary, expand_template};
use esd_core::scheduler::run_bounded;
use esd_core::similarity::real_quick_ratio;
use std::time::Duration;

fn bench_template_expansion(c: &mut Criterion) {
    c.bench_function("expand_template_two_letters", |b| {
        b.iter(|| black_box(expand_template("srv{letter}{letter}")));
    });

    c.bench_function("expand_dictionary_mixed_templates", |b| {
        let templates = vec!["www", "mail", "srv{number}", "{letter}{letter}"];
        b.iter(|| black_box(expand_dictionary(templates.clone())));
    });
}

fn bench_real_quick_ratio(c: &mut Criterion) {
    let page_a = "<html><body>Welcome to our parked domain landing page</body></html>".repeat(20);
    let page_b = "<html><body>Welcome to our parked domain landing zone</body></html>".repeat(20);

    c.bench_function("real_quick_ratio_similar_pages", |b| {
        b.iter(|| black_box(real_quick_ratio(&page_a, &page_b)));
    });
}

fn bench_bounded_scheduler(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("run_bounded_1000_noop_tasks", |b| {
        b.to_async(&rt).iter(|| async {
            let tasks = (0..1000).map(|i| async move { black_box(i) });
            black_box(run_bounded(tasks, 100).await);
        });
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(50)
        .warm_up_time(Duration::from_millis(500))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_template_expansion, bench_real_quick_ratio, bench_bounded_scheduler
}

criterion_main!(benches);
