use criterion::{Criterion, criterion_group, criterion_main};
use textvars_engine::scan::scan;
use textvars_engine::{
    DocumentSettings, Font, MemoryDocument, MemoryVariableStore, restore, substitute,
};

fn label_text(placeholders: usize) -> String {
    (0..placeholders)
        .map(|i| format!("Item {i}: @item/{i}.label costs @price and ships @when. "))
        .collect()
}

fn vars(placeholders: usize) -> MemoryVariableStore {
    let mut vars = MemoryVariableStore::new();
    for i in 0..placeholders {
        vars.set_string("Text Variables", &format!("item/{i}/label"), "Widget");
    }
    vars.set_string("Text Variables", "price", "$10");
    vars
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in [10, 100] {
        let text = label_text(size);
        group.bench_function(format!("{size}_placeholders"), |b| {
            b.iter(|| std::hint::black_box(scan(std::hint::black_box(&text))));
        });
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    group.sample_size(20);
    let settings = DocumentSettings::default();

    for size in [10, 100] {
        let text = label_text(size);
        let mut vars = vars(size);
        group.bench_function(format!("{size}_placeholders"), |b| {
            b.iter(|| {
                let mut doc = MemoryDocument::new();
                let id = doc.add_text("Label", &text, Font::new("Inter", "Regular"));
                substitute(&mut doc, &mut vars, &id, &settings).unwrap();
                restore(&mut doc, &id).unwrap();
                std::hint::black_box(doc);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan, bench_round_trip);
criterion_main!(benches);
