//! Performance benchmarks for the tether unit build.
//!
//! Models are generated with `FileBuilder`, so the numbers cover the
//! analysis passes only:
//! - Wide: many packages and files with plain records
//! - Alias chains: long `A0 = A1 = ... = Int` chains, resolved over many rounds
//! - Record webs: records referencing each other through optional fields
//! - Endpoints: services with providers and consumers
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-pass timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tether::{File, FileBuilder, FileId, Unit};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn unit_of(files: Vec<File>) -> Unit {
    let mut unit = Unit::new();
    for file in files {
        unit.add_file(file).unwrap();
    }
    unit
}

// =============================================================================
// Synthetic models
// =============================================================================

/// `packages` packages with `records` records each; every record points at a
/// record of the previous package.
fn wide_model(packages: u32, records: u32) -> Vec<File> {
    (0..packages)
        .map(|p| {
            let b = FileBuilder::new(FileId::new(p), format!("pkg{p}.tether"));
            let package = format!("pkg{p}");
            let statements = (0..records)
                .map(|r| {
                    let mut fields = vec![
                        b.field("id", b.ident("String")),
                        b.field(
                            "count",
                            b.call(b.ident("Int"), vec![b.range(b.int(0), b.int(100))]),
                        ),
                        b.field("tags", b.list(b.ident("String"))),
                    ];
                    if p > 0 {
                        let previous = format!("pkg{}", p - 1);
                        let target = format!("Record{r}");
                        fields.push(b.field("link", b.path(&[previous.as_str(), target.as_str()])));
                    }
                    b.record(&format!("Record{r}"), fields)
                })
                .collect();
            b.file(&[package.as_str()], vec![], statements)
        })
        .collect()
}

/// One alias chain of `length` links, declared in reverse so every round
/// resolves a single alias.
fn alias_chain(length: u32) -> Vec<File> {
    let b = FileBuilder::new(FileId::new(0), "aliases.tether");
    let statements = (0..length)
        .map(|i| {
            let target = if i + 1 == length {
                b.ident("Int")
            } else {
                b.ident(&format!("A{}", i + 1))
            };
            b.alias(&format!("A{i}"), target)
        })
        .collect();
    vec![b.file(&["aliases"], vec![], statements)]
}

/// `size` records, each holding optional references to the next two.
fn record_web(size: u32) -> Vec<File> {
    let b = FileBuilder::new(FileId::new(0), "web.tether");
    let statements = (0..size)
        .map(|i| {
            let next = format!("Node{}", (i + 1) % size);
            let skip = format!("Node{}", (i + 2) % size);
            b.record(
                &format!("Node{i}"),
                vec![
                    b.field("next", b.optional(b.ident(&next))),
                    b.field("skip", b.optional(b.ident(&skip))),
                    b.field("children", b.list(b.ident(&next))),
                ],
            )
        })
        .collect();
    vec![b.file(&["web"], vec![], statements)]
}

/// `services` services with one provider and one consumer each, one
/// declaration per file.
fn endpoints(services: u32) -> Vec<File> {
    let mut files = Vec::new();
    let mut next_file = 0;
    let mut builder = |name: String| {
        let b = FileBuilder::new(FileId::new(next_file), format!("{name}.tether"));
        next_file += 1;
        b
    };

    for s in 0..services {
        let service = format!("Service{s}");
        let provider = format!("Provider{s}");

        let b = builder(service.clone());
        let operations = (0..8)
            .map(|o| {
                b.operation(
                    &format!("op{o}"),
                    vec![b.param("id", b.ident("String"))],
                    Some(b.ident("Int")),
                )
            })
            .collect();
        files.push(b.file(&["api"], vec![], vec![b.service(&service, operations)]));

        let b = builder(provider.clone());
        files.push(b.file(
            &["api"],
            vec![],
            vec![b.provider(
                &provider,
                vec![b.implements(b.ident(&service), Some(&["op0", "op1", "op2", "op3"]))],
                b.transport("http", None),
            )],
        ));

        let b = builder(format!("Consumer{s}"));
        files.push(b.file(
            &["api"],
            vec![],
            vec![b.consumer(
                &format!("Consumer{s}"),
                b.ident(&provider),
                vec![b.uses(b.ident(&service), Some(&["op0", "op2"]))],
            )],
        ));
    }
    files
}

// =============================================================================
// Benchmarks
// =============================================================================

fn wide_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("unit/wide");
    for (packages, records) in [(4, 25), (16, 50), (64, 100)] {
        let unit = unit_of(wide_model(packages, records));
        group.throughput(Throughput::Elements(u64::from(packages * records)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{packages}x{records}")),
            &unit,
            |b, unit| {
                b.iter(|| {
                    let result = black_box(unit).build();
                    end_profiling_frame();
                    black_box(result.is_success())
                });
            },
        );
    }
    group.finish();
}

fn alias_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit/alias_chain");
    for length in [10, 100, 500] {
        let unit = unit_of(alias_chain(length));
        group.bench_with_input(BenchmarkId::from_parameter(length), &unit, |b, unit| {
            b.iter(|| black_box(black_box(unit).build().is_success()));
        });
    }
    group.finish();
}

fn cycle_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit/record_web");
    for size in [10, 100, 400] {
        let unit = unit_of(record_web(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &unit, |b, unit| {
            b.iter(|| black_box(black_box(unit).build().diagnostics.warning_count()));
        });
    }
    group.finish();
}

fn endpoint_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit/endpoints");
    for services in [10, 100] {
        let unit = unit_of(endpoints(services));
        group.bench_with_input(BenchmarkId::from_parameter(services), &unit, |b, unit| {
            b.iter(|| black_box(black_box(unit).build().is_success()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    wide_benchmarks,
    alias_benchmarks,
    cycle_benchmarks,
    endpoint_benchmarks
);
criterion_main!(benches);
