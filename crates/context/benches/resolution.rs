use context::{
    instantiate_class, resolve_injected_arguments, Binding, Class, Context, InjectionResolver,
    Injection, InjectionTarget, ResolverConfig, ScanMode,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Benchmarks for injection resolution
/// Measures: sync fast path, deferred join, class instantiation

struct Service {
    id: u64,
    label: Arc<String>,
}

fn bench_context(width: usize) -> Context {
    let ctx = Context::new("bench");
    for i in 0..width {
        ctx.bind(Binding::new(format!("sync.{i}")).to(i as u64));
        ctx.bind(Binding::new(format!("async.{i}")).to_async_value(move || async move { Ok(i as u64) }));
    }
    ctx.bind(Binding::new("label").to("bench".to_string()));
    ctx
}

fn target(prefix: &str, width: usize) -> InjectionTarget {
    (0..width).fold(InjectionTarget::new("f", width), |target, i| {
        target.arg(i, Injection::key(format!("{prefix}.{i}")))
    })
}

fn bench_argument_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_arguments");
    let rt = Runtime::new().expect("bench runtime");

    for width in [1usize, 4, 16] {
        let ctx = bench_context(width);
        let sync_target = target("sync", width);
        let async_target = target("async", width);

        group.bench_with_input(BenchmarkId::new("sync", width), &width, |b, _| {
            b.iter(|| {
                let args = resolve_injected_arguments(black_box(&sync_target), &ctx, None)
                    .expect("resolves");
                black_box(args.is_promise())
            })
        });

        group.bench_with_input(BenchmarkId::new("async", width), &width, |b, _| {
            b.to_async(&rt).iter(|| async {
                let args = resolve_injected_arguments(black_box(&async_target), &ctx, None)
                    .expect("resolves");
                black_box(args.resolve().await.expect("joins").len())
            })
        });
    }

    group.finish();
}

fn bench_scan_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_mode");
    let ctx = bench_context(16);
    let target = target("sync", 16);

    for mode in [ScanMode::Atomic, ScanMode::Interleaved] {
        let resolver = InjectionResolver::new(ResolverConfig::production().with_scan_mode(mode));
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter(|| black_box(resolver.resolve_arguments(&target, &ctx, None).is_ok()))
        });
    }

    group.finish();
}

fn bench_instantiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("instantiate");
    let rt = Runtime::new().expect("bench runtime");
    let ctx = bench_context(1);

    let service = |key: &str| {
        Class::new("Service", 1, |args| {
            Ok(Service {
                id: *args.get::<u64>(0)?,
                label: Arc::new(String::new()),
            })
        })
        .arg(0, Injection::key(key))
        .property("label", Injection::key("label"), |s: &mut Service, v: Arc<String>| {
            s.label = v
        })
    };
    let sync_class = service("sync.0");
    let async_class = service("async.0");

    group.bench_function("sync_class", |b| {
        b.iter(|| {
            let instance = instantiate_class(&sync_class, &ctx, None).expect("valid class");
            black_box(instance.is_promise())
        })
    });

    group.bench_function("async_class", |b| {
        b.to_async(&rt).iter(|| async {
            let instance = instantiate_class(&async_class, &ctx, None).expect("valid class");
            let service = instance.resolve().await.expect("constructs");
            black_box((service.id, service.label.len()))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_argument_resolution,
    bench_scan_modes,
    bench_instantiation
);
criterion_main!(benches);
