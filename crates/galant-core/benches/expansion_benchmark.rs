use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use galant_core::macros::{scan_nested, DelimiterSet};
use galant_core::{Expander, SourceIntegrator};

const DEPTH_FIRST: &str = r#"function void visit(Node v) {
  v.mark();
  for_outgoing(v, e, w) {
    if ( !w.isMarked() ) {
      e.highlight();
      visit(w);
    }
  }
}
algorithm {
  numOfNodes n;
  for_nodes(v) {
    if ( !v.isMarked() ) visit(v);
  }
}
"#;

/// `copies` independent algorithms, each with its own function name
fn generated_source(copies: usize) -> String {
    (0..copies)
        .map(|i| DEPTH_FIRST.replace("visit", &format!("visit{i}")).replace("algorithm", ""))
        .collect()
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    for copies in [1, 10, 50] {
        let source = generated_source(copies);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &source, |b, source| {
            b.iter(|| {
                let mut expander = Expander::default();
                black_box(expander.expand(black_box(source)).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_integrate(c: &mut Criterion) {
    let integrator = SourceIntegrator::default();
    c.bench_function("integrate_depth_first", |b| {
        b.iter(|| {
            let mut expander = Expander::default();
            black_box(
                integrator
                    .to_class(&mut expander, "DepthFirst", black_box(DEPTH_FIRST))
                    .unwrap(),
            )
        })
    });
}

fn bench_scan_nested(c: &mut Criterion) {
    let delimiters = DelimiterSet::default();
    let args = format!("{})rest", vec!["f(a, [b, c], {d})"; 200].join(", "));
    c.bench_function("scan_nested_200_args", |b| {
        b.iter(|| black_box(scan_nested(&delimiters, "(", ")", black_box(&args), &[","]).unwrap()))
    });
}

criterion_group!(benches, bench_expand, bench_integrate, bench_scan_nested);
criterion_main!(benches);
