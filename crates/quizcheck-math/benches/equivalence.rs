use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizcheck_core::ExpressionEngine;
use quizcheck_math::{parse_latex, simplify, LatexEngine};

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let long_sum = (1..=50)
        .map(|i| format!("{i}x^{{{i}}}"))
        .collect::<Vec<_>>()
        .join(" + ");

    group.bench_function("fraction", |b| {
        b.iter(|| parse_latex(black_box("\\frac{2}{12}")))
    });

    let nested = "\\sqrt[3]{\\frac{(x+1)^2}{\\left(y - 2\\right)}} \\cdot 3\\pi";
    group.bench_function("nested", |b| b.iter(|| parse_latex(black_box(nested))));

    group.bench_function("50_terms", |b| b.iter(|| parse_latex(black_box(&long_sum))));

    group.finish();
}

fn bench_equivalence(c: &mut Criterion) {
    let mut group = c.benchmark_group("equivalence");
    let engine = LatexEngine::new();

    let pairs = [
        ("rational", "\\frac{2}{12}", "\\frac{1}{6}"),
        ("linear", "2(x + 1)", "2x + 2"),
        ("binomial", "(x + y)^2", "x^2 + 2xy + y^2"),
        ("trig", "\\sin(x)^2 + \\cos(x)^2", "1"),
    ];

    for (name, submitted, canonical) in pairs {
        let a = parse_latex(submitted).unwrap();
        let b = parse_latex(canonical).unwrap();
        group.bench_function(name, |bench| {
            bench.iter(|| {
                let sa = simplify(black_box(&a)).unwrap();
                let sb = simplify(black_box(&b)).unwrap();
                engine.is_value_equal(&sa, &sb) || engine.is_structurally_same(&sa, &sb)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_equivalence);
criterion_main!(benches);
