use criterion::{criterion_group, criterion_main, Criterion};
use planning_sat::planning::encoder::encode;
use planning_sat::planning::find_plan;
use planning_sat::planning::problem::{Action, Atom, Problem};
use planning_sat::sat::cnf::Cnf;
use planning_sat::sat::dpll::Dpll;
use planning_sat::sat::solver::Solver;
use std::hint::black_box;
use std::time::Duration;

/// Uniform random 3-SAT with the given clause/variable ratio.
fn random_3sat(rng: &mut fastrand::Rng, vars: i32, ratio: f64) -> Cnf {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clauses = (f64::from(vars) * ratio) as usize;
    (0..clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let var = rng.i32(1..=vars);
                    if rng.bool() { var } else { -var }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into()
}

/// A robot in a corridor of `len` cells, starting at one end with the goal at the other.
fn corridor(len: usize) -> Problem {
    let cell = |i: usize| format!("c{i}");
    let at = |i: usize| Atom::new("at", ["rob".to_string(), cell(i)]);

    let mut initial = vec![at(0)];
    let mut actions = Vec::new();
    for i in 0..len - 1 {
        for (from, to) in [(i, i + 1), (i + 1, i)] {
            initial.push(Atom::new("adjacent", [cell(from), cell(to)]));
            actions.push(
                Action::new("move", ["rob".to_string(), cell(from), cell(to)])
                    .with_precondition(at(from))
                    .with_precondition(Atom::new("adjacent", [cell(from), cell(to)]))
                    .with_add_effect(at(to))
                    .with_delete_effect(at(from)),
            );
        }
    }

    Problem::new(
        initial,
        vec![at(len - 1)],
        (0..len).map(at).collect(),
        actions,
    )
}

fn bench_random_3sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("random 3-SAT");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let mut rng = fastrand::Rng::with_seed(42);
    for vars in [10, 15, 20] {
        let cnfs: Vec<Cnf> = (0..20).map(|_| random_3sat(&mut rng, vars, 4.26)).collect();

        group.bench_function(format!("DPLL {vars} vars"), |b| {
            b.iter(|| {
                for cnf in &cnfs {
                    let mut solver = Dpll::new(cnf.clone());
                    black_box(solver.solve());
                }
            });
        });
    }

    group.finish();
}

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning - corridor");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for len in [3, 4, 5] {
        let problem = corridor(len);

        group.bench_function(format!("encode {len} cells"), |b| {
            b.iter(|| black_box(encode(&problem, len - 1)));
        });

        group.bench_function(format!("encode + solve {len} cells"), |b| {
            b.iter(|| black_box(find_plan(&problem, len - 1)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_random_3sat, bench_planning);

criterion_main!(benches);
