use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chemcanon::{
    canonicalize, to_canonical_smiles, to_smiles, write_smiles_list, Atom, Bond, BondOrder,
    GenerationMode, Mol, MolBuilder, SmilesOptions,
};

fn methane() -> Mol<Atom, Bond> {
    MolBuilder::chain("C").build().unwrap()
}

fn hexacontane() -> Mol<Atom, Bond> {
    MolBuilder::chain(&"C".repeat(60)).build().unwrap()
}

/// Linearly fused aromatic rings, `rings` of them.
fn acene(rings: usize) -> Mol<Atom, Bond> {
    let mut b = MolBuilder::ring("cccccc");
    // shared edge of the last ring, far side first
    let (mut left, mut right) = (2, 3);
    for _ in 1..rings {
        let new = b.atoms("cccc");
        b.bond(right, new[0], BondOrder::Aromatic)
            .bond(new[0], new[1], BondOrder::Aromatic)
            .bond(new[1], new[2], BondOrder::Aromatic)
            .bond(new[2], new[3], BondOrder::Aromatic)
            .bond(new[3], left, BondOrder::Aromatic);
        (left, right) = (new[1], new[2]);
    }
    b.build().unwrap()
}

/// Binary tree of carbons with hydroxyl leaves.
fn dendrimer(depth: usize) -> Mol<Atom, Bond> {
    let mut b = MolBuilder::new();
    let mut frontier = vec![b.atom("C")];
    for level in 0..depth {
        let symbol = if level + 1 == depth { "O" } else { "C" };
        let mut next = Vec::new();
        for &parent in &frontier {
            for _ in 0..2 {
                let child = b.atom(symbol);
                b.single(parent, child);
                next.push(child);
            }
        }
        frontier = next;
    }
    b.build().unwrap()
}

fn molecules() -> Vec<(&'static str, Mol<Atom, Bond>)> {
    vec![
        ("methane", methane()),
        ("hexacontane", hexacontane()),
        ("pentacene", acene(5)),
        ("dendrimer", dendrimer(6)),
    ]
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for (name, mol) in molecules() {
        group.bench_function(name, |b| b.iter(|| black_box(to_smiles(black_box(&mol)))));
    }
    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");
    for (name, mol) in molecules() {
        group.bench_function(name, |b| b.iter(|| black_box(canonicalize(black_box(&mol)))));
    }
    group.finish();

    let mut group = c.benchmark_group("canonical_smiles");
    for (name, mol) in molecules() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(to_canonical_smiles(black_box(&mol))))
        });
    }
    group.finish();
}

fn bench_random(c: &mut Criterion) {
    let options = SmilesOptions {
        generation_mode: GenerationMode::Random,
        random_output_count: 10,
        random_seed: Some(1),
        ..SmilesOptions::default()
    };
    let mut group = c.benchmark_group("random");
    for (name, mol) in molecules() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(write_smiles_list(black_box(&mol), &options)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_write, bench_canonical, bench_random);
criterion_main!(benches);
