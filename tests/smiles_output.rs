use chemcanon::{
    to_canonical_smiles, to_smiles, write_smiles, write_smiles_list, Atom, Bond, GenerationMode,
    Mol, MolBuilder, SmilesOptions, SmilesWriter, StereoParity,
};

fn toluene() -> Mol<Atom, Bond> {
    let mut b = MolBuilder::ring("cccccc");
    let c = b.atom("C");
    b.single(0, c);
    b.build().unwrap()
}

/// F/C=C/C(H)(Cl)Br with both stereo elements defined.
fn stereo_mix() -> Mol<Atom, Bond> {
    let mut b = MolBuilder::new();
    let a = b.atoms("FCCCClBr");
    b.single(a[0], a[1])
        .double(a[1], a[2])
        .single(a[2], a[3])
        .single(a[3], a[4])
        .single(a[3], a[5]);
    b.bond_parity(a[1], a[2], StereoParity::Even);
    b.atom_parity(a[3], StereoParity::Odd);
    b.build().unwrap()
}

fn random(count: usize, seed: u64) -> SmilesOptions {
    SmilesOptions {
        generation_mode: GenerationMode::Random,
        random_output_count: count,
        random_seed: Some(seed),
        ..SmilesOptions::default()
    }
}

#[test]
fn empty_molecule_writes_nothing() {
    let mol = MolBuilder::new().build().unwrap();
    assert_eq!(to_smiles(&mol), "");
    assert_eq!(to_canonical_smiles(&mol).unwrap(), "");
}

#[test]
fn toluene_starts_at_the_methyl() {
    assert_eq!(to_smiles(&toluene()), "Cc1ccccc1");
}

#[test]
fn benzene_canonical() {
    let mol = MolBuilder::ring("cccccc").build().unwrap();
    assert_eq!(to_canonical_smiles(&mol).unwrap(), "c1ccccc1");
}

#[test]
fn random_strings_describe_the_same_atoms() {
    let list = write_smiles_list(&toluene(), &random(6, 11));
    assert!(!list.is_empty() && list.len() <= 6);
    for s in &list {
        assert_eq!(s.matches('c').count(), 6, "{s}");
        assert_eq!(s.matches('C').count(), 1, "{s}");
        assert_eq!(s.matches('1').count(), 2, "{s}");
    }
    let mut unique = list.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), list.len());
}

#[test]
fn seeded_random_output_repeats() {
    let a = write_smiles_list(&toluene(), &random(4, 99));
    let b = write_smiles_list(&toluene(), &random(4, 99));
    assert_eq!(a, b);
}

#[test]
fn deterministic_modes_give_one_string() {
    for mode in [
        GenerationMode::HeaviestAndLongest,
        GenerationMode::Heaviest,
        GenerationMode::LightestAndLongest,
    ] {
        let options = SmilesOptions {
            generation_mode: mode,
            random_output_count: 5,
            ..SmilesOptions::default()
        };
        let list = write_smiles_list(&toluene(), &options);
        assert_eq!(list, vec![write_smiles(&toluene(), &options)]);
    }
}

#[test]
fn stereo_switches_are_independent() {
    let mol = stereo_mix();
    let full = to_smiles(&mol);
    assert!(full.contains('@') && full.contains('/'), "{full}");

    let none = write_smiles(
        &mol,
        &SmilesOptions {
            ignore_stereo: true,
            ..SmilesOptions::default()
        },
    );
    assert!(!none.contains('@') && !none.contains('/') && !none.contains('\\'), "{none}");

    let atoms_only = write_smiles(
        &mol,
        &SmilesOptions {
            ignore_stereo: true,
            ignore_stereo_atom: Some(false),
            ..SmilesOptions::default()
        },
    );
    assert!(atoms_only.contains('@'), "{atoms_only}");
    assert!(!atoms_only.contains('/') && !atoms_only.contains('\\'), "{atoms_only}");
}

#[test]
fn options_load_from_json() {
    let options: SmilesOptions = serde_json::from_str(
        r#"{"generation_mode": "Random", "random_output_count": 3, "random_seed": 5}"#,
    )
    .unwrap();
    assert_eq!(options, random(3, 5));
    let writer = SmilesWriter::new(options);
    assert!(writer.write_all(&toluene()).len() <= 3);
}
