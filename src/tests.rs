use crate::*;

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Mol::<Atom, Bond>::new();
    let c = mol.add_atom(Atom {
        atomic_num: 6,
        ..Atom::default()
    });
    let o = mol.add_atom(Atom {
        atomic_num: 8,
        ..Atom::default()
    });
    let bond_idx = mol.add_bond(
        c,
        o,
        Bond {
            order: BondOrder::Double,
            ..Bond::default()
        },
    );

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(c).atomic_num, 6);
    assert_eq!(mol.atom(o).atomic_num, 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    let neighbors: Vec<_> = mol.neighbors(a).collect();
    assert_eq!(neighbors.len(), 2);

    let incident: Vec<_> = mol.bonds_of(a).collect();
    assert_eq!(incident.len(), 2);
}

#[test]
fn mol_bond_between_and_endpoints() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    let e = mol.add_bond(a, b, Bond::default());

    assert_eq!(mol.bond_between(a, b), Some(e));
    assert_eq!(mol.bond_between(a, c), None);

    let (src, dst) = mol.bond_endpoints(e).unwrap();
    assert!((src == a && dst == b) || (src == b && dst == a));
}

#[test]
fn mol_iterators() {
    let mut mol = Mol::<Atom, Bond>::new();
    mol.add_atom(Atom::default());
    mol.add_atom(Atom::default());

    assert_eq!(mol.atoms().count(), 2);
    assert_eq!(mol.bonds().count(), 0);
}

#[test]
fn mol_atom_mut() {
    let mut mol = Mol::<Atom, Bond>::new();
    let idx = mol.add_atom(Atom::default());
    mol.atom_mut(idx).atomic_num = 7;
    assert_eq!(mol.atom(idx).atomic_num, 7);
}

#[test]
fn bond_order_default_is_single() {
    assert_eq!(BondOrder::default(), BondOrder::Single);
    assert_eq!(BondType::default(), BondType::Covalent);
}

#[test]
fn atom_default() {
    let atom = Atom::default();
    assert_eq!(atom.atomic_num, 0);
    assert_eq!(atom.class, NodeClass::Atom);
    assert_eq!(atom.formal_charge, 0);
    assert_eq!(atom.isotope, 0);
    assert_eq!(atom.radical, Radical::None);
    assert_eq!(atom.parity, None);
    assert_eq!(atom.explicit_hydrogens, None);
    assert!(!atom.is_aromatic);
    assert!(!atom.is_element());
}

#[test]
fn mol_default() {
    let mol = Mol::<Atom, Bond>::default();
    assert_eq!(mol.atom_count(), 0);
    assert_eq!(mol.bond_count(), 0);
}

#[test]
fn mol_graph_access() {
    let mut mol = Mol::<Atom, Bond>::new();
    mol.add_atom(Atom::default());
    assert_eq!(mol.graph().node_count(), 1);
}

#[test]
fn builder_reports_unknown_symbols() {
    let mut b = MolBuilder::chain("CC");
    b.atom("Xx");
    assert_eq!(b.build(), Err(Error::UnknownElement("Xx".to_string())));
}

#[test]
fn canonical_smiles_ignores_input_order() {
    // acetic acid, written from both ends
    let mut forward = MolBuilder::chain("CCO");
    let o = forward.atom("O");
    forward.double(1, o);
    let mut backward = MolBuilder::new();
    backward.atoms("OOCC");
    backward.double(0, 2).single(1, 2).single(2, 3);

    let a = to_canonical_smiles(&forward.build().unwrap()).unwrap();
    let b = to_canonical_smiles(&backward.build().unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn canonicalizer_and_writer_compose() {
    let mut mol = MolBuilder::ring("cccccn").build().unwrap();
    let ordering = Canonicalizer::new().canonicalize(&mut mol, None).unwrap();
    assert_eq!(ordering.atom_order.len(), 6);
    let s = to_smiles(&mol);
    assert_eq!(s.matches('1').count(), 2, "{s}");
    assert_eq!(s.matches('n').count(), 1, "{s}");
}

#[test]
fn stereo_survives_canonical_renumbering() {
    let mut b = MolBuilder::new();
    b.atoms("FCCF");
    b.single(0, 1).double(1, 2).single(2, 3);
    b.bond_parity(1, 2, StereoParity::Even);
    let trans = b.build().unwrap();
    assert_eq!(to_canonical_smiles(&trans).unwrap(), "F/C=C/F");
}
