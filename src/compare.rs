//! Total-order keys for atoms, bonds and whole molecules.
//!
//! An atom key packs, from most to least significant:
//!
//! | bits  | field |
//! |-------|-------|
//! | 56–63 | major category, `0x10` for every node |
//! | 48–55 | node class (`0x11` atom, `0x12` pseudo atom, `0x13` variable atom, `0x35` molecule) |
//! | 36–47 | atomic number, `0xFFE` for pseudo atoms, `0xFFF` for variable atoms |
//! | 24–35 | mass number |
//! | 16–23 | linked bond count |
//! | 8–15  | formal charge + `0x40` |
//! | 0–7   | hydrogen count |
//!
//! A bond key packs `is_bond << 20 | bond_type << 16 | electrons << 8 |
//! connected_atoms`.

use std::cmp::Ordering;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::atom::{Atom, NodeClass};
use crate::bond::{Bond, BondType};
use crate::hydrogen::total_hydrogens;
use crate::mol::Mol;

const NODE_CATEGORY: u64 = 0x10;
const MOLECULE_CLASS: u64 = 0x35;
const CHARGE_BASE: i64 = 0x40;

/// Which attribute groups take part in a key. All default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub linked_connector_count: bool,
    pub charge: bool,
    pub hydrogen_count: bool,
    pub connected_obj_count: bool,
    pub bond_type: bool,
    pub bond_order: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            linked_connector_count: true,
            charge: true,
            hydrogen_count: true,
            connected_obj_count: true,
            bond_type: true,
            bond_order: true,
        }
    }
}

fn node_class_code(class: NodeClass) -> u64 {
    match class {
        NodeClass::Atom => 0x11,
        NodeClass::Pseudoatom => 0x12,
        NodeClass::VariableAtom => 0x13,
        NodeClass::Other => 0,
    }
}

fn major_property(atom: &Atom) -> u64 {
    match atom.class {
        NodeClass::Atom => atom.atomic_num as u64,
        NodeClass::Pseudoatom => 0xFFE,
        NodeClass::VariableAtom => 0xFFF,
        NodeClass::Other => 0,
    }
}

fn charge_byte(charge: i64) -> u64 {
    (charge + CHARGE_BASE).clamp(0, 0xFF) as u64
}

pub fn atom_key(mol: &Mol<Atom, Bond>, idx: NodeIndex, options: &CompareOptions) -> u64 {
    let atom = mol.atom(idx);
    let mass = if atom.class == NodeClass::Atom {
        (atom.isotope as u64).min(0xFFF)
    } else {
        0
    };
    let mut key = NODE_CATEGORY << 56
        | node_class_code(atom.class) << 48
        | major_property(atom) << 36
        | mass << 24;
    if options.linked_connector_count {
        key |= (mol.degree(idx) as u64).min(0xFF) << 16;
    }
    if options.charge {
        key |= charge_byte(atom.formal_charge as i64) << 8;
    }
    if options.hydrogen_count {
        key |= total_hydrogens(mol, idx) as u64;
    }
    key
}

fn bond_type_code(kind: BondType) -> u64 {
    match kind {
        BondType::Covalent => 1,
        BondType::Ionic => 2,
        BondType::Coordinate => 3,
        BondType::Metallic => 4,
        BondType::Hydrogen => 9,
        BondType::Other => 0,
    }
}

pub fn bond_key(mol: &Mol<Atom, Bond>, idx: EdgeIndex, options: &CompareOptions) -> u64 {
    let bond = mol.bond(idx);
    let mut key = 1 << 20;
    if options.bond_type {
        key |= bond_type_code(bond.kind) << 16;
    }
    if options.bond_order {
        key |= (bond.order.electron_count() as u64) << 8;
    }
    if options.connected_obj_count {
        key |= 2;
    }
    key
}

/// Key of a whole molecule: counts only, refined element-wise by
/// [`compare_fragments`].
pub fn fragment_key(mol: &Mol<Atom, Bond>, options: &CompareOptions) -> u64 {
    let mut key = NODE_CATEGORY << 56
        | MOLECULE_CLASS << 48
        | (mol.atom_count() as u64).min(0xFFF) << 36
        | (mol.bond_count() as u64).min(0xFFF) << 24;
    if options.charge {
        let charge: i64 = mol.atoms().map(|a| mol.atom(a).formal_charge as i64).sum();
        key |= charge_byte(charge) << 8;
    }
    key
}

pub fn compare_atoms(
    left: (&Mol<Atom, Bond>, NodeIndex),
    right: (&Mol<Atom, Bond>, NodeIndex),
    options: &CompareOptions,
) -> Ordering {
    atom_key(left.0, left.1, options).cmp(&atom_key(right.0, right.1, options))
}

pub fn compare_bonds(
    left: (&Mol<Atom, Bond>, EdgeIndex),
    right: (&Mol<Atom, Bond>, EdgeIndex),
    options: &CompareOptions,
) -> Ordering {
    bond_key(left.0, left.1, options).cmp(&bond_key(right.0, right.1, options))
}

/// Compares two molecules by key, then atom by atom, then bond by bond in
/// stored order. Only meaningful once both have been canonicalized.
pub fn compare_fragments(
    left: &Mol<Atom, Bond>,
    right: &Mol<Atom, Bond>,
    options: &CompareOptions,
) -> Ordering {
    fragment_key(left, options)
        .cmp(&fragment_key(right, options))
        .then_with(|| {
            left.atoms()
                .zip(right.atoms())
                .map(|(a, b)| compare_atoms((left, a), (right, b), options))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            left.bonds()
                .zip(right.bonds())
                .map(|(a, b)| compare_bonds((left, a), (right, b), options))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

/// Stable sort of `atoms` by key.
pub fn sort_atoms(
    mol: &Mol<Atom, Bond>,
    atoms: &mut [NodeIndex],
    ascending: bool,
    options: &CompareOptions,
) {
    atoms.sort_by_cached_key(|&a| {
        let key = atom_key(mol, a, options);
        if ascending {
            key
        } else {
            !key
        }
    });
}

/// Stable sort of `bonds` by key.
pub fn sort_bonds(
    mol: &Mol<Atom, Bond>,
    bonds: &mut [EdgeIndex],
    ascending: bool,
    options: &CompareOptions,
) {
    bonds.sort_by_cached_key(|&b| {
        let key = bond_key(mol, b, options);
        if ascending {
            key
        } else {
            !key
        }
    });
}
