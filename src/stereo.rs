use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, StereoParity};
use crate::bond::Bond;
use crate::hydrogen::total_hydrogens;
use crate::mol::{permutation_parity, Mol};

/// One substituent position around a tetrahedral center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sibling {
    Atom(NodeIndex),
    /// The center's single implicit hydrogen.
    ImplicitHydrogen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    Anticlockwise,
    /// No defined configuration, or the given order does not cover the center.
    None,
}

/// Rotation verdict for a tetrahedral center seen from `reference`, with
/// `others` taken in the given order.
pub trait RotationHelper {
    fn rotation_direction(
        &self,
        mol: &Mol<Atom, Bond>,
        center: NodeIndex,
        reference: Sibling,
        others: &[Sibling],
    ) -> RotationDirection;
}

/// Derives rotation from the stored [`StereoParity`] of the center.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityRotation;

impl RotationHelper for ParityRotation {
    fn rotation_direction(
        &self,
        mol: &Mol<Atom, Bond>,
        center: NodeIndex,
        reference: Sibling,
        others: &[Sibling],
    ) -> RotationDirection {
        let Some(parity) = mol.atom(center).parity.filter(|p| p.is_defined()) else {
            return RotationDirection::None;
        };
        let Some(base) = reference_order(mol, center) else {
            return RotationDirection::None;
        };
        let mut written = Vec::with_capacity(others.len() + 1);
        written.push(reference);
        written.extend_from_slice(others);
        if written.len() != base.len() || !base.iter().all(|s| written.contains(s)) {
            return RotationDirection::None;
        }
        let clockwise = (parity == StereoParity::Odd) == permutation_parity(&base, &written);
        if clockwise {
            RotationDirection::Clockwise
        } else {
            RotationDirection::Anticlockwise
        }
    }
}

/// Neighbors by ascending index, then the implicit hydrogen if there is
/// exactly one. `None` unless that makes four positions.
pub fn reference_order(mol: &Mol<Atom, Bond>, center: NodeIndex) -> Option<Vec<Sibling>> {
    let mut order: Vec<Sibling> = mol
        .sorted_neighbors(center)
        .into_iter()
        .map(Sibling::Atom)
        .collect();
    if total_hydrogens(mol, center) == 1 {
        order.push(Sibling::ImplicitHydrogen);
    }
    (order.len() == 4).then_some(order)
}

/// `[ref0, end0, end1, ref1]` for a double bond, where each reference is
/// the highest-indexed neighbor of its end other than the opposite end.
pub fn double_bond_key_atoms(mol: &Mol<Atom, Bond>, bond: EdgeIndex) -> Option<[NodeIndex; 4]> {
    let (a, b) = mol.bond_endpoints(bond)?;
    let (end0, end1) = (a.min(b), a.max(b));
    let ref0 = key_neighbor(mol, end0, end1, |n| n.index())?;
    let ref1 = key_neighbor(mol, end1, end0, |n| n.index())?;
    Some([ref0, end0, end1, ref1])
}

fn key_neighbor(
    mol: &Mol<Atom, Bond>,
    end: NodeIndex,
    opposite: NodeIndex,
    index_of: impl Fn(NodeIndex) -> usize,
) -> Option<NodeIndex> {
    mol.neighbors(end)
        .filter(|&n| n != opposite)
        .max_by_key(|&n| index_of(n))
}

/// Atom parity after moving every atom `i` to `new_index[i]`.
pub(crate) fn remap_atom_parity(
    mol: &Mol<Atom, Bond>,
    center: NodeIndex,
    new_index: &[usize],
) -> Option<StereoParity> {
    let parity = mol.atom(center).parity?;
    let Some(old_order) = reference_order(mol, center) else {
        return Some(parity);
    };
    let relabel = |s: &Sibling| match s {
        Sibling::Atom(n) => Sibling::Atom(NodeIndex::new(new_index[n.index()])),
        Sibling::ImplicitHydrogen => Sibling::ImplicitHydrogen,
    };
    let moved: Vec<Sibling> = old_order.iter().map(relabel).collect();
    let mut sorted = moved.clone();
    sorted.sort_by_key(|s| match s {
        Sibling::Atom(n) => n.index(),
        Sibling::ImplicitHydrogen => usize::MAX,
    });
    if permutation_parity(&moved, &sorted) {
        Some(parity)
    } else {
        Some(parity.inverted())
    }
}

/// Bond parity after moving every atom `i` to `new_index[i]`. Flips once
/// for each end whose key neighbor changes.
pub(crate) fn remap_bond_parity(
    mol: &Mol<Atom, Bond>,
    bond: EdgeIndex,
    new_index: &[usize],
) -> Option<StereoParity> {
    let parity = mol.bond(bond).parity?;
    let Some((a, b)) = mol.bond_endpoints(bond) else {
        return Some(parity);
    };
    let mut flips = 0;
    for (end, opposite) in [(a, b), (b, a)] {
        let before = key_neighbor(mol, end, opposite, |n| n.index());
        let after = key_neighbor(mol, end, opposite, |n| new_index[n.index()]);
        if before != after {
            flips += 1;
        }
    }
    if flips % 2 == 0 {
        Some(parity)
    } else {
        Some(parity.inverted())
    }
}
