use petgraph::graph::NodeIndex;

use crate::atom::{Atom, StereoParity};
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::mol::Mol;

/// Incremental construction of a [`Mol<Atom, Bond>`].
///
/// Atom symbols follow SMILES conventions: `"C"`, `"Cl"`, a lower-case
/// `"c"` for an aromatic atom, `"*"` for a pseudo atom. The first invalid
/// call is remembered and reported by [`build`](MolBuilder::build), so calls
/// can be chained without checking each one.
///
/// ```
/// use chemcanon::{BondOrder, MolBuilder};
///
/// let mut b = MolBuilder::chain("CC");
/// let o = b.atom("O");
/// b.bond(1, o, BondOrder::Double);
/// let acetaldehyde = b.build().unwrap();
/// assert_eq!(acetaldehyde.atom_count(), 3);
/// ```
#[derive(Debug, Default)]
pub struct MolBuilder {
    mol: Mol<Atom, Bond>,
    error: Option<Error>,
}

impl MolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atoms from `symbols` joined in a line. Two adjacent aromatic atoms
    /// get an aromatic bond, everything else a single bond.
    pub fn chain(symbols: &str) -> Self {
        let mut b = Self::new();
        let atoms = b.atoms(symbols);
        for pair in atoms.windows(2) {
            b.link(pair[0], pair[1]);
        }
        b
    }

    /// Like [`chain`](MolBuilder::chain), with the last atom bonded back to
    /// the first.
    pub fn ring(symbols: &str) -> Self {
        let mut b = Self::chain(symbols);
        let n = b.mol.atom_count();
        if n > 2 {
            b.link(n - 1, 0);
        }
        b
    }

    /// Adds the atoms spelled by `symbols` without bonding them.
    pub fn atoms(&mut self, symbols: &str) -> Vec<usize> {
        split_symbols(symbols)
            .into_iter()
            .map(|sym| self.atom(sym))
            .collect()
    }

    pub fn atom(&mut self, symbol: &str) -> usize {
        match parse_atom(symbol) {
            Some(atom) => self.add(atom),
            None => {
                self.fail(Error::UnknownElement(symbol.to_string()));
                self.add(Atom::pseudo())
            }
        }
    }

    pub fn add(&mut self, atom: Atom) -> usize {
        self.mol.add_atom(atom).index()
    }

    pub fn bond(&mut self, a: usize, b: usize, order: BondOrder) -> &mut Self {
        self.bond_with(a, b, Bond::new(order))
    }

    pub fn bond_with(&mut self, a: usize, b: usize, bond: Bond) -> &mut Self {
        if self.check_atom(a) && self.check_atom(b) {
            self.mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), bond);
        }
        self
    }

    pub fn single(&mut self, a: usize, b: usize) -> &mut Self {
        self.bond(a, b, BondOrder::Single)
    }

    pub fn double(&mut self, a: usize, b: usize) -> &mut Self {
        self.bond(a, b, BondOrder::Double)
    }

    pub fn triple(&mut self, a: usize, b: usize) -> &mut Self {
        self.bond(a, b, BondOrder::Triple)
    }

    pub fn charge(&mut self, atom: usize, charge: i8) -> &mut Self {
        self.update_atom(atom, |a| a.formal_charge = charge)
    }

    pub fn isotope(&mut self, atom: usize, mass: u16) -> &mut Self {
        self.update_atom(atom, |a| a.isotope = mass)
    }

    pub fn hydrogens(&mut self, atom: usize, count: u8) -> &mut Self {
        self.update_atom(atom, |a| a.explicit_hydrogens = Some(count))
    }

    pub fn atom_parity(&mut self, atom: usize, parity: StereoParity) -> &mut Self {
        self.update_atom(atom, |a| a.parity = Some(parity))
    }

    pub fn bond_parity(&mut self, a: usize, b: usize, parity: StereoParity) -> &mut Self {
        if !(self.check_atom(a) && self.check_atom(b)) {
            return self;
        }
        match self.mol.bond_between(NodeIndex::new(a), NodeIndex::new(b)) {
            Some(edge) => self.mol.bond_mut(edge).parity = Some(parity),
            None => self.fail(Error::BondNotFound(a, b)),
        }
        self
    }

    pub fn build(self) -> Result<Mol<Atom, Bond>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.mol),
        }
    }

    fn link(&mut self, a: usize, b: usize) {
        let aromatic = |i: usize| self.mol.atom(NodeIndex::new(i)).is_aromatic;
        let order = if aromatic(a) && aromatic(b) {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        };
        self.bond(a, b, order);
    }

    fn update_atom(&mut self, atom: usize, f: impl FnOnce(&mut Atom)) -> &mut Self {
        if self.check_atom(atom) {
            f(self.mol.atom_mut(NodeIndex::new(atom)));
        }
        self
    }

    fn check_atom(&mut self, atom: usize) -> bool {
        let ok = atom < self.mol.atom_count();
        if !ok {
            self.fail(Error::AtomOutOfRange(atom));
        }
        ok
    }

    fn fail(&mut self, err: Error) {
        self.error.get_or_insert(err);
    }
}

fn parse_atom(symbol: &str) -> Option<Atom> {
    if symbol == "*" {
        return Some(Atom::pseudo());
    }
    let aromatic = symbol.starts_with(|c: char| c.is_ascii_lowercase());
    let element = if aromatic {
        let mut chars = symbol.chars();
        let first = chars.next()?.to_ascii_uppercase();
        Element::from_symbol(&format!("{first}{}", chars.as_str()))?
    } else {
        Element::from_symbol(symbol)?
    };
    Some(Atom {
        is_aromatic: aromatic,
        ..Atom::new(element.atomic_num())
    })
}

/// Splits `"CClc*"` into `["C", "Cl", "c", "*"]`. A valid two-letter
/// element always wins over two one-letter atoms.
fn split_symbols(symbols: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = symbols;
    while let Some(first) = rest.chars().next() {
        let mut take = first.len_utf8();
        if first.is_ascii_uppercase() {
            if let Some(two) = rest.get(..2) {
                if Element::from_symbol(two).is_some() {
                    take = 2;
                }
            }
        }
        let (head, tail) = rest.split_at(take);
        out.push(head);
        rest = tail;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_two_letter_symbols() {
        assert_eq!(split_symbols("CClBrc*N"), vec!["C", "Cl", "Br", "c", "*", "N"]);
    }

    #[test]
    fn aromatic_ring_gets_aromatic_bonds() {
        let mol = MolBuilder::ring("cccccc").build().unwrap();
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
        assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let mut b = MolBuilder::new();
        b.atom("Xx");
        assert_eq!(b.build().unwrap_err(), Error::UnknownElement("Xx".into()));
    }

    #[test]
    fn out_of_range_bond_is_reported() {
        let mut b = MolBuilder::chain("CC");
        b.single(0, 5);
        assert_eq!(b.build().unwrap_err(), Error::AtomOutOfRange(5));
    }

    #[test]
    fn missing_bond_parity_is_reported() {
        let mut b = MolBuilder::new();
        b.atoms("CC");
        b.bond_parity(0, 1, StereoParity::Even);
        assert_eq!(b.build().unwrap_err(), Error::BondNotFound(0, 1));
    }
}
