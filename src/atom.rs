use serde::{Deserialize, Serialize};

/// Kind of structure node an [`Atom`] represents.
///
/// Only [`NodeClass::Atom`] nodes carry a meaningful atomic number; the
/// others are written as the SMILES wildcard `*` and rank by class alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeClass {
    /// A concrete element.
    #[default]
    Atom,
    /// A labelled pseudo atom (e.g. an abbreviation or attachment point).
    Pseudoatom,
    /// A variable atom standing for a list of elements.
    VariableAtom,
    /// Any other node.
    Other,
}

/// Radical state of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Radical {
    #[default]
    None,
    Singlet,
    Doublet,
    Triplet,
}

/// Stored stereochemical flag of a tetrahedral atom or a double bond.
///
/// The flag is relative to atom indices, never to a particular SMILES
/// string:
///
/// - for an atom, take its neighbors sorted by ascending index, followed by
///   one implicit hydrogen if the atom carries exactly one. `Odd` means that,
///   looking from the first of them, the other three run clockwise.
/// - for a double bond, take at each end the highest-indexed neighbor other
///   than the opposite end. `Even` means those two neighbors are trans, `Odd`
///   means cis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StereoParity {
    Odd,
    Even,
    /// Stereo center with undetermined configuration.
    Unknown,
}

impl StereoParity {
    pub fn inverted(self) -> Self {
        match self {
            StereoParity::Odd => StereoParity::Even,
            StereoParity::Even => StereoParity::Odd,
            StereoParity::Unknown => StereoParity::Unknown,
        }
    }

    pub fn is_defined(self) -> bool {
        self != StereoParity::Unknown
    }
}

/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things you would read off
/// a structural formula. Computed properties such as the implicit hydrogen
/// count live in [`hydrogen`](crate::hydrogen).
///
/// # Examples
///
/// ```
/// use chemcanon::Atom;
///
/// let carbon = Atom::new(6);
/// assert_eq!(carbon.atomic_num, 6);
/// assert_eq!(carbon.explicit_hydrogens, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` for non-element nodes.
    pub atomic_num: u8,
    pub class: NodeClass,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    pub radical: Radical,
    /// Hydrogen count set by the author of the structure.
    ///
    /// `None` means the count follows from the element's default valence.
    pub explicit_hydrogens: Option<u8>,
    /// Whether this atom was flagged aromatic by an upstream perception step.
    pub is_aromatic: bool,
    pub parity: Option<StereoParity>,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn pseudo() -> Self {
        Self {
            class: NodeClass::Pseudoatom,
            ..Self::default()
        }
    }

    pub fn is_element(&self) -> bool {
        self.class == NodeClass::Atom && self.atomic_num > 0
    }

    pub fn is_hydrogen(&self) -> bool {
        self.class == NodeClass::Atom && self.atomic_num == 1
    }

    /// Whether a defined tetrahedral parity is stored.
    pub fn has_stereo(&self) -> bool {
        self.parity.is_some_and(StereoParity::is_defined)
    }
}
