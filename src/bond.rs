use serde::{Deserialize, Serialize};

use crate::atom::StereoParity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Quadruple,
    /// Delocalized bond stored without a Kekulé assignment.
    Aromatic,
}

impl BondOrder {
    /// Number of bonding electrons, the value the comparator ranks by.
    pub fn electron_count(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Quadruple => 8,
            BondOrder::Aromatic => 3,
        }
    }

    /// Valence contribution in half-bond units (aromatic = 1.5 bonds).
    pub(crate) fn half_valence(self) -> u8 {
        self.electron_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondType {
    #[default]
    Covalent,
    Ionic,
    Coordinate,
    Metallic,
    Hydrogen,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub order: BondOrder,
    pub kind: BondType,
    /// E/Z flag for a double bond, see [`StereoParity`].
    pub parity: Option<StereoParity>,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn is_covalent(&self) -> bool {
        self.kind == BondType::Covalent
    }

    pub fn has_stereo(&self) -> bool {
        self.order == BondOrder::Double && self.parity.is_some_and(StereoParity::is_defined)
    }
}

impl From<BondOrder> for Bond {
    fn from(order: BondOrder) -> Self {
        Self::new(order)
    }
}
