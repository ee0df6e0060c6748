/// Periodic table entry for elements 1–118, identified by atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        (1..=118).contains(&n).then_some(Element(n))
    }

    /// Looks up an element by its case-sensitive symbol (`"Cl"`, not `"CL"`).
    pub fn from_symbol(s: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .position(|sym| *sym == s)
            .map(|i| Element(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self.0 as usize - 1]
    }

    /// Valences tried in turn when deriving implicit hydrogens.
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 => &[3],
            6 | 14 | 32 => &[4],
            7 | 15 | 33 => &[3, 5],
            8 => &[2],
            9 | 17 | 35 | 85 => &[1],
            16 | 34 | 52 => &[2, 4, 6],
            53 => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// Elements that may be written bare in lower case when aromatic.
    pub fn is_aromatic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 15 | 16)
    }
}

static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];
