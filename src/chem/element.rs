//! Periodic table used by the SMILES and molfile readers.

/// A chemical element, or the `*` dummy atom (atomic number 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
    /// Default valences, lowest first. Empty for elements without an
    /// implicit-hydrogen model (metals, noble gases).
    pub valences: &'static [u8],
    /// Monoisotopic mass number of the most common isotope
    pub mass_number: u16,
}

const fn el(
    atomic_number: u8,
    symbol: &'static str,
    valences: &'static [u8],
    mass_number: u16,
) -> Element {
    Element {
        atomic_number,
        symbol,
        valences,
        mass_number,
    }
}

static ELEMENTS: &[Element] = &[
    // Dummy atom (`*`): attachment point or unknown
    el(0, "*", &[], 0),
    el(1, "H", &[1], 1),
    el(2, "He", &[], 4),
    el(3, "Li", &[1], 7),
    el(4, "Be", &[2], 9),
    el(5, "B", &[3], 11),
    el(6, "C", &[4], 12),
    el(7, "N", &[3, 5], 14),
    el(8, "O", &[2], 16),
    el(9, "F", &[1], 19),
    el(10, "Ne", &[], 20),
    el(11, "Na", &[1], 23),
    el(12, "Mg", &[2], 24),
    el(13, "Al", &[3], 27),
    el(14, "Si", &[4], 28),
    el(15, "P", &[3, 5], 31),
    el(16, "S", &[2, 4, 6], 32),
    el(17, "Cl", &[1], 35),
    el(18, "Ar", &[], 40),
    el(19, "K", &[1], 39),
    el(20, "Ca", &[2], 40),
    el(21, "Sc", &[], 45),
    el(22, "Ti", &[], 48),
    el(23, "V", &[], 51),
    el(24, "Cr", &[], 52),
    el(25, "Mn", &[], 55),
    el(26, "Fe", &[], 56),
    el(27, "Co", &[], 59),
    el(28, "Ni", &[], 58),
    el(29, "Cu", &[], 63),
    el(30, "Zn", &[], 64),
    el(31, "Ga", &[3], 69),
    el(32, "Ge", &[4], 74),
    el(33, "As", &[3, 5], 75),
    el(34, "Se", &[2, 4, 6], 80),
    el(35, "Br", &[1], 79),
    el(36, "Kr", &[], 84),
    el(37, "Rb", &[1], 85),
    el(38, "Sr", &[2], 88),
    el(39, "Y", &[], 89),
    el(40, "Zr", &[], 90),
    el(41, "Nb", &[], 93),
    el(42, "Mo", &[], 98),
    el(43, "Tc", &[], 98),
    el(44, "Ru", &[], 102),
    el(45, "Rh", &[], 103),
    el(46, "Pd", &[], 106),
    el(47, "Ag", &[], 107),
    el(48, "Cd", &[], 114),
    el(49, "In", &[3], 115),
    el(50, "Sn", &[], 120),
    el(51, "Sb", &[3, 5], 121),
    el(52, "Te", &[2, 4, 6], 130),
    el(53, "I", &[1], 127),
    el(54, "Xe", &[], 132),
    el(55, "Cs", &[1], 133),
    el(56, "Ba", &[2], 138),
    el(57, "La", &[], 139),
    el(58, "Ce", &[], 140),
    el(59, "Pr", &[], 141),
    el(60, "Nd", &[], 142),
    el(61, "Pm", &[], 145),
    el(62, "Sm", &[], 152),
    el(63, "Eu", &[], 153),
    el(64, "Gd", &[], 158),
    el(65, "Tb", &[], 159),
    el(66, "Dy", &[], 164),
    el(67, "Ho", &[], 165),
    el(68, "Er", &[], 166),
    el(69, "Tm", &[], 169),
    el(70, "Yb", &[], 174),
    el(71, "Lu", &[], 175),
    el(72, "Hf", &[], 180),
    el(73, "Ta", &[], 181),
    el(74, "W", &[], 184),
    el(75, "Re", &[], 187),
    el(76, "Os", &[], 192),
    el(77, "Ir", &[], 193),
    el(78, "Pt", &[], 195),
    el(79, "Au", &[], 197),
    el(80, "Hg", &[], 202),
    el(81, "Tl", &[1, 3], 205),
    el(82, "Pb", &[], 208),
    el(83, "Bi", &[3], 209),
    el(84, "Po", &[2], 209),
    el(85, "At", &[1], 210),
    el(86, "Rn", &[], 222),
    el(87, "Fr", &[1], 223),
    el(88, "Ra", &[2], 226),
    el(89, "Ac", &[], 227),
    el(90, "Th", &[], 232),
    el(91, "Pa", &[], 231),
    el(92, "U", &[], 238),
    el(93, "Np", &[], 237),
    el(94, "Pu", &[], 244),
    el(95, "Am", &[], 243),
    el(96, "Cm", &[], 247),
    el(97, "Bk", &[], 247),
    el(98, "Cf", &[], 251),
    el(99, "Es", &[], 252),
    el(100, "Fm", &[], 257),
    el(101, "Md", &[], 258),
    el(102, "No", &[], 259),
    el(103, "Lr", &[], 266),
    el(104, "Rf", &[], 267),
    el(105, "Db", &[], 268),
    el(106, "Sg", &[], 269),
    el(107, "Bh", &[], 270),
    el(108, "Hs", &[], 269),
    el(109, "Mt", &[], 278),
    el(110, "Ds", &[], 281),
    el(111, "Rg", &[], 282),
    el(112, "Cn", &[], 285),
    el(113, "Nh", &[], 286),
    el(114, "Fl", &[], 289),
    el(115, "Mc", &[], 290),
    el(116, "Lv", &[], 293),
    el(117, "Ts", &[], 294),
    el(118, "Og", &[], 294),
];

/// Elements (and the dummy atom) that may appear outside brackets in SMILES
pub const ORGANIC_SUBSET: &[&str] = &["*", "B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];

/// Elements that may be written aromatic (lower case) in SMILES
pub const AROMATIC_CAPABLE: &[&str] = &["B", "C", "N", "O", "P", "S", "As", "Se", "Te"];

impl Element {
    /// Look up an element by its case-sensitive symbol (e.g. `Cl`, not `CL`)
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ELEMENTS.iter().copied().find(|e| e.symbol == symbol)
    }

    /// Look up an element by symbol ignoring case, as molfiles are not
    /// consistent about capitalisation
    #[must_use]
    pub fn from_symbol_ignore_case(symbol: &str) -> Option<Self> {
        ELEMENTS
            .iter()
            .copied()
            .find(|e| e.symbol.eq_ignore_ascii_case(symbol))
    }

    #[must_use]
    pub fn is_organic_subset(&self) -> bool {
        ORGANIC_SUBSET.contains(&self.symbol)
    }

    #[must_use]
    pub fn can_be_aromatic(&self) -> bool {
        AROMATIC_CAPABLE.contains(&self.symbol)
    }

    /// Lowest default valence, if the element has a valence model
    #[must_use]
    pub fn default_valence(&self) -> Option<u8> {
        self.valences.first().copied()
    }

    /// Implicit hydrogens needed to reach the lowest default valence that is
    /// at least `valence`. `valence` is signed because formal charge is folded
    /// into it by the caller. Zero when the element has no valence model or
    /// the atom is already saturated.
    #[must_use]
    pub fn implicit_hydrogens(&self, valence: i32) -> u8 {
        self.valences
            .iter()
            .map(|&v| i32::from(v))
            .find(|&v| v >= valence)
            .map_or(0, |v| u8::try_from(v - valence).unwrap_or(u8::MAX))
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol() {
        let carbon = Element::from_symbol("C").unwrap();
        assert_eq!(carbon.atomic_number, 6);
        assert!(Element::from_symbol("Cl").is_some());
        assert!(Element::from_symbol("CL").is_none());
        assert!(Element::from_symbol("Xx").is_none());
    }

    #[test]
    fn test_lookup_ignore_case() {
        assert_eq!(Element::from_symbol_ignore_case("CL").unwrap().symbol, "Cl");
        assert_eq!(Element::from_symbol_ignore_case("br").unwrap().symbol, "Br");
    }

    #[test]
    fn test_full_periodic_table() {
        let samples = [
            (22, "Ti"),
            (32, "Ge"),
            (46, "Pd"),
            (51, "Sb"),
            (64, "Gd"),
            (83, "Bi"),
            (118, "Og"),
        ];
        for (z, symbol) in samples {
            assert_eq!(Element::from_symbol(symbol).unwrap().atomic_number, z);
        }
        assert_eq!(ELEMENTS.len(), 119);
        assert!(ELEMENTS.iter().enumerate().all(|(i, e)| usize::from(e.atomic_number) == i));

        let dummy = Element::from_symbol("*").unwrap();
        assert_eq!(dummy.atomic_number, 0);
        assert!(dummy.is_organic_subset());
        assert_eq!(dummy.implicit_hydrogens(1), 0);
    }

    #[test]
    fn test_implicit_hydrogens() {
        let carbon = Element::from_symbol("C").unwrap();
        assert_eq!(carbon.implicit_hydrogens(0), 4);
        assert_eq!(carbon.implicit_hydrogens(1), 3);
        assert_eq!(carbon.implicit_hydrogens(4), 0);
        assert_eq!(carbon.implicit_hydrogens(5), 0);

        // Nitrogen jumps to its higher valence once over-bonded
        let nitrogen = Element::from_symbol("N").unwrap();
        assert_eq!(nitrogen.implicit_hydrogens(3), 0);
        assert_eq!(nitrogen.implicit_hydrogens(4), 1);
        // Ammonium: no bonds, +1 charge folded in as -1
        assert_eq!(nitrogen.implicit_hydrogens(-1), 4);

        let iron = Element::from_symbol("Fe").unwrap();
        assert_eq!(iron.implicit_hydrogens(0), 0);
    }
}
