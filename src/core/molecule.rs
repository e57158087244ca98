use std::collections::BTreeMap;

use crate::chem::element::Element;

/// Bond multiplicity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribution of the bond to an atom's valence. Aromatic bonds count as
    /// one; the shared pi electron is accounted for per atom.
    #[must_use]
    pub fn valence_contribution(self) -> i32 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Stable small integer used when hashing atom environments
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Aromatic => 12,
        }
    }
}

/// A single atom in a molecular graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub element: Element,
    pub charge: i8,
    /// Explicit mass number (`[13C]`, `M  ISO`)
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// Hydrogen count fixed by the input (bracket atoms). `None` means the
    /// count is derived from the default valence model.
    pub explicit_hydrogens: Option<u8>,
}

impl Atom {
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            isotope: None,
            aromatic: false,
            explicit_hydrogens: None,
        }
    }

    #[must_use]
    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    #[must_use]
    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = Some(isotope);
        self
    }

    #[must_use]
    pub fn aromatic(mut self) -> Self {
        self.aromatic = true;
        self
    }

    #[must_use]
    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.explicit_hydrogens = Some(count);
        self
    }
}

/// An undirected bond between two atom indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    /// The atom on the other side of the bond from `atom`
    #[must_use]
    pub fn other(&self, atom: usize) -> usize {
        if self.begin == atom {
            self.end
        } else {
            self.begin
        }
    }
}

/// A parsed molecular structure.
///
/// The graph is immutable once it has been handed to a [`Collection`]; all
/// derived properties (neighbours, hydrogen counts, ring membership) are
/// computed from the atom and bond lists.
///
/// [`Collection`]: crate::core::collection::Collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    /// Record title (SMILES name column, molfile header line)
    pub name: Option<String>,

    atoms: Vec<Atom>,
    bonds: Vec<Bond>,

    /// `adjacency[atom]` lists `(neighbor, bond_index)` in insertion order
    adjacency: Vec<Vec<(usize, usize)>>,

    /// SD data items (`> <TAG>` blocks), kept for reporting
    pub properties: BTreeMap<String, String>,
}

impl Molecule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an atom and return its index
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Add a bond between two existing atoms. Returns the bond index, or
    /// `None` if an index is out of range, the atoms are identical, or the
    /// pair is already bonded.
    pub fn add_bond(&mut self, begin: usize, end: usize, order: BondOrder) -> Option<usize> {
        if begin == end || begin >= self.atoms.len() || end >= self.atoms.len() {
            return None;
        }
        if self.bond_between(begin, end).is_some() {
            return None;
        }
        let index = self.bonds.len();
        self.bonds.push(Bond { begin, end, order });
        self.adjacency[begin].push((end, index));
        self.adjacency[end].push((begin, index));
        Some(index)
    }

    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[must_use]
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    #[must_use]
    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    /// Mutable access for readers that patch atoms after the bond block
    /// (molfile property lines, aromatic bond flags)
    pub fn atom_mut(&mut self, index: usize) -> &mut Atom {
        &mut self.atoms[index]
    }

    /// Change a bond's order in place, for aromaticity perception
    pub fn set_bond_order(&mut self, index: usize, order: BondOrder) {
        self.bonds[index].order = order;
    }

    #[must_use]
    pub fn bond(&self, index: usize) -> &Bond {
        &self.bonds[index]
    }

    /// `(neighbor, bond_index)` pairs of an atom
    #[must_use]
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    #[must_use]
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, bond)| *bond)
    }

    /// Number of explicit graph neighbours
    #[must_use]
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Sum of bond valence contributions, plus one for an aromatic atom that
    /// takes part in at least one aromatic bond
    #[must_use]
    pub fn bond_valence(&self, atom: usize) -> i32 {
        let mut total = 0;
        let mut has_aromatic_bond = false;
        for &(_, bond) in &self.adjacency[atom] {
            let order = self.bonds[bond].order;
            has_aromatic_bond |= order == BondOrder::Aromatic;
            total += order.valence_contribution();
        }
        if self.atoms[atom].aromatic && has_aromatic_bond {
            total += 1;
        }
        total
    }

    /// Hydrogens implied by the default valence model, ignoring any explicit
    /// count. Formal charge shifts the target valence (`[NH4+]`, `[O-]`).
    #[must_use]
    pub fn implicit_hydrogens(&self, atom: usize) -> u8 {
        let a = &self.atoms[atom];
        let charge = i32::from(a.charge);
        let valence = if matches!(a.element.atomic_number, 5 | 6 | 14) {
            self.bond_valence(atom) + charge.abs()
        } else {
            self.bond_valence(atom) - charge
        };

        if a.aromatic {
            // Only the lowest valence is meaningful for aromatic atoms
            let Some(default) = a.element.default_valence() else {
                return 0;
            };
            return u8::try_from((i32::from(default) - valence).max(0)).unwrap_or(0);
        }
        a.element.implicit_hydrogens(valence)
    }

    /// Hydrogens attached to the atom that are not graph nodes
    #[must_use]
    pub fn attached_hydrogens(&self, atom: usize) -> u8 {
        self.atoms[atom]
            .explicit_hydrogens
            .unwrap_or_else(|| self.implicit_hydrogens(atom))
    }

    /// Attached hydrogens plus hydrogen atoms present as graph nodes
    #[must_use]
    pub fn total_hydrogens(&self, atom: usize) -> u32 {
        let graph_h = self.adjacency[atom]
            .iter()
            .filter(|(n, _)| self.atoms[*n].element.atomic_number == 1)
            .count();
        u32::from(self.attached_hydrogens(atom)) + u32::try_from(graph_h).unwrap_or(u32::MAX)
    }

    /// Non-hydrogen neighbour count
    #[must_use]
    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .filter(|(n, _)| self.atoms[*n].element.atomic_number != 1)
            .count()
    }

    /// For every bond, whether it lies on a cycle (i.e. is not a bridge)
    #[must_use]
    pub fn ring_bonds(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut discovery = vec![0usize; n];
        let mut low = vec![0usize; n];
        let mut in_ring = vec![true; self.bonds.len()];
        let mut timer = 1;

        // (atom, bond it was entered through, next adjacency slot)
        let mut stack: Vec<(usize, Option<usize>, usize)> = Vec::new();

        for start in 0..n {
            if discovery[start] != 0 {
                continue;
            }
            discovery[start] = timer;
            low[start] = timer;
            timer += 1;
            stack.push((start, None, 0));

            while let Some(frame) = stack.last_mut() {
                let (atom, parent_bond, slot) = *frame;
                if let Some(&(next, bond)) = self.adjacency[atom].get(slot) {
                    frame.2 += 1;
                    if Some(bond) == parent_bond {
                        continue;
                    }
                    if discovery[next] == 0 {
                        discovery[next] = timer;
                        low[next] = timer;
                        timer += 1;
                        stack.push((next, Some(bond), 0));
                    } else {
                        low[atom] = low[atom].min(discovery[next]);
                    }
                } else {
                    stack.pop();
                    if let (Some(bond), Some(&(parent, _, _))) = (parent_bond, stack.last()) {
                        low[parent] = low[parent].min(low[atom]);
                        if low[atom] > discovery[parent] {
                            in_ring[bond] = false;
                        }
                    }
                }
            }
        }
        in_ring
    }

    /// For every atom, whether it belongs to at least one ring
    #[must_use]
    pub fn ring_atoms(&self) -> Vec<bool> {
        let ring_bonds = self.ring_bonds();
        let mut atoms = vec![false; self.atoms.len()];
        for (bond, _) in self.bonds.iter().enumerate().filter(|(i, _)| ring_bonds[*i]) {
            atoms[self.bonds[bond].begin] = true;
            atoms[self.bonds[bond].end] = true;
        }
        atoms
    }

    /// Connected components as lists of atom indices, each in ascending order
    #[must_use]
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut components = Vec::new();
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut component = Vec::new();
            seen[start] = true;
            while let Some(atom) = stack.pop() {
                component.push(atom);
                for &(next, _) in &self.adjacency[atom] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Deterministic canonical SMILES for this structure
    #[must_use]
    pub fn to_canonical_smiles(&self) -> String {
        crate::chem::canon::canonical_smiles(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom::new(Element::from_symbol("C").unwrap())
    }

    fn oxygen() -> Atom {
        Atom::new(Element::from_symbol("O").unwrap())
    }

    fn ethanol() -> Molecule {
        let mut mol = Molecule::new();
        let c1 = mol.add_atom(carbon());
        let c2 = mol.add_atom(carbon());
        let o = mol.add_atom(oxygen());
        mol.add_bond(c1, c2, BondOrder::Single);
        mol.add_bond(c2, o, BondOrder::Single);
        mol
    }

    #[test]
    fn test_hydrogen_counts() {
        let mol = ethanol();
        assert_eq!(mol.total_hydrogens(0), 3);
        assert_eq!(mol.total_hydrogens(1), 2);
        assert_eq!(mol.total_hydrogens(2), 1);
    }

    #[test]
    fn test_add_bond_rejects_invalid() {
        let mut mol = ethanol();
        assert!(mol.add_bond(0, 0, BondOrder::Single).is_none());
        assert!(mol.add_bond(0, 9, BondOrder::Single).is_none());
        assert!(mol.add_bond(1, 0, BondOrder::Double).is_none());
        assert_eq!(mol.bond_count(), 2);
    }

    #[test]
    fn test_charged_hydrogens() {
        let mut mol = Molecule::new();
        mol.add_atom(oxygen().with_charge(-1));
        assert_eq!(mol.implicit_hydrogens(0), 1);

        let mut ammonium = Molecule::new();
        ammonium.add_atom(Atom::new(Element::from_symbol("N").unwrap()).with_charge(1));
        assert_eq!(ammonium.implicit_hydrogens(0), 4);
    }

    #[test]
    fn test_aromatic_hydrogens() {
        // Benzene ring of aromatic carbons
        let mut mol = Molecule::new();
        for _ in 0..6 {
            mol.add_atom(carbon().aromatic());
        }
        for i in 0..6 {
            mol.add_bond(i, (i + 1) % 6, BondOrder::Aromatic);
        }
        assert!((0..6).all(|i| mol.total_hydrogens(i) == 1));
    }

    #[test]
    fn test_ring_detection() {
        // Cyclopropane with a methyl tail
        let mut mol = Molecule::new();
        for _ in 0..4 {
            mol.add_atom(carbon());
        }
        mol.add_bond(0, 1, BondOrder::Single);
        mol.add_bond(1, 2, BondOrder::Single);
        mol.add_bond(2, 0, BondOrder::Single);
        mol.add_bond(2, 3, BondOrder::Single);

        assert_eq!(mol.ring_bonds(), vec![true, true, true, false]);
        assert_eq!(mol.ring_atoms(), vec![true, true, true, false]);
    }

    #[test]
    fn test_ring_detection_fused_and_bridged() {
        // Bicyclo[2.2.0]hexane with an ethyl tail on atom 0
        let mut mol = Molecule::new();
        for _ in 0..8 {
            mol.add_atom(carbon());
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (2, 4), (4, 5), (5, 3), (0, 6), (6, 7)] {
            mol.add_bond(a, b, BondOrder::Single);
        }
        let ring = mol.ring_bonds();
        assert!(ring[..7].iter().all(|&r| r));
        assert!(!ring[7] && !ring[8]);
    }

    #[test]
    fn test_long_chain_ring_scan() {
        let mut mol = Molecule::new();
        let n = 200_000;
        for _ in 0..n {
            mol.add_atom(carbon());
        }
        for i in 1..n {
            mol.add_bond(i - 1, i, BondOrder::Single);
        }
        mol.add_bond(n - 1, n - 4, BondOrder::Single);

        let ring = mol.ring_atoms();
        assert_eq!(ring.iter().filter(|&&r| r).count(), 4);
        assert!(ring[n - 1] && ring[n - 4] && !ring[n - 5]);
    }

    #[test]
    fn test_components() {
        let mut mol = ethanol();
        mol.add_atom(oxygen());
        assert_eq!(mol.components(), vec![vec![0, 1, 2], vec![3]]);
    }
}
