//! Aromaticity perception.
//!
//! Both readers run [`set_aromaticity`] on every molecule, so a Kekulé
//! spelling (`C1=CC=CC=C1`, a molfile with alternating 1/2 bonds) and an
//! aromatic spelling (`c1ccccc1`, type 4 bonds) of one structure end up as
//! the same graph.
//!
//! Candidate rings are the shortest cycles through each ring bond, up to
//! [`MAX_RING_SIZE`] atoms. A ring is aromatic when every atom is sp2-like
//! and the pi electron count obeys Hückel's 4n + 2 rule. Two rings sharing a
//! bond, and whole fused systems, are tested as single envelopes as well, so
//! naphthalene and indole are recognised whichever Kekulé form they come in.
//! Atoms the reader already marked aromatic are trusted as they are.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::core::molecule::{BondOrder, Molecule};

/// Largest ring considered for aromaticity
pub const MAX_RING_SIZE: usize = 8;

/// A cycle as sorted atom and bond indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

impl Ring {
    fn from_sets(atoms: BTreeSet<usize>, bonds: BTreeSet<usize>) -> Self {
        Self {
            atoms: atoms.into_iter().collect(),
            bonds: bonds.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Distinct shortest cycles through each ring bond, at most
/// [`MAX_RING_SIZE`] atoms each, in order of first discovery
#[must_use]
pub fn smallest_rings(mol: &Molecule) -> Vec<Ring> {
    let ring_bonds = mol.ring_bonds();
    let mut seen = BTreeSet::new();
    let mut rings = Vec::new();

    for bond in (0..mol.bond_count()).filter(|&b| ring_bonds[b]) {
        if let Some(ring) = shortest_cycle(mol, bond) {
            if seen.insert(ring.bonds.clone()) {
                rings.push(ring);
            }
        }
    }
    rings
}

/// Breadth-first search from one end of `bond` to the other without using it
fn shortest_cycle(mol: &Molecule, bond: usize) -> Option<Ring> {
    let b = mol.bond(bond);
    // atom -> (depth, previous atom and bond on the search tree)
    let mut reached: HashMap<usize, (usize, Option<(usize, usize)>)> = HashMap::new();
    reached.insert(b.begin, (0, None));
    let mut queue = VecDeque::from([b.begin]);

    while let Some(atom) = queue.pop_front() {
        if atom == b.end {
            break;
        }
        let depth = reached.get(&atom).map_or(0, |&(d, _)| d);
        if depth + 1 >= MAX_RING_SIZE {
            continue;
        }
        for &(next, via) in mol.neighbors(atom) {
            if via == bond || reached.contains_key(&next) {
                continue;
            }
            reached.insert(next, (depth + 1, Some((atom, via))));
            queue.push_back(next);
        }
    }

    if !reached.contains_key(&b.end) {
        return None;
    }
    let mut atoms = BTreeSet::from([b.end]);
    let mut bonds = BTreeSet::from([bond]);
    let mut current = b.end;
    while let Some(&(_, Some((prev, via)))) = reached.get(&current) {
        atoms.insert(prev);
        bonds.insert(via);
        current = prev;
    }
    Some(Ring::from_sets(atoms, bonds))
}

/// Pi electrons `atom` donates to the ring system `members`, or `None` if
/// the atom cannot take part in an aromatic system
fn pi_electrons(mol: &Molecule, atom: usize, members: &BTreeSet<usize>) -> Option<u32> {
    let a = mol.atom(atom);
    if a.aromatic || !a.element.can_be_aromatic() {
        return None;
    }

    let mut endocyclic = 0;
    let mut exocyclic = Vec::new();
    for &(next, bond) in mol.neighbors(atom) {
        match mol.bond(bond).order {
            BondOrder::Single => {}
            BondOrder::Double if members.contains(&next) => endocyclic += 1,
            BondOrder::Double => exocyclic.push(next),
            BondOrder::Triple | BondOrder::Aromatic => return None,
        }
    }

    match (endocyclic, exocyclic.as_slice()) {
        (1, []) => Some(1),
        // Exocyclic C=O, C=N, C=S pull the electron out of the ring
        (0, [partner]) if matches!(mol.atom(*partner).element.atomic_number, 7 | 8 | 16) => {
            Some(0)
        }
        (0, []) => lone_pair_electrons(mol, atom),
        _ => None,
    }
}

/// Contribution of an atom with no double bonds
fn lone_pair_electrons(mol: &Molecule, atom: usize) -> Option<u32> {
    let a = mol.atom(atom);
    let connections = mol.degree(atom) + usize::from(mol.attached_hydrogens(atom));
    match (a.element.atomic_number, a.charge) {
        (6, -1) => Some(2),
        (6, 1) | (5, 0) => Some(0),
        (7 | 15 | 33, 0) if connections == 3 => Some(2),
        (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
        _ => None,
    }
}

fn is_huckel(mol: &Molecule, atoms: &BTreeSet<usize>) -> bool {
    let mut total = 0;
    for &atom in atoms {
        match pi_electrons(mol, atom, atoms) {
            Some(e) => total += e,
            None => return false,
        }
    }
    total % 4 == 2
}

fn union_of<'a>(
    rings: impl IntoIterator<Item = &'a Ring>,
) -> (BTreeSet<usize>, BTreeSet<usize>) {
    let mut atoms = BTreeSet::new();
    let mut bonds = BTreeSet::new();
    for ring in rings {
        atoms.extend(ring.atoms.iter().copied());
        bonds.extend(ring.bonds.iter().copied());
    }
    (atoms, bonds)
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Rings and fused envelopes that pass the Hückel test
fn aromatic_systems(mol: &Molecule) -> Vec<Ring> {
    let rings = smallest_rings(mol);
    let mut systems = Vec::new();
    let mut single = vec![false; rings.len()];

    for (i, ring) in rings.iter().enumerate() {
        let atoms: BTreeSet<usize> = ring.atoms.iter().copied().collect();
        if is_huckel(mol, &atoms) {
            single[i] = true;
            systems.push(ring.clone());
        }
    }

    // Rings sharing a bond, grouped into fused systems
    let mut by_bond: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, ring) in rings.iter().enumerate() {
        for &bond in &ring.bonds {
            by_bond.entry(bond).or_default().push(i);
        }
    }
    let mut pairs = BTreeSet::new();
    let mut parent: Vec<usize> = (0..rings.len()).collect();
    for members in by_bond.values() {
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                pairs.insert((i.min(j), i.max(j)));
                let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
                parent[ri] = rj;
            }
        }
    }

    for (i, j) in pairs {
        if single[i] && single[j] {
            continue;
        }
        let (atoms, bonds) = union_of([&rings[i], &rings[j]]);
        if is_huckel(mol, &atoms) {
            systems.push(Ring::from_sets(atoms, bonds));
        }
    }

    let mut fused: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..rings.len() {
        let root = find_root(&mut parent, i);
        fused.entry(root).or_default().push(i);
    }
    for members in fused.values().filter(|m| m.len() > 2) {
        let (atoms, bonds) = union_of(members.iter().map(|&i| &rings[i]));
        if is_huckel(mol, &atoms) {
            systems.push(Ring::from_sets(atoms, bonds));
        }
    }

    systems
}

/// For every atom, whether it is aromatic in the input or perceived as such
#[must_use]
pub fn find_aromatic_atoms(mol: &Molecule) -> Vec<bool> {
    let mut aromatic: Vec<bool> = mol.atoms().iter().map(|a| a.aromatic).collect();
    for system in aromatic_systems(mol) {
        for atom in system.atoms {
            aromatic[atom] = true;
        }
    }
    aromatic
}

/// Mark perceived aromatic rings on `mol`.
///
/// Atoms in an aromatic system get the aromatic flag with their current
/// hydrogen count pinned, and the system's bonds become aromatic. Aromatic
/// bonds outside any ring (the link in `c1ccccc1c1ccccc1`) become single.
pub fn set_aromaticity(mol: &mut Molecule) {
    let ring_bonds = mol.ring_bonds();
    for bond in 0..mol.bond_count() {
        if !ring_bonds[bond] && mol.bond(bond).order == BondOrder::Aromatic {
            mol.set_bond_order(bond, BondOrder::Single);
        }
    }

    let systems = aromatic_systems(mol);
    if systems.is_empty() {
        return;
    }
    let (atoms, bonds) = union_of(&systems);

    // Counts must be read before any flag flips the valence model
    let hydrogens: Vec<(usize, u8)> = atoms
        .iter()
        .map(|&atom| (atom, mol.attached_hydrogens(atom)))
        .collect();
    for (atom, count) in hydrogens {
        let a = mol.atom_mut(atom);
        a.explicit_hydrogens = Some(count);
        a.aromatic = true;
    }
    for bond in bonds {
        mol.set_bond_order(bond, BondOrder::Aromatic);
    }
}
