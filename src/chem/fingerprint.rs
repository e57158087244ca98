//! Fixed-width bit-vector fingerprints and the Tanimoto coefficient.
//!
//! [`MorganFingerprinter`] produces circular (ECFP-style) fingerprints: every
//! atom starts from an invariant identifier, which is re-hashed together with
//! its neighbours' identifiers once per radius step. Every identifier seen at
//! any step is folded into the bit vector by `id % n_bits`. The hashing is a
//! fixed 64-bit mix, so fingerprints are identical across runs and platforms.

use thiserror::Error;

use crate::core::molecule::Molecule;

/// Default circular fingerprint radius (ECFP4)
pub const DEFAULT_RADIUS: u32 = 2;

/// Default fingerprint width in bits
pub const DEFAULT_N_BITS: usize = 2048;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("cannot fingerprint a molecule with no atoms")]
    EmptyMolecule,

    #[error("fingerprint width must be at least one bit")]
    ZeroWidth,
}

/// A fixed-width bit vector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    n_bits: usize,
    words: Vec<u64>,
}

impl BitVector {
    #[must_use]
    pub fn new(n_bits: usize) -> Self {
        Self {
            n_bits,
            words: vec![0; n_bits.div_ceil(64)],
        }
    }

    /// Build a vector with the given bits set; out-of-range bits are ignored
    #[must_use]
    pub fn from_bits(n_bits: usize, bits: &[usize]) -> Self {
        let mut bv = Self::new(n_bits);
        for &bit in bits {
            bv.set(bit);
        }
        bv
    }

    /// Set a bit. Out-of-range indices are ignored.
    pub fn set(&mut self, bit: usize) {
        if bit < self.n_bits {
            self.words[bit / 64] |= 1 << (bit % 64);
        }
    }

    #[must_use]
    pub fn get(&self, bit: usize) -> bool {
        bit < self.n_bits && self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    /// Width in bits
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_bits
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Indices of set bits, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_bits).filter(|&bit| self.get(bit))
    }

    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

/// Produces a fingerprint for a molecule
pub trait Fingerprinter {
    /// # Errors
    ///
    /// Returns a `FingerprintError` if the molecule cannot be encoded.
    fn fingerprint(&self, mol: &Molecule) -> Result<BitVector, FingerprintError>;
}

/// Similarity coefficient between two fingerprints, bounded to `[0, 1]`
pub trait SimilarityMetric {
    fn similarity(&self, a: &BitVector, b: &BitVector) -> f64;
}

/// Circular connectivity fingerprint with a fixed radius and width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorganFingerprinter {
    pub radius: u32,
    pub n_bits: usize,
}

impl Default for MorganFingerprinter {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            n_bits: DEFAULT_N_BITS,
        }
    }
}

impl MorganFingerprinter {
    #[must_use]
    pub fn new(radius: u32, n_bits: usize) -> Self {
        Self { radius, n_bits }
    }

    fn atom_invariant(mol: &Molecule, atom: usize, in_ring: bool) -> u64 {
        let a = mol.atom(atom);
        let delta_mass = a
            .isotope
            .map_or(0, |iso| i64::from(iso) - i64::from(a.element.mass_number));

        [
            u64::from(a.element.atomic_number),
            u64::try_from(mol.heavy_degree(atom)).unwrap_or(u64::MAX),
            u64::from(mol.total_hydrogens(atom)),
            signed_bits(i64::from(a.charge)),
            signed_bits(delta_mass),
            u64::from(in_ring),
        ]
        .into_iter()
        .fold(0, hash_combine)
    }
}

impl Fingerprinter for MorganFingerprinter {
    fn fingerprint(&self, mol: &Molecule) -> Result<BitVector, FingerprintError> {
        if self.n_bits == 0 {
            return Err(FingerprintError::ZeroWidth);
        }
        if mol.is_empty() {
            return Err(FingerprintError::EmptyMolecule);
        }

        let mut bits = BitVector::new(self.n_bits);
        let width = u64::try_from(self.n_bits).unwrap_or(u64::MAX);
        // The remainder is below `n_bits`, so it always fits back into usize
        let fold = |id: u64| usize::try_from(id % width).unwrap_or(0);

        let ring_atoms = mol.ring_atoms();
        let mut ids: Vec<u64> = (0..mol.atom_count())
            .map(|atom| Self::atom_invariant(mol, atom, ring_atoms[atom]))
            .collect();
        for &id in &ids {
            bits.set(fold(id));
        }

        for layer in 0..self.radius {
            let next: Vec<u64> = (0..mol.atom_count())
                .map(|atom| {
                    let mut environment: Vec<(u64, u64)> = mol
                        .neighbors(atom)
                        .iter()
                        .map(|&(n, bond)| (mol.bond(bond).order.code(), ids[n]))
                        .collect();
                    environment.sort_unstable();

                    environment
                        .into_iter()
                        .fold(hash_combine(u64::from(layer) + 1, ids[atom]), |h, (order, id)| {
                            hash_combine(hash_combine(h, order), id)
                        })
                })
                .collect();
            for &id in &next {
                bits.set(fold(id));
            }
            ids = next;
        }

        Ok(bits)
    }
}

/// Tanimoto (Jaccard) coefficient: |A ∩ B| / |A ∪ B|
///
/// Two vectors with no bits set score 0.0, so empty fingerprints never look
/// like perfect matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tanimoto;

impl SimilarityMetric for Tanimoto {
    fn similarity(&self, a: &BitVector, b: &BitVector) -> f64 {
        let words = a.words.len().max(b.words.len());
        let mut common = 0u32;
        let mut union = 0u32;
        for i in 0..words {
            let x = a.words.get(i).copied().unwrap_or(0);
            let y = b.words.get(i).copied().unwrap_or(0);
            common += (x & y).count_ones();
            union += (x | y).count_ones();
        }
        if union == 0 {
            0.0
        } else {
            f64::from(common) / f64::from(union)
        }
    }
}

/// Two's-complement bit pattern of a signed invariant, for hashing
#[allow(clippy::cast_sign_loss)]
fn signed_bits(value: i64) -> u64 {
    value as u64
}

/// SplitMix64 finaliser
fn mix(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ mix(value)
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::smiles::parse_smiles;

    fn fp(smiles: &str) -> BitVector {
        MorganFingerprinter::default()
            .fingerprint(&parse_smiles(smiles).unwrap())
            .unwrap()
    }

    #[test]
    fn test_bitvector_basics() {
        let mut bv = BitVector::new(130);
        assert_eq!(bv.words().len(), 3);
        bv.set(0);
        bv.set(64);
        bv.set(129);
        bv.set(500); // ignored
        assert!(bv.get(64));
        assert!(!bv.get(65));
        assert_eq!(bv.count_ones(), 3);
        assert_eq!(bv.ones().collect::<Vec<_>>(), vec![0, 64, 129]);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fp("CC(=O)Oc1ccccc1C(=O)O");
        let b = fp("CC(=O)Oc1ccccc1C(=O)O");
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_N_BITS);
        assert!(a.count_ones() > 0);
    }

    #[test]
    fn test_fingerprint_ignores_atom_order() {
        assert_eq!(fp("OCC"), fp("CCO"));
        assert_eq!(fp("c1ccccc1C"), fp("Cc1ccccc1"));
    }

    #[test]
    fn test_signed_invariants() {
        assert_eq!(signed_bits(0), 0);
        assert_eq!(signed_bits(-1), u64::MAX);
        assert_eq!(signed_bits(3), 3);

        // Mass number equal to the element's most common isotope hashes like
        // an unlabelled atom; lighter and heavier labels are distinct
        assert_eq!(fp("[12CH4]"), fp("C"));
        assert_ne!(fp("[11CH4]"), fp("C"));
        assert_ne!(fp("[11CH4]"), fp("[13CH4]"));
        assert_ne!(fp("[O-]C"), fp("[O+]C"));
    }

    #[test]
    fn test_fingerprint_errors() {
        let empty = Molecule::new();
        assert_eq!(
            MorganFingerprinter::default().fingerprint(&empty),
            Err(FingerprintError::EmptyMolecule)
        );
        let mol = parse_smiles("C").unwrap();
        assert_eq!(
            MorganFingerprinter::new(2, 0).fingerprint(&mol),
            Err(FingerprintError::ZeroWidth)
        );
    }

    #[test]
    fn test_radius_zero_sets_atom_bits_only() {
        let mol = parse_smiles("CCO").unwrap();
        let bv = MorganFingerprinter::new(0, 2048).fingerprint(&mol).unwrap();
        // Methyl carbon, methylene carbon, hydroxyl oxygen
        assert!(bv.count_ones() <= 3);
        assert!(bv.count_ones() >= 1);
    }

    #[test]
    fn test_tanimoto_identity_and_bounds() {
        let a = fp("CCO");
        let b = fp("CCN");
        let c = fp("c1ccccc1");

        assert!((Tanimoto.similarity(&a, &a) - 1.0).abs() < 1e-12);
        for (x, y) in [(&a, &b), (&a, &c), (&b, &c)] {
            let s = Tanimoto.similarity(x, y);
            assert!((0.0..=1.0).contains(&s));
            assert!((s - Tanimoto.similarity(y, x)).abs() < 1e-12);
        }
        assert!(Tanimoto.similarity(&a, &b) > Tanimoto.similarity(&a, &c));
    }

    #[test]
    fn test_tanimoto_hand_computed() {
        let a = BitVector::from_bits(64, &[1, 2, 3]);
        let b = BitVector::from_bits(64, &[2, 3, 4, 5]);
        // |A ∩ B| = 2, |A ∪ B| = 5
        assert!((Tanimoto.similarity(&a, &b) - 0.4).abs() < 1e-12);

        let empty = BitVector::new(64);
        assert_eq!(Tanimoto.similarity(&empty, &empty), 0.0);
    }
}
