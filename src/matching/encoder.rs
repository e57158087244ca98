//! Fingerprint encoding for whole collections.

use thiserror::Error;

use crate::chem::fingerprint::{BitVector, FingerprintError, Fingerprinter};
use crate::core::collection::Collection;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(
        "Fingerprint generation failed for record {index} ({title}) of {label}: {source}",
        title = .name.as_deref().unwrap_or("unnamed")
    )]
    Fingerprint {
        label: String,
        index: usize,
        name: Option<String>,
        #[source]
        source: FingerprintError,
    },
}

/// Fingerprints index-aligned with the collection they were computed from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintSet {
    fingerprints: Vec<BitVector>,
}

impl FingerprintSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BitVector> {
        self.fingerprints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BitVector> {
        self.fingerprints.iter()
    }
}

impl FromIterator<BitVector> for FingerprintSet {
    fn from_iter<I: IntoIterator<Item = BitVector>>(iter: I) -> Self {
        Self {
            fingerprints: iter.into_iter().collect(),
        }
    }
}

/// Fingerprint every molecule of `collection` with the same `fingerprinter`.
///
/// Fingerprint `i` belongs to molecule `i`. A molecule that cannot be
/// encoded fails the whole call: dropping it would shift every later index.
///
/// # Errors
///
/// Returns `EncodeError::Fingerprint` for the first molecule the
/// fingerprinter rejects.
pub fn encode<F>(collection: &Collection, fingerprinter: &F) -> Result<FingerprintSet, EncodeError>
where
    F: Fingerprinter + ?Sized,
{
    collection
        .iter()
        .enumerate()
        .map(|(index, mol)| {
            fingerprinter
                .fingerprint(mol)
                .map_err(|source| EncodeError::Fingerprint {
                    label: collection.label.clone(),
                    index,
                    name: mol.name.clone(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::fingerprint::MorganFingerprinter;
    use crate::chem::smiles::{parse_smiles, parse_smiles_named};
    use crate::core::molecule::Molecule;

    /// Sets bit `atom_count` so each fingerprint identifies its molecule
    struct AtomCountFingerprinter;

    impl Fingerprinter for AtomCountFingerprinter {
        fn fingerprint(&self, mol: &Molecule) -> Result<BitVector, FingerprintError> {
            Ok(BitVector::from_bits(64, &[mol.atom_count()]))
        }
    }

    /// Refuses molecules with more than `max_atoms` atoms
    struct PickyFingerprinter {
        max_atoms: usize,
    }

    impl Fingerprinter for PickyFingerprinter {
        fn fingerprint(&self, mol: &Molecule) -> Result<BitVector, FingerprintError> {
            if mol.atom_count() > self.max_atoms {
                Err(FingerprintError::EmptyMolecule)
            } else {
                Ok(BitVector::new(64))
            }
        }
    }

    fn collection(smiles: &[&str]) -> Collection {
        let molecules = smiles.iter().map(|s| parse_smiles(s).unwrap()).collect();
        Collection::new("test.smi", molecules)
    }

    #[test]
    fn test_encode_preserves_alignment() {
        let coll = collection(&["C", "CCCC", "CC", "CCC"]);
        let set = encode(&coll, &AtomCountFingerprinter).unwrap();

        assert_eq!(set.len(), coll.len());
        for (i, mol) in coll.iter().enumerate() {
            assert!(set.get(i).unwrap().get(mol.atom_count()));
        }
    }

    #[test]
    fn test_encode_empty_collection() {
        let set = encode(&Collection::new("empty.smi", Vec::new()), &AtomCountFingerprinter).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let coll = collection(&["CCO", "c1ccccc1O", "CC(=O)N"]);
        let morgan = MorganFingerprinter::default();
        assert_eq!(encode(&coll, &morgan).unwrap(), encode(&coll, &morgan).unwrap());
    }

    #[test]
    fn test_encode_failure_is_fatal_and_names_record() {
        let molecules = vec![
            parse_smiles_named("CC", Some("ethane")).unwrap(),
            parse_smiles_named("CCCCC", Some("pentane")).unwrap(),
            parse_smiles_named("CCCCCC", Some("hexane")).unwrap(),
        ];
        let coll = Collection::new("db.smi", molecules);

        let err = encode(&coll, &PickyFingerprinter { max_atoms: 3 }).unwrap_err();
        let EncodeError::Fingerprint { index, name, .. } = &err;
        assert_eq!(*index, 1);
        assert_eq!(name.as_deref(), Some("pentane"));
        assert!(err.to_string().contains("pentane"));
        assert!(err.to_string().contains("db.smi"));
    }
}
