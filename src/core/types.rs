use std::path::Path;

use serde::{Deserialize, Serialize};

/// Molecule file formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MoleculeFormat {
    /// MDL structure-data file (`.sdf`), V2000 molfile blocks separated by `$$$$`
    Sdf,
    /// Tab-delimited SMILES file (`.smi`): SMILES in column 0, name in column 1
    Smi,
}

impl MoleculeFormat {
    /// Resolve a format from a file extension (case-insensitive, without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "sdf" => Some(Self::Sdf),
            "smi" => Some(Self::Smi),
            _ => None,
        }
    }

    /// Resolve a format from the extension of a path
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for MoleculeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sdf => write!(f, "SDF"),
            Self::Smi => write!(f, "SMILES"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            MoleculeFormat::from_path(Path::new("a/b/query.sdf")),
            Some(MoleculeFormat::Sdf)
        );
        assert_eq!(
            MoleculeFormat::from_path(Path::new("LIB.SMI")),
            Some(MoleculeFormat::Smi)
        );
        assert_eq!(MoleculeFormat::from_path(Path::new("ligands.mol2")), None);
        assert_eq!(MoleculeFormat::from_path(Path::new("no_extension")), None);
    }
}
