use std::path::Path;

use crate::core::molecule::Molecule;

/// An ordered, immutable set of molecules loaded from one file.
///
/// The position of a molecule in the collection is its row (query) or column
/// (database) index in the similarity matrix, so the order is file order and
/// never changes after loading.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Source identifier used in report headers (the file name)
    pub label: String,

    molecules: Vec<Molecule>,

    /// Records present in the file that failed to parse and were dropped
    pub skipped: usize,
}

impl Collection {
    #[must_use]
    pub fn new(label: impl Into<String>, molecules: Vec<Molecule>) -> Self {
        Self {
            label: label.into(),
            molecules,
            skipped: 0,
        }
    }

    #[must_use]
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// Label a collection after the final component of its source path
    #[must_use]
    pub fn label_for(path: &Path) -> String {
        path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Molecule> {
        self.molecules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Molecule;
    type IntoIter = std::slice::Iter<'a, Molecule>;

    fn into_iter(self) -> Self::IntoIter {
        self.molecules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_uses_file_name() {
        assert_eq!(
            Collection::label_for(Path::new("/data/screen/actives.smi")),
            "actives.smi"
        );
        assert_eq!(Collection::label_for(Path::new("lib.sdf")), "lib.sdf");
    }

    #[test]
    fn test_collection_preserves_order() {
        let molecules = vec![
            Molecule::new().with_name("first"),
            Molecule::new().with_name("second"),
        ];
        let collection = Collection::new("q.smi", molecules).with_skipped(3);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.skipped, 3);
        let names: Vec<_> = collection.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
