use hashbrown::HashSet;
use trawl_fs::{ExtensionSet, FileRecord};

/// Lowercased record fields a clause can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Parent folder and file name
    Suffix,
    /// Ancestors above the suffix
    Prefix,
    /// The whole path
    Path,
}

impl Field {
    #[inline]
    pub fn of(self, record: &FileRecord) -> &str {
        match self {
            Field::Suffix => &record.suffix_path,
            Field::Prefix => &record.prefix_path,
            Field::Path => &record.path_lower,
        }
    }
}

/// One predicate over a record. A query is the conjunction of its clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `field` contains `needle` as a substring
    Contains { field: Field, needle: String },
    /// The record's extension is in the set. An empty set matches nothing.
    ExtensionIn(ExtensionSet),
    /// The record's exact path is not in the set
    PathNotIn(HashSet<String>),
}

impl Clause {
    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Clause::Contains {
            field,
            needle: needle.into(),
        }
    }

    /// One `Contains` per word, plus an `ExtensionIn` when a filter is given.
    pub fn for_words<S: AsRef<str>>(
        field: Field,
        words: &[S],
        extensions: Option<&ExtensionSet>,
    ) -> Vec<Clause> {
        let mut clauses: Vec<Clause> = words
            .iter()
            .map(|w| Clause::contains(field, w.as_ref()))
            .collect();
        if let Some(exts) = extensions {
            clauses.push(Clause::ExtensionIn(exts.clone()));
        }
        clauses
    }
}

/// Clauses normalised for evaluation.
///
/// Needles are case-folded (fields are stored lowercased), empty needles
/// are dropped since every string contains them, and repeats collapse.
#[derive(Debug, Clone, Default)]
pub struct CompiledQuery {
    needles: Vec<(Field, String)>,
    extensions: Vec<ExtensionSet>,
    excluded: Vec<HashSet<String>>,
}

impl CompiledQuery {
    pub fn compile(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut q = CompiledQuery::default();

        for clause in clauses {
            match clause {
                Clause::Contains { field, needle } => {
                    let needle = needle.to_lowercase();
                    if needle.is_empty() {
                        continue;
                    }
                    if !q.needles.iter().any(|(f, n)| *f == field && *n == needle) {
                        q.needles.push((field, needle));
                    }
                }
                Clause::ExtensionIn(set) => {
                    if !q.extensions.contains(&set) {
                        q.extensions.push(set);
                    }
                }
                Clause::PathNotIn(paths) => {
                    if !paths.is_empty() {
                        q.excluded.push(paths);
                    }
                }
            }
        }

        // Longest first: they reject the most candidates.
        q.needles.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        q
    }

    /// True when no record can match, without looking at any.
    pub fn is_unsatisfiable(&self) -> bool {
        self.extensions.iter().any(ExtensionSet::is_empty)
    }

    pub fn needles(&self) -> impl Iterator<Item = (Field, &str)> {
        self.needles.iter().map(|(f, n)| (*f, n.as_str()))
    }

    pub fn matches(&self, record: &FileRecord) -> bool {
        self.extensions
            .iter()
            .all(|set| !record.extension.is_empty() && set.contains(&record.extension))
            && self
                .needles
                .iter()
                .all(|(field, needle)| field.of(record).contains(needle.as_str()))
            && !self
                .excluded
                .iter()
                .any(|paths| paths.contains(record.path.as_str()))
    }
}

#[cfg(test)]
#[path = "clause_tests.rs"]
mod tests;
