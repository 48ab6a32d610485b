use hashbrown::HashSet;

use crate::path::extension_of;

/// Extensions a crawl is interested in, normalised to lowercase without a
/// leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    exts: HashSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        exts.into_iter().collect()
    }

    #[inline]
    pub fn contains(&self, ext: &str) -> bool {
        self.exts.contains(ext)
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exts.len()
    }

    /// Sorted copy, for display and for handing to a store query.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut v: Vec<String> = self.exts.iter().cloned().collect();
        v.sort_unstable();
        v
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let exts = iter
            .into_iter()
            .filter_map(|s| normalize_extension(s.as_ref()))
            .collect();
        Self { exts }
    }
}

/// Lowercase, strip one leading dot, reject empty.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Whether `path`'s extension is one we record. The size threshold is
/// applied separately, once the size is known.
pub fn is_recordable(path: &str, allowed: &ExtensionSet) -> bool {
    let ext = extension_of(path);
    !ext.is_empty() && allowed.contains(&ext)
}

/// Quick-mode pre-filter, decided from the name alone.
///
/// `false` means the entry is confidently a file we don't want and can be
/// skipped without a stat. Extension-less names may be directories, and
/// short all-digit extensions are usually version-numbered directories
/// ("Tool 2021.3.1"), so both must be checked.
pub fn quick_scan_should_descend(path: &str, allowed: &ExtensionSet) -> bool {
    let ext = extension_of(path);
    ext.is_empty() || allowed.contains(&ext) || is_version_fragment(&ext)
}

#[inline]
fn is_version_fragment(ext: &str) -> bool {
    (1..=4).contains(&ext.len()) && ext.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
