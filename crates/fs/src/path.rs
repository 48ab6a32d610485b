use std::path::is_separator;

/// Case-folded fields derived from a full path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParts {
    pub path_lower: String,
    pub prefix_path: String,
    pub suffix_path: String,
    pub extension: String,
}

/// Split a path into every segment but the last two, and those last two.
///
/// The separator between the halves is dropped, so
/// `prefix + sep + suffix == path` whenever `prefix` is non-empty. Paths
/// with fewer than three segments yield an empty prefix and the whole path
/// (minus a leading separator) as the suffix.
pub fn split_suffix(path: &str) -> (&str, &str) {
    let mut seps = path
        .char_indices()
        .rev()
        .filter(|&(_, c)| is_separator(c))
        .map(|(i, _)| i);

    match (seps.next(), seps.next()) {
        // Separators are ASCII, so `cut + 1` is a char boundary.
        (Some(_), Some(cut)) => (&path[..cut], &path[cut + 1..]),
        _ => ("", path),
    }
}

/// Lowercase text after the final `.`, or empty if there is none.
///
/// A dot that belongs to an ancestor directory (`a.d/file`) does not make
/// an extension.
pub fn extension_of(path: &str) -> String {
    match path.rfind('.') {
        Some(dot) => {
            let tail = &path[dot + 1..];
            if tail.contains(is_separator) {
                String::new()
            } else {
                tail.to_lowercase()
            }
        }
        None => String::new(),
    }
}

pub fn decompose(path: &str) -> PathParts {
    let (prefix, suffix) = split_suffix(path);

    PathParts {
        path_lower: path.to_lowercase(),
        prefix_path: prefix.to_lowercase(),
        suffix_path: suffix.to_lowercase(),
        extension: extension_of(path),
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
