use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use trawl_runtime::{DEFAULT_PROJECT_IGNORE_PATTERNS, DEFAULT_SYSTEM_SKIP_PREFIXES};

/// Gitignore-style patterns anchored at a crawl root.
#[derive(Debug)]
pub struct IgnoreEngine {
    root: PathBuf,
    matcher: Gitignore,
}

/// Subtrees that are never crawled, matched by path prefix.
#[derive(Debug, Clone, Default)]
pub struct UserExcludes {
    roots: Vec<PathBuf>,
}

/// Everything that can veto an entry before or after its stat.
#[derive(Debug, Default)]
pub struct ScanFilter {
    excludes: UserExcludes,
    ignore: Option<IgnoreEngine>,
}

impl IgnoreEngine {
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);
        for pat in patterns {
            builder.add_line(None, pat.as_ref())?;
        }

        Ok(IgnoreEngine {
            root: root.to_path_buf(),
            matcher: builder.build()?,
        })
    }

    #[inline]
    pub fn with_defaults(root: &Path) -> Result<Self, ignore::Error> {
        Self::new(root, DEFAULT_PROJECT_IGNORE_PATTERNS)
    }

    /// Paths outside the root never match; the matcher would panic on them.
    #[inline]
    #[must_use]
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if self.matcher.is_empty() || !path.starts_with(&self.root) || path == self.root {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}

impl UserExcludes {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut ux = UserExcludes::default();
        for root in roots {
            ux.add_root(root);
        }
        ux
    }

    pub fn with_system_defaults() -> Self {
        let mut ux = UserExcludes::default();
        #[cfg(unix)]
        {
            for p in DEFAULT_SYSTEM_SKIP_PREFIXES {
                ux.add_root(PathBuf::from(p));
            }
        }
        ux
    }

    pub fn add_root(&mut self, root: PathBuf) {
        // /var/run is a symlink to /run on many systems.
        let root = root.canonicalize().unwrap_or(root);

        if self.roots.iter().any(|existing| root.starts_with(existing)) {
            return;
        }

        // Drop roots the new one already covers
        self.roots.retain(|existing| !existing.starts_with(&root));
        self.roots.push(root);
    }

    #[inline]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ScanFilter {
    pub fn new(excludes: UserExcludes, ignore: Option<IgnoreEngine>) -> Self {
        Self { excludes, ignore }
    }

    /// System skip prefixes plus the default project patterns under `root`.
    pub fn with_defaults(root: &Path) -> Result<Self, ignore::Error> {
        Ok(Self {
            excludes: UserExcludes::with_system_defaults(),
            ignore: Some(IgnoreEngine::with_defaults(root)?),
        })
    }

    /// Decided from the path alone, before any stat.
    #[inline]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.is_excluded(path)
    }

    /// Needs the entry kind, so only after stat.
    #[inline]
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.ignore
            .as_ref()
            .is_some_and(|engine| engine.is_ignored(path, is_dir))
    }
}

#[cfg(test)]
#[path = "excludes_tests.rs"]
mod tests;
