//! Mapping of (token, file name) pairs onto the storage tree.
//!
//! Every stored image lives at `<root>/<token>/<file_name>`. The locator is
//! pure path computation: it never touches the filesystem.
//!
//! # Path Safety
//!
//! Directory components of the raw file name are discarded first, so
//! `a/b/receipt.jpg` and `receipt.jpg` resolve to the same file. If the
//! remaining base name still contains `..` the request is rejected.
//!
//! This is a coarse filter. It does not canonicalize, does not resolve
//! symlinks, and does not undo encodings other than the percent-decoding the
//! HTTP router already performed. Tokens are checked with the same rules so a
//! token can never name more than one directory level.

use std::path::{Path, PathBuf};

use crate::error::LocatorError;

/// Resolves user tokens and file names to paths below a fixed storage root.
#[derive(Debug, Clone)]
pub struct StoreLocator {
    root: PathBuf,
}

impl StoreLocator {
    /// Create a locator rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root every resolved path lives under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every image stored under `token`.
    pub fn user_dir(&self, token: &str) -> Result<PathBuf, LocatorError> {
        check_token(token)?;
        Ok(self.root.join(token))
    }

    /// Resolve a raw file name for `token`.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::EmptyToken`] if `token` is empty
    /// - [`LocatorError::InvalidToken`] if `token` is not a single plain segment
    /// - [`LocatorError::InvalidFileName`] if the base name is empty, `.`, or contains `..`
    pub fn resolve(&self, token: &str, raw_file_name: &str) -> Result<PathBuf, LocatorError> {
        let dir = self.user_dir(token)?;
        let file_name = sanitize_file_name(raw_file_name)?;
        Ok(dir.join(file_name))
    }
}

/// Strip directory components from `raw`, keeping only the last segment.
///
/// Both `/` and `\` count as separators so that client-supplied Windows
/// paths lose their directories too.
pub fn base_name(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Extract the base name of `raw` and reject it if it is unusable.
pub fn sanitize_file_name(raw: &str) -> Result<&str, LocatorError> {
    let name = base_name(raw);
    if name.is_empty() || name == "." || name.contains("..") || name.contains('\0') {
        return Err(LocatorError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

fn check_token(token: &str) -> Result<(), LocatorError> {
    if token.is_empty() {
        return Err(LocatorError::EmptyToken);
    }
    if token == "." || token.contains("..") || token.contains(['/', '\\', '\0']) {
        return Err(LocatorError::InvalidToken);
    }
    Ok(())
}
