//! Utility functions for path handling inside the downloads directory

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve a client-supplied file name to a path inside `dir`
///
/// Only a single plain path component is accepted, so a name can never
/// address anything outside the directory. The returned path is not checked
/// for existence.
///
/// # Examples
///
/// ```
/// use media_dl::utils::resolve_in_dir;
/// use std::path::Path;
///
/// let dir = Path::new("downloads");
/// assert_eq!(resolve_in_dir(dir, "song.mp3").unwrap(), dir.join("song.mp3"));
/// assert!(resolve_in_dir(dir, "../secret").is_err());
/// ```
pub fn resolve_in_dir(dir: &Path, name: &str) -> Result<PathBuf> {
    let not_found = || Error::FileNotFound(name.to_string());

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(not_found());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => Ok(dir.join(component)),
        _ => Err(not_found()),
    }
}
