use std::path::{Path, PathBuf};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Paths in the configuration are relative to the configuration file.
/// Absolute paths are kept as they are.
pub fn resolve(root_path: &Path, file_path: &str) -> String {
    let p: PathBuf = root_path.join(file_path);
    p.as_path().display().to_string()
}

/// The lower-case extension of a file, if any.
pub fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}
