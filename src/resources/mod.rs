//! API resources sharing one [`crate::LaraClient`]

pub mod documents;
pub mod glossaries;
pub mod memories;

use std::path::Path;

/// Last path component, used as the uploaded file name
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}
