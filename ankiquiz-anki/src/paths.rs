use ankiquiz_core::CoreError;
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix of an Anki profile database.
pub const COLLECTION_SUFFIX: &str = "collection.anki2";

/// Anki's data folder: `~/.local/share/Anki2`, `~/Library/Application Support/Anki2`
/// or `%APPDATA%\Anki2`.
pub fn anki_base_dir() -> Result<PathBuf, CoreError> {
    let base = BaseDirs::new().ok_or(CoreError::PathNotFound)?;
    let dir = base.data_dir().join("Anki2");
    if !dir.is_dir() {
        return Err(CoreError::PathNotFound);
    }
    Ok(dir)
}

/// First `*collection.anki2` file under `base`, in sorted walk order.
pub fn find_collection(base: &Path) -> Result<PathBuf, CoreError> {
    if !base.is_dir() {
        return Err(CoreError::PathNotFound);
    }
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_string_lossy().ends_with(COLLECTION_SUFFIX))
        .map(|e| e.into_path())
        .ok_or(CoreError::StoreNotFound)
}

/// Media folder that sits next to a collection file.
pub fn media_dir_for(collection: &Path) -> PathBuf {
    collection
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collection.media")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_first_profile_collection() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("User 2")).unwrap();
        fs::create_dir_all(dir.path().join("User 1")).unwrap();
        fs::write(dir.path().join("User 2").join("collection.anki2"), b"").unwrap();
        fs::write(dir.path().join("User 1").join("collection.anki2"), b"").unwrap();
        fs::write(dir.path().join("prefs21.db"), b"").unwrap();

        let found = find_collection(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("User 1").join("collection.anki2"));
        assert_eq!(media_dir_for(&found), dir.path().join("User 1").join("collection.media"));
    }

    #[test]
    fn missing_store_and_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_collection(dir.path()), Err(CoreError::StoreNotFound));
        assert_eq!(
            find_collection(&dir.path().join("nope")),
            Err(CoreError::PathNotFound)
        );
    }
}
