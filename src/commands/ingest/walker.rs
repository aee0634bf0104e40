use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::model::{Category, Period};

/// Year directories are exactly four digits; anything else under a category
/// root that still ends in `.json` is a period-encoding mistake we must not
/// guess around.
pub(crate) fn year_pattern() -> Result<Regex> {
    Regex::new(r"^\d{4}$").context("failed to compile year directory pattern")
}

/// Recursively collects every `.json` document below the category root.
/// Traversal order is whatever the filesystem yields; nothing downstream
/// depends on it.
pub(crate) fn discover_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            documents.push(path.to_path_buf());
        }
    }

    Ok(documents)
}

/// Derives the (year, quarter) period from a document path: the parent
/// directory name is the year, the filename stem is the quarter (1-4).
pub(crate) fn extract_period(
    category: Category,
    path: &Path,
    year_pattern: &Regex,
) -> Result<Period, LoadError> {
    let parent_name = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            LoadError::path_format(category.label(), path, "missing parent directory name")
        })?;

    if !year_pattern.is_match(parent_name) {
        return Err(LoadError::path_format(
            category.label(),
            path,
            format!("parent directory {parent_name:?} is not a four-digit year"),
        ));
    }

    let year = parent_name.parse::<u16>().map_err(|err| {
        LoadError::path_format(
            category.label(),
            path,
            format!("parent directory {parent_name:?} is not a valid year: {err}"),
        )
    })?;

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| LoadError::path_format(category.label(), path, "missing filename stem"))?;

    let quarter = stem.parse::<u8>().map_err(|err| {
        LoadError::path_format(
            category.label(),
            path,
            format!("filename stem {stem:?} is not a quarter index: {err}"),
        )
    })?;

    if !(1..=4).contains(&quarter) {
        return Err(LoadError::path_format(
            category.label(),
            path,
            format!("quarter index {quarter} is out of range 1-4"),
        ));
    }

    Ok(Period { year, quarter })
}
