use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::template::IMAGE_EXTENSIONS;

/// File name prefix identifying the production order in an input folder.
pub const PRODUCTION_FILE_PREFIX: &str = "生产单";

const SPREADSHEET_SUFFIXES: [&str; 2] = [".xls", ".xlsx"];

/// Returns the first file in `dir` whose name starts with
/// [`PRODUCTION_FILE_PREFIX`] and carries a spreadsheet extension.
///
/// When several files match, the winner is whichever the filesystem lists
/// first. No sorting is applied.
pub fn find_production_file(dir: &Path) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_production_file_name(name) {
            debug!(file = name, "found production order file");
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

fn is_production_file_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    name.starts_with(PRODUCTION_FILE_PREFIX)
        && SPREADSHEET_SUFFIXES
            .iter()
            .any(|suffix| lower.ends_with(suffix))
}

/// Resolves the picture for an item by probing `<key><ext>` in `dir` for each
/// of [`IMAGE_EXTENSIONS`] in order.
pub fn find_item_image(dir: &Path, key: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{key}{ext}")))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_production_file_names() {
        assert!(is_production_file_name("生产单_0001.xlsx"));
        assert!(is_production_file_name("生产单.XLS"));
        assert!(!is_production_file_name("生产单_0001.csv"));
        assert!(!is_production_file_name("出货单_SO-1.xlsx"));
        assert!(!is_production_file_name("copy of 生产单.xlsx"));
    }
}
