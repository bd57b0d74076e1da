//! Project directory conventions: `Data_/`, `Docs_/`, `Images_/`, `Scripts_/`
//! and the provenance page under `Data_/`.

use crate::utils::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "Data_";
pub const DOCS_DIR: &str = "Docs_";
pub const IMAGES_DIR: &str = "Images_";
pub const SCRIPTS_DIR: &str = "Scripts_";
pub const PROJECT_DIRS: [&str; 4] = [DATA_DIR, DOCS_DIR, IMAGES_DIR, SCRIPTS_DIR];
pub const PROVENANCE_PAGE: &str = "Data_/provenance.html";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub root: PathBuf,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub provenance_present: bool,
}

impl LayoutReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.provenance_present
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project layout at {}", self.root.display())?;
        for dir in &self.present {
            writeln!(f, "  ✅ {}/", dir)?;
        }
        for dir in &self.missing {
            writeln!(f, "  ❌ {}/ (missing)", dir)?;
        }
        if self.provenance_present {
            write!(f, "  ✅ {}", PROVENANCE_PAGE)
        } else {
            write!(f, "  ❌ {} (missing)", PROVENANCE_PAGE)
        }
    }
}

pub fn check_layout(root: &Path) -> LayoutReport {
    let (present, missing): (Vec<&str>, Vec<&str>) =
        PROJECT_DIRS.iter().copied().partition(|dir| root.join(dir).is_dir());

    LayoutReport {
        root: root.to_path_buf(),
        present: present.into_iter().map(String::from).collect(),
        missing: missing.into_iter().map(String::from).collect(),
        provenance_present: root.join(PROVENANCE_PAGE).is_file(),
    }
}

/// Create whatever project directories are missing and re-check.
/// The provenance page is never generated.
pub fn create_missing(root: &Path) -> Result<LayoutReport> {
    let before = check_layout(root);
    for dir in &before.missing {
        std::fs::create_dir_all(root.join(dir))?;
        tracing::info!("Created {}/", dir);
    }
    Ok(check_layout(root))
}
