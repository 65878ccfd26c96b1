use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{default_report_name, render_assessment};
use crate::constants;
use crate::logic::engine::Assessment;
use crate::logic::error::{HazardError, HazardResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportFiles {
    pub data: PathBuf,
    pub summary: Option<PathBuf>,
}

pub struct ReportWriter {
    base_dir: PathBuf,
}

impl ReportWriter {
    /// `DISPRE_OUTPUT_DIR` or the platform default
    pub fn new() -> Self {
        Self::from_path(constants::get_output_dir())
    }

    pub fn from_path(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve_name(name: Option<&str>) -> HazardResult<String> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(default_report_name);
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(HazardError::invalid(format!("invalid report name '{}'", name)));
        }
        Ok(name)
    }

    /// Pretty JSON at `<name>_data.json`
    pub fn write_data<T: Serialize>(&self, name: Option<&str>, payload: &T) -> HazardResult<PathBuf> {
        let name = Self::resolve_name(name)?;
        fs::create_dir_all(&self.base_dir)?;
        let path = self.base_dir.join(format!("{}_data.json", name));
        fs::write(&path, serde_json::to_string_pretty(payload)?)?;
        log::info!("Report written to {}", path.display());
        Ok(path)
    }

    /// JSON data plus the text summary
    pub fn write_assessment(&self, name: Option<&str>, assessment: &Assessment) -> HazardResult<ReportFiles> {
        let name = Self::resolve_name(name)?;
        let data = self.write_data(Some(&name), assessment)?;
        let summary = self.base_dir.join(format!("{}_summary.txt", name));
        fs::write(&summary, render_assessment(assessment))?;
        Ok(ReportFiles {
            data,
            summary: Some(summary),
        })
    }

    /// Report data files in the output directory, oldest first
    pub fn list(&self) -> HazardResult<Vec<PathBuf>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("_data.json"))
            })
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
