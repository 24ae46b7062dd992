//! Report document rendering.
//!
//! Document composition is a collaborator behind a trait so the agent
//! core stays independent of the output format.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

pub trait ReportRenderer: Send + Sync {
    /// Render the day's per-symbol lines into an artifact file and
    /// return its path.
    fn render(&self, date: NaiveDate, lines: &[String]) -> Result<PathBuf>;
}

/// Plain-Markdown renderer writing one file per calendar date.
pub struct MarkdownRenderer {
    artifact_dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn artifact_path(&self, date: NaiveDate) -> PathBuf {
        self.artifact_dir.join(format!("{date}.md"))
    }
}

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, date: NaiveDate, lines: &[String]) -> Result<PathBuf> {
        fs::create_dir_all(&self.artifact_dir).with_context(|| {
            format!(
                "Failed to create artifact directory {}",
                self.artifact_dir.display()
            )
        })?;

        let mut document = format!("# Daily market report — {date}\n\n");
        if lines.is_empty() {
            document.push_str("No symbols tracked.\n");
        } else {
            for line in lines {
                document.push_str("- ");
                document.push_str(line);
                document.push('\n');
            }
        }

        let path = self.artifact_path(date);
        fs::write(&path, document)
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        Ok(path)
    }
}

/// Delete every artifact in `dir`. Missing directory is fine.
pub fn clear_artifacts(dir: &Path) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove artifact {}", path.display()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = MarkdownRenderer::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();

        let path = renderer
            .render(date, &["AAPL: 228.5 (1.25%)".to_string()])
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "2026-08-04.md");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("2026-08-04"));
        assert!(contents.contains("- AAPL: 228.5 (1.25%)"));
    }

    #[test]
    fn test_clear_artifacts_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = MarkdownRenderer::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        renderer.render(date, &[]).unwrap();

        clear_artifacts(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(clear_artifacts(&missing).is_ok());
    }
}
