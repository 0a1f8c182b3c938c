use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::warn;

use crate::config::EngineConfig;
use crate::parser;
use crate::record::IncidentSet;

const CHUNK: usize = 200;

pub struct BatchCounts {
    pub pages: usize,
    pub failed: usize,
    pub incidents: usize,
    pub priority: usize,
}

impl BatchCounts {
    pub fn print(&self) {
        eprintln!(
            "Processed {} pages ({} failed): {} incidents, {} priority.",
            self.pages, self.failed, self.incidents, self.priority,
        );
    }
}

/// Saved `*.html` snapshots in `dir`, sorted by name.
pub fn list_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|x| x.eq_ignore_ascii_case("html")))
        .collect();
    pages.sort();
    Ok(pages)
}

/// Extract every snapshot in parallel and write `<stem>.json` into `out`.
pub fn process_dir(dir: &Path, out: &Path, cfg: &EngineConfig) -> Result<BatchCounts> {
    let pages = list_pages(dir)?;
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BatchCounts {
        pages: pages.len(),
        failed: 0,
        incidents: 0,
        priority: 0,
    };

    for chunk in pages.chunks(CHUNK) {
        let results: Vec<(&PathBuf, Result<IncidentSet>)> = chunk
            .par_iter()
            .map(|path| (path, extract_file(path, cfg)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(set) => {
                    counts.incidents += set.total_incidents;
                    counts.priority += set.priority_count;
                    if set.error.is_some() {
                        counts.failed += 1;
                    }
                    let target = out.join(output_name(path));
                    let json = serde_json::to_string_pretty(&set)?;
                    std::fs::write(&target, json)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    counts.failed += 1;
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

pub fn extract_file(path: &Path, cfg: &EngineConfig) -> Result<IncidentSet> {
    let page = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parser::process_html(&page, cfg))
}

fn output_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".into());
    format!("{stem}.json")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processes_directory() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let dispatch = std::fs::read_to_string("tests/fixtures/dispatch.html").unwrap();
        std::fs::write(input.path().join("a.html"), &dispatch).unwrap();
        std::fs::write(input.path().join("b.html"), "<p>down for maintenance</p>").unwrap();
        std::fs::write(input.path().join("notes.txt"), "ignored").unwrap();

        let counts = process_dir(input.path(), out.path(), &EngineConfig::default()).unwrap();
        assert_eq!(counts.pages, 2);
        assert_eq!(counts.failed, 0);
        assert_eq!(counts.incidents, 5);

        let a: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("a.json")).unwrap())
                .unwrap();
        assert_eq!(a["total_incidents"], 5);
        let b: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("b.json")).unwrap())
                .unwrap();
        assert_eq!(b["total_incidents"], 0);
        assert_eq!(b["incidents"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn missing_directory() {
        assert!(list_pages(Path::new("no/such/dir")).is_err());
    }
}
