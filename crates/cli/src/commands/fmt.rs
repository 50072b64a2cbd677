//! `adf fmt`: canonicalize ADF files.

use adf_config::AdfConfig;
use std::path::{Path, PathBuf};

pub async fn run(files: Vec<PathBuf>, check: bool) -> Result<(), Box<dyn std::error::Error>> {
    let files = if files.is_empty() {
        let config = AdfConfig::load()?;
        adf_files_in(&config.ai_dir).await?
    } else {
        files
    };

    if files.is_empty() {
        println!("No .adf files found.");
        return Ok(());
    }

    let mut unformatted = 0;
    let mut failed = 0;
    for path in &files {
        let raw = tokio::fs::read_to_string(path).await?;
        let canonical = match adf_syntax::parse(&raw) {
            Ok(doc) => adf_syntax::format(&doc),
            Err(e) => {
                eprintln!("❌ {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        if canonical == raw {
            tracing::debug!("{} already formatted", path.display());
            continue;
        }

        unformatted += 1;
        if check {
            println!("would reformat {}", path.display());
        } else {
            tokio::fs::write(path, canonical).await?;
            println!("formatted {}", path.display());
        }
    }

    if failed > 0 || (check && unformatted > 0) {
        eprintln!(
            "{} of {} files need attention ({} unformatted, {} unparsable)",
            unformatted + failed,
            files.len(),
            unformatted,
            failed
        );
        std::process::exit(1);
    }
    Ok(())
}

/// Every `.adf` file directly inside `dir`, sorted by path.
async fn adf_files_in(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "adf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_only_adf_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.adf", "a.adf", "notes.md"] {
            tokio::fs::write(dir.path().join(name), "TASK: x").await.unwrap();
        }
        let files = adf_files_in(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.adf", "b.adf"]);
    }

    #[tokio::test]
    async fn missing_dir_is_empty() {
        let files = adf_files_in(Path::new("/nonexistent/.ai")).await.unwrap();
        assert!(files.is_empty());
    }
}
