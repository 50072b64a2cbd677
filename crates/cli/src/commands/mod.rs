//! Subcommands and the file plumbing they share.

pub mod bundle;
pub mod evidence;
pub mod fmt;
pub mod parse;
pub mod patch;

use adf_config::AdfConfig;
use adf_manifest::{
    BundleError, BundleResult, Manifest, MetricSource, ModuleReader, bundle_with_manifest,
    resolve_modules,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// Split free text into lowercase keywords for trigger matching.
pub fn task_keywords(task: &str, min_len: usize) -> BTreeSet<String> {
    task.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

/// Read and project the configured manifest. A missing manifest yields an
/// empty one.
pub async fn read_manifest(config: &AdfConfig) -> Result<Manifest, Box<dyn std::error::Error>> {
    let path = config.manifest_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            let doc = adf_syntax::parse(&text).map_err(|e| format!("{}: {e}", path.display()))?;
            Ok(Manifest::from_document(&doc))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("No manifest at {}, only explicit modules apply", path.display());
            Ok(Manifest::default())
        }
        Err(e) => Err(format!("failed to read {}: {e}", path.display()).into()),
    }
}

/// Resolve the modules for `keywords` and bundle them from the AI dir.
pub async fn load_bundle(
    config: &AdfConfig,
    manifest: &Manifest,
    keywords: &BTreeSet<String>,
) -> Result<BundleResult, BundleError> {
    let modules = resolve_modules(manifest, keywords);
    tracing::debug!(?modules, "resolved modules");
    let reader = Preloaded::read_all(&config.ai_dir, &modules).await;
    bundle_with_manifest(&config.ai_dir, manifest, &modules, &reader, keywords)
}

/// Module texts read up front so the synchronous bundler never blocks.
struct Preloaded(HashMap<PathBuf, Result<String, (io::ErrorKind, String)>>);

impl Preloaded {
    async fn read_all(base: &Path, modules: &[String]) -> Self {
        let mut files = HashMap::new();
        for module in modules {
            let path = base.join(module);
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| (e.kind(), e.to_string()));
            files.insert(path, text);
        }
        Self(files)
    }
}

impl ModuleReader for Preloaded {
    fn read_module(&self, path: &Path) -> io::Result<String> {
        match self.0.get(path) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err((kind, reason))) => Err(io::Error::new(*kind, reason.clone())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} was not preloaded", path.display()),
            )),
        }
    }
}

/// Line counts of each metric source file, keyed by metric. Unreadable
/// sources are skipped.
pub async fn measure_line_counts(root: &Path, sources: &[MetricSource]) -> BTreeMap<String, f64> {
    let mut measured = BTreeMap::new();
    for source in sources {
        let path = root.join(&source.path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let lines = text.lines().count();
                tracing::debug!(metric = %source.key, path = %path.display(), lines, "measured source");
                measured.insert(source.key.clone(), lines as f64);
            }
            Err(e) => {
                tracing::warn!("Cannot measure {} from {}: {e}", source.key, path.display());
            }
        }
    }
    measured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_lowercase_tokens() {
        let keywords = task_keywords("Fix the React/CSS build: a flaky-test", 2);
        let expected: BTreeSet<String> = ["fix", "the", "react", "css", "build", "flaky", "test"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn short_keywords_are_dropped() {
        let keywords = task_keywords("go to db", 3);
        assert!(keywords.is_empty());
    }

    #[tokio::test]
    async fn line_counts_skip_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("main.rs"), "fn main() {\n}\n")
            .await
            .unwrap();
        let sources = vec![
            MetricSource {
                key: "entry_loc".into(),
                path: "main.rs".into(),
            },
            MetricSource {
                key: "gone".into(),
                path: "missing.rs".into(),
            },
        ];
        let measured = measure_line_counts(dir.path(), &sources).await;
        assert_eq!(measured.len(), 1);
        assert_eq!(measured["entry_loc"], 2.0);
    }

    #[tokio::test]
    async fn bundle_reads_modules_from_ai_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("core.adf"), "CONSTRAINTS [load-bearing]:\n  - a\n")
            .await
            .unwrap();
        let config = AdfConfig {
            ai_dir: dir.path().to_path_buf(),
            ..AdfConfig::default()
        };
        let manifest = Manifest {
            default_load: vec!["core.adf".into()],
            ..Manifest::default()
        };
        let result = load_bundle(&config, &manifest, &BTreeSet::new()).await.unwrap();
        assert_eq!(result.modules, ["core.adf"]);

        let missing = Manifest {
            default_load: vec!["gone.adf".into()],
            ..Manifest::default()
        };
        let err = load_bundle(&config, &missing, &BTreeSet::new()).await.unwrap_err();
        assert_eq!(err.module_path(), "gone.adf");
    }
}
