//! `adf patch`: apply JSON patch operations to a document.

use adf_patch::{apply_patches, parse_ops};
use std::path::PathBuf;

pub async fn run(file: PathBuf, ops: String, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let payload = match ops.strip_prefix('@') {
        Some(ops_file) => tokio::fs::read_to_string(ops_file).await?,
        None => ops.clone(),
    };
    let ops = parse_ops(&payload).map_err(|e| format!("invalid patch operations: {e}"))?;

    let raw = tokio::fs::read_to_string(&file).await?;
    let doc = adf_syntax::parse(&raw).map_err(|e| format!("{}: {e}", file.display()))?;

    let patched = match apply_patches(&doc, &ops) {
        Ok(patched) => patched,
        Err(e) => {
            eprintln!("❌ {}: {e}", file.display());
            std::process::exit(1);
        }
    };
    let output = adf_syntax::format(&patched);

    if dry_run {
        print!("{output}");
    } else {
        tokio::fs::write(&file, output).await?;
        println!(
            "✅ Applied {} operation{} to {}",
            ops.len(),
            if ops.len() == 1 { "" } else { "s" },
            file.display()
        );
    }
    Ok(())
}
