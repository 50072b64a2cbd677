//! `adf parse`: dump a document tree.

use std::path::PathBuf;

pub async fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(&file).await?;
    match adf_syntax::parse(&raw) {
        Ok(doc) => {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}: {e}", file.display());
            std::process::exit(1);
        }
    }
}
