use std::path::Path;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::commands::ingest::{discover_documents, extract_period, year_pattern};
use crate::model::{Category, DocumentEntry, DocumentInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.data_root)?;

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            data_root = %manifest.data_root,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.cache_root
            .join("manifests")
            .join("document_inventory.json")
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(data_root: &Path) -> Result<DocumentInventoryManifest> {
    let year_pattern = year_pattern()?;
    let mut documents = Vec::new();

    for category in Category::ALL {
        let root = data_root.join(category.relative_root());
        if !root.is_dir() {
            warn!(
                category = category.label(),
                path = %root.display(),
                "category root missing"
            );
            continue;
        }

        for path in discover_documents(&root)? {
            let period = match extract_period(category, &path, &year_pattern) {
                Ok(period) => period,
                Err(err) => {
                    warn!(
                        category = category.label(),
                        path = %path.display(),
                        error = %err,
                        "document name does not encode a period"
                    );
                    continue;
                }
            };

            let relative = path
                .strip_prefix(data_root)
                .unwrap_or(path.as_path())
                .display()
                .to_string();

            documents.push(DocumentEntry {
                category,
                path: relative,
                year: period.year,
                quarter: period.quarter,
                sha256: sha256_file(&path)?,
            });
        }
    }

    if documents.is_empty() {
        bail!("no documents found under {}", data_root.display());
    }

    documents.sort_by(|a, b| {
        a.category
            .label()
            .cmp(b.category.label())
            .then(a.year.cmp(&b.year))
            .then(a.quarter.cmp(&b.quarter))
            .then(a.path.cmp(&b.path))
    });

    Ok(DocumentInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        data_root: data_root.display().to_string(),
        document_count: documents.len(),
        documents,
    })
}
