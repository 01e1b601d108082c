use anyhow::{Context, Result};
use pdfslice::{Error, PageRange, Session, SourceFile};
use std::path::{Path, PathBuf};

pub async fn run<P: AsRef<Path>>(input: P, pages: &str, output: Option<PathBuf>) -> Result<()> {
    let file = SourceFile::open(&input).await?;
    let session = Session::new();

    let Some(metadata) = session.select_file(file).await else {
        anyhow::bail!(session
            .error()
            .unwrap_or_else(|| "Failed to load PDF".to_string()));
    };

    let total_pages = metadata.total_pages;
    let range = PageRange::parse(pages, total_pages)?;
    if !range.is_valid_for(total_pages) {
        return Err(Error::InvalidRange {
            start: range.start,
            end: range.end,
            total: total_pages,
        }
        .into());
    }
    session.set_range(range);

    let Some(reference) = session.extract().await else {
        anyhow::bail!(session
            .error()
            .unwrap_or_else(|| "Extraction did not run".to_string()));
    };

    let bytes = session
        .artifacts()
        .fetch(&reference)
        .context("Extracted document is no longer available")?;
    let output = output.unwrap_or_else(|| PathBuf::from(reference.file_name()));
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("Failed to save PDF: {}", output.display()))?;
    session.reset();

    println!(
        "Extracted {} page(s) to {}",
        range.len(),
        output.display()
    );

    Ok(())
}
