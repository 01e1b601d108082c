use anyhow::Result;
use pdfslice::{Session, SourceFile};
use std::path::Path;

pub async fn run<P: AsRef<Path>>(path: P, json: bool) -> Result<()> {
    let file = SourceFile::open(&path).await?;
    let media_type = file.media_type().to_string();
    let session = Session::new();
    session.select_file(file).await;
    let snapshot = session.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("File: {}", path.as_ref().display());
        println!("Type: {}", media_type);
        if let Some(size) = snapshot.file_size {
            println!("Size: {} bytes", size);
        }
        if let Some(pages) = snapshot.total_pages {
            println!("Pages: {}", pages);
            println!("Default range: {}", snapshot.range);
        }
    }

    if let Some(error) = snapshot.error {
        anyhow::bail!(error);
    }

    session.reset();
    Ok(())
}
