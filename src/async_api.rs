//! Async API for non-blocking rendering.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! mdhtml = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::options::RenderOptions;
use crate::pipeline::Pipeline;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Asynchronously converts markdown to HTML.
///
/// Rendering is CPU-bound, so it runs on the blocking thread pool.
pub async fn render(markdown: String, options: &RenderOptions) -> Result<String> {
    let pipeline = Pipeline::new(options);
    tokio::task::spawn_blocking(move || pipeline.try_run(&markdown))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}

/// Asynchronously reads and converts a markdown file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> mdhtml::Result<()> {
/// let html = mdhtml::async_api::render_file("notes.md").await?;
/// tokio::fs::write("notes.html", html).await?;
/// # Ok(())
/// # }
/// ```
pub async fn render_file(path: impl AsRef<Path>) -> Result<String> {
    render_file_with_options(path, &RenderOptions::default()).await
}

/// Asynchronously reads and converts a markdown file with custom options.
pub async fn render_file_with_options(
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<String> {
    let bytes = fs::read(path).await?;
    let markdown = String::from_utf8(bytes)?;
    render(markdown, options).await
}

/// Asynchronously converts markdown read from an async reader.
pub async fn render_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    options: &RenderOptions,
) -> Result<String> {
    let mut markdown = String::new();
    reader.read_to_string(&mut markdown).await?;
    render(markdown, options).await
}

/// Asynchronously converts markdown and writes the HTML to `writer`.
pub async fn render_to_writer<W: AsyncWrite + Unpin>(
    markdown: String,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let html = render(markdown, options).await?;
    writer.write_all(html.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Asynchronously converts markdown and writes the HTML to `path`.
pub async fn render_to_file(
    markdown: String,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let html = render(markdown, options).await?;
    fs::write(path, html).await?;
    Ok(())
}
