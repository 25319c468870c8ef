//! # mdhtml
//!
//! A small, fail-open Markdown to HTML converter for live editor previews.
//!
//! The input is run through a fixed chain of transformers, one per markdown
//! construct. A transformer that fails leaves its input unchanged and the
//! chain carries on, so a half-typed document always renders something.
//!
//! ## Quick Start
//!
//! ```
//! let html = mdhtml::render("# Hello\n**bold** and _em_\n");
//! assert!(html.starts_with("<h1>Hello</h1>"));
//! ```
//!
//! ## Supported Constructs
//!
//! - Fenced code blocks with cosmetic highlighting, inline code
//! - Bullet and numbered lists with nesting
//! - Pipe tables with column alignment
//! - Horizontal rules, images, links (inline, reference, bare URLs)
//! - Nested blockquotes
//! - Headings (`#` to `###`), bold, italic, line breaks
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio
//! - `ffi`: C ABI bindings

pub mod error;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod transform;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use error::{Error, Result};
pub use normalize::normalize_input;
pub use options::{ErrorMode, RenderOptions};
pub use pipeline::{Pipeline, Stage, StageReport, Transform};

use rayon::prelude::*;
use std::io::Write;
use std::path::Path;

/// Converts markdown to HTML with default options.
///
/// Never fails: constructs that cannot be converted are left as text.
///
/// # Example
///
/// ```
/// let html = mdhtml::render("> quoted");
/// assert_eq!(html, "<blockquote>quoted<br></blockquote>");
/// ```
pub fn render(markdown: &str) -> String {
    render_with_options(markdown, &RenderOptions::default())
}

/// Converts markdown to HTML with custom options.
///
/// # Example
///
/// ```
/// use mdhtml::{render_with_options, RenderOptions, Stage};
///
/// let options = RenderOptions::default().without_stage(Stage::Table);
/// let html = render_with_options("|a|\n|-|", &options);
/// assert!(!html.contains("<table>"));
/// ```
pub fn render_with_options(markdown: &str, options: &RenderOptions) -> String {
    Pipeline::new(options).run(markdown)
}

/// Converts markdown to HTML, returning the first transformer fault when
/// `options` selects [`ErrorMode::Strict`].
pub fn try_render(markdown: &str, options: &RenderOptions) -> Result<String> {
    Pipeline::new(options).try_run(markdown)
}

/// Reads a markdown file and converts it with default options.
///
/// # Example
///
/// ```no_run
/// let html = mdhtml::render_file("README.md")?;
/// std::fs::write("README.html", html)?;
/// # Ok::<(), mdhtml::Error>(())
/// ```
pub fn render_file(path: impl AsRef<Path>) -> Result<String> {
    render_file_with_options(path, &RenderOptions::default())
}

/// Reads a markdown file and converts it with custom options.
pub fn render_file_with_options(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    try_render(&read_markdown(path)?, options)
}

fn read_markdown(path: impl AsRef<Path>) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

/// Converts markdown and writes the HTML to `path`.
pub fn render_to_file(
    markdown: &str,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let html = try_render(markdown, options)?;
    std::fs::write(path, html)?;
    Ok(())
}

/// Converts markdown and writes the HTML to a writer.
pub fn render_to_writer<W: Write>(
    markdown: &str,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let html = try_render(markdown, options)?;
    writer.write_all(html.as_bytes())?;
    Ok(())
}

/// Converts many documents in parallel. Output order matches input order.
pub fn render_batch<S>(documents: &[S], options: &RenderOptions) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    let pipeline = Pipeline::new(options);
    documents
        .par_iter()
        .map(|doc| pipeline.run(doc.as_ref()))
        .collect()
}

/// Converts many documents in parallel, stopping at the first fault when
/// `options` asks for strict errors.
///
/// In lenient mode this is equivalent to [`render_batch`].
pub fn try_render_batch<S>(documents: &[S], options: &RenderOptions) -> Result<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    let pipeline = Pipeline::new(options);
    documents
        .par_iter()
        .map(|doc| pipeline.try_run(doc.as_ref()))
        .collect()
}

/// Builder for rendering documents.
///
/// Provides a fluent API for configuring the pipeline once and reusing it.
///
/// # Example
///
/// ```
/// use mdhtml::{Mdhtml, Stage};
///
/// let renderer = Mdhtml::new().without_stage(Stage::Image);
/// let html = renderer.render("![cat](cat.png)");
/// assert!(!html.contains("<img"));
/// ```
#[derive(Debug, Clone)]
pub struct Mdhtml {
    options: RenderOptions,
    pipeline: Pipeline,
}

impl Default for Mdhtml {
    fn default() -> Self {
        Self::new()
    }
}

impl Mdhtml {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Creates a builder from existing options.
    pub fn with_options(options: RenderOptions) -> Self {
        let pipeline = Pipeline::new(&options);
        Self { options, pipeline }
    }

    /// Surfaces the first transformer fault from `try_render`.
    pub fn strict(self) -> Self {
        Self::with_options(self.options.with_strict_errors())
    }

    /// Skips faulting transformers (the default).
    pub fn lenient(self) -> Self {
        Self::with_options(self.options.lenient())
    }

    /// Disables input normalization.
    pub fn without_normalization(self) -> Self {
        Self::with_options(self.options.without_normalization())
    }

    /// Disables one transformer.
    pub fn without_stage(self, stage: Stage) -> Self {
        Self::with_options(self.options.without_stage(stage))
    }

    /// Returns the current options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Converts markdown to HTML. Never fails.
    pub fn render(&self, markdown: &str) -> String {
        self.pipeline.run(markdown)
    }

    /// Converts markdown to HTML, surfacing faults in strict mode.
    pub fn try_render(&self, markdown: &str) -> Result<String> {
        self.pipeline.try_run(markdown)
    }

    /// Reads and converts a markdown file.
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        self.try_render(&read_markdown(path)?)
    }

    /// Runs the pipeline and returns every stage's output.
    pub fn trace(&self, markdown: &str) -> Vec<StageReport> {
        self.pipeline.trace(markdown)
    }
}
