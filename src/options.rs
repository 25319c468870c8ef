//! Rendering options for HTML output.

use crate::error::Result;
use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for controlling markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Normalize line endings and Unicode before the first stage.
    pub normalize_input: bool,
    /// How transformer faults are handled.
    pub error_mode: ErrorMode,
    /// Enable fenced code blocks.
    pub code_blocks: bool,
    /// Enable inline code spans.
    pub inline_code: bool,
    /// Enable bullet and numbered lists.
    pub lists: bool,
    /// Enable pipe tables.
    pub tables: bool,
    /// Enable horizontal rules.
    pub horizontal_rules: bool,
    /// Enable images.
    pub images: bool,
    /// Enable links (inline, reference and bare URLs).
    pub links: bool,
    /// Enable blockquotes.
    pub quotes: bool,
    /// Enable headings, emphasis and line breaks.
    pub inline_styles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            normalize_input: true,
            error_mode: ErrorMode::Lenient,
            code_blocks: true,
            inline_code: true,
            lists: true,
            tables: true,
            horizontal_rules: true,
            images: true,
            links: true,
            quotes: true,
            inline_styles: true,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for minimal rendering (code blocks and inline styles only).
    pub fn minimal() -> Self {
        Self {
            normalize_input: true,
            error_mode: ErrorMode::Lenient,
            code_blocks: true,
            inline_code: false,
            lists: false,
            tables: false,
            horizontal_rules: false,
            images: false,
            links: false,
            quotes: false,
            inline_styles: true,
        }
    }

    /// Creates default options that surface the first transformer fault.
    pub fn strict() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            ..Self::default()
        }
    }

    /// Loads options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets lenient error handling (faulting stages are skipped).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (`try_render` fails on the first fault).
    pub fn with_strict_errors(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disables input normalization.
    pub fn without_normalization(mut self) -> Self {
        self.normalize_input = false;
        self
    }

    /// Enables or disables a single stage.
    pub fn with_stage(mut self, stage: Stage, enabled: bool) -> Self {
        *self.stage_flag_mut(stage) = enabled;
        self
    }

    /// Disables a single stage.
    pub fn without_stage(self, stage: Stage) -> Self {
        self.with_stage(stage, false)
    }

    /// Returns true if the given stage should run.
    pub fn is_enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::CodeBlock => self.code_blocks,
            Stage::InlineCode => self.inline_code,
            Stage::List => self.lists,
            Stage::Table => self.tables,
            Stage::HorizontalRule => self.horizontal_rules,
            Stage::Image => self.images,
            Stage::Link => self.links,
            Stage::Quote => self.quotes,
            Stage::InlineStyle => self.inline_styles,
        }
    }

    /// Returns true if faults should be surfaced.
    pub fn is_strict(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Strict)
    }

    fn stage_flag_mut(&mut self, stage: Stage) -> &mut bool {
        match stage {
            Stage::CodeBlock => &mut self.code_blocks,
            Stage::InlineCode => &mut self.inline_code,
            Stage::List => &mut self.lists,
            Stage::Table => &mut self.tables,
            Stage::HorizontalRule => &mut self.horizontal_rules,
            Stage::Image => &mut self.images,
            Stage::Link => &mut self.links,
            Stage::Quote => &mut self.quotes,
            Stage::InlineStyle => &mut self.inline_styles,
        }
    }
}

/// How to handle transformer faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// A faulting stage contributes no change and the pipeline continues.
    #[default]
    Lenient,
    /// `try_render` stops at the first fault and returns it.
    Strict,
}
