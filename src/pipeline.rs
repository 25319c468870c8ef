//! The transformer pipeline.
//!
//! Stages run in a fixed order, each one receiving the previous stage's
//! output. A stage that fails or panics contributes no change: its input is
//! handed to the next stage as if it had never run.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::normalize_input;
use crate::options::RenderOptions;
use crate::transform::{code, image, inline, link, list, quote, rule, table};

/// One markdown transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CodeBlock,
    InlineCode,
    List,
    Table,
    HorizontalRule,
    Image,
    Link,
    Quote,
    InlineStyle,
}

impl Stage {
    /// All stages in execution order.
    ///
    /// Code runs first so later stages never see raw fences. Images run
    /// before links so `![alt](src)` is not taken for a link. Inline style
    /// runs last because it replaces newlines.
    pub const ALL: [Stage; 9] = [
        Stage::CodeBlock,
        Stage::InlineCode,
        Stage::List,
        Stage::Table,
        Stage::HorizontalRule,
        Stage::Image,
        Stage::Link,
        Stage::Quote,
        Stage::InlineStyle,
    ];

    /// Stable snake_case name, as used in config files and logs.
    pub fn name(self) -> &'static str {
        match self {
            Stage::CodeBlock => "code_block",
            Stage::InlineCode => "inline_code",
            Stage::List => "list",
            Stage::Table => "table",
            Stage::HorizontalRule => "horizontal_rule",
            Stage::Image => "image",
            Stage::Link => "link",
            Stage::Quote => "quote",
            Stage::InlineStyle => "inline_style",
        }
    }

    /// Runs this stage's transformer.
    pub fn apply(self, input: &str) -> Result<String> {
        self.transform()(input)
    }

    /// The transformer function behind this stage.
    pub fn transform(self) -> Transform {
        match self {
            Stage::CodeBlock => |input| Ok(code::convert_blocks(input)),
            Stage::InlineCode => |input| Ok(code::convert_inline(input)),
            Stage::List => list::convert,
            Stage::Table => |input| Ok(table::convert(input)),
            Stage::HorizontalRule => |input| Ok(rule::convert(input)),
            Stage::Image => |input| Ok(image::convert(input)),
            Stage::Link => |input| Ok(link::convert(input)),
            Stage::Quote => |input| Ok(quote::convert(input)),
            Stage::InlineStyle => |input| Ok(inline::convert(input)),
        }
    }
}

/// A transformer: takes the previous stage's text and returns its own.
pub type Transform = fn(&str) -> Result<String>;

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown stage: {}", s)))
    }
}

/// What one stage did during [`Pipeline::trace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Text handed to the next stage.
    pub output: String,
    /// Fault message if the stage failed and was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl StageReport {
    /// Returns true if the stage failed.
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// Runs the enabled stages over a document.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
    transforms: Vec<Transform>,
    normalize: bool,
    strict: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("normalize", &self.normalize)
            .field("strict", &self.strict)
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&RenderOptions::default())
    }
}

impl Pipeline {
    /// Builds a pipeline with the stages enabled in `options`.
    pub fn new(options: &RenderOptions) -> Self {
        let steps = Stage::ALL
            .into_iter()
            .filter(|stage| options.is_enabled(*stage))
            .map(|stage| (stage, stage.transform()));
        Self::with_transforms(steps, options)
    }

    /// Builds a pipeline from explicit `(stage, transformer)` steps, run in
    /// the order given.
    pub fn with_transforms<I>(steps: I, options: &RenderOptions) -> Self
    where
        I: IntoIterator<Item = (Stage, Transform)>,
    {
        let (stages, transforms): (Vec<Stage>, Vec<Transform>) = steps.into_iter().unzip();
        Self {
            stages,
            transforms,
            normalize: options.normalize_input,
            strict: options.is_strict(),
        }
    }

    /// Stages this pipeline will run, in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Converts markdown to HTML. Never fails.
    pub fn run(&self, input: &str) -> String {
        let mut text = self.prepare(input);

        for (stage, transform) in self.steps() {
            match run_stage(stage, transform, &text) {
                Ok(output) => {
                    debug!(stage = %stage, bytes = output.len(), "stage complete");
                    text = output;
                }
                Err(err) => {
                    warn!(stage = %stage, error = %err, "stage failed, passing input through");
                }
            }
        }

        text
    }

    /// Converts markdown to HTML, surfacing the first fault in strict mode.
    ///
    /// In lenient mode this is equivalent to [`Pipeline::run`].
    pub fn try_run(&self, input: &str) -> Result<String> {
        if !self.strict {
            return Ok(self.run(input));
        }

        let mut text = self.prepare(input);
        for (stage, transform) in self.steps() {
            text = run_stage(stage, transform, &text)?;
            debug!(stage = %stage, bytes = text.len(), "stage complete");
        }
        Ok(text)
    }

    /// Runs every stage and records each one's output.
    ///
    /// Fail-open applies as in [`Pipeline::run`]; the last report's output is
    /// the rendered document.
    pub fn trace(&self, input: &str) -> Vec<StageReport> {
        let mut text = self.prepare(input);
        let mut reports = Vec::with_capacity(self.stages.len());

        for (stage, transform) in self.steps() {
            let fault = match run_stage(stage, transform, &text) {
                Ok(output) => {
                    text = output;
                    None
                }
                Err(err) => {
                    warn!(stage = %stage, error = %err, "stage failed, passing input through");
                    Some(err.to_string())
                }
            };
            reports.push(StageReport {
                stage,
                output: text.clone(),
                fault,
            });
        }

        reports
    }

    fn steps(&self) -> impl Iterator<Item = (Stage, Transform)> + '_ {
        self.stages.iter().copied().zip(self.transforms.iter().copied())
    }

    fn prepare(&self, input: &str) -> String {
        if self.normalize {
            normalize_input(input)
        } else {
            input.to_string()
        }
    }
}

fn run_stage(stage: Stage, transform: Transform, input: &str) -> Result<String> {
    guarded(stage.name(), || transform(input))
}

/// Runs `f`, converting a panic into a transform fault for `stage`.
fn guarded<F>(stage: &'static str, f: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Error::fault(stage, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixed_order() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.stages(), &Stage::ALL);
        assert_eq!(pipeline.stages().last(), Some(&Stage::InlineStyle));
    }

    #[test]
    fn test_disabled_stages_skipped() {
        let options = RenderOptions::default()
            .without_stage(Stage::Table)
            .without_stage(Stage::Quote);
        let pipeline = Pipeline::new(&options);
        assert_eq!(pipeline.stages().len(), 7);
        assert!(!pipeline.stages().contains(&Stage::Table));

        let html = pipeline.run("> not a quote");
        assert_eq!(html, "> not a quote<br>");
    }

    #[test]
    fn test_stage_names_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
        assert_eq!("horizontal-rule".parse::<Stage>().unwrap(), Stage::HorizontalRule);
        assert!("footnote".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_serde_name() {
        let json = serde_json::to_string(&Stage::InlineCode).unwrap();
        assert_eq!(json, "\"inline_code\"");
    }

    #[test]
    fn test_guarded_converts_panic() {
        let result = guarded("list", || panic!("stack underflow"));
        match result {
            Err(Error::TransformFault { stage, message }) => {
                assert_eq!(stage, "list");
                assert_eq!(message, "stack underflow");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_guarded_passes_errors_through() {
        let result = guarded("table", || Err(Error::fault("table", "bad block")));
        assert!(result.unwrap_err().is_transform_fault());

        let result = guarded("table", || Ok("x".to_string()));
        assert_eq!(result.unwrap(), "x");
    }

    #[test]
    fn test_panic_message_formats() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "panic");
    }

    #[test]
    fn test_normalization_runs_first() {
        let html = Pipeline::default().run("# Hi\r\nthere");
        assert_eq!(html, "<h1>Hi</h1><br>there<br>");

        let raw = RenderOptions::default()
            .without_normalization()
            .without_stage(Stage::InlineStyle);
        let html = Pipeline::new(&raw).run("a\r\nb");
        assert!(html.contains('\r'));
    }

    #[test]
    fn test_trace_reports_every_stage() {
        let pipeline = Pipeline::default();
        let reports = pipeline.trace("# Title\n- a\n");
        assert_eq!(reports.len(), Stage::ALL.len());
        assert!(reports.iter().all(|r| !r.is_fault()));

        let list = reports.iter().find(|r| r.stage == Stage::List).unwrap();
        assert!(list.output.contains("<ul><li>a</li></ul>"));

        let last = reports.last().unwrap();
        assert_eq!(last.output, pipeline.run("# Title\n- a\n"));
    }

    #[test]
    fn test_trace_serializes() {
        let reports = Pipeline::default().trace("x");
        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json[0]["stage"], "code_block");
        assert!(json[0].get("fault").is_none());
    }

    fn upper(input: &str) -> Result<String> {
        Ok(input.to_uppercase())
    }

    fn exclaim(input: &str) -> Result<String> {
        Ok(format!("{}!", input))
    }

    fn explode(_: &str) -> Result<String> {
        panic!("stack underflow")
    }

    fn reject(_: &str) -> Result<String> {
        Err(Error::fault("table", "bad block"))
    }

    fn faulty_pipeline(options: &RenderOptions) -> Pipeline {
        let steps: [(Stage, Transform); 5] = [
            (Stage::CodeBlock, upper),
            (Stage::List, explode),
            (Stage::Link, exclaim),
            (Stage::Table, reject),
            (Stage::InlineStyle, exclaim),
        ];
        Pipeline::with_transforms(steps, options)
    }

    #[test]
    fn test_run_passes_input_through_faulting_stages() {
        let pipeline = faulty_pipeline(&RenderOptions::default());
        assert_eq!(pipeline.run("ab"), "AB!!");
    }

    #[test]
    fn test_try_run_lenient_swallows_faults() {
        let pipeline = faulty_pipeline(&RenderOptions::default());
        assert_eq!(pipeline.try_run("ab").unwrap(), "AB!!");
    }

    #[test]
    fn test_try_run_strict_reports_panicking_stage() {
        let pipeline = faulty_pipeline(&RenderOptions::strict());
        match pipeline.try_run("ab") {
            Err(Error::TransformFault { stage, message }) => {
                assert_eq!(stage, "list");
                assert_eq!(message, "stack underflow");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_try_run_strict_reports_failing_stage() {
        let steps: [(Stage, Transform); 2] = [(Stage::CodeBlock, upper), (Stage::Table, reject)];
        let pipeline = Pipeline::with_transforms(steps, &RenderOptions::strict());
        match pipeline.try_run("ab") {
            Err(Error::TransformFault { stage, .. }) => assert_eq!(stage, "table"),
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_records_faults() {
        let pipeline = faulty_pipeline(&RenderOptions::default());
        let reports = pipeline.trace("ab");
        let outputs: Vec<_> = reports.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, vec!["AB", "AB", "AB!", "AB!", "AB!!"]);

        let faulted: Vec<_> = reports.iter().filter(|r| r.is_fault()).map(|r| r.stage).collect();
        assert_eq!(faulted, vec![Stage::List, Stage::Table]);
        assert!(reports[1].fault.as_deref().unwrap().contains("stack underflow"));
        assert!(reports[3].fault.as_deref().unwrap().contains("bad block"));
    }

    #[test]
    fn test_try_run_matches_run_when_clean() {
        let input = "|A|\n|-|\n|1|\n\n1. x\n    2. y";
        let lenient = Pipeline::default();
        let strict = Pipeline::new(&RenderOptions::strict());
        assert_eq!(strict.try_run(input).unwrap(), lenient.run(input));
        assert_eq!(lenient.try_run(input).unwrap(), lenient.run(input));
    }
}
