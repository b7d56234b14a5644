//! The interactive editing session.
//!
//! One session is: readiness gate, input collection, an optional edit, then a
//! watermark. Edit and watermark are separate steps with their own error
//! boundary, so a failed edit still lets the watermark run. Every failure is
//! logged in full and shown to the user as [`FAILURE_MESSAGE`]. The session
//! then returns to the readiness gate.

use crate::edit::{parse_adjustment, parse_degrees, EditOption, EditRequest, InvertOperation};
use crate::prompt::Prompt;
use crate::watermark::{WatermarkRequest, WatermarkType, DEFAULT_WATERMARK_IMAGE};
use crate::workspace::Workspace;
use crate::{Result, WatermarkerError, FAILURE_MESSAGE};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_INPUT_IMAGE: &str = "test.jpg";

const AXIS_QUESTION: &str = "Choose between: horizontally (hortz) and vertically (vert)";

/// Answers gathered by the input collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswers {
    pub input_image: String,
    pub edit_first: bool,
    /// Only asked for when `edit_first` is set.
    pub edit_option: Option<EditOption>,
    pub watermark_type: WatermarkType,
}

/// Files written by one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub edited: Option<PathBuf>,
    pub watermarked: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Declined,
    Completed(SessionReport),
}

/// Close a step: print its success message, or log the error and print the
/// generic failure. Closed input is never swallowed.
fn settle<W: Write>(
    out: &mut W,
    step: &'static str,
    result: Result<(PathBuf, &'static str)>,
) -> Result<Option<PathBuf>> {
    match result {
        Ok((path, message)) => {
            writeln!(out, "{message}")?;
            Ok(Some(path))
        }
        Err(WatermarkerError::InputClosed) => Err(WatermarkerError::InputClosed),
        Err(e) => {
            warn!(step, error = %e, "Step failed");
            writeln!(out, "{FAILURE_MESSAGE}")?;
            Ok(None)
        }
    }
}

pub struct Session<'a, R, W> {
    prompt: Prompt<R, W>,
    workspace: &'a Workspace,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(workspace: &'a Workspace, input: R, output: W) -> Self {
        Self { prompt: Prompt::new(input, output), workspace }
    }

    pub fn prompt(&self) -> &Prompt<R, W> {
        &self.prompt
    }

    /// Run sessions until the user declines or input ends. A bad answer to
    /// the gate or the collector is reported like a failed step, and the loop
    /// goes back to the gate.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.run_once() {
                Ok(Outcome::Declined) => {
                    info!("User declined, leaving");
                    return Ok(());
                }
                Ok(Outcome::Completed(report)) => debug!(?report, "Session finished"),
                Err(WatermarkerError::InputClosed) => {
                    info!("Input closed, leaving");
                    return Ok(());
                }
                Err(e @ WatermarkerError::Io(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Session failed before any step ran");
                    writeln!(self.prompt.output_mut(), "{FAILURE_MESSAGE}")?;
                }
            }
        }
    }

    pub fn run_once(&mut self) -> Result<Outcome> {
        if !self.readiness_gate()? {
            return Ok(Outcome::Declined);
        }

        let answers = self.collect_inputs()?;
        debug!(?answers, "Inputs collected");
        let workspace = self.workspace;
        let input = answers.input_image.as_str();

        let mut report = SessionReport::default();
        if let Some(option) = answers.edit_option {
            let result = self.edit_step(input, option);
            report.edited = settle(self.prompt.output_mut(), "edit", result)?;
        }

        let result = self.collect_watermark(answers.watermark_type).and_then(|request| {
            let path = workspace.apply_watermark(input, &request)?;
            Ok((path, request.success_message()))
        });
        report.watermarked = settle(self.prompt.output_mut(), "watermark", result)?;

        Ok(Outcome::Completed(report))
    }

    pub fn readiness_gate(&mut self) -> Result<bool> {
        let message = format!(
            "Hi! Welcome to \"Watermark manager\". Copy your image files to `{}` folder. \
             Then you'll be able to use them in the app. Are you ready?",
            self.workspace.root().display()
        );
        self.prompt.confirm(&message, true)
    }

    pub fn collect_inputs(&mut self) -> Result<SessionAnswers> {
        let input_image = self
            .prompt
            .input("What file do you want to mark?", Some(DEFAULT_INPUT_IMAGE))?;
        let edit_first = self.prompt.confirm("Do you want to modify the file?", true)?;
        let edit_option = if edit_first {
            Some(self.prompt.select("How do you want to modify it?", &EditOption::ALL)?)
        } else {
            None
        };
        let watermark_type = self
            .prompt
            .select("What kind of watermark do you want?", &WatermarkType::ALL)?;

        Ok(SessionAnswers { input_image, edit_first, edit_option, watermark_type })
    }

    /// The input must exist before any edit parameter is asked for.
    fn edit_step(&mut self, input: &str, option: EditOption) -> Result<(PathBuf, &'static str)> {
        self.workspace.require(input)?;
        let request = self.collect_edit(option)?;
        let path = self.workspace.apply_edit(input, &request)?;
        Ok((path, request.success_message()))
    }

    pub fn collect_edit(&mut self, option: EditOption) -> Result<EditRequest> {
        match option {
            EditOption::Brighten => {
                let line = self.prompt.read_line(
                    "Choose value from (decrease brightness) -1 to 1 (increase brightness)",
                )?;
                Ok(EditRequest::Brighten { value: parse_adjustment(&line)? })
            }
            EditOption::IncreaseContrast => {
                let line = self
                    .prompt
                    .read_line("Choose value from (decrease contrast) -1 to 1 (increase contrast)")?;
                Ok(EditRequest::Contrast { value: parse_adjustment(&line)? })
            }
            EditOption::Grayscale => Ok(EditRequest::Grayscale),
            EditOption::Invert => Ok(EditRequest::Invert(self.collect_invert()?)),
        }
    }

    fn collect_invert(&mut self) -> Result<InvertOperation> {
        let kind = self.prompt.read_line("Choose between: flip, mirror and rotate")?;
        match kind.to_ascii_lowercase().as_str() {
            "flip" => Ok(InvertOperation::Flip(self.prompt.read_line(AXIS_QUESTION)?.parse()?)),
            "mirror" => Ok(InvertOperation::Mirror(self.prompt.read_line(AXIS_QUESTION)?.parse()?)),
            "rotate" => {
                let line = self
                    .prompt
                    .read_line("Write a number of degrees to rotate the image clockwise")?;
                Ok(InvertOperation::Rotate { degrees: parse_degrees(&line)? })
            }
            other => Err(WatermarkerError::InvalidInput(format!(
                "unknown operation '{other}'"
            ))),
        }
    }

    pub fn collect_watermark(&mut self, kind: WatermarkType) -> Result<WatermarkRequest> {
        Ok(match kind {
            WatermarkType::Text => WatermarkRequest::Text {
                text: self.prompt.input("Type your watermark text:", None)?,
            },
            WatermarkType::Image => WatermarkRequest::Image {
                file: self
                    .prompt
                    .input("Type your watermark name:", Some(DEFAULT_WATERMARK_IMAGE))?,
            },
        })
    }
}

/// A single non-interactive session read from a JSON answers file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedSession {
    #[serde(default = "default_input_image")]
    pub input_image: String,
    #[serde(default)]
    pub edit: Option<EditRequest>,
    pub watermark: WatermarkRequest,
}

fn default_input_image() -> String {
    DEFAULT_INPUT_IMAGE.to_string()
}

impl ScriptedSession {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Run the edit (if any) and the watermark with the same step boundaries
    /// as the interactive session.
    pub fn run<W: Write>(&self, workspace: &Workspace, out: &mut W) -> Result<SessionReport> {
        let input = self.input_image.as_str();
        let mut report = SessionReport::default();

        if let Some(request) = &self.edit {
            let result = workspace
                .apply_edit(input, request)
                .map(|path| (path, request.success_message()));
            report.edited = settle(out, "edit", result)?;
        }

        let result = workspace
            .apply_watermark(input, &self.watermark)
            .map(|path| (path, self.watermark.success_message()));
        report.watermarked = settle(out, "watermark", result)?;

        Ok(report)
    }
}
