//! Interactive image editing and watermarking.

pub mod edit;
pub mod image_io;
pub mod naming;
pub mod prompt;
pub mod session;
pub mod watermark;
pub mod workspace;

pub use edit::{Axis, EditOption, EditRequest, InvertOperation};
pub use naming::{prepare_edited_filename, prepare_output_filename};
pub use prompt::Prompt;
pub use session::{Outcome, ScriptedSession, Session, SessionAnswers, SessionReport};
pub use watermark::{TextRenderer, WatermarkRequest, WatermarkType};
pub use workspace::Workspace;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatermarkerError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Font error: {0}")]
    Font(String),
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Input closed")]
    InputClosed,
    #[error("Answers error: {0}")]
    Answers(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WatermarkerError>;

/// Message shown for every failed step.
pub const FAILURE_MESSAGE: &str = "Something went wrong... Try again";
