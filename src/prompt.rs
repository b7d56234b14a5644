//! Line-oriented terminal prompts.
//!
//! Every question is a single blocking read of one line. Nothing is kept
//! registered between questions, so a looping session never accumulates
//! readers. End of input surfaces as [`WatermarkerError::InputClosed`].

use crate::{Result, WatermarkerError};
use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print a line of output.
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        // An undecodable line is consumed by the read, so the next question
        // starts on fresh input.
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => {
                WatermarkerError::InvalidInput("answer is not valid UTF-8".to_string())
            }
            _ => WatermarkerError::Io(e),
        })?;
        if read == 0 {
            return Err(WatermarkerError::InputClosed);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Print `message` on its own line and return the next raw line, trimmed.
    pub fn read_line(&mut self, message: &str) -> Result<String> {
        let line = self.ask(&format!("{message}\n"))?;
        Ok(line.trim().to_string())
    }

    /// Free-text question. An empty answer takes `default` when one is given.
    pub fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let question = match default {
            Some(d) => format!("? {message} ({d}) "),
            None => format!("? {message} "),
        };
        let answer = self.ask(&question)?;
        let answer = answer.trim();
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer.to_string(),
        })
    }

    /// Yes/no question. Asks again until the answer is recognised.
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("? {message} ({hint}) "))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y(es) or n(o).")?,
            }
        }
    }

    /// Pick one of `choices` by number or by label (case-insensitive). An empty
    /// answer picks the first choice.
    pub fn select<T: Copy + Display>(&mut self, message: &str, choices: &[T]) -> Result<T> {
        let first = *choices
            .first()
            .ok_or_else(|| WatermarkerError::InvalidInput("no choices to select from".into()))?;

        self.say(&format!("? {message}"))?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }

        loop {
            let answer = self.ask("  Answer: ")?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(first);
            }
            if let Ok(n) = answer.parse::<usize>() {
                if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
                    return Ok(*choice);
                }
            }
            if let Some(choice) = choices
                .iter()
                .find(|c| c.to_string().eq_ignore_ascii_case(answer))
            {
                return Ok(*choice);
            }
            self.say(&format!("Please enter a number from 1 to {}.", choices.len()))?;
        }
    }
}
