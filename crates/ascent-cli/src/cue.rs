//! Terminal cue output: a bell plus a tagged line on stderr.

use std::io::Write;

use ascent_core::{CueError, CueName, CuePlayer};

#[derive(Debug, Default)]
pub struct TerminalCuePlayer {
    quiet: bool,
}

impl TerminalCuePlayer {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl CuePlayer for TerminalCuePlayer {
    fn play(&mut self, cue: CueName) -> Result<(), CueError> {
        if self.quiet {
            return Ok(());
        }
        let mut err = std::io::stderr().lock();
        let bell = if cue == CueName::Countdown { "" } else { "\x07" };
        writeln!(err, "{bell}[cue] {cue}")?;
        err.flush()?;
        Ok(())
    }

    fn stop(&mut self, cue: CueName) -> Result<(), CueError> {
        tracing::debug!(cue = %cue, "cue stopped");
        Ok(())
    }
}
