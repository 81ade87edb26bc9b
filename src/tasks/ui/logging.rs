/* ************************************************************************ **
** This file is part of phmodes, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of phmodes is provided under this permissive       **
** license, and that the project as a whole is licensed under the GPL 3.0.  **
** ************************************************************************ */

use crate::FailResult;
use failure::ResultExt;
use std::fmt;
use std::path::{Path, PathBuf};
use log::{Level, LevelFilter};

const OUR_CRATES: &[&str] = &[
    "phmodes_tasks",
    "phmodes_thermal",
    "phmodes_frozen",
    "phmodes_dispdb",
    "phmodes_dynmat",
    "phmodes_ddb",
    "phmodes_structure",
    "phmodes_linalg",
];

/// Builder-style setup for logging
#[derive(Debug, Clone, Default)]
pub struct GlobalLogger {
    path: Option<PathBuf>,
    verbosity: Verbosity,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity { Quiet, Default, Loud }

impl Default for Verbosity {
    fn default() -> Self { Verbosity::Default }
}

impl GlobalLogger {
    /// Also write the log to a file.
    ///
    /// NOTE: Relative paths will not be resolved until apply() is called.
    pub fn path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self
    { self.path = Some(path.as_ref().to_owned()); self }

    /// Any integer will be accepted; the level will be truncated
    /// to the most extreme value supported.
    pub fn verbosity(&mut self, level: i32) -> &mut Self {
        self.verbosity = match level {
            l if l < 0 => Verbosity::Quiet,
            0 => Verbosity::Default,
            _ => Verbosity::Loud,
        };
        self
    }

    fn our_level(&self) -> LevelFilter {
        match self.verbosity {
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Default => LevelFilter::Info,
            Verbosity::Loud => LevelFilter::Trace,
        }
    }

    /// Install the logger.  This can only succeed once per process.
    pub fn apply(&mut self) -> FailResult<()> {
        use std::time::Instant;

        let show_target = crate::env::log_mod()?;
        let start = Instant::now();
        let mut fern = fern::Dispatch::new();
        fern = fern.format(move |out, message, record| {
            let t = start.elapsed();
            let target = match show_target {
                true => format!("[{}]", record.target()),
                false => String::new(),
            };
            out.finish(format_args!("[{:>4}.{:03}s]{}[{}] {}",
                t.as_secs(),
                t.subsec_millis(),
                target,
                ColorizedLevel(record.level()),
                message))
        });

        fern = fern.level(LevelFilter::Warn);
        for &name in OUR_CRATES {
            fern = fern.level_for(name, self.our_level());
        }
        fern = fern.chain(std::io::stdout());

        if let Some(path) = self.path.as_ref() {
            let file = {
                fern::log_file(path)
                    .with_context(|e| format!("could not open log file {}: {}", path.display(), e))?
            };
            fern = fern.chain(file);
        }

        fern.apply()?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ColorizedLevel(pub Level);
impl fmt::Display for ColorizedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = match self.0 {
            Level::Error => ansi_term::Colour::Red.bold(),
            Level::Warn  => ansi_term::Colour::Red.normal(),
            Level::Info  => ansi_term::Colour::Cyan.bold(),
            Level::Debug => ansi_term::Colour::Yellow.dimmed(),
            Level::Trace => ansi_term::Colour::Cyan.normal(),
        };
        write!(f, "{}", style.paint(self.0.to_string()))
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        let mut logger = GlobalLogger::default();
        assert_eq!(logger.our_level(), LevelFilter::Info);
        assert_eq!(logger.verbosity(-3).our_level(), LevelFilter::Warn);
        assert_eq!(logger.verbosity(2).our_level(), LevelFilter::Trace);
    }

    #[test]
    fn colorized_level_keeps_the_name() {
        let text = ColorizedLevel(Level::Warn).to_string();
        assert!(text.contains("WARN"));
    }
}
