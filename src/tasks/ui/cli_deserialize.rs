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
use crate::config::{Settings, ValidatedSettings, YamlRead};
use crate::ui::logging::GlobalLogger;
use failure::ResultExt;
use std::fs::File;
use std::path::PathBuf;

/// Adds arguments to a clap app, and reads them back out of the matches.
///
/// Implementors compose through tuples, so that each binary can list the argument
/// groups it needs and get them back with their types inferred.
pub trait CliDeserialize: Sized {
    fn augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> (clap::App<'a, 'b>, ClapDeserializer<Self>)
    {
        let app = Self::_augment_clap_app(app);
        (app, ClapDeserializer(Default::default()))
    }

    /// Don't use this. Call 'augment_clap_app' instead.
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b>;
    /// Don't use this. Call 'resolve_args' on the ClapDeserializer instead.
    fn _resolve_args(matches: &clap::ArgMatches<'_>) -> FailResult<Self>;
}

/// Token of "proof" that a clap app was augmented to be capable of deserializing A.
pub struct ClapDeserializer<A>(std::marker::PhantomData<A>);

impl<A: CliDeserialize> ClapDeserializer<A> {
    /// Deserialize the arguments.  This may read files.
    pub fn resolve_args(self, matches: &clap::ArgMatches<'_>) -> FailResult<A>
    { A::_resolve_args(matches) }
}

impl CliDeserialize for () {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b>
    { app }

    fn _resolve_args(_: &clap::ArgMatches<'_>) -> FailResult<Self>
    { Ok(()) }
}

impl<A, B> CliDeserialize for (A, B)
where
    A: CliDeserialize,
    B: CliDeserialize,
{
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b>
    { B::_augment_clap_app(A::_augment_clap_app(app)) }

    fn _resolve_args(matches: &clap::ArgMatches<'_>) -> FailResult<Self>
    { Ok((A::_resolve_args(matches)?, B::_resolve_args(matches)?)) }
}

// -------------------------------------------------------------------------------------

/// Arguments shared by every binary: the config file and logging.
#[derive(Debug, Clone)]
pub struct CommonArgs {
    pub config: PathBuf,
    pub verbosity: i32,
    pub log: Option<PathBuf>,
}

impl CliDeserialize for CommonArgs {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        use clap::Arg;
        app.args(&[
            Arg::with_name("config")
                .short("c").long("config").value_name("CONFIG")
                .takes_value(true).required(true)
                .help("settings yaml"),
            Arg::with_name("verbose")
                .short("v").long("verbose").multiple(true)
                .help("log more; may be given twice"),
            Arg::with_name("quiet")
                .short("q").long("quiet")
                .help("only log warnings and errors"),
            Arg::with_name("log")
                .long("log").value_name("LOGFILE").takes_value(true)
                .help("also write the log to this file"),
        ])
    }

    fn _resolve_args(m: &clap::ArgMatches<'_>) -> FailResult<Self> {
        let verbosity = match m.is_present("quiet") {
            true => -1,
            false => m.occurrences_of("verbose") as i32,
        };
        Ok(CommonArgs {
            config: m.value_of_os("config").map(PathBuf::from).unwrap_or_default(),
            verbosity,
            log: m.value_of_os("log").map(PathBuf::from),
        })
    }
}

impl CommonArgs {
    pub fn init_logger(&self) -> FailResult<()> {
        let mut logger = GlobalLogger::default();
        logger.verbosity(self.verbosity);
        if let Some(path) = &self.log {
            logger.path(path);
        }
        logger.apply()
    }

    pub fn read_settings(&self) -> FailResult<ValidatedSettings> {
        let path = &self.config;
        let file = File::open(path).with_context(|e| format!("could not open {}: {}", path.display(), e))?;
        let settings = {
            Settings::from_reader(file)
                .with_context(|e| format!("could not parse config {}: {}", path.display(), e))?
        };
        settings.validate()
    }
}
