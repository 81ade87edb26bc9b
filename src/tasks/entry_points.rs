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
use crate::cereal::{self, Input, TrajectoryCereal, DecompositionCereal};
use crate::cmd;
use crate::ui::cli_deserialize::{CliDeserialize, CommonArgs};
use crate::ui::parse_qpoint::{parse_qpoint, parse_qpoint_file};
use phmodes_array_types::V3;
use std::path::PathBuf;

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        // the logger might not be up yet
        if log::log_enabled!(log::Level::Error) {
            for cause in e.iter_chain() {
                error!("{}", cause);
            }
        } else {
            for cause in e.iter_chain() {
                eprintln!("Error: {}", cause);
            }
        }

        if crate::env::backtrace() {
            error!("{}", e.backtrace());
        }
        std::process::exit(1);
    });
}

/// `INPUT` and `-o/--output`.
struct IoArgs {
    input: PathBuf,
    output: PathBuf,
}

impl CliDeserialize for IoArgs {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        use clap::Arg;
        app.args(&[
            Arg::with_name("input")
                .value_name("INPUT").required(true)
                .help("json file with the unit cell and its force constants"),
            Arg::with_name("output")
                .short("o").long("output").value_name("OUTPUT")
                .takes_value(true).required(true)
                .help("output json file"),
        ])
    }

    fn _resolve_args(m: &clap::ArgMatches<'_>) -> FailResult<Self> {
        Ok(IoArgs {
            input: m.value_of_os("input").map(PathBuf::from).unwrap_or_default(),
            output: m.value_of_os("output").map(PathBuf::from).unwrap_or_default(),
        })
    }
}

// %% CRATES: binary: phmodes-thermal %%
pub fn thermal() {
    wrap_result_main(|| {
        let (app, de) = CliDeserialize::augment_clap_app({
            clap::App::new("phmodes-thermal")
                .about("Generate frames of a supercell with thermally populated phonons.")
        });
        let matches = app.get_matches();
        let (common, io): (CommonArgs, IoArgs) = de.resolve_args(&matches)?;
        common.init_logger()?;

        let settings = common.read_settings()?;
        let input: Input = cereal::read_json(&io.input)?;
        let trajectory = cmd::run_thermal(&settings, &input)?;

        info!("Writing {} frames to {}", trajectory.len(), io.output.display());
        cereal::write_json(&io.output, &TrajectoryCereal::from_trajectory(&trajectory))
    });
}

/// Which qpoints to project onto.
struct QpointArgs(Option<Vec<V3>>);

impl CliDeserialize for QpointArgs {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        use clap::Arg;
        app.args(&[
            Arg::with_name("trajectory")
                .short("t").long("trajectory").value_name("TRAJECTORY")
                .takes_value(true).required(true)
                .help("json trajectory, as written by phmodes-thermal"),
            Arg::with_name("qpoint")
                .long("qpoint").value_name("QPOINT")
                .takes_value(true).multiple(true).number_of_values(1)
                .help("only project onto modes at this qpoint, e.g. '1/2 0 0'; may be repeated"),
            Arg::with_name("qpoints_file")
                .long("qpoints-file").value_name("FILE").takes_value(true)
                .help("file with one qpoint per line, like --qpoint"),
        ])
    }

    fn _resolve_args(m: &clap::ArgMatches<'_>) -> FailResult<Self> {
        let mut qpoints = vec![];
        if let Some(values) = m.values_of("qpoint") {
            for s in values {
                qpoints.push(parse_qpoint(s)?);
            }
        }
        if let Some(path) = m.value_of("qpoints_file") {
            let text = std::fs::read_to_string(path)?;
            qpoints.extend(parse_qpoint_file(&text)?);
        }
        Ok(QpointArgs(match qpoints.is_empty() {
            true => None,
            false => Some(qpoints),
        }))
    }
}

// %% CRATES: binary: phmodes-decompose %%
pub fn decompose() {
    wrap_result_main(|| {
        let (app, de) = CliDeserialize::augment_clap_app({
            clap::App::new("phmodes-decompose")
                .about("Find the strain and mode amplitudes of each frame of a trajectory.")
        });
        let matches = app.get_matches();
        let (common, (io, QpointArgs(only))): (CommonArgs, (IoArgs, QpointArgs)) = de.resolve_args(&matches)?;
        common.init_logger()?;

        let settings = common.read_settings()?;
        let input: Input = cereal::read_json(&io.input)?;
        let trajectory_path = matches.value_of_os("trajectory").map(PathBuf::from).unwrap_or_default();
        let trajectory: TrajectoryCereal = cereal::read_json(&trajectory_path)?;
        let frames = trajectory.to_structures()?;

        let decomposed = cmd::run_decompose(&settings, &input, &frames, only.as_deref())?;

        info!("Writing {} frames to {}", decomposed.len(), io.output.display());
        cereal::write_json(&io.output, &DecompositionCereal { frames: decomposed })
    });
}
