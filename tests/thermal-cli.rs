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

mod shared;

use phmodes::array_types::V3;
use phmodes::tasks::cmd;
use phmodes::tasks::cereal::{Input, TrajectoryCereal};
use phmodes::tasks::config::{Settings, ValidatedSettings, YamlRead};
use phmodes::thermal::GeneratorState;
use phmodes_assert_close::assert_close;

fn settings(yaml: &str) -> ValidatedSettings
{ Settings::from_str(yaml).unwrap().validate().unwrap() }

fn round_trip_input() -> Input {
    let json = serde_json::to_string(&shared::dimer_input()).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn thermal_frames() {
    shared::init_logger();
    let settings = settings("
        supercell: [2, 1, 1]
        temperature: 300
        frames: 5
        seed: {user: 17}
    ");
    let input = round_trip_input();
    let trajectory = cmd::run_thermal(&settings, &input).unwrap();
    assert_eq!(trajectory.len(), 5);

    for (frame, record) in trajectory.frames.iter().zip(&trajectory.records) {
        assert_eq!(frame.num_atoms(), 4);
        // only Γ is in the force constants, so only the optical modes at Γ move
        assert_eq!(record.modes.len(), 3);
        assert!(record.modes.iter().all(|m| m.qpoint == V3::zero() && m.index >= 3));
        assert_eq!(record.strain, Default::default());
    }

    // same seed, same frames
    let again = cmd::run_thermal(&settings, &input).unwrap();
    assert_eq!(again.records, trajectory.records);
}

#[cfg(feature = "fft")]
#[test]
fn thermal_then_decompose() {
    shared::init_logger();
    let settings = settings("
        supercell: [1, 1, 2]
        frames: 4
        seed: {user: 99}
        strain: {isotropic: 0.01, tetragonal: 0.01, rotate: true}
    ");
    let input = round_trip_input();
    let trajectory = cmd::run_thermal(&settings, &input).unwrap();

    // through the file format, as the binaries do it
    let json = serde_json::to_string(&TrajectoryCereal::from_trajectory(&trajectory)).unwrap();
    let cereal: TrajectoryCereal = serde_json::from_str(&json).unwrap();
    let record = cereal.frames[2].record.as_ref().unwrap();
    assert_close!(abs=1e-12, record.modes[0].amplitude, trajectory.records[2].modes[0].amplitude);
    let frames = cereal.to_structures().unwrap();

    let decomposed = cmd::run_decompose(&settings, &input, &frames, None).unwrap();
    assert_eq!(decomposed.len(), 4);
    for (record, found) in trajectory.records.iter().zip(&decomposed) {
        assert_close!(abs=1e-9, found.strain, record.strain);
        assert_eq!(found.selection.num_modes(), 6);
        for mode in &record.modes {
            let amplitude = found.selection.get(&mode.qpoint, mode.index).unwrap().amplitude;
            assert_close!(abs=1e-8, amplitude, mode.amplitude);
        }
        for index in 0..3 {
            assert_close!(abs=1e-8, found.selection.get(&V3::zero(), index).unwrap().amplitude, 0.0);
        }
    }
}

#[cfg(feature = "fft")]
#[test]
fn decompose_only_some_qpoints() {
    let settings = settings("supercell: [1, 1, 2]");
    let input = round_trip_input();
    let frames = vec![shared::dimer_cell(); 0];

    let only = [V3::zero()];
    assert!(cmd::run_decompose(&settings, &input, &frames, Some(&only)).unwrap().is_empty());

    // on the grid, but the force constants have nothing there
    let only = [V3([0.0, 0.0, 0.5])];
    assert!(cmd::run_decompose(&settings, &input, &frames, Some(&only)).is_err());
}

#[test]
fn background_build_and_cancel() {
    use phmodes::thermal::EnsembleGenerator;

    let settings = settings("{supercell: [1, 1, 1], frames: 50}");
    let prepared = cmd::prepare(&settings, &round_trip_input()).unwrap();
    let mut generator = EnsembleGenerator::new(
        settings.ensemble_config(), &prepared.unit, settings.supercell, prepared.db,
    ).unwrap();

    let token = generator.cancel_token();
    let handle = generator.spawn_build(move |i, _| {
        if i == 9 {
            token.cancel();
        }
    }).unwrap();
    let trajectory = handle.join().unwrap();
    assert_eq!(trajectory.len(), 10);
    assert_eq!(generator.state(), GeneratorState::Cancelled);
}
