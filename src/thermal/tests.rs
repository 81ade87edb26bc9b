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

#![deny(unused)]

use crate::*;
use phmodes_array_types::{V3, C3};
use phmodes_assert_close::assert_close;
use phmodes_structure::{AtomStructure, Atom, CoordsKind, Element, Lattice};
use phmodes_dispdb::{DispDb, ExternalEntry};
use phmodes_dynmat::units::{cm1_to_hartree, KELVIN_TO_HARTREE};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const MASS: f64 = 28.0;

fn unit() -> AtomStructure {
    let atom = Atom::new(Element::from_symbol("Si").unwrap());
    AtomStructure::new(Lattice::cubic(3.0), CoordsKind::Fracs(vec![V3::zero()]), vec![atom])
}

fn axis_modes() -> Vec<Vec<C3>>
{ (0..3).map(|i| vec![C3::from_real(&V3::axis_unit(i))]).collect() }

// One atom; acoustic modes at Γ, and the given energies along the x axis.
fn table(energies: &[(f64, [f64; 3])]) -> Arc<DispDb> {
    let mut entries = vec![ExternalEntry {
        qpoint: V3::zero(),
        energies: vec![0.0; 3],
        displacements: axis_modes(),
    }];
    for &(qx, energies) in energies {
        entries.push(ExternalEntry {
            qpoint: V3([qx, 0.0, 0.0]),
            energies: energies.to_vec(),
            displacements: axis_modes(),
        });
    }
    Arc::new(DispDb::read_external(1, &[MASS], entries).unwrap())
}

fn omega() -> f64 { cm1_to_hartree(300.0) }

fn zone_boundary_table() -> Arc<DispDb>
{ table(&[(0.5, [omega(), 1.5 * omega(), 2.0 * omega()])]) }

fn generator(config: EnsembleConfig, periods: [u32; 3], db: Arc<DispDb>) -> EnsembleGenerator
{ EnsembleGenerator::new(config, &unit(), periods, db).unwrap() }

#[test]
fn acoustic_modes_are_skipped() {
    let mut gen = generator(EnsembleConfig::default(), [2, 1, 1], zone_boundary_table());
    let records = gen.sample().unwrap();
    assert_eq!(records.len(), 1);
    let modes = &records[0].modes;
    assert_eq!(modes.len(), 3);
    for (i, mode) in modes.iter().enumerate() {
        assert_eq!(mode.qpoint, V3([0.5, 0.0, 0.0]));
        assert_eq!(mode.index, i);
        // equal to its own negative, so no phase
        assert_eq!(mode.phase, 0.0);
    }
}

#[test]
fn half_grid() {
    let db = table(&[
        (0.25, [omega(), 1.5 * omega(), 2.0 * omega()]),
        (0.5, [omega(), 1.5 * omega(), 2.0 * omega()]),
    ]);
    let config = EnsembleConfig { num_frames: 2, ..Default::default() };
    let mut gen = generator(config, [4, 1, 1], db);
    let records = gen.sample().unwrap();

    // 0.75 is the negative of 0.25, and is covered by it
    let qpoints: Vec<_> = records[0].modes.iter().map(|m| m.qpoint[0]).collect();
    assert_eq!(qpoints, vec![0.25, 0.25, 0.25, 0.5, 0.5, 0.5]);
    assert!(records[0].modes[..3].iter().all(|m| 0.0 <= m.phase && m.phase < 2.0 * std::f64::consts::PI));
    assert_ne!(records[0].modes[0].phase, records[1].modes[0].phase);
}

#[test]
fn uniform_distribution() {
    let config = EnsembleConfig {
        distribution: Distribution::Uniform,
        num_frames: 5,
        ..Default::default()
    };
    let mut gen = generator(config.clone(), [2, 1, 1], zone_boundary_table());
    for record in gen.sample().unwrap() {
        for mode in &record.modes {
            let expected = thermal_amplitude(mode.energy, config.temperature, config.statistics, config.length_per_bohr);
            assert_close!(rel=1e-12, mode.amplitude.abs(), expected);
        }
    }
}

#[test]
fn classical_and_quantum_agree_when_hot() {
    let temperature = 200.0 * omega() / KELVIN_TO_HARTREE;
    let num_frames = 20000;
    let first_mode = |statistics| -> Vec<f64> {
        let config = EnsembleConfig { temperature, statistics, num_frames, seed: SeedPolicy::User(11), ..Default::default() };
        let mut gen = generator(config, [2, 1, 1], zone_boundary_table());
        gen.sample().unwrap().iter().map(|r| r.modes[0].amplitude).collect()
    };
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let variance = |xs: &[f64]| xs.iter().map(|x| x * x).sum::<f64>() / xs.len() as f64;

    let quantum = first_mode(Statistics::Quantum);
    let classical = first_mode(Statistics::Classical);
    let expected = thermal_amplitude(omega(), temperature, Statistics::Classical, EnsembleConfig::default().length_per_bohr).powi(2);

    // same seed, same draws; at kT = 200 hbar omega the two laws differ by about 1e-6
    assert_close!(rel=1e-5, variance(&quantum), variance(&classical));
    assert_close!(rel=0.05, variance(&classical), expected);
    assert_close!(abs=0.05 * expected.sqrt(), mean(&quantum), 0.0);
    assert_close!(abs=0.05 * expected.sqrt(), mean(&classical), 0.0);
}

#[test]
fn classical_at_zero_temperature() {
    let config = EnsembleConfig { temperature: 0.0, statistics: Statistics::Classical, ..Default::default() };
    let mut gen = generator(config, [2, 1, 1], zone_boundary_table());
    let trajectory = gen.generate().unwrap();
    assert!(trajectory.records[0].modes.iter().all(|m| m.amplitude == 0.0));
    assert_close!(abs=1e-12, trajectory.frames[0].to_carts(), gen.supercell().structure().to_carts());
}

#[test]
fn instable_policies() {
    let db = table(&[(0.5, [-omega(), omega(), 2.0 * omega()])]);
    let indices = |instable| {
        let config = EnsembleConfig { instable, distribution: Distribution::Uniform, ..Default::default() };
        let mut gen = generator(config, [2, 1, 1], db.clone());
        gen.sample().unwrap()[0].modes.iter().map(|m| (m.index, m.amplitude.abs())).collect::<Vec<_>>()
    };

    let ignored = indices(InstablePolicy::Ignore);
    assert_eq!(ignored.iter().map(|&(i, _)| i).collect::<Vec<_>>(), vec![1, 2]);

    // |ω| of mode 0 equals ω of mode 1
    let absolute = indices(InstablePolicy::Absolute);
    assert_eq!(absolute.len(), 3);
    assert_close!(rel=1e-12, absolute[0].1, absolute[1].1);

    let constant = indices(InstablePolicy::Constant(0.2));
    assert_eq!(constant[0], (0, 0.2));
}

#[test]
fn user_seed_is_reproducible() {
    let config = EnsembleConfig {
        num_frames: 3,
        seed: SeedPolicy::User(42),
        strain: Some(StrainBounds { isotropic: 0.01, shear: 0.01, rotate: true, ..Default::default() }),
        ..Default::default()
    };
    let first = generator(config.clone(), [2, 1, 1], zone_boundary_table()).generate().unwrap();
    let second = generator(config, [2, 1, 1], zone_boundary_table()).generate().unwrap();
    assert_eq!(first.records, second.records);
    for (a, b) in first.frames.iter().zip(&second.frames) {
        assert_eq!(a.to_carts(), b.to_carts());
    }
}

#[test]
fn states() {
    let mut gen = generator(EnsembleConfig::default(), [2, 1, 1], zone_boundary_table());
    assert_eq!(gen.state(), GeneratorState::Idle);
    gen.sample().unwrap();
    assert_eq!(gen.state(), GeneratorState::Sampling);
    assert!(gen.records().is_some());
    gen.build().unwrap();
    assert_eq!(gen.state(), GeneratorState::Done);
    assert!(gen.sample().is_err());
    assert!(gen.build().is_err());
}

#[test]
fn background_build() {
    let config = EnsembleConfig { num_frames: 10, ..Default::default() };
    let mut gen = generator(config, [2, 1, 1], zone_boundary_table());
    let count = Arc::new(AtomicUsize::new(0));
    let handle = gen.spawn_build({
        let count = count.clone();
        move |_, _| { count.fetch_add(1, Ordering::SeqCst); }
    }).unwrap();

    let trajectory = handle.join().unwrap();
    assert_eq!(trajectory.len(), 10);
    assert_eq!(trajectory.records.len(), 10);
    assert_eq!(count.load(Ordering::SeqCst), 10);
    assert_eq!(gen.state(), GeneratorState::Done);
}

#[test]
fn failed_spawn_keeps_the_samples() {
    let config = EnsembleConfig { num_frames: 3, seed: SeedPolicy::User(7), ..Default::default() };
    let mut gen = generator(config, [2, 1, 1], zone_boundary_table());
    gen.sample().unwrap();

    // no thread can have a stack this large
    let builder = std::thread::Builder::new().stack_size(1 << 60);
    assert!(gen.spawn_build_on(builder, |_, _| {}).is_err());
    assert_eq!(gen.state(), GeneratorState::Sampling);

    let handle = gen.spawn_build(|_, _| {}).unwrap();
    while handle.try_finished().is_none() {
        std::thread::yield_now();
    }
    let trajectory = handle.join().unwrap();
    assert_eq!(trajectory.len(), 3);
    assert_eq!(gen.state(), GeneratorState::Done);
}

#[test]
fn cancellation_truncates() {
    let config = EnsembleConfig { num_frames: 10, ..Default::default() };
    let mut gen = generator(config, [2, 1, 1], zone_boundary_table());
    let token = gen.cancel_token();
    let handle = gen.spawn_build(move |i, _| {
        if i == 2 {
            token.cancel();
        }
    }).unwrap();

    let trajectory = handle.join().unwrap();
    assert_eq!(trajectory.len(), 3);
    assert_eq!(trajectory.records.len(), 3);
    assert_eq!(gen.state(), GeneratorState::Cancelled);
}

#[cfg(feature = "fft")]
#[test]
fn decomposition_recovers_strain_and_amplitudes() {
    let db = table(&[
        (0.25, [omega(), 1.5 * omega(), 2.0 * omega()]),
        (0.5, [omega(), 1.5 * omega(), 2.0 * omega()]),
    ]);
    let config = EnsembleConfig {
        num_frames: 4,
        seed: SeedPolicy::User(5),
        strain: Some(StrainBounds { isotropic: 0.01, tetragonal: 0.02, shear: 0.01, rotate: true, ..Default::default() }),
        ..Default::default()
    };
    let mut gen = generator(config, [4, 1, 1], db.clone());
    let trajectory = gen.generate().unwrap();

    let selection = trajectory.records[0].selection();
    let decomposed = decompose(&trajectory.frames, &unit(), [4, 1, 1], &db, &selection, &Default::default()).unwrap();
    assert_eq!(decomposed.len(), 4);
    for (record, found) in trajectory.records.iter().zip(&decomposed) {
        assert_close!(abs=1e-12, found.strain, record.strain);
        for mode in &record.modes {
            let amplitude = found.selection.get(&mode.qpoint, mode.index).unwrap().amplitude;
            // the signed projection of a wave with a phase is its real part
            assert_close!(abs=1e-9, amplitude, mode.amplitude * mode.phase.cos());
        }
    }
}
