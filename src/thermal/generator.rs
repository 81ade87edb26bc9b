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
use crate::amplitude::thermal_amplitude;
use crate::config::{EnsembleConfig, Distribution, InstablePolicy, SeedPolicy, DEFAULT_SEED};
use phmodes_array_types::{V3, M33};
use phmodes_structure::AtomStructure;
use phmodes_structure::supercell;
use phmodes_ddb::{qpoints_equivalent, DEFAULT_QPT_TOL};
use phmodes_dispdb::{DispDb, CondensedSelection, Mode};
use phmodes_frozen::FrozenSupercell;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;
use std::sync::{Arc, mpsc};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;

/// Frequencies below this (in Hartree) are treated as zero, and not sampled.
const ZERO_FREQUENCY_TOL: f64 = 1e-12;

/// Progress of an `EnsembleGenerator`.
///
/// `Idle → Sampling → Building → Done`, or `Cancelled` if building stopped early.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    /// Amplitudes are being drawn, or have been drawn and are waiting to be built.
    Sampling,
    Building,
    Done,
    Cancelled,
}

impl GeneratorState {
    const ALL: [GeneratorState; 5] = [
        GeneratorState::Idle,
        GeneratorState::Sampling,
        GeneratorState::Building,
        GeneratorState::Done,
        GeneratorState::Cancelled,
    ];
}

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: GeneratorState) -> Self
    { StateCell(AtomicU8::new(state as u8)) }

    fn get(&self) -> GeneratorState
    { GeneratorState::ALL[self.0.load(Ordering::SeqCst) as usize] }

    fn set(&self, state: GeneratorState)
    { self.0.store(state as u8, Ordering::SeqCst) }
}

/// Cooperative cancellation flag for a build, checked between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// One mode as frozen into one frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledMode {
    pub qpoint: V3,
    pub index: usize,
    pub amplitude: f64,
    pub phase: f64,
    pub energy: f64,
}

/// Everything that was randomly chosen for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub modes: Vec<SampledMode>,
    pub strain: M33,
}

impl FrameRecord {
    /// The sampled amplitudes, without phases.
    pub fn selection(&self) -> CondensedSelection {
        self.modes.iter()
            .map(|m| (m.qpoint, Mode::new(m.index, m.amplitude, m.energy)))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    pub frames: Vec<AtomStructure>,
    /// One per frame.
    pub records: Vec<FrameRecord>,
}

impl Trajectory {
    pub fn len(&self) -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}

// A mode that gets an amplitude in every frame.
#[derive(Debug, Copy, Clone)]
struct Target {
    qpoint: V3,
    index: usize,
    energy: f64,
    scale: f64,
    random_phase: bool,
}

/// Generates frames of a supercell with thermally populated phonons and random strain.
pub struct EnsembleGenerator {
    config: EnsembleConfig,
    supercell: FrozenSupercell,
    db: Arc<DispDb>,
    state: Arc<StateCell>,
    cancel: CancelToken,
    records: Option<Vec<FrameRecord>>,
}

impl EnsembleGenerator {
    pub fn new(
        config: EnsembleConfig,
        unit: &AtomStructure,
        periods: [u32; 3],
        db: Arc<DispDb>,
    ) -> FailResult<Self> {
        if db.natom() != unit.num_atoms() {
            bail!("the mode table has {} atoms per cell, but the unit cell has {}", db.natom(), unit.num_atoms());
        }
        if !(config.temperature >= 0.0 && config.temperature.is_finite()) {
            bail!("temperature must be finite and non-negative (got {})", config.temperature);
        }
        if let Some(strain) = &config.strain {
            strain.validate().map_err(failure::err_msg)?;
        }
        let supercell = FrozenSupercell::from_unit(unit, periods);
        Ok(EnsembleGenerator {
            config,
            supercell,
            db,
            state: Arc::new(StateCell::new(GeneratorState::Idle)),
            cancel: CancelToken::new(),
            records: None,
        })
    }

    /// The undistorted supercell that every frame starts from.
    pub fn supercell(&self) -> &FrozenSupercell { &self.supercell }

    pub fn state(&self) -> GeneratorState { self.state.get() }

    /// A handle that can stop a build in progress.
    pub fn cancel_token(&self) -> CancelToken { self.cancel.clone() }

    /// Draw the amplitudes and strains of every frame.
    pub fn sample(&mut self) -> FailResult<&[FrameRecord]> {
        match self.state() {
            GeneratorState::Idle => {},
            state => bail!("cannot sample; the generator is in state {:?}", state),
        }
        self.state.set(GeneratorState::Sampling);

        let targets = match select_targets(&self.db, self.supercell.periods(), &self.config) {
            Ok(targets) => targets,
            Err(e) => {
                self.state.set(GeneratorState::Idle);
                return Err(e);
            },
        };
        let seed = resolve_seed(self.config.seed);
        info!("Sampling {} modes in {} frames (seed {})", targets.len(), self.config.num_frames, seed);

        let mut rng = StdRng::seed_from_u64(seed);
        let records = sample_records(&targets, &self.config, &mut rng);
        Ok(&self.records.insert(records)[..])
    }

    /// The sampled records, once `sample` has run and until building starts.
    pub fn records(&self) -> Option<&[FrameRecord]>
    { self.records.as_ref().map(|r| &r[..]) }

    fn take_records(&mut self) -> FailResult<Vec<FrameRecord>> {
        if self.state() == GeneratorState::Idle {
            self.sample()?;
        }
        match (self.state(), self.records.take()) {
            (GeneratorState::Sampling, Some(records)) => Ok(records),
            (state, _) => bail!("cannot build; the generator is in state {:?}", state),
        }
    }

    /// Sample (if not done yet) and build every frame on this thread.
    pub fn build(&mut self) -> FailResult<Trajectory>
    { self.build_with(|_, _| {}) }

    /// `build`, calling a function after each frame.
    pub fn build_with<F>(&mut self, on_frame: F) -> FailResult<Trajectory>
    where F: FnMut(usize, &AtomStructure),
    {
        let records = self.take_records()?;
        run_build(&self.supercell, &self.db, records, &self.cancel, &self.state, on_frame)
    }

    /// Sample and build.
    pub fn generate(&mut self) -> FailResult<Trajectory> {
        self.sample()?;
        self.build()
    }

    /// Build on a background thread.
    ///
    /// `on_frame` is called on the worker after each frame.  Sampling (if not done yet)
    /// happens on this thread before the worker starts.
    pub fn spawn_build<F>(&mut self, on_frame: F) -> FailResult<BuildHandle>
    where F: FnMut(usize, &AtomStructure) + Send + 'static,
    { self.spawn_build_on(thread::Builder::new().name("phmodes-build".into()), on_frame) }

    // The worker receives its records only once it is running, so that a failed
    // spawn leaves the generator as it was.
    pub(crate) fn spawn_build_on<F>(&mut self, builder: thread::Builder, on_frame: F) -> FailResult<BuildHandle>
    where F: FnMut(usize, &AtomStructure) + Send + 'static,
    {
        let records = self.take_records()?;
        let supercell = self.supercell.clone();
        let db = self.db.clone();
        let cancel = self.cancel.clone();
        let state = self.state.clone();
        let (records_sender, records_receiver) = mpsc::channel::<Vec<FrameRecord>>();
        let (sender, finished) = mpsc::channel();

        let spawned = builder.spawn(move || {
            let records = match records_receiver.recv() {
                Ok(records) => records,
                Err(_) => bail!("the build was abandoned before it started"),
            };
            let result = run_build(&supercell, &db, records, &cancel, &state, on_frame);
            // the receiver may be gone; nobody is listening then
            let _ = sender.send(result.as_ref().map(|t| t.len()).unwrap_or(0));
            result
        });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.records = Some(records);
                bail!("could not start the build thread: {}", e);
            },
        };

        self.state.set(GeneratorState::Building);
        if let Err(mpsc::SendError(records)) = records_sender.send(records) {
            self.records = Some(records);
            self.state.set(GeneratorState::Sampling);
            bail!("the build thread exited before it started");
        }
        Ok(BuildHandle {
            cancel: self.cancel.clone(),
            state: self.state.clone(),
            finished,
            thread,
        })
    }
}

/// A build running on a background thread.
pub struct BuildHandle {
    cancel: CancelToken,
    state: Arc<StateCell>,
    finished: mpsc::Receiver<usize>,
    thread: thread::JoinHandle<FailResult<Trajectory>>,
}

impl BuildHandle {
    /// Ask the worker to stop before its next frame.
    pub fn cancel(&self) { self.cancel.cancel() }

    pub fn state(&self) -> GeneratorState { self.state.get() }

    /// The number of frames built, if the worker has finished.
    pub fn try_finished(&self) -> Option<usize>
    { self.finished.try_recv().ok() }

    /// Block until the worker finishes, and get the (possibly truncated) trajectory.
    pub fn join(self) -> FailResult<Trajectory> {
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => bail!("the build thread panicked"),
        }
    }
}

/// Apply a record to a fresh copy of the reference supercell.
pub fn build_frame(supercell: &FrozenSupercell, db: &DispDb, record: &FrameRecord) -> FailResult<AtomStructure> {
    let mut frame = supercell.clone();
    for mode in &record.modes {
        frame.make_displacement(&mode.qpoint, db, mode.index, mode.amplitude, mode.phase)?;
    }
    frame.apply_strain(&record.strain);
    Ok(frame.into_structure())
}

fn run_build<F>(
    supercell: &FrozenSupercell,
    db: &DispDb,
    mut records: Vec<FrameRecord>,
    cancel: &CancelToken,
    state: &StateCell,
    mut on_frame: F,
) -> FailResult<Trajectory>
where F: FnMut(usize, &AtomStructure),
{
    state.set(GeneratorState::Building);
    info!("Building {} frames", records.len());

    let mut slots: Vec<Option<AtomStructure>> = (0..records.len()).map(|_| None).collect();
    let mut cancelled = false;
    for (i, (record, slot)) in records.iter().zip(&mut slots).enumerate() {
        if cancel.is_cancelled() {
            info!("Build cancelled after {} frames", i);
            cancelled = true;
            break;
        }
        let frame = match build_frame(supercell, db, record) {
            Ok(frame) => frame,
            Err(e) => {
                state.set(GeneratorState::Cancelled);
                return Err(e.context(format!("while building frame {}", i)).into());
            },
        };
        trace!("built frame {}", i);
        on_frame(i, &frame);
        *slot = Some(frame);
    }

    let frames: Vec<_> = slots.into_iter().take_while(Option::is_some).flatten().collect();
    records.truncate(frames.len());
    state.set(match cancelled {
        true => GeneratorState::Cancelled,
        false => GeneratorState::Done,
    });
    Ok(Trajectory { frames, records })
}

fn resolve_seed(policy: SeedPolicy) -> u64 {
    match policy {
        SeedPolicy::None => DEFAULT_SEED,
        SeedPolicy::User(seed) => seed,
        SeedPolicy::Random => StdRng::from_entropy().gen(),
        SeedPolicy::Time => {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(DEFAULT_SEED)
        },
    }
}

/// The modes to sample: one qpoint of each `{q, -q}` pair of the supercell grid,
/// excluding the three acoustic modes at Γ.
fn select_targets(db: &DispDb, periods: [u32; 3], config: &EnsembleConfig) -> FailResult<Vec<Target>> {
    let tol = DEFAULT_QPT_TOL;
    let mut taken: Vec<V3> = vec![];
    let mut targets = vec![];
    for m in supercell::cell_indices(periods) {
        let qpoint = V3::from_fn(|k| m[k] as f64 / periods[k] as f64);
        let minus_q = -qpoint;
        if taken.iter().any(|q| qpoints_equivalent(q, &minus_q, tol)) {
            continue;
        }
        taken.push(qpoint);

        let iqpt = match db.find_equivalent(&qpoint) {
            Some((iqpt, _)) => iqpt,
            None => {
                warn!("The mode table has nothing equivalent to qpoint {:?}; it will not be sampled", qpoint);
                continue;
            },
        };
        let energies = db.energies(iqpt)?;
        let self_conjugate = qpoints_equivalent(&qpoint, &minus_q, tol);

        let mut acoustic = vec![];
        if qpoints_equivalent(&qpoint, &V3::zero(), tol) {
            acoustic = (0..energies.len()).collect();
            acoustic.sort_by(|&a: &usize, &b: &usize| energies[a].abs().total_cmp(&energies[b].abs()));
            acoustic.truncate(3);
        }

        for (index, &energy) in energies.iter().enumerate() {
            if acoustic.contains(&index) {
                continue;
            }
            if let Some(scale) = amplitude_scale(energy, config) {
                targets.push(Target { qpoint, index, energy, scale, random_phase: !self_conjugate });
            }
        }
    }
    Ok(targets)
}

/// Standard deviation of a mode's amplitude, or `None` if it is not sampled.
fn amplitude_scale(energy: f64, config: &EnsembleConfig) -> Option<f64> {
    let frequency = match energy < 0.0 {
        false => energy,
        true => match config.instable {
            InstablePolicy::Ignore => return None,
            InstablePolicy::Absolute => -energy,
            InstablePolicy::Constant(amplitude) => return Some(amplitude),
        },
    };
    if frequency < ZERO_FREQUENCY_TOL {
        warn_once!("Modes of zero frequency away from Γ are not sampled");
        return None;
    }
    Some(thermal_amplitude(frequency, config.temperature, config.statistics, config.length_per_bohr))
}

fn sample_records<R: Rng>(targets: &[Target], config: &EnsembleConfig, rng: &mut R) -> Vec<FrameRecord> {
    let mut records = Vec::with_capacity(config.num_frames);
    for _ in 0..config.num_frames {
        let mut modes = Vec::with_capacity(targets.len());
        for target in targets {
            let factor: f64 = match config.distribution {
                Distribution::Normal => rng.sample(StandardNormal),
                Distribution::Uniform => if rng.gen() { 1.0 } else { -1.0 },
            };
            let phase = match target.random_phase {
                true => rng.gen_range(0.0..2.0 * PI),
                false => 0.0,
            };
            modes.push(SampledMode {
                qpoint: target.qpoint,
                index: target.index,
                amplitude: factor * target.scale,
                phase,
                energy: target.energy,
            });
        }
        let strain = match &config.strain {
            Some(bounds) => bounds.sample(rng),
            None => M33::zero(),
        };
        records.push(FrameRecord { modes, strain });
    }
    records
}
