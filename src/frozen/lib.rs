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

//! Frozen phonons.
//!
//! A `FrozenSupercell` is a supercell of some reference unit cell together with the
//! map from each of its atoms to a unit cell atom and a translation.  Modes from a
//! `DispDb` can be frozen into it as displacements, and an arbitrary displacement
//! field can be decomposed back into qpoints and modes through a discrete Fourier
//! transform over the grid of translations.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;
#[macro_use] extern crate itertools;
#[macro_use] extern crate phmodes_util_macros;

use phmodes_array_types::{V3, M33, C3};
use phmodes_structure::{AtomStructure, Lattice};
use phmodes_structure::supercell::{self, ReferenceMap};
use phmodes_dispdb::{DispDb, CondensedSelection, Mode, mass_weighted_dot};
use phmodes_linalg::{RealFft3, HalfSpectrum};
use failure::ResultExt;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::sync::Arc;

pub type FailResult<T> = Result<T, failure::Error>;

/// How far `q · N` may be from an integer for `q` to count as a point of the grid.
const GRID_TOL: f64 = 1e-5;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FrozenError {
    #[error("the supercell has no reference map (see `find_reference` and `set_reference`)")]
    NoReference,

    #[error("reference unit cell has {actual} atoms, but the reference map expects {expected}")]
    UnitCellMismatch { expected: usize, actual: usize },

    #[error("mode table has {actual} atoms per cell, but the reference map expects {expected}")]
    TableMismatch { expected: usize, actual: usize },

    #[error("reference map is for a {map:?} supercell, but this supercell is {periods:?}")]
    PeriodMismatch { map: [u32; 3], periods: [u32; 3] },

    #[error("qpoint {qpoint:?} is not a point of the {periods:?} supercell's grid")]
    OffGrid { qpoint: V3, periods: [u32; 3] },

    #[error("expected {expected} masses (one per unit cell atom), got {actual}")]
    MassCount { expected: usize, actual: usize },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Project the filtered displacement as is.
    None,
    /// Give the filtered displacement at each qpoint unit mass-weighted norm.
    PerQpoint,
    /// Divide by the total norm over all projected qpoints.
    Global,
}

impl Default for Normalization {
    fn default() -> Self { Normalization::None }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectionOptions {
    #[serde(default)]
    pub policy: Normalization,
    /// Report `|c|²` rather than `Re c`.
    #[serde(default)]
    pub use_modulus: bool,
    /// Multiply the result by the norm that was divided out (squared, with `use_modulus`).
    #[serde(default)]
    pub rescale: bool,
}

#[derive(Debug, Clone)]
pub struct FrozenSupercell {
    structure: AtomStructure,
    periods: [u32; 3],
    reference: Option<Arc<ReferenceMap>>,
}

impl FrozenSupercell {
    /// Build the supercell of a unit cell.  The reference map comes for free.
    pub fn from_unit(unit: &AtomStructure, periods: [u32; 3]) -> Self {
        let (structure, token) = supercell::diagonal(periods).build(unit);
        let reference = Some(Arc::new(token.reference_map()));
        FrozenSupercell { structure, periods, reference }
    }

    /// Build the smallest diagonal supercell that is commensurate with a qpoint.
    pub fn from_qpoint(unit: &AtomStructure, qpoint: &V3) -> FailResult<Self> {
        let periods = supercell::dims_from_qpoint(qpoint)?;
        Ok(FrozenSupercell::from_unit(unit, periods))
    }

    /// Wrap a structure that is believed to be a supercell, without mapping it.
    pub fn new(structure: AtomStructure, periods: [u32; 3]) -> Self
    { FrozenSupercell { structure, periods, reference: None } }

    /// Wrap a structure together with a precomputed mapping.
    pub fn with_reference(structure: AtomStructure, reference: Arc<ReferenceMap>) -> FailResult<Self> {
        let mut out = FrozenSupercell::new(structure, reference.periods());
        out.set_reference(reference)?;
        Ok(out)
    }

    /// Map every atom onto a unit cell atom and translation, and keep the result.
    pub fn find_reference(&mut self, unit: &AtomStructure) -> FailResult<Arc<ReferenceMap>> {
        let map = {
            ReferenceMap::find(&self.structure, unit, self.periods)
                .with_context(|e| format!("could not map the supercell onto the unit cell: {}", e))?
        };
        let map = Arc::new(map);
        self.reference = Some(map.clone());
        Ok(map)
    }

    pub fn set_reference(&mut self, reference: Arc<ReferenceMap>) -> FailResult<()> {
        if reference.periods() != self.periods {
            Err(FrozenError::PeriodMismatch { map: reference.periods(), periods: self.periods })?;
        }
        reference.check_num_atoms(self.structure.num_atoms())?;
        self.reference = Some(reference);
        Ok(())
    }

    pub fn reference(&self) -> Option<&Arc<ReferenceMap>> { self.reference.as_ref() }
    pub fn periods(&self) -> [u32; 3] { self.periods }
    pub fn structure(&self) -> &AtomStructure { &self.structure }
    pub fn into_structure(self) -> AtomStructure { self.structure }

    fn reference_map(&self) -> Result<Arc<ReferenceMap>, FrozenError>
    { self.reference.clone().ok_or(FrozenError::NoReference) }

    /// Multiply the lattice by `I + strain`, keeping fractional coordinates.
    pub fn apply_strain(&mut self, strain: &M33) {
        let lattice = self.structure.lattice().strained(strain);
        self.structure.set_lattice(&lattice);
    }

    /// Put the atoms at the same fractional coordinates of another lattice.
    pub fn set_lattice(&mut self, lattice: &Lattice)
    { self.structure.set_lattice(lattice) }

    /// Add the displacement of a mode with real amplitude and a phase.
    ///
    /// The atom of unit cell atom `a` in cell `R` moves by
    /// `amplitude * Re(u_a exp(i (2π q·R + phase)))`.  Any qpoint equivalent to a
    /// stored qpoint (modulo reciprocal lattice vectors, or by time reversal) may be used.
    pub fn make_displacement(
        &mut self,
        qpoint: &V3,
        db: &DispDb,
        imode: usize,
        amplitude: f64,
        phase: f64,
    ) -> FailResult<()> {
        let map = self.reference_map()?;
        check_table(&map, db)?;
        grid_bin(qpoint, self.periods)?;

        let (disp, _) = {
            db.resolve_mode(qpoint, imode)
                .with_context(|e| format!("cannot freeze mode {} at {:?}: {}", imode, qpoint, e))?
        };
        trace!("Freezing mode {} at {:?} (amplitude {}, phase {})", imode, qpoint, amplitude, phase);

        let carts = self.structure.carts_mut();
        for (cart, &prim, cell) in izip!(carts, map.primitive_atoms(), map.cells()) {
            let theta = 2.0 * PI * qpoint.dot(&cell.to_f64()) + phase;
            let u = disp[prim];
            *cart += (u.re() * theta.cos() - u.im() * theta.sin()) * amplitude;
        }
        Ok(())
    }

    /// Displacement of every atom from its ideal position in an undistorted supercell of
    /// `reference_unit`.
    ///
    /// Each displacement is reduced to its nearest image under the supercell lattice.
    pub fn get_displacement(&self, reference_unit: &AtomStructure) -> FailResult<Vec<V3>> {
        let map = self.reference_map()?;
        if reference_unit.num_atoms() != map.num_primitive_atoms() {
            Err(FrozenError::UnitCellMismatch {
                expected: map.num_primitive_atoms(),
                actual: reference_unit.num_atoms(),
            })?;
        }

        let unit_carts = reference_unit.to_carts();
        let unit_lattice = reference_unit.lattice();
        let super_lattice = self.structure.lattice();
        let carts = self.structure.to_carts();
        Ok({
            izip!(&carts, map.primitive_atoms(), map.cells())
                .map(|(actual, &prim, cell)| {
                    let ideal = unit_carts[prim] + cell.to_f64() * unit_lattice;
                    let frac = &(actual - ideal) / super_lattice;
                    frac.map(|x| x - x.round()) * super_lattice
                })
                .collect()
        })
    }

    /// Fourier component of a displacement field at one qpoint of the supercell grid,
    /// as one complex vector per unit cell atom.
    ///
    /// For a field produced by `make_displacement(q, .., imode, A, phase)`, this returns
    /// `A u e^{i phase}`.  (At qpoints equal to their own negative, the two halves of
    /// the wave are indistinguishable, and the result is `A Re(u e^{i phase})`.)
    pub fn filter_to_qpoint(&self, qpoint: &V3, field: &[V3]) -> FailResult<Vec<C3>> {
        let map = self.reference_map()?;
        let spectra = field_spectra(&map, field)?;
        let bin = grid_bin(qpoint, self.periods)?;
        Ok(filtered_at(&spectra, map.num_primitive_atoms(), bin, self.periods))
    }

    /// Amplitudes of the modes of a selection in this structure's displacement from
    /// `reference_unit`.
    ///
    /// The result has the same qpoints and modes as `selection`, with amplitudes filled
    /// in and energies taken from `db`.
    pub fn project_onto_modes(
        &self,
        reference_unit: &AtomStructure,
        db: &DispDb,
        selection: &CondensedSelection,
        options: &ProjectionOptions,
    ) -> FailResult<CondensedSelection> {
        let map = self.reference_map()?;
        check_table(&map, db)?;
        let masses = db.masses();

        let field = self.get_displacement(reference_unit)?;
        let spectra = field_spectra(&map, &field)?;

        let mut filtered = vec![];
        for qpoint in selection.qpoints() {
            let bin = grid_bin(&qpoint, self.periods)?;
            let wave = filtered_at(&spectra, map.num_primitive_atoms(), bin, self.periods);
            let norm = mass_weighted_dot(masses, &wave, &wave).re.sqrt();
            filtered.push((qpoint, wave, norm));
        }

        let global_norm = filtered.iter().map(|&(_, _, norm)| norm * norm).sum::<f64>().sqrt();
        let mut out = CondensedSelection::new();
        for (qpoint, wave, norm) in filtered {
            let divisor = match options.policy {
                Normalization::None => 1.0,
                Normalization::PerQpoint => norm,
                Normalization::Global => global_norm,
            };
            for mode in selection.modes_at(&qpoint) {
                let (disp, energy) = {
                    db.resolve_mode(&qpoint, mode.index)
                        .with_context(|e| format!("cannot project onto mode {} at {:?}: {}", mode.index, qpoint, e))?
                };
                let c = match divisor > 0.0 {
                    true => mass_weighted_dot(masses, &disp, &wave) / divisor,
                    false => Complex64::new(0.0, 0.0),
                };
                let amplitude = match (options.use_modulus, options.rescale) {
                    (false, false) => c.re,
                    (false, true) => c.re * divisor,
                    (true, false) => c.norm_sqr(),
                    (true, true) => c.norm_sqr() * divisor * divisor,
                };
                out.insert(qpoint, Mode::new(mode.index, amplitude, energy));
            }
        }
        Ok(out)
    }

    /// Mass-weighted squared norm of the filtered displacement at every qpoint of the
    /// supercell grid, with qpoints in `[0, 1)`.
    ///
    /// The rigid translation of the whole supercell (its mass-weighted mean
    /// displacement) is removed first, so it does not show up at Γ.
    pub fn spectrum(&self, reference_unit: &AtomStructure, masses: &[f64]) -> FailResult<Vec<(V3, f64)>> {
        let map = self.reference_map()?;
        if masses.len() != map.num_primitive_atoms() {
            Err(FrozenError::MassCount { expected: map.num_primitive_atoms(), actual: masses.len() })?;
        }
        let mut field = self.get_displacement(reference_unit)?;
        remove_rigid_translation(&map, masses, &mut field);
        let spectra = field_spectra(&map, &field)?;

        let periods = self.periods;
        Ok({
            supercell::cell_indices(periods).into_iter().map(|m| {
                let qpoint = V3::from_fn(|k| m[k] as f64 / periods[k] as f64);
                let bin = V3::from_fn(|k| m[k] as i64);
                let wave = filtered_at(&spectra, map.num_primitive_atoms(), bin, periods);
                (qpoint, mass_weighted_dot(masses, &wave, &wave).re)
            }).collect()
        })
    }
}

fn check_table(map: &ReferenceMap, db: &DispDb) -> Result<(), FrozenError> {
    match db.natom() == map.num_primitive_atoms() {
        true => Ok(()),
        false => Err(FrozenError::TableMismatch { expected: map.num_primitive_atoms(), actual: db.natom() }),
    }
}

fn remove_rigid_translation(map: &ReferenceMap, masses: &[f64], field: &mut [V3]) {
    let atom_masses = map.primitive_atoms().iter().map(|&prim| masses[prim]);
    let total_mass: f64 = atom_masses.clone().sum();
    if total_mass <= 0.0 {
        return;
    }
    let momentum = atom_masses.zip(field.iter()).fold(V3::zero(), |acc, (m, d)| acc + m * d);
    let mean = momentum / total_mass;
    for d in field {
        *d -= mean;
    }
}

/// Index of the bin of the `periods` grid for a qpoint.
fn grid_bin(qpoint: &V3, periods: [u32; 3]) -> Result<V3<i64>, FrozenError> {
    let scaled = V3::from_fn(|k| qpoint[k] * periods[k] as f64);
    let bin = scaled.map(|x| x.round());
    match (0..3).all(|k| (scaled[k] - bin[k]).abs() < GRID_TOL) {
        true => Ok(bin.map(|x| x as i64)),
        false => Err(FrozenError::OffGrid { qpoint: *qpoint, periods }),
    }
}

/// Spectrum of each channel `(unit cell atom, axis)`, in that order.
fn field_spectra(map: &ReferenceMap, field: &[V3]) -> FailResult<Vec<HalfSpectrum>> {
    map.check_num_atoms(field.len())?;
    let [n1, n2, n3] = map.periods();
    let fft = match RealFft3::plan([n1 as usize, n2 as usize, n3 as usize]) {
        Ok(fft) => fft,
        Err(e) => {
            warn_once!("Projection onto modes is unavailable: {}", e);
            return Err(e.into());
        },
    };

    let mut grids = vec![vec![0.0; map.num_cells()]; 3 * map.num_primitive_atoms()];
    for (atom, (&prim, disp)) in map.primitive_atoms().iter().zip(field).enumerate() {
        let index = map.grid_index(atom);
        for axis in 0..3 {
            grids[3 * prim + axis][index] = disp[axis];
        }
    }
    Ok(grids.iter().map(|grid| fft.forward(grid)).collect())
}

fn filtered_at(spectra: &[HalfSpectrum], natom: usize, bin: V3<i64>, periods: [u32; 3]) -> Vec<C3> {
    // X[m] of a real wave is half its complex amplitude, unless m ≡ -m
    let self_conjugate = (0..3).all(|k| (2 * bin[k]).rem_euclid(periods[k] as i64) == 0);
    let factor = if self_conjugate { 1.0 } else { 2.0 };
    (0..natom).map(|atom| {
        V3::from_fn(|axis| spectra[3 * atom + axis].bin(bin.0) * factor)
    }).collect()
}
