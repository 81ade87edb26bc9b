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

//! A table of phonon eigendisplacements and energies, by qpoint.
//!
//! This is what the frozen-phonon operations read modes from.  It is built once,
//! either by solving a force constant store or from a precomputed table, and is
//! read-only afterwards except for merging.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;

mod selection;

pub use crate::selection::{Mode, CondensedSelection};

use phmodes_array_types::{V3, C3};
use phmodes_ddb::{Ddb, QptMap, QptNotFound, DEFAULT_QPT_TOL};
use phmodes_dynmat::{PhononSolver, AsrMode, DynmatError, normalize_mass_weighted};
use num_complex::Complex64;
use std::borrow::Cow;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DispDbError {
    #[error(transparent)]
    QptNotFound(#[from] QptNotFound),

    #[error("no mode {mode} at qpoint #{qpt} (there are {nmode} modes)")]
    ModeNotFound { qpt: usize, mode: usize, nmode: usize },

    #[error("no qpoint #{index} (there are {count} qpoints)")]
    QptIndexNotFound { index: usize, count: usize },

    #[error("cannot merge a table of {other_natom} atoms and {other_nmode} modes into one of {natom} atoms and {nmode} modes")]
    IncompatibleMerge { natom: usize, nmode: usize, other_natom: usize, other_nmode: usize },

    #[error("entry at qpoint {qpoint:?} has {actual} {what} (expected {expected})")]
    BadEntry { qpoint: V3, what: &'static str, expected: usize, actual: usize },

    #[error("expected {expected} masses (one per atom), got {actual}")]
    MassCount { expected: usize, actual: usize },

    #[error("while solving for phonons: {0}")]
    Solver(#[from] DynmatError),
}

/// Modes at one qpoint, in ascending order of energy.
#[derive(Debug, Clone, PartialEq)]
pub struct QptModes {
    pub energies: Vec<f64>,
    /// `displacements[mode][atom]`, with unit mass-weighted norm.
    pub displacements: Vec<Vec<C3>>,
}

/// One row of a precomputed table.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct ExternalEntry {
    pub qpoint: V3,
    pub energies: Vec<f64>,
    pub displacements: Vec<Vec<C3>>,
}

/// How a qpoint was matched by `DispDb::find_equivalent`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Equivalence {
    /// The stored qpoint differs by a reciprocal lattice vector (possibly zero).
    Direct,
    /// The stored qpoint is equivalent to `-q`; modes must be complex conjugated.
    TimeReversed,
}

#[derive(Debug, Clone)]
pub struct DispDb {
    natom: usize,
    masses: Vec<f64>,
    qpoints: QptMap<QptModes>,
}

impl DispDb {
    /// Solve a force constant store at every one of its qpoints.
    pub fn compute_from_store(ddb: &Ddb, masses: &[f64], asr: AsrMode) -> Result<Self, DispDbError> {
        let natom = ddb.natom();
        check_masses(natom, masses)?;

        info!("Solving for phonons at {} qpoints", ddb.all_qpoints().len());
        let mut qpoints = QptMap::new(ddb.qpoint_tol());
        for solution in PhononSolver::new(asr).solve_all(ddb, masses)? {
            qpoints.insert(solution.qpoint, QptModes {
                energies: solution.frequencies,
                displacements: solution.eigendisplacements,
            });
        }
        Ok(DispDb { natom, masses: masses.to_vec(), qpoints })
    }

    /// Load a precomputed table.  Displacements are renormalized to unit mass-weighted norm.
    pub fn read_external(natom: usize, masses: &[f64], entries: Vec<ExternalEntry>) -> Result<Self, DispDbError> {
        check_masses(natom, masses)?;
        let nmode = 3 * natom;

        let mut qpoints = QptMap::new(DEFAULT_QPT_TOL);
        for ExternalEntry { qpoint, energies, mut displacements } in entries {
            let bad_entry = |what, actual| DispDbError::BadEntry { qpoint, what, expected: nmode, actual };
            if energies.len() != nmode {
                return Err(bad_entry("energies", energies.len()));
            }
            if displacements.len() != nmode {
                return Err(bad_entry("displacements", displacements.len()));
            }
            for disp in &mut displacements {
                if disp.len() != natom {
                    return Err(DispDbError::BadEntry { qpoint, what: "atoms in a displacement", expected: natom, actual: disp.len() });
                }
                normalize_mass_weighted(disp, masses);
            }
            if qpoints.insert(qpoint, QptModes { energies, displacements }).is_some() {
                warn!("qpoint {:?} appears more than once in the table; keeping the last", qpoint);
            }
        }
        Ok(DispDb { natom, masses: masses.to_vec(), qpoints })
    }

    pub fn natom(&self) -> usize { self.natom }
    pub fn nmode(&self) -> usize { 3 * self.natom }
    pub fn masses(&self) -> &[f64] { &self.masses }
    pub fn num_qpoints(&self) -> usize { self.qpoints.len() }
    pub fn qpoints(&self) -> Vec<V3> { self.qpoints.qpoints() }

    pub fn has_qpoint(&self, qpoint: &V3) -> bool
    { self.qpoints.position(qpoint).is_some() }

    /// Index of a stored qpoint (exact match within tolerance).
    pub fn select_qpoint(&self, qpoint: &V3) -> Result<usize, QptNotFound> {
        self.qpoints.position(qpoint)
            .ok_or(QptNotFound { qpoint: *qpoint, tol: self.qpoints.tol() })
    }

    /// Find a stored qpoint equal to `q` modulo reciprocal lattice vectors, or failing
    /// that, equivalent to `-q`.
    pub fn find_equivalent(&self, qpoint: &V3) -> Option<(usize, Equivalence)> {
        if let Some(index) = self.qpoints.position_mod_g(qpoint) {
            return Some((index, Equivalence::Direct));
        }
        self.qpoints.position_mod_g(&-*qpoint).map(|index| (index, Equivalence::TimeReversed))
    }

    fn qpt_modes(&self, iqpt: usize) -> Result<(&V3, &QptModes), DispDbError> {
        self.qpoints.get_index(iqpt)
            .ok_or(DispDbError::QptIndexNotFound { index: iqpt, count: self.qpoints.len() })
    }

    pub fn qpoint(&self, iqpt: usize) -> Result<V3, DispDbError>
    { self.qpt_modes(iqpt).map(|(&q, _)| q) }

    pub fn mode(&self, iqpt: usize, imode: usize) -> Result<&[C3], DispDbError> {
        let (_, modes) = self.qpt_modes(iqpt)?;
        modes.displacements.get(imode)
            .map(|disp| &disp[..])
            .ok_or(DispDbError::ModeNotFound { qpt: iqpt, mode: imode, nmode: self.nmode() })
    }

    pub fn energy(&self, iqpt: usize, imode: usize) -> Result<f64, DispDbError> {
        let (_, modes) = self.qpt_modes(iqpt)?;
        modes.energies.get(imode).cloned()
            .ok_or(DispDbError::ModeNotFound { qpt: iqpt, mode: imode, nmode: self.nmode() })
    }

    pub fn energies(&self, iqpt: usize) -> Result<&[f64], DispDbError>
    { self.qpt_modes(iqpt).map(|(_, modes)| &modes.energies[..]) }

    pub fn modes_at(&self, qpoint: &V3) -> Result<&QptModes, QptNotFound> {
        self.qpoints.get(qpoint)
            .ok_or(QptNotFound { qpoint: *qpoint, tol: self.qpoints.tol() })
    }

    /// Eigendisplacement and energy of a mode at any qpoint equivalent to a stored one,
    /// conjugated when matched through time reversal.
    pub fn resolve_mode(&self, qpoint: &V3, imode: usize) -> Result<(Cow<'_, [C3]>, f64), DispDbError> {
        let (iqpt, equivalence) = {
            self.find_equivalent(qpoint)
                .ok_or(QptNotFound { qpoint: *qpoint, tol: self.qpoints.tol() })?
        };
        let disp = self.mode(iqpt, imode)?;
        let energy = self.energy(iqpt, imode)?;
        let disp = match equivalence {
            Equivalence::Direct => Cow::Borrowed(disp),
            Equivalence::TimeReversed => Cow::Owned(disp.iter().map(|u| u.conj()).collect()),
        };
        Ok((disp, energy))
    }

    /// `Σ_a m_a conj(u_a)·v_a`
    pub fn mass_weighted_dot(&self, u: &[C3], v: &[C3]) -> Complex64
    { mass_weighted_dot(&self.masses, u, v) }

    /// Add the qpoints of another table.  Qpoints already present are kept as they are.
    ///
    /// Tables of differing atom or mode counts are rejected without modifying `self`.
    pub fn merge(&mut self, other: &DispDb) -> Result<(), DispDbError> {
        if (self.natom, self.nmode()) != (other.natom, other.nmode()) {
            return Err(DispDbError::IncompatibleMerge {
                natom: self.natom,
                nmode: self.nmode(),
                other_natom: other.natom,
                other_nmode: other.nmode(),
            });
        }
        if self.masses != other.masses {
            warn!("Merging mode tables computed with different masses");
        }

        let mut added = 0;
        for (qpoint, modes) in other.qpoints.iter() {
            if !self.has_qpoint(qpoint) {
                self.qpoints.insert(*qpoint, modes.clone());
                added += 1;
            }
        }
        debug!("merge added {} of {} qpoints", added, other.qpoints.len());
        Ok(())
    }

    pub fn cereal(&self) -> DispDbCereal {
        DispDbCereal {
            natom: self.natom,
            masses: self.masses.clone(),
            qpoints: self.qpoints.iter().map(|(&qpoint, modes)| ExternalEntry {
                qpoint,
                energies: modes.energies.clone(),
                displacements: modes.displacements.clone(),
            }).collect(),
        }
    }

    pub fn from_cereal(cereal: DispDbCereal) -> Result<Self, DispDbError> {
        let DispDbCereal { natom, masses, qpoints } = cereal;
        DispDb::read_external(natom, &masses, qpoints)
    }
}

/// `db += other` is `db.merge(&other)`.
///
/// # Panics
///
/// Panics on tables of differing atom or mode counts; use `merge` to handle this.
impl<'a> std::ops::AddAssign<&'a DispDb> for DispDb {
    fn add_assign(&mut self, other: &'a DispDb) {
        if let Err(e) = self.merge(other) {
            panic!("{}", e);
        }
    }
}

/// Serialized form of a `DispDb`.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispDbCereal {
    pub natom: usize,
    pub masses: Vec<f64>,
    pub qpoints: Vec<ExternalEntry>,
}

/// `Σ_a m_a conj(u_a)·v_a`
pub fn mass_weighted_dot(masses: &[f64], u: &[C3], v: &[C3]) -> Complex64 {
    assert_eq!(masses.len(), u.len());
    assert_eq!(masses.len(), v.len());
    masses.iter().zip(u).zip(v)
        .map(|((&m, u), v)| phmodes_array_types::cdot(&[*u], &[*v]) * m)
        .sum()
}

fn check_masses(natom: usize, masses: &[f64]) -> Result<(), DispDbError> {
    match masses.len() == natom {
        true => Ok(()),
        false => Err(DispDbError::MassCount { expected: natom, actual: masses.len() }),
    }
}
