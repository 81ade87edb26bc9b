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

//! A store of second derivatives of the total energy, keyed by qpoint.
//!
//! Each derivative is taken with respect to two perturbations (an atomic displacement,
//! a homogeneous electric field, or a strain) along two cartesian directions. The
//! atom/atom derivatives are the force constants that `phmodes-dynmat` turns into
//! phonons; the derivatives involving the electric field at Γ give the Born effective
//! charges and the electronic dielectric tensor.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;

mod qpoints;
mod response;
pub mod cereal;

pub use crate::qpoints::{QptMap, qpoints_equal, qpoints_equivalent, DEFAULT_QPT_TOL};

use phmodes_array_types::V3;
use phmodes_structure::Lattice;
use num_complex::Complex64;
use std::fmt;

/// What a derivative is taken with respect to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Perturbation {
    /// Displacement of an atom of the unit cell.
    Atom(usize),
    ElectricField,
    Strain,
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perturbation::Atom(atom) => write!(f, "atom {}", atom),
            Perturbation::ElectricField => write!(f, "electric field"),
            Perturbation::Strain => write!(f, "strain"),
        }
    }
}

/// `d²E / (d pert1_dir1) (d pert2_dir2)` at some qpoint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SecondDerivative {
    pub dir1: usize,
    pub pert1: Perturbation,
    pub dir2: usize,
    pub pert2: Perturbation,
    pub value: Complex64,
}

pub type DerivativeKey = (usize, Perturbation, usize, Perturbation);

impl SecondDerivative {
    pub fn new(dir1: usize, pert1: Perturbation, dir2: usize, pert2: Perturbation, value: Complex64) -> Self
    { SecondDerivative { dir1, pert1, dir2, pert2, value } }

    pub fn key(&self) -> DerivativeKey
    { (self.dir1, self.pert1, self.dir2, self.pert2) }

    /// Both perturbations are atomic displacements.
    pub fn atom_pair(&self) -> Option<(usize, usize)> {
        match (self.pert1, self.pert2) {
            (Perturbation::Atom(a), Perturbation::Atom(b)) => Some((a, b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("qpoint {qpoint:?} not found (tolerance {tol:e})")]
pub struct QptNotFound {
    pub qpoint: V3,
    pub tol: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DdbError {
    #[error(transparent)]
    QptNotFound(#[from] QptNotFound),

    #[error("no second derivative with respect to ({pert1}, direction {dir1}) and ({pert2}, direction {dir2}) at Γ; {hint}")]
    MissingComponent {
        dir1: usize,
        pert1: Perturbation,
        dir2: usize,
        pert2: Perturbation,
        hint: &'static str,
    },

    #[error("derivative refers to atom {atom}, but the store has {natom} atoms")]
    BadIndex { atom: usize, natom: usize },

    #[error("derivative has direction {dir} (directions are 0, 1, or 2)")]
    BadDirection { dir: usize },

    #[error("the dielectric tensor needs the cell volume, but the store has no lattice")]
    NoLattice,
}

/// The capability interface of anything that can supply second derivatives.
///
/// Readers of external formats implement this; `Ddb::from_source` copies any
/// source into an in-memory store.
pub trait ForceConstantSource {
    fn natom(&self) -> usize;
    fn qpoints(&self) -> Vec<V3>;
    fn block(&self, qpoint: &V3) -> Result<Vec<SecondDerivative>, QptNotFound>;

    /// Whether the atom/atom values are already divided by `sqrt(m_a m_b)`.
    fn is_mass_normalized(&self) -> bool;

    /// The unit cell, when known. Needed only for the dielectric tensor.
    fn lattice(&self) -> Option<Lattice> { None }
}

/// In-memory derivative database.
#[derive(Debug, Clone)]
pub struct Ddb {
    natom: usize,
    mass_normalized: bool,
    lattice: Option<Lattice>,
    blocks: QptMap<Vec<SecondDerivative>>,
}

impl Ddb {
    pub fn new(natom: usize) -> Self
    { Ddb::with_tolerance(natom, DEFAULT_QPT_TOL) }

    pub fn with_tolerance(natom: usize, qpoint_tol: f64) -> Self {
        Ddb {
            natom,
            mass_normalized: false,
            lattice: None,
            blocks: QptMap::new(qpoint_tol),
        }
    }

    pub fn from_source<S: ForceConstantSource + ?Sized>(source: &S) -> Result<Self, DdbError> {
        let mut ddb = Ddb::new(source.natom());
        ddb.set_mass_normalized(source.is_mass_normalized());
        ddb.lattice = source.lattice();
        for qpoint in source.qpoints() {
            for derivative in source.block(&qpoint)? {
                ddb.insert(qpoint, derivative)?;
            }
        }
        debug!("copied {} qpoints from a force constant source", ddb.blocks.len());
        Ok(ddb)
    }

    pub fn natom(&self) -> usize { self.natom }

    pub fn is_mass_normalized(&self) -> bool { self.mass_normalized }
    pub fn set_mass_normalized(&mut self, value: bool) { self.mass_normalized = value; }

    pub fn lattice(&self) -> Option<&Lattice> { self.lattice.as_ref() }
    pub fn set_lattice(&mut self, lattice: Lattice) { self.lattice = Some(lattice); }

    pub fn qpoint_tol(&self) -> f64 { self.blocks.tol() }

    /// Record a derivative, replacing any existing value for the same perturbations
    /// at the same qpoint.
    pub fn insert(&mut self, qpoint: V3, derivative: SecondDerivative) -> Result<(), DdbError> {
        self.validate(&derivative)?;
        let block = self.blocks.entry_or_insert_with(qpoint, Vec::new);
        match block.iter_mut().find(|d| d.key() == derivative.key()) {
            Some(existing) => *existing = derivative,
            None => block.push(derivative),
        }
        Ok(())
    }

    fn validate(&self, derivative: &SecondDerivative) -> Result<(), DdbError> {
        for &dir in &[derivative.dir1, derivative.dir2] {
            if dir >= 3 {
                return Err(DdbError::BadDirection { dir });
            }
        }
        for &pert in &[derivative.pert1, derivative.pert2] {
            if let Perturbation::Atom(atom) = pert {
                if atom >= self.natom {
                    return Err(DdbError::BadIndex { atom, natom: self.natom });
                }
            }
        }
        Ok(())
    }

    /// All derivatives recorded at a qpoint.
    pub fn block_for(&self, qpoint: &V3) -> Result<&[SecondDerivative], QptNotFound> {
        self.blocks.get(qpoint)
            .map(|block| &block[..])
            .ok_or(QptNotFound { qpoint: *qpoint, tol: self.blocks.tol() })
    }

    pub fn has_qpoint(&self, qpoint: &V3) -> bool
    { self.blocks.position(qpoint).is_some() }

    pub fn all_qpoints(&self) -> Vec<V3>
    { self.blocks.qpoints() }
}

impl ForceConstantSource for Ddb {
    fn natom(&self) -> usize { self.natom }
    fn qpoints(&self) -> Vec<V3> { self.all_qpoints() }
    fn block(&self, qpoint: &V3) -> Result<Vec<SecondDerivative>, QptNotFound>
    { self.block_for(qpoint).map(|b| b.to_vec()) }
    fn is_mass_normalized(&self) -> bool { self.mass_normalized }
    fn lattice(&self) -> Option<Lattice> { self.lattice.clone() }
}
