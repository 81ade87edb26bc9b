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

//! Thermal ensembles of frozen-phonon supercells.
//!
//! An `EnsembleGenerator` draws, for each frame, a random amplitude for every mode
//! commensurate with the supercell (with the spread of a thermal population at some
//! temperature) and optionally a random strain, then freezes them into copies of the
//! supercell.  `decompose` goes the other way.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;
#[macro_use] extern crate failure;
#[macro_use] extern crate phmodes_util_macros;

mod amplitude;
mod config;
mod decompose;
mod generator;
pub mod strain;

#[cfg(test)]
mod tests;

pub type FailResult<T> = Result<T, failure::Error>;

pub use crate::amplitude::{thermal_amplitude, bose_occupation};
pub use crate::config::{EnsembleConfig, Statistics, Distribution, InstablePolicy, SeedPolicy};
pub use crate::decompose::{decompose, strain_between, supercell_lattice, FrameDecomposition};
pub use crate::generator::{
    EnsembleGenerator, GeneratorState, BuildHandle, CancelToken,
    Trajectory, FrameRecord, SampledMode, build_frame,
};
pub use crate::strain::{StrainBounds, cubic_rotations};
