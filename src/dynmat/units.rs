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

//! Unit conversions.
//!
//! Energies inside phmodes are in Hartree, masses in amu, and raw force constants
//! in Hartree/Bohr².

pub const HARTREE_TO_EV: f64 = 27.211386245988;
pub const HARTREE_TO_MEV: f64 = HARTREE_TO_EV * 1e3;
pub const HARTREE_TO_THZ: f64 = 6579.683920502;
pub const HARTREE_TO_CM1: f64 = 219474.6313632;
pub const KELVIN_TO_HARTREE: f64 = 3.166811563e-6;

/// Mass of one atomic mass unit, in electron masses.
pub const AMU_TO_ELECTRON_MASS: f64 = 1822.888486209;

pub const BOHR_TO_ANGSTROM: f64 = 0.529177210903;
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

pub fn hartree_to_thz(energy: f64) -> f64 { energy * HARTREE_TO_THZ }
pub fn hartree_to_cm1(energy: f64) -> f64 { energy * HARTREE_TO_CM1 }
pub fn hartree_to_mev(energy: f64) -> f64 { energy * HARTREE_TO_MEV }
pub fn thz_to_hartree(freq: f64) -> f64 { freq / HARTREE_TO_THZ }
pub fn cm1_to_hartree(freq: f64) -> f64 { freq / HARTREE_TO_CM1 }

/// `kT` in Hartree.
pub fn kelvin_to_hartree(temperature: f64) -> f64 { temperature * KELVIN_TO_HARTREE }

/// Signed frequency of an eigenvalue: `sign(λ) sqrt(|λ|)`.
///
/// Negative output encodes an imaginary frequency.
pub fn signed_sqrt(eigenvalue: f64) -> f64 { eigenvalue.signum() * eigenvalue.abs().sqrt() }
