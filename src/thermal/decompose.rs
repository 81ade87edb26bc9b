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
use phmodes_array_types::{V3, M33};
use phmodes_structure::{AtomStructure, Lattice};
use phmodes_structure::supercell::ReferenceMap;
use phmodes_dispdb::{DispDb, CondensedSelection};
use phmodes_frozen::{FrozenSupercell, ProjectionOptions};
use failure::ResultExt;
use rayon::prelude::*;
use std::sync::Arc;

/// Strain and mode amplitudes found in one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDecomposition {
    pub strain: M33,
    pub selection: CondensedSelection,
}

/// The symmetric strain `ε` such that `frame ≈ reference (I + ε)`.
pub fn strain_between(reference: &Lattice, frame: &Lattice) -> M33
{ (*reference.inverse_matrix() * *frame.matrix()).sym() - M33::eye() }

/// Lattice of the undistorted `periods` supercell of a unit cell.
pub fn supercell_lattice(unit: &Lattice, periods: [u32; 3]) -> Lattice
{ &M33::from_diag(V3(periods).map(f64::from)) * unit }

/// Recover the strain and the amplitudes of the modes of `selection` in every
/// frame of a trajectory of `periods` supercells of `reference_unit`.
///
/// With default `options`, the amplitudes are signed and unnormalized.
///
/// The strain of each frame is removed by putting its atoms at the same fractional
/// coordinates of the undistorted supercell lattice.  Atoms are assumed to appear in
/// the same order in every frame, so the mapping onto the unit cell is computed once.
pub fn decompose(
    frames: &[AtomStructure],
    reference_unit: &AtomStructure,
    periods: [u32; 3],
    db: &DispDb,
    selection: &CondensedSelection,
    options: &ProjectionOptions,
) -> FailResult<Vec<FrameDecomposition>> {
    let reference_lattice = supercell_lattice(reference_unit.lattice(), periods);
    let first = match frames.first() {
        Some(first) => first,
        None => return Ok(vec![]),
    };

    let unstrain = |frame: &AtomStructure| {
        let mut frame = frame.clone();
        frame.set_lattice(&reference_lattice);
        frame
    };
    let map = {
        ReferenceMap::find(&unstrain(first), reference_unit, periods)
            .with_context(|e| format!("could not map the first frame onto the unit cell: {}", e))?
    };
    let map = Arc::new(map);
    info!("Decomposing {} frames onto {} modes", frames.len(), selection.num_modes());

    frames.par_iter().enumerate().map(|(i, frame)| -> FailResult<FrameDecomposition> {
        let strain = strain_between(&reference_lattice, frame.lattice());
        let supercell = FrozenSupercell::with_reference(unstrain(frame), map.clone())?;
        let selection = {
            supercell.project_onto_modes(reference_unit, db, selection, options)
                .with_context(|e| format!("while decomposing frame {}: {}", i, e))?
        };
        Ok(FrameDecomposition { strain, selection })
    }).collect()
}
