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

//! The work behind each binary, separated from argument parsing.

use crate::FailResult;
use crate::cereal::Input;
use crate::config::ValidatedSettings;
use phmodes_array_types::V3;
use phmodes_structure::AtomStructure;
use phmodes_structure::supercell;
use phmodes_ddb::{qpoints_equivalent, DEFAULT_QPT_TOL};
use phmodes_dispdb::{DispDb, CondensedSelection, Mode};
use phmodes_thermal::{EnsembleGenerator, FrameDecomposition, Trajectory};
use failure::ResultExt;
use std::sync::Arc;

/// The unit cell and its modes.
pub struct Prepared {
    pub unit: AtomStructure,
    pub db: Arc<DispDb>,
}

/// Mass of each atom of a structure.
pub fn masses_of(settings: &ValidatedSettings, structure: &AtomStructure) -> Vec<f64>
{ structure.elements().into_iter().map(|e| settings.mass_of(e)).collect() }

/// Read the unit cell and solve for its modes at every qpoint of the store.
pub fn prepare(settings: &ValidatedSettings, input: &Input) -> FailResult<Prepared> {
    let unit = input.unit_cell.to_structure()?;
    let ddb = input.ddb.to_ddb().with_context(|e| format!("bad force constants: {}", e))?;
    if ddb.natom() != unit.num_atoms() {
        bail!("the force constants are for {} atoms, but the unit cell has {}", ddb.natom(), unit.num_atoms());
    }
    let masses = masses_of(settings, &unit);

    info!("Solving for modes at {} qpoints", ddb.all_qpoints().len());
    let db = DispDb::compute_from_store(&ddb, &masses, settings.asr)?;
    Ok(Prepared { unit, db: Arc::new(db) })
}

/// Generate the thermal ensemble described by the settings.
pub fn run_thermal(settings: &ValidatedSettings, input: &Input) -> FailResult<Trajectory> {
    let Prepared { unit, db } = prepare(settings, input)?;

    let mut generator = EnsembleGenerator::new(settings.ensemble_config(), &unit, settings.supercell, db)?;
    generator.sample()?;

    let num_frames = settings.frames;
    let report_every = usize::max(1, num_frames / 10);
    let trajectory = generator.build_with(|i, _| {
        if (i + 1) % report_every == 0 || i + 1 == num_frames {
            info!("Built {} of {} frames", i + 1, num_frames);
        }
    })?;
    Ok(trajectory)
}

/// Every mode at every qpoint of the supercell grid (or only at `only`), with zero amplitude.
///
/// Grid qpoints that the mode table has nothing for are left out with a warning.
pub fn grid_selection(db: &DispDb, periods: [u32; 3], only: Option<&[V3]>) -> FailResult<CondensedSelection> {
    let mut selection = CondensedSelection::new();
    for m in supercell::cell_indices(periods) {
        let qpoint = V3::from_fn(|k| m[k] as f64 / periods[k] as f64);
        if let Some(only) = only {
            if !only.iter().any(|q| qpoints_equivalent(q, &qpoint, DEFAULT_QPT_TOL)) {
                continue;
            }
        }
        let iqpt = match db.find_equivalent(&qpoint) {
            Some((iqpt, _)) => iqpt,
            None => {
                warn!("No modes at qpoint {:?}; it will not be projected", qpoint);
                continue;
            },
        };
        for (index, &energy) in db.energies(iqpt)?.iter().enumerate() {
            selection.insert(qpoint, Mode::new(index, 0.0, energy));
        }
    }

    if let Some(only) = only {
        for q in only {
            if !selection.qpoints().iter().any(|p| qpoints_equivalent(p, q, DEFAULT_QPT_TOL)) {
                bail!("qpoint {:?} is not on the {:?} supercell grid, or has no modes", q, periods);
            }
        }
    }
    Ok(selection)
}

/// Decompose frames of the settings' supercell into strain and mode amplitudes.
pub fn run_decompose(
    settings: &ValidatedSettings,
    input: &Input,
    frames: &[AtomStructure],
    only: Option<&[V3]>,
) -> FailResult<Vec<FrameDecomposition>> {
    let Prepared { unit, db } = prepare(settings, input)?;
    let selection = grid_selection(&db, settings.supercell, only)?;
    phmodes_thermal::decompose(frames, &unit, settings.supercell, &db, &selection, &settings.projection)
}
