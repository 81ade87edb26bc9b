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

use phmodes::array_types::{V3, C3};
use phmodes::dispdb::{DispDb, DispDbError, ExternalEntry};
use phmodes::frozen::FrozenSupercell;

fn table(natom: usize, qpoint: V3) -> DispDb {
    let nmode = 3 * natom;
    let displacements = {
        (0..nmode).map(|mode| {
            (0..natom).map(|atom| match atom == mode / 3 {
                true => C3::from_real(&V3::axis_unit(mode % 3)),
                false => C3::from_real(&V3::zero()),
            }).collect()
        }).collect()
    };
    let entry = ExternalEntry {
        qpoint,
        energies: (0..nmode).map(|i| i as f64 * 1e-3).collect(),
        displacements,
    };
    DispDb::read_external(natom, &vec![12.0; natom], vec![entry]).unwrap()
}

#[test]
fn merge_rejects_different_sizes() {
    let mut target = table(2, V3::zero());
    let before = target.cereal();

    let other = table(1, V3([0.5, 0.0, 0.0]));
    match target.merge(&other) {
        Err(DispDbError::IncompatibleMerge { natom: 2, other_natom: 1, .. }) => {},
        r => panic!("unexpected result: {:?}", r),
    }
    assert_eq!(target.cereal(), before);
}

#[test]
fn merge_adds_qpoints() {
    let mut target = table(2, V3::zero());
    target.merge(&table(2, V3([0.5, 0.0, 0.0]))).unwrap();
    assert_eq!(target.num_qpoints(), 2);
    assert!(target.has_qpoint(&V3([0.5, 0.0, 0.0])));
}

#[test]
fn non_commensurate_qpoint() {
    let unit = shared::dimer_cell();
    assert!(FrozenSupercell::from_qpoint(&unit, &V3([0.4, 0.0, 0.0])).is_err());

    let supercell = FrozenSupercell::from_qpoint(&unit, &V3([0.5, 0.0, 1.0 / 3.0])).unwrap();
    assert_eq!(supercell.periods(), [2, 1, 3]);
    assert_eq!(supercell.structure().num_atoms(), 2 * 6);
}
