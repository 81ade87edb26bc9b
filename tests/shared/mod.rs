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

#![allow(dead_code)]

use phmodes::array_types::V3;
use phmodes::structure::{Atom, AtomStructure, CoordsKind, Element, Lattice};
use phmodes::ddb::Perturbation;
use phmodes::ddb::cereal::{BlockCereal, DdbCereal};
use phmodes::tasks::cereal::{Input, UnitCellCereal};

/// Spring constant between the two atoms of the dimer, in Hartree/Bohr².
pub const SPRING: f64 = 0.1;

/// Two carbon atoms in a cubic cell.
pub fn dimer_cell() -> AtomStructure {
    let carbon = Atom::new(Element::from_symbol("C").unwrap());
    AtomStructure::new(
        Lattice::cubic(3.0),
        CoordsKind::Fracs(vec![V3::zero(), V3([0.5, 0.5, 0.5])]),
        vec![carbon; 2],
    )
}

/// Force constants at Γ of two atoms tied by an isotropic spring.
///
/// Three acoustic modes, and three degenerate optical modes.
pub fn dimer_ddb() -> DdbCereal {
    let mut entries = vec![];
    for a in 0..2 {
        for b in 0..2 {
            let value = if a == b { SPRING } else { -SPRING };
            for k in 0..3 {
                entries.push((k, Perturbation::Atom(a), k, Perturbation::Atom(b), value, 0.0));
            }
        }
    }
    DdbCereal {
        natom: 2,
        mass_normalized: false,
        lattice: None,
        blocks: vec![BlockCereal { qpoint: [0.0; 3], entries }],
    }
}

pub fn dimer_input() -> Input {
    Input {
        unit_cell: UnitCellCereal::from_structure(&dimer_cell()),
        ddb: dimer_ddb(),
    }
}

pub fn init_logger()
{ let _ = env_logger::try_init(); }
