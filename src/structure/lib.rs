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

//! Periodic crystal structures.
//!
//! `Structure<M>` pairs a `Lattice` with positions and per-atom metadata. The `supercell`
//! module replicates a unit cell along its lattice vectors and maps arbitrary supercells
//! back onto the unit cell they came from.

#[macro_use] extern crate log;
#[macro_use] extern crate lazy_static;
#[cfg(feature = "serde")]
#[macro_use] extern crate serde;

pub mod supercell {
    pub use crate::algo::supercell::{
        diagonal,
        dims_from_qpoint,
        cell_indices,
        Builder,
        SupercellToken,
        NotCommensurate,
    };
    pub use crate::algo::reference::{
        ReferenceMap,
        MappingFailure,
    };
}

mod core;
mod algo;
mod element;

//---------------------------
// public reexports; API

pub use crate::core::lattice::Lattice;
pub use crate::core::coords::CoordsKind;
pub use crate::core::structure::{Structure, Atom, AtomStructure, CrystalSource};

pub use crate::element::{Element, ElementParseError};
