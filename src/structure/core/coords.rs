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

use crate::Lattice;

use phmodes_array_types::V3;

/// Atom positions, in cartesian rows or in fractional rows of some lattice.
///
/// `cart = frac * lattice`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordsKind {
    Carts(Vec<V3>),
    Fracs(Vec<V3>),
}

fn carts_of(fracs: &[V3], lattice: &Lattice) -> Vec<V3>
{ fracs.iter().map(|v| v * lattice).collect() }

fn fracs_of(carts: &[V3], lattice: &Lattice) -> Vec<V3>
{ carts.iter().map(|v| v / lattice).collect() }

impl CoordsKind {
    fn raw(&self) -> &[V3] {
        match self {
            CoordsKind::Carts(c) | CoordsKind::Fracs(c) => c,
        }
    }

    pub fn len(&self) -> usize { self.raw().len() }
    pub fn is_empty(&self) -> bool { self.raw().is_empty() }

    pub fn to_carts(&self, lattice: &Lattice) -> Vec<V3> {
        match self {
            CoordsKind::Carts(c) => c.clone(),
            CoordsKind::Fracs(c) => carts_of(c, lattice),
        }
    }

    pub fn to_fracs(&self, lattice: &Lattice) -> Vec<V3> {
        match self {
            CoordsKind::Carts(c) => fracs_of(c, lattice),
            CoordsKind::Fracs(c) => c.clone(),
        }
    }

    pub fn into_carts(self, lattice: &Lattice) -> Vec<V3> {
        match self {
            CoordsKind::Carts(c) => c,
            CoordsKind::Fracs(c) => carts_of(&c, lattice),
        }
    }

    pub fn into_fracs(self, lattice: &Lattice) -> Vec<V3> {
        match self {
            CoordsKind::Carts(c) => fracs_of(&c, lattice),
            CoordsKind::Fracs(c) => c,
        }
    }
}
