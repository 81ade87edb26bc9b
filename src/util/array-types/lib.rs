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

//! Fixed-size vector and matrix types.
//!
//! `V3` is a 3-vector. `M33` is a 3x3 matrix stored as three row vectors;
//! when a matrix is used to hold a lattice, each row is a lattice vector.
//!
//! Row vectors multiply on the left (`v * m`), column vectors on the right (`m * v`).

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

mod types;
mod ops;
mod methods_v;
mod methods_m;
mod complex;

pub use crate::types::*;
pub use crate::complex::{C3, cdot};

/// Functions for constructing and working with vectors.
pub mod vee {
    pub use crate::methods_v::{dot, from_fn, zero};
}

/// Functions for constructing and working with matrices.
pub mod mat {
    pub use crate::methods_m::{eye, from_array, from_fn, inv, zero};
}

pub use crate::vee::dot;
pub use crate::mat::inv;

use phmodes_assert_close::{CheckClose, CheckCloseError, Tolerances};

impl<X: CheckClose> CheckClose for V3<X> {
    type Scalar = X::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<X::Scalar>>
    { self.0.check_close(&other.0, tol) }
}

impl<V: CheckClose> CheckClose for M3<V> {
    type Scalar = V::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<V::Scalar>>
    { self.0.check_close(&other.0, tol) }
}
