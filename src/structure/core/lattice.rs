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

use phmodes_array_types::{V3, M33, mat, inv};
use phmodes_assert_close::{CheckClose, CheckCloseError, Tolerances};

use std::ops::{Mul, Div};
use std::sync::Arc;

/// Periodic cell of a crystal, as a matrix whose rows are the cell vectors.
///
/// The inverse is computed once on construction; it converts cartesian rows to
/// fractional rows.  Both live behind `Arc`, since every frame of a trajectory
/// carries its own lattice and frames cross threads.
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Arc<M33>,
    inverse: Arc<M33>,
}

// the inverse follows from the matrix
impl PartialEq<Lattice> for Lattice {
    fn eq(&self, other: &Lattice) -> bool
    { self.matrix == other.matrix }
}

impl Lattice {
    pub fn new(matrix: &M33) -> Self {
        Lattice {
            matrix: Arc::new(*matrix),
            inverse: Arc::new(inv(matrix)),
        }
    }

    pub fn matrix(&self) -> &M33
    { &self.matrix }

    pub fn inverse_matrix(&self) -> &M33
    { &self.inverse }

    pub fn vectors(&self) -> &[V3; 3]
    { &self.matrix.0 }

    pub fn volume(&self) -> f64
    { self.matrix.det().abs() }

    /// The cell deformed by a strain `ε`, i.e. `L (I + ε)`.
    pub fn strained(&self, strain: &M33) -> Lattice
    { self * &(M33::eye() + strain) }

    pub fn eye() -> Self { Lattice::cubic(1.0) }

    pub fn cubic(a: f64) -> Self { Lattice::orthorhombic(a, a, a) }

    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self
    { Lattice::from(&[[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]]) }
}

impl<'a> From<&'a [[f64; 3]; 3]> for Lattice {
    fn from(rows: &'a [[f64; 3]; 3]) -> Self
    { Lattice::new(&mat::from_array(*rows)) }
}

/// `L M`, e.g. a strain acting on the cell vectors.
impl<'a, 'b> Mul<&'b M33> for &'a Lattice {
    type Output = Lattice;

    // the inverse is recomputed rather than multiplied, so that it does not drift
    fn mul(self, other: &'b M33) -> Lattice
    { Lattice::new(&(self.matrix() * other)) }
}

/// `M L`, e.g. an integer supercell matrix.
impl<'a, 'b> Mul<&'b Lattice> for &'a M33 {
    type Output = Lattice;

    fn mul(self, other: &'b Lattice) -> Lattice
    { Lattice::new(&(self * other.matrix())) }
}

/// Fractional row to cartesian row.
impl<'a, 'b> Mul<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn mul(self, lattice: &'b Lattice) -> V3
    { self * lattice.matrix() }
}

impl<'b> Mul<&'b Lattice> for V3 {
    type Output = V3;

    fn mul(self, lattice: &'b Lattice) -> V3
    { &self * lattice }
}

/// Cartesian row to fractional row.
impl<'a, 'b> Div<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn div(self, lattice: &'b Lattice) -> V3
    { self * lattice.inverse_matrix() }
}

impl CheckClose for Lattice {
    type Scalar = f64;

    fn check_close(&self, other: &Lattice, tol: Tolerances) -> Result<(), CheckCloseError> {
        self.matrix().check_close(other.matrix(), tol)
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;

    fn skewed() -> Lattice {
        // exactly invertible in floating point
        Lattice::from(&[
            [2.0, 2.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 2.0],
        ])
    }

    #[test]
    fn inverse_and_volume() {
        let lattice = skewed();
        assert_eq!(lattice.inverse_matrix(), &mat::from_array([
            [0.5, -0.25, 0.0],
            [0.0,  0.25, 0.0],
            [0.0,   0.0, 0.5],
        ]));
        assert_eq!(lattice.volume(), 16.0);
    }

    #[test]
    fn products_keep_their_order() {
        let swap = mat::from_array([
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        // swaps columns
        assert_eq!(&skewed() * &swap, Lattice::from(&[
            [2.0, 2.0, 0.0],
            [4.0, 0.0, 0.0],
            [0.0, 0.0, 2.0],
        ]));
        // swaps rows
        assert_eq!(&swap * &skewed(), Lattice::from(&[
            [0.0, 4.0, 0.0],
            [2.0, 2.0, 0.0],
            [0.0, 0.0, 2.0],
        ]));
    }

    #[test]
    fn fractional_and_cartesian() {
        let lattice = skewed();
        let frac = V3([0.5, -0.5, 0.25]);
        let cart = frac * &lattice;
        assert_eq!(cart, V3([1.0, -1.0, 0.5]));
        assert_close!(abs=1e-12, &cart / &lattice, frac);
    }

    #[test]
    fn strain() {
        let strain = mat::from_array([
            [0.01, 0.0, 0.0],
            [0.0, -0.02, 0.0],
            [0.0, 0.0, 0.0],
        ]);
        let strained = Lattice::cubic(2.0).strained(&strain);
        assert_close!(rel=1e-12, strained.volume(), 8.0 * 1.01 * 0.98);
        assert_close!(abs=1e-12, strained, Lattice::orthorhombic(2.02, 1.96, 2.0));
    }
}
