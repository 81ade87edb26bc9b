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

use crate::types::*;

use num_traits::Zero;

/// Construct a matrix from a function on (row, col) indices.
#[inline(always)]
pub fn from_fn<X, F>(mut f: F) -> M33<X>
where F: FnMut(usize, usize) -> X,
{ M3([0, 1, 2].map(|r| V3([f(r, 0), f(r, 1), f(r, 2)]))) }

/// Construct a matrix from nested arrays (each inner array is a row).
#[inline(always)]
pub fn from_array<X>(rows: [[X; 3]; 3]) -> M33<X>
{ M3(rows.map(V3)) }

/// Get a zero matrix.
#[inline(always)]
pub fn zero<X: Zero + Copy>() -> M33<X>
{ from_fn(|_, _| X::zero()) }

/// Get the identity matrix.
#[inline(always)]
pub fn eye() -> M33
{ from_fn(|r, c| if r == c { 1.0 } else { 0.0 }) }

/// Matrix inverse.
///
/// Singular matrices produce non-finite elements.
#[inline]
pub fn inv(m: &M33) -> M33 {
    let det = m.det();
    let cof = |r: usize, c: usize| {
        let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
        let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
        m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
    };
    // inverse is the transposed cofactor matrix over the determinant
    from_fn(|r, c| cof(c, r) / det)
}

impl<X> M33<X> {
    /// Construct a matrix from a function on (row, col) indices.
    #[inline(always)]
    pub fn from_fn<F>(f: F) -> Self
    where F: FnMut(usize, usize) -> X,
    { from_fn(f) }

    /// Apply a function to each element.
    #[inline]
    pub fn map<B, F>(self, mut f: F) -> M33<B>
    where F: FnMut(X) -> B,
    { M3(self.0.map(|row| row.map(&mut f))) }

    /// Matrix transpose.
    #[inline]
    pub fn t(&self) -> Self
    where X: Copy,
    { from_fn(|r, c| self[c][r]) }
}

impl M33 {
    #[inline(always)]
    pub fn zero() -> M33 { zero() }

    /// Get the identity matrix.
    #[inline(always)]
    pub fn eye() -> M33 { eye() }

    /// Matrix inverse.
    #[inline(always)]
    pub fn inv(&self) -> M33 { inv(self) }

    /// Matrix determinant.
    #[inline]
    pub fn det(&self) -> f64 {
        let m = self;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Sum of the diagonal.
    #[inline]
    pub fn trace(&self) -> f64 { self[0][0] + self[1][1] + self[2][2] }

    /// Symmetric part, `(M + M^T) / 2`.
    #[inline]
    pub fn sym(&self) -> M33 { (*self + self.t()) / 2.0 }

    /// Diagonal matrix.
    #[inline]
    pub fn from_diag(diag: V3) -> M33
    { from_fn(|r, c| if r == c { diag[r] } else { 0.0 }) }

    /// Largest absolute value of any element.
    #[inline]
    pub fn max_abs(&self) -> f64 {
        self.iter().flat_map(|row| row.iter()).fold(0.0, |acc: f64, &x| acc.max(x.abs()))
    }
}
