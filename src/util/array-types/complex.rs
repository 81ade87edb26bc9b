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

use num_complex::Complex64;

/// A complex 3-vector, as used for the per-atom components of eigenvectors.
pub type C3 = V3<Complex64>;

/// Hermitian inner product, `sum(conj(a) * b)`.
#[inline]
pub fn cdot(a: &[C3], b: &[C3]) -> Complex64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(a, b)| {
        a[0].conj() * b[0] + a[1].conj() * b[1] + a[2].conj() * b[2]
    }).sum()
}

impl V3<Complex64> {
    /// Promote a real vector.
    #[inline]
    pub fn from_real(v: &V3) -> C3
    { v.map(|x| Complex64::new(x, 0.0)) }

    #[inline]
    pub fn conj(&self) -> C3
    { self.map(|x| x.conj()) }

    #[inline]
    pub fn re(&self) -> V3
    { self.map(|x| x.re) }

    #[inline]
    pub fn im(&self) -> V3
    { self.map(|x| x.im) }

    /// Multiply by a complex scalar.
    #[inline]
    pub fn scale(&self, s: Complex64) -> C3
    { self.map(|x| x * s) }

    #[inline]
    pub fn sqnorm(&self) -> f64
    { self.iter().map(|x| x.norm_sqr()).sum() }
}
