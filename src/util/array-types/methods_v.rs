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

/// Construct a vector from a function on indices.
#[inline(always)]
pub fn from_fn<X, F>(mut f: F) -> V3<X>
where F: FnMut(usize) -> X,
{ V3([f(0), f(1), f(2)]) }

/// Get a zero vector.
#[inline(always)]
pub fn zero<X: Zero>() -> V3<X>
{ V3([X::zero(), X::zero(), X::zero()]) }

/// Inner product of two real vectors.
#[inline(always)]
pub fn dot(a: &V3, b: &V3) -> f64
{ a[0] * b[0] + a[1] * b[1] + a[2] * b[2] }

impl<X> V3<X> {
    /// Get a zero vector.
    ///
    /// This is also available as the free function `vee::zero`;
    /// this static method just provides an easy way to supply a type hint.
    #[inline(always)]
    pub fn zero() -> Self
    where X: Zero,
    { zero() }

    /// Construct a vector from a function on indices.
    #[inline(always)]
    pub fn from_fn<F>(f: F) -> Self
    where F: FnMut(usize) -> X,
    { from_fn(f) }

    /// Apply a function to each element.
    #[inline]
    pub fn map<B, F>(self, mut f: F) -> V3<B>
    where F: FnMut(X) -> B,
    {
        let V3([a, b, c]) = self;
        V3([f(a), f(b), f(c)])
    }

}

impl V3 {
    /// Get the inner product of two vectors.
    ///
    /// It is recommended you write this as `V3::dot(a, b)`, rather than `a.dot(b)`.
    #[inline(always)]
    pub fn dot(&self, other: &V3) -> f64
    { dot(self, other) }

    /// Get the vector's squared magnitude.
    #[inline(always)]
    pub fn sqnorm(&self) -> f64
    { dot(self, self) }

    /// Get the vector's magnitude.
    #[inline(always)]
    pub fn norm(&self) -> f64
    { self.sqnorm().sqrt() }

    /// Normalize the vector.
    #[inline(always)]
    pub fn unit(&self) -> V3
    { self / self.norm() }

    /// Get a basis vector.
    #[inline]
    pub fn axis_unit(i: usize) -> V3 {
        assert!(i < 3, "Invalid axis for 3d vector: {}", i);
        V3::from_fn(|k| if k == i { 1.0 } else { 0.0 })
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: &V3) -> V3 {
        V3([
            self[1] * other[2] - self[2] * other[1],
            self[2] * other[0] - self[0] * other[2],
            self[0] * other[1] - self[1] * other[0],
        ])
    }

    /// Round each element to the nearest integer.
    #[inline]
    pub fn round_to_int(&self) -> V3<i32>
    { self.map(|x| x.round() as i32) }
}

impl V3<i32> {
    /// Convert to floating point.
    #[inline(always)]
    pub fn to_f64(&self) -> V3
    { self.map(f64::from) }
}
