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

use std::ops::{Deref, DerefMut};
use std::fmt;

/// A 3-dimensional vector with operations for linear algebra.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct V3<X=f64>(pub [X; 3]);

/// A 3-row matrix. Each row is a `V`.
///
/// Generally you want the alias `M33`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct M3<V=V3>(pub [V; 3]);

/// A 3x3 matrix.
pub type M33<X=f64> = M3<V3<X>>;

// ---------------------------------------------------------------------------

impl<X> Deref for V3<X> {
    type Target = [X; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<X> DerefMut for V3<X> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl<V> Deref for M3<V> {
    type Target = [V; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<V> DerefMut for M3<V> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

// Print vectors and matrices the way arrays print, without the newtype noise.
impl<X: fmt::Debug> fmt::Debug for V3<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(&self.0, f) }
}

impl<V: fmt::Debug> fmt::Debug for M3<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(&self.0, f) }
}

impl<X> From<[X; 3]> for V3<X> {
    #[inline(always)]
    fn from(arr: [X; 3]) -> Self { V3(arr) }
}

impl<X> From<V3<X>> for [X; 3] {
    #[inline(always)]
    fn from(v: V3<X>) -> Self { v.0 }
}

/// Views a slice of arrays as a slice of vectors.
pub trait Envee<X> {
    fn envee_ref(&self) -> &[V3<X>];
}

/// Views a slice of vectors as a slice of arrays.
pub trait Unvee<X> {
    fn unvee_ref(&self) -> &[[X; 3]];
}

impl<X> Envee<X> for [[X; 3]] {
    #[inline(always)]
    fn envee_ref(&self) -> &[V3<X>] {
        // V3 is repr(transparent) over the array.
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const V3<X>, self.len()) }
    }
}

impl<X> Unvee<X> for [V3<X>] {
    #[inline(always)]
    fn unvee_ref(&self) -> &[[X; 3]] {
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const [X; 3], self.len()) }
    }
}
