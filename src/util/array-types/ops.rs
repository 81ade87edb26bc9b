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

use std::ops::{Add, Sub, Neg, Mul, Div};
use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};

use crate::types::*;

// Given an impl between owned operands, generate the impls between references.
macro_rules! forward_ref_binop {
    (impl<$($g:ident),*> $Trait:ident::$method:ident for $A:ty, $B:ty where $($bounds:tt)*) => {
        impl<'a, $($g,)*> $Trait<$B> for &'a $A where $($bounds)* {
            type Output = <$A as $Trait<$B>>::Output;

            #[inline(always)]
            fn $method(self, other: $B) -> Self::Output { $Trait::$method(*self, other) }
        }

        impl<'b, $($g,)*> $Trait<&'b $B> for $A where $($bounds)* {
            type Output = <$A as $Trait<$B>>::Output;

            #[inline(always)]
            fn $method(self, other: &'b $B) -> Self::Output { $Trait::$method(self, *other) }
        }

        impl<'a, 'b, $($g,)*> $Trait<&'b $B> for &'a $A where $($bounds)* {
            type Output = <$A as $Trait<$B>>::Output;

            #[inline(always)]
            fn $method(self, other: &'b $B) -> Self::Output { $Trait::$method(*self, *other) }
        }
    };
}

// ---------------------------------------------------------------------------
// vector-vector ops

impl<X> Add<V3<X>> for V3<X> where X: Copy + Add<Output=X> {
    type Output = V3<X>;

    #[inline]
    fn add(self, other: V3<X>) -> V3<X>
    { V3([self[0] + other[0], self[1] + other[1], self[2] + other[2]]) }
}

impl<X> Sub<V3<X>> for V3<X> where X: Copy + Sub<Output=X> {
    type Output = V3<X>;

    #[inline]
    fn sub(self, other: V3<X>) -> V3<X>
    { V3([self[0] - other[0], self[1] - other[1], self[2] - other[2]]) }
}

forward_ref_binop!{ impl<X> Add::add for V3<X>, V3<X> where X: Copy + Add<Output=X> }
forward_ref_binop!{ impl<X> Sub::sub for V3<X>, V3<X> where X: Copy + Sub<Output=X> }

impl<X> Neg for V3<X> where X: Copy + Neg<Output=X> {
    type Output = V3<X>;

    #[inline]
    fn neg(self) -> V3<X> { V3([-self[0], -self[1], -self[2]]) }
}

impl<'a, X> Neg for &'a V3<X> where X: Copy + Neg<Output=X> {
    type Output = V3<X>;

    #[inline]
    fn neg(self) -> V3<X> { -*self }
}

impl<X, B> AddAssign<B> for V3<X> where V3<X>: Copy + Add<B, Output=V3<X>> {
    #[inline]
    fn add_assign(&mut self, other: B) { *self = *self + other }
}

impl<X, B> SubAssign<B> for V3<X> where V3<X>: Copy + Sub<B, Output=V3<X>> {
    #[inline]
    fn sub_assign(&mut self, other: B) { *self = *self - other }
}

// ---------------------------------------------------------------------------
// vector-scalar ops

impl Mul<f64> for V3 {
    type Output = V3;

    #[inline]
    fn mul(self, s: f64) -> V3 { V3([self[0] * s, self[1] * s, self[2] * s]) }
}

impl Div<f64> for V3 {
    type Output = V3;

    #[inline]
    fn div(self, s: f64) -> V3 { V3([self[0] / s, self[1] / s, self[2] / s]) }
}

impl Mul<V3> for f64 {
    type Output = V3;

    #[inline]
    fn mul(self, v: V3) -> V3 { v * self }
}

impl<'a> Mul<&'a V3> for f64 {
    type Output = V3;

    #[inline]
    fn mul(self, v: &'a V3) -> V3 { *v * self }
}

forward_ref_binop!{ impl<> Mul::mul for V3, f64 where }
forward_ref_binop!{ impl<> Div::div for V3, f64 where }

impl MulAssign<f64> for V3 {
    #[inline]
    fn mul_assign(&mut self, s: f64) { *self = *self * s }
}

impl DivAssign<f64> for V3 {
    #[inline]
    fn div_assign(&mut self, s: f64) { *self = *self / s }
}

// ---------------------------------------------------------------------------
// matrix ops

// row vector times matrix
impl Mul<M33> for V3 {
    type Output = V3;

    #[inline]
    fn mul(self, m: M33) -> V3 {
        V3::from_fn(|c| (0..3).map(|r| self[r] * m[r][c]).sum())
    }
}

// matrix times column vector
impl Mul<V3> for M33 {
    type Output = V3;

    #[inline]
    fn mul(self, v: V3) -> V3 {
        V3::from_fn(|r| crate::dot(&self[r], &v))
    }
}

impl Mul<M33> for M33 {
    type Output = M33;

    #[inline]
    fn mul(self, other: M33) -> M33 {
        M3([self[0] * other, self[1] * other, self[2] * other])
    }
}

impl Add<M33> for M33 {
    type Output = M33;

    #[inline]
    fn add(self, other: M33) -> M33 {
        M3([self[0] + other[0], self[1] + other[1], self[2] + other[2]])
    }
}

impl Sub<M33> for M33 {
    type Output = M33;

    #[inline]
    fn sub(self, other: M33) -> M33 {
        M3([self[0] - other[0], self[1] - other[1], self[2] - other[2]])
    }
}

impl Mul<f64> for M33 {
    type Output = M33;

    #[inline]
    fn mul(self, s: f64) -> M33 { M3([self[0] * s, self[1] * s, self[2] * s]) }
}

impl Div<f64> for M33 {
    type Output = M33;

    #[inline]
    fn div(self, s: f64) -> M33 { M3([self[0] / s, self[1] / s, self[2] / s]) }
}

impl Neg for M33 {
    type Output = M33;

    #[inline]
    fn neg(self) -> M33 { M3([-self[0], -self[1], -self[2]]) }
}

forward_ref_binop!{ impl<> Mul::mul for V3, M33 where }
forward_ref_binop!{ impl<> Mul::mul for M33, V3 where }
forward_ref_binop!{ impl<> Mul::mul for M33, M33 where }
forward_ref_binop!{ impl<> Add::add for M33, M33 where }
forward_ref_binop!{ impl<> Sub::sub for M33, M33 where }
forward_ref_binop!{ impl<> Mul::mul for M33, f64 where }
forward_ref_binop!{ impl<> Div::div for M33, f64 where }
