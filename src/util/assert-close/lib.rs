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

//! `assert_close!`, and the `CheckClose` trait that powers it.
//!
//! ```
//! # #[macro_use] extern crate phmodes_assert_close;
//! # fn main() {
//! assert_close!(1.0, 1.0 + 1e-12);
//! assert_close!(abs=1e-8, 0.0, 1e-10);
//! assert_close!(rel=1e-3, abs=1e-8, vec![1.0, 2.0], vec![1.0001, 2.0]);
//! # }
//! ```

use std::fmt;

use num_complex::Complex64;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    ($($t:tt)*) => {
        $crate::assert_close_impl!{@parsing [$($t)*] [[@rel $crate::DEFAULT_NONZERO_TOL] [@abs 0.0]]}
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_close_impl {
    (@parsing [rel=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@rel $tol]]);
    };
    (@parsing [abs=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@abs $tol]]);
    };
    (@parsing [$a:expr, $b:expr $(,)*] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt "not nearly equal!"])
    };
    (@parsing [$a:expr, $b:expr, $($fmt:tt)+] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt $($fmt)+])
    };
    (@expand [$($assignment:tt)*] [@comp $a:expr, $b:expr] [@fmt $($fmt:tt)+] ) => {{
        match (&$a, &$b) {
            (a, b) => {
                #[allow(unused_mut, unused_assignments)]
                let (abs, rel) = {
                    let mut abs;
                    let mut rel;
                    $(
                        $crate::assert_close_impl!{@stmt::assign [abs, rel] $assignment}
                    )*
                    (abs, rel)
                };

                if let Err(e) = $crate::CheckClose::check_close(a, b, $crate::Tolerances { abs, rel }) {
                    panic!(
                        "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                        format!($($fmt)*), rel, abs, a, b, e,
                    );
                }
            }
        }
    }};
    (@stmt::assign [$abs:ident, $rel:ident] [@abs $tol:expr]) => { $abs = $tol; };
    (@stmt::assign [$abs:ident, $rel:ident] [@rel $tol:expr]) => { $rel = $tol; };
}

/// Test two floats for closeness.
///
/// Semantics follow `math.isclose` from Python 3.5: the values are close if their
/// difference is below `abs`, or below `rel` times either of their magnitudes.
#[inline]
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // catch infinities of same sign
    if a == b { return true; }

    // catch infinities of opposite sign, avoiding infinite relative tolerance
    if a.is_infinite() || b.is_infinite() { return false; }

    // case for general values and NaN.
    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances<T = f64> {
    pub abs: T,
    pub rel: T
}

impl Tolerances {
    pub fn abs(abs: f64) -> Self { Tolerances { abs, rel: 0.0 } }
    pub fn rel(rel: f64) -> Self { Tolerances { abs: 0.0, rel } }
}

#[derive(Debug, Clone)]
pub struct CheckCloseError<T = f64> {
    pub values: (T, T),
    pub tol: Tolerances,
}

impl<T: fmt::Debug> fmt::Display for CheckCloseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ref left, ref right) = self.values;
        write!(f, "failed at:
  left: {:?}
 right: {:?}
   tol: {:?}", left, right, self.tol)
    }
}

impl<T: fmt::Debug> std::error::Error for CheckCloseError<T> {}

pub trait CheckClose<Rhs: ?Sized = Self> {
    type Scalar;

    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>;
}

impl CheckClose for f64 {
    type Scalar = f64;

    #[inline]
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<f64>> {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError { values: (*self, *other), tol }),
        }
    }
}

// Complex numbers are compared by the distance between them,
// with the relative tolerance scaled by their moduli.
impl CheckClose for Complex64 {
    type Scalar = Complex64;

    #[inline]
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Complex64>> {
        let dist = (self - other).norm();
        let scale = self.norm().max(other.norm());
        match self == other || dist < tol.abs.max(tol.rel * scale) {
            true => Ok(()),
            false => Err(CheckCloseError { values: (*self, *other), tol }),
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { CheckClose::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>> {
        assert_eq!(self.len(), other.len(), "length mismatch in check_close");
        self.iter().zip(other)
            .map(|(a, b)| a.check_close(b, tol))
            .collect()
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose, const N: usize> CheckClose for [T; N] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn macro_output_can_compile() {
        assert_close!(1.0, 1.0);
        assert_close!(abs=1e-8, 1.0, 1.0);
        assert_close!(rel=1e-8, abs=1e-8, 1.0, 1.0);
        assert_close!(1.0, 1.0,);
        assert_close!(abs=1e-8, 1.0, 1.0, "{}", "with a message");
    }

    #[test]
    fn operands_are_borrowed() {
        let values = vec![1.0, 2.0];
        assert_close!(abs=1e-12, values, vec![1.0, 2.0]);
        assert_eq!(values.len(), 2);

        for i in 0..2 {
            match i {
                0 => assert_close!(values[i], 1.0),
                _ => assert_close!(values[i], 2.0),
            }
        }
    }

    #[test]
    fn complex() {
        assert_close!(abs=1e-10, Complex64::new(1.0, 2.0), Complex64::new(1.0, 2.0 + 1e-12));
        assert!(Complex64::new(1.0, 0.0).check_close(&Complex64::new(0.0, 1.0), Tolerances::abs(1e-3)).is_err());
        assert!(Complex64::new(1.0, 0.0).check_close(&Complex64::new(1.0, 1e-4), Tolerances::rel(1e-3)).is_ok());
    }

    #[test]
    fn containers() {
        assert_close!(abs=1e-10, vec![[1.0, 2.0], [3.0, 4.0]], vec![[1.0, 2.0], [3.0, 4.0 + 1e-12]]);
    }

    #[test]
    #[should_panic]
    fn not_close() {
        assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn debug_not_close() {
        debug_assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }
}
