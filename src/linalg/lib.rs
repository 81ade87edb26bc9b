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

//! Dense linear algebra and Fourier transforms.
//!
//! This crate is deliberately thin: it wraps `nalgebra`'s symmetric eigensolver
//! and (optionally) `rustfft` behind the handful of entry points the rest of the
//! workspace needs.

#[cfg(feature = "fft")]
#[macro_use]
extern crate lazy_static;

pub mod fft;
pub use crate::fft::{RealFft3, HalfSpectrum, FftUnavailable};

use nalgebra::DMatrix;
use num_complex::Complex64;
use ordered_float::NotNan;

#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot diagonalize a {dim}x{dim} matrix with non-finite elements")]
pub struct NonFiniteMatrix {
    pub dim: usize,
}

/// Eigenvalues in ascending order, with eigenvectors in the same order.
///
/// `vectors[i]` is the normalized eigenvector for `values[i]`.
#[derive(Debug, Clone)]
pub struct Eigensystem<T> {
    pub values: Vec<f64>,
    pub vectors: Vec<Vec<T>>,
}

/// Diagonalize a Hermitian matrix given in row-major order.
///
/// Only the hermitian part of the input is meaningful; callers are expected to
/// hermitianize first. Each eigenvector is put in a fixed gauge: its element of
/// largest modulus is made real and positive.
pub fn eigh_hermitian(dim: usize, row_major: &[Complex64]) -> Result<Eigensystem<Complex64>, NonFiniteMatrix> {
    assert_eq!(row_major.len(), dim * dim);
    if row_major.iter().any(|x| !(x.re.is_finite() && x.im.is_finite())) {
        return Err(NonFiniteMatrix { dim });
    }

    let matrix = DMatrix::from_row_slice(dim, dim, row_major);
    let eigen = matrix.symmetric_eigen();

    let mut pairs: Vec<(f64, Vec<Complex64>)> = {
        (0..dim).map(|i| {
            let mut vector: Vec<Complex64> = eigen.eigenvectors.column(i).iter().cloned().collect();
            fix_gauge(&mut vector);
            (eigen.eigenvalues[i], vector)
        }).collect()
    };
    sort_pairs(dim, &mut pairs)?;
    Ok(unzip_pairs(pairs))
}

/// Diagonalize a real symmetric matrix given in row-major order.
///
/// Each eigenvector is given a sign such that its element of largest magnitude is positive.
pub fn eigh_real_symmetric(dim: usize, row_major: &[f64]) -> Result<Eigensystem<f64>, NonFiniteMatrix> {
    assert_eq!(row_major.len(), dim * dim);
    if row_major.iter().any(|x| !x.is_finite()) {
        return Err(NonFiniteMatrix { dim });
    }

    let matrix = DMatrix::from_row_slice(dim, dim, row_major);
    let eigen = matrix.symmetric_eigen();

    let mut pairs: Vec<(f64, Vec<f64>)> = {
        (0..dim).map(|i| {
            let mut vector: Vec<f64> = eigen.eigenvectors.column(i).iter().cloned().collect();
            let biggest = vector.iter().cloned().fold(0.0, |acc: f64, x| if x.abs() > acc.abs() { x } else { acc });
            if biggest < 0.0 {
                vector.iter_mut().for_each(|x| *x = -*x);
            }
            (eigen.eigenvalues[i], vector)
        }).collect()
    };
    sort_pairs(dim, &mut pairs)?;
    Ok(unzip_pairs(pairs))
}

fn fix_gauge(vector: &mut [Complex64]) {
    let biggest = vector.iter().cloned().fold(Complex64::new(0.0, 0.0), |acc, x| {
        if x.norm_sqr() > acc.norm_sqr() { x } else { acc }
    });
    if biggest.norm_sqr() > 0.0 {
        let phase = biggest.conj() / biggest.norm();
        vector.iter_mut().for_each(|x| *x *= phase);
    }
}

fn sort_pairs<T>(dim: usize, pairs: &mut Vec<(f64, T)>) -> Result<(), NonFiniteMatrix> {
    let mut keyed = Vec::with_capacity(pairs.len());
    for (value, vector) in pairs.drain(..) {
        let key = NotNan::new(value).map_err(|_| NonFiniteMatrix { dim })?;
        keyed.push((key, vector));
    }
    keyed.sort_by_key(|&(key, _)| key);
    pairs.extend(keyed.into_iter().map(|(key, vector)| (key.into_inner(), vector)));
    Ok(())
}

fn unzip_pairs<T>(pairs: Vec<(f64, Vec<T>)>) -> Eigensystem<T> {
    let (values, vectors) = pairs.into_iter().unzip();
    Eigensystem { values, vectors }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;

    fn apply(dim: usize, m: &[Complex64], v: &[Complex64]) -> Vec<Complex64> {
        (0..dim).map(|r| (0..dim).map(|c| m[r * dim + c] * v[c]).sum()).collect()
    }

    #[test]
    fn hermitian_eigenpairs() {
        let c = |re, im| Complex64::new(re, im);
        let m = vec![
            c(2.0, 0.0), c(0.0, -1.0), c(0.5, 0.5),
            c(0.0, 1.0), c(3.0, 0.0),  c(0.0, 0.0),
            c(0.5, -0.5), c(0.0, 0.0), c(1.0, 0.0),
        ];
        let eig = eigh_hermitian(3, &m).unwrap();
        assert!(eig.values.windows(2).all(|w| w[0] <= w[1]));

        let trace: f64 = eig.values.iter().sum();
        assert_close!(abs=1e-10, trace, 6.0);

        for (&value, vector) in eig.values.iter().zip(&eig.vectors) {
            let norm: f64 = vector.iter().map(|x| x.norm_sqr()).sum();
            assert_close!(abs=1e-10, norm, 1.0);

            let mv = apply(3, &m, vector);
            let lv: Vec<_> = vector.iter().map(|x| x * value).collect();
            assert_close!(abs=1e-10, mv, lv);

            // gauge: the largest element is real and positive
            let biggest = vector.iter().max_by(|a, b| a.norm_sqr().partial_cmp(&b.norm_sqr()).unwrap()).unwrap();
            assert_close!(abs=1e-12, biggest.im, 0.0);
            assert!(biggest.re > 0.0);
        }
    }

    #[test]
    fn real_symmetric() {
        let m = vec![
            2.0, 1.0, 0.0,
            1.0, 2.0, 0.0,
            0.0, 0.0, 5.0,
        ];
        let eig = eigh_real_symmetric(3, &m).unwrap();
        assert_close!(abs=1e-12, eig.values, vec![1.0, 3.0, 5.0]);
        let s = 0.5f64.sqrt();
        assert_close!(abs=1e-12, eig.vectors[1].clone(), vec![s, s, 0.0]);
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(eigh_real_symmetric(1, &[std::f64::NAN]).is_err());
    }
}
