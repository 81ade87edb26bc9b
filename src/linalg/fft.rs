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

//! Forward 3D Fourier transforms of real data on a periodic grid.
//!
//! Conventions: for a grid of dimensions `[n1, n2, n3]` stored in row-major order,
//!
//! ```text
//! X[m] = (1 / (n1 n2 n3)) * sum_r x[r] * exp(-2 pi i * sum_k m_k r_k / n_k)
//! ```
//!
//! Because the input is real, `X[-m] = conj(X[m])`, and only the half of the
//! spectrum with `m3 <= n3 / 2` is stored.

use num_complex::Complex64;
use std::fmt;

#[cfg(feature = "fft")]
use {
    std::collections::HashMap,
    std::sync::{Arc, Mutex},
    rustfft::{Fft, FftPlanner},
};

#[derive(Debug, Clone, thiserror::Error)]
#[error("no FFT backend is available (phmodes-linalg was built without the \"fft\" feature)")]
pub struct FftUnavailable;

/// A plan for the forward transform of real data on one grid shape.
///
/// Plans are cheap to clone and may be executed from many threads at once.
#[derive(Clone)]
pub struct RealFft3 {
    dims: [usize; 3],
    #[cfg(feature = "fft")]
    plans: [Arc<dyn Fft<f64>>; 3],
}

impl fmt::Debug for RealFft3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft3").field("dims", &self.dims).finish()
    }
}

#[cfg(feature = "fft")]
lazy_static! {
    // Plan creation is not reentrant, so all of it happens under this lock.
    static ref PLAN_CACHE: Mutex<HashMap<usize, Arc<dyn Fft<f64>>>> = Mutex::new(HashMap::new());
}

#[cfg(feature = "fft")]
fn plan_1d(n: usize) -> Arc<dyn Fft<f64>> {
    let mut cache = PLAN_CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cache.entry(n)
        .or_insert_with(|| FftPlanner::new().plan_fft_forward(n))
        .clone()
}

impl RealFft3 {
    #[cfg(feature = "fft")]
    pub fn plan(dims: [usize; 3]) -> Result<Self, FftUnavailable> {
        assert!(dims.iter().all(|&n| n > 0), "empty FFT grid: {:?}", dims);
        let plans = [plan_1d(dims[0]), plan_1d(dims[1]), plan_1d(dims[2])];
        Ok(RealFft3 { dims, plans })
    }

    #[cfg(not(feature = "fft"))]
    pub fn plan(dims: [usize; 3]) -> Result<Self, FftUnavailable> {
        let _ = dims;
        Err(FftUnavailable)
    }

    pub fn grid_len(&self) -> usize { self.dims.iter().product() }

    /// Transform real data on the grid, stored in row-major order.
    ///
    /// The output is normalized by the number of grid points.
    pub fn forward(&self, input: &[f64]) -> HalfSpectrum {
        assert_eq!(input.len(), self.grid_len());
        let mut buf: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.transform_in_place(&mut buf);

        let norm = 1.0 / self.grid_len() as f64;
        let [n1, n2, n3] = self.dims;
        let half = n3 / 2 + 1;
        let mut data = Vec::with_capacity(n1 * n2 * half);
        for row in buf.chunks(n3) {
            data.extend(row[..half].iter().map(|x| x * norm));
        }
        HalfSpectrum { dims: self.dims, data }
    }

    #[cfg(feature = "fft")]
    fn transform_in_place(&self, buf: &mut [Complex64]) {
        let [_, n2, n3] = self.dims;
        let strides = [n2 * n3, n3, 1];
        for axis in 0..3 {
            let n = self.dims[axis];
            if n == 1 {
                continue;
            }
            let stride = strides[axis];
            let mut line = vec![Complex64::new(0.0, 0.0); n];
            for start in 0..buf.len() {
                // visit each line along this axis once, from its first element
                if (start / stride) % n != 0 {
                    continue;
                }
                for (i, x) in line.iter_mut().enumerate() {
                    *x = buf[start + i * stride];
                }
                self.plans[axis].process(&mut line);
                for (i, x) in line.iter().enumerate() {
                    buf[start + i * stride] = *x;
                }
            }
        }
    }

    #[cfg(not(feature = "fft"))]
    fn transform_in_place(&self, _: &mut [Complex64]) {
        unreachable!("RealFft3 cannot be constructed without an FFT backend")
    }
}

/// The non-redundant half of the spectrum of real data.
#[derive(Debug, Clone)]
pub struct HalfSpectrum {
    dims: [usize; 3],
    // shape [n1, n2, n3 / 2 + 1]
    data: Vec<Complex64>,
}

impl HalfSpectrum {
    /// Get any bin of the full spectrum.
    ///
    /// Indices may be negative or exceed the grid; they are taken modulo the grid.
    /// Bins in the redundant half are recovered by conjugation.
    pub fn bin(&self, index: [i64; 3]) -> Complex64 {
        let [n1, n2, n3] = self.dims;
        let wrap = |m: i64, n: usize| m.rem_euclid(n as i64) as usize;
        let (m1, m2, m3) = (wrap(index[0], n1), wrap(index[1], n2), wrap(index[2], n3));

        let half = n3 / 2 + 1;
        if m3 < half {
            self.data[(m1 * n2 + m2) * half + m3]
        } else {
            let (c1, c2, c3) = (wrap(-(m1 as i64), n1), wrap(-(m2 as i64), n2), n3 - m3);
            self.data[(c1 * n2 + c2) * half + c3].conj()
        }
    }
}
