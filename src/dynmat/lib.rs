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

//! Phonons at the qpoints of a force constant store.
//!
//! The dynamical matrix at a qpoint is assembled directly from the atom/atom second
//! derivatives recorded at that qpoint; there is no interpolation between qpoints.

#[macro_use] extern crate log;
#[macro_use] extern crate serde;

pub mod units;

use crate::units::AMU_TO_ELECTRON_MASS;

use phmodes_array_types::{V3, M33, C3};
use phmodes_ddb::{Ddb, SecondDerivative, QptNotFound};
use phmodes_linalg::{NonFiniteMatrix, eigh_hermitian, eigh_real_symmetric};
use num_complex::Complex64;

const GAMMA: V3 = V3([0.0; 3]);

/// Tolerance (relative to the largest element) below which imaginary parts are noise.
const REAL_TOL: f64 = 1e-10;

/// Hermitian error (relative to the largest element) above which we complain.
const HERMITIAN_WARN_TOL: f64 = 1e-3;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DynmatError {
    #[error("cannot build the dynamical matrix: {0}")]
    QptNotFound(#[from] QptNotFound),

    #[error("derivative refers to atom {atom}, but there are {natom} atoms")]
    BadIndex { atom: usize, natom: usize },

    #[error("derivative has direction {dir} (directions are 0, 1, or 2)")]
    BadDirection { dir: usize },

    #[error("expected {expected} masses (one per atom), got {actual}")]
    MassCount { expected: usize, actual: usize },

    #[error("atom {atom} has non-positive mass {mass}")]
    BadMass { atom: usize, mass: f64 },

    #[error("while diagonalizing at qpoint {qpoint:?}: {source}")]
    NonFinite { qpoint: V3, source: NonFiniteMatrix },
}

/// Reasons the acoustic sum rule correction could not be computed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AsrUncorrectable {
    #[error("the store has no Γ block")]
    NoGamma,

    #[error("the Γ block has no entry for (atom {atom1}, direction {dir1}) and (atom {atom2}, direction {dir2})")]
    MissingEntry { atom1: usize, dir1: usize, atom2: usize, dir2: usize },

    #[error("{0}")]
    Dynmat(#[from] DynmatError),
}

// ------------------------------------------------------

/// A dense `3N x 3N` complex matrix, stored row-major.
///
/// Row `3a + α` and column `3b + β` hold the derivative with respect to atom `a` along
/// `α` and atom `b` along `β`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicalMatrix {
    natom: usize,
    data: Vec<Complex64>,
}

impl DynamicalMatrix {
    pub fn zero(natom: usize) -> Self
    { DynamicalMatrix { natom, data: vec![Complex64::new(0.0, 0.0); 9 * natom * natom] } }

    /// Assemble from the atom/atom derivatives of a block.  Entries involving the electric
    /// field or strain are ignored.
    ///
    /// An element recorded only in its transposed position is filled in by hermiticity.
    pub fn from_block(natom: usize, block: &[SecondDerivative]) -> Result<Self, DynmatError>
    { Self::assemble(natom, block).map(|(matrix, _)| matrix) }

    // Also returns which elements were present after filling by hermiticity.
    fn assemble(natom: usize, block: &[SecondDerivative]) -> Result<(Self, Vec<bool>), DynmatError> {
        let mut matrix = DynamicalMatrix::zero(natom);
        let dim = matrix.dim();
        let mut present = vec![false; dim * dim];

        for derivative in block {
            let (a, b) = match derivative.atom_pair() {
                Some(pair) => pair,
                None => continue,
            };
            for &atom in &[a, b] {
                if atom >= natom {
                    return Err(DynmatError::BadIndex { atom, natom });
                }
            }
            for &dir in &[derivative.dir1, derivative.dir2] {
                if dir >= 3 {
                    return Err(DynmatError::BadDirection { dir });
                }
            }
            let index = (3 * a + derivative.dir1) * dim + 3 * b + derivative.dir2;
            matrix.data[index] = derivative.value;
            present[index] = true;
        }

        for r in 0..dim {
            for c in 0..dim {
                if !present[r * dim + c] && present[c * dim + r] {
                    matrix.data[r * dim + c] = matrix.data[c * dim + r].conj();
                    present[r * dim + c] = true;
                }
            }
        }
        Ok((matrix, present))
    }

    pub fn num_atoms(&self) -> usize { self.natom }
    pub fn dim(&self) -> usize { 3 * self.natom }

    pub fn get(&self, row: usize, col: usize) -> Complex64
    { self.data[row * self.dim() + col] }

    fn max_abs(&self) -> f64
    { self.data.iter().fold(0.0, |acc, x| f64::max(acc, x.norm())) }

    fn max_imag(&self) -> f64
    { self.data.iter().fold(0.0, |acc, x| f64::max(acc, x.im.abs())) }

    /// Max absolute value of `M - M^H`.
    pub fn max_hermitian_error(&self) -> f64 {
        let dim = self.dim();
        let mut acc = 0.0;
        for r in 0..dim {
            for c in 0..dim {
                let diff = self.get(r, c) - self.get(c, r).conj();
                acc = f64::max(acc, diff.norm());
            }
        }
        acc
    }

    pub fn conj_t(&self) -> Self {
        let dim = self.dim();
        let mut out = DynamicalMatrix::zero(self.natom);
        for r in 0..dim {
            for c in 0..dim {
                out.data[c * dim + r] = self.get(r, c).conj();
            }
        }
        out
    }

    /// `(M + M^H) / 2`
    pub fn hermitianize(&self) -> Self {
        let conj_t = self.conj_t();
        let data = self.data.iter().zip(&conj_t.data).map(|(a, b)| (a + b) * 0.5).collect();
        DynamicalMatrix { natom: self.natom, data }
    }

    fn scale_blocks(&mut self, factor: impl Fn(usize, usize) -> f64) {
        let dim = self.dim();
        for r in 0..dim {
            for c in 0..dim {
                self.data[r * dim + c] *= factor(r / 3, c / 3);
            }
        }
    }

    /// Divide block `(a, b)` by `sqrt(m_a m_b)`.
    pub fn mass_weight(&mut self, masses: &[f64])
    { self.scale_blocks(|a, b| 1.0 / f64::sqrt(masses[a] * masses[b])) }

    /// Multiply block `(a, b)` by `sqrt(m_a m_b)`.
    pub fn mass_unweight(&mut self, masses: &[f64])
    { self.scale_blocks(|a, b| f64::sqrt(masses[a] * masses[b])) }

    /// The 3x3 block coupling two atoms, real part only.
    pub fn real_block(&self, a: usize, b: usize) -> M33
    { M33::from_fn(|r, c| self.get(3 * a + r, 3 * b + c).re) }

    fn sub_from_diagonal_block(&mut self, atom: usize, block: &M33) {
        let dim = self.dim();
        for r in 0..3 {
            for c in 0..3 {
                self.data[(3 * atom + r) * dim + 3 * atom + c] -= block[r][c];
            }
        }
    }

    /// If the matrix is real (to within noise), produce a flat real representation.
    pub fn to_dense_flat_real(&self) -> Option<Vec<f64>> {
        let scale = f64::max(self.max_abs(), std::f64::MIN_POSITIVE);
        match self.max_imag() <= REAL_TOL * scale {
            true => Some(self.data.iter().map(|x| x.re).collect()),
            false => None,
        }
    }

    /// All eigensolutions in ascending order of eigenvalue.
    ///
    /// Each eigenvector is given as one complex 3-vector per atom, with unit norm.
    /// A real matrix is diagonalized with the real symmetric solver so that its
    /// eigenvectors come out real.
    pub fn eigensolutions(&self) -> Result<(Eigenvalues, Vec<Vec<C3>>), NonFiniteMatrix> {
        trace!("Computing all eigensolutions.");
        let dim = self.dim();
        let (eigenvalues, flat_vectors): (_, Vec<Vec<Complex64>>) = match self.to_dense_flat_real() {
            Some(real) => {
                let esys = eigh_real_symmetric(dim, &real)?;
                let vectors = esys.vectors.into_iter().map(|v| {
                    v.into_iter().map(|x| Complex64::new(x, 0.0)).collect()
                }).collect();
                (esys.values, vectors)
            },
            None => {
                let esys = eigh_hermitian(dim, &self.data)?;
                (esys.values, esys.vectors)
            },
        };

        let vectors = flat_vectors.into_iter().map(|flat| {
            flat.chunks(3).map(|c| V3([c[0], c[1], c[2]])).collect()
        }).collect();
        Ok((Eigenvalues { eigenvalues }, vectors))
    }
}

/// Trivial wrapper type to help ensure eigenvalues don't get mistaken for frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigenvalues { pub eigenvalues: Vec<f64> }

impl Eigenvalues {
    /// `sign(λ) sqrt(|λ| * scale)` for each eigenvalue.
    pub fn frequencies(&self, scale: f64) -> Vec<f64>
    { self.eigenvalues.iter().map(|&x| units::signed_sqrt(x * scale)).collect() }
}

// ------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsrMode {
    /// Use the force constants as recorded.
    None,
    /// Subtract the residual `r_a` from each diagonal block.
    Diagonal,
    /// Subtract `(r_a + r_a^T) / 2` from each diagonal block.
    Symmetric,
}

impl Default for AsrMode {
    fn default() -> Self { AsrMode::Diagonal }
}

/// Per-atom residuals of the acoustic sum rule at Γ.
///
/// `residuals[a][α][β] = Σ_b Re Φ_Γ(α, a; β, b)`, which should vanish for a
/// translationally invariant set of force constants.  These are in the units of
/// the raw (not mass-normalized) force constants.
#[derive(Debug, Clone, PartialEq)]
pub struct AsrCorrection {
    residuals: Vec<M33>,
}

impl AsrCorrection {
    /// Compute from the Γ block of a store. `masses` are only used to undo mass
    /// normalization.
    pub fn compute(ddb: &Ddb, masses: &[f64]) -> Result<Self, AsrUncorrectable> {
        let natom = ddb.natom();
        let block = ddb.block_for(&GAMMA).map_err(|_| AsrUncorrectable::NoGamma)?;
        let (mut matrix, present) = DynamicalMatrix::assemble(natom, block)?;
        let dim = matrix.dim();
        if let Some(index) = present.iter().position(|&p| !p) {
            let (row, col) = (index / dim, index % dim);
            return Err(AsrUncorrectable::MissingEntry {
                atom1: row / 3, dir1: row % 3,
                atom2: col / 3, dir2: col % 3,
            });
        }
        if ddb.is_mass_normalized() {
            check_masses(natom, masses)?;
            matrix.mass_unweight(masses);
        }
        Ok(AsrCorrection::from_gamma_matrix(&matrix))
    }

    /// Compute from a complete raw dynamical matrix at Γ.
    pub fn from_gamma_matrix(matrix: &DynamicalMatrix) -> Self {
        let natom = matrix.num_atoms();
        let residuals = (0..natom).map(|a| {
            (0..natom).fold(M33::zero(), |acc, b| acc + matrix.real_block(a, b))
        }).collect();
        AsrCorrection { residuals }
    }

    pub fn residuals(&self) -> &[M33] { &self.residuals }

    pub fn max_residual(&self) -> f64
    { self.residuals.iter().fold(0.0, |acc, r| f64::max(acc, r.max_abs())) }

    /// Apply to a raw (not mass-weighted) matrix at any qpoint.
    pub fn apply(&self, mode: AsrMode, matrix: &mut DynamicalMatrix) {
        assert_eq!(matrix.num_atoms(), self.residuals.len());
        for (atom, residual) in self.residuals.iter().enumerate() {
            let correction = match mode {
                AsrMode::None => return,
                AsrMode::Diagonal => *residual,
                AsrMode::Symmetric => residual.sym(),
            };
            matrix.sub_from_diagonal_block(atom, &correction);
        }
    }
}

// ------------------------------------------------------

/// Phonons at one qpoint.
#[derive(Debug, Clone)]
pub struct PhononSolution {
    pub qpoint: V3,
    /// Ascending, in Hartree.  Negative values encode imaginary frequencies.
    pub frequencies: Vec<f64>,
    /// One per frequency; one complex 3-vector per atom, with `Σ_a m_a |u_a|² = 1`.
    pub eigendisplacements: Vec<Vec<C3>>,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct PhononSolver {
    pub asr: AsrMode,
}

impl PhononSolver {
    pub fn new(asr: AsrMode) -> Self { PhononSolver { asr } }

    /// The ASR correction to use for a store, or `None` if it is disabled or cannot be
    /// computed (which is only worth a warning).
    pub fn asr_correction(&self, ddb: &Ddb, masses: &[f64]) -> Option<AsrCorrection> {
        if self.asr == AsrMode::None {
            return None;
        }
        match AsrCorrection::compute(ddb, masses) {
            Ok(correction) => {
                debug!("acoustic sum rule residual: {:e}", correction.max_residual());
                Some(correction)
            },
            Err(e) => {
                warn!("Not correcting the acoustic sum rule: {}", e);
                None
            },
        }
    }

    pub fn solve(&self, qpoint: &V3, ddb: &Ddb, masses: &[f64]) -> Result<PhononSolution, DynmatError> {
        let correction = self.asr_correction(ddb, masses);
        self.solve_with_correction(qpoint, ddb, masses, correction.as_ref())
    }

    /// Solve at every qpoint of the store, in store order.
    pub fn solve_all(&self, ddb: &Ddb, masses: &[f64]) -> Result<Vec<PhononSolution>, DynmatError> {
        let correction = self.asr_correction(ddb, masses);
        ddb.all_qpoints().iter()
            .map(|q| self.solve_with_correction(q, ddb, masses, correction.as_ref()))
            .collect()
    }

    pub fn solve_with_correction(
        &self,
        qpoint: &V3,
        ddb: &Ddb,
        masses: &[f64],
        correction: Option<&AsrCorrection>,
    ) -> Result<PhononSolution, DynmatError> {
        let natom = ddb.natom();
        check_masses(natom, masses)?;
        trace!("Solving for phonons at {:?}", qpoint);

        let block = ddb.block_for(qpoint)?;
        let mut matrix = DynamicalMatrix::from_block(natom, block)?;

        if let Some(correction) = correction {
            if ddb.is_mass_normalized() {
                matrix.mass_unweight(masses);
            }
            correction.apply(self.asr, &mut matrix);
            matrix.mass_weight(masses);
        } else if !ddb.is_mass_normalized() {
            matrix.mass_weight(masses);
        }

        let error = matrix.max_hermitian_error();
        if error > HERMITIAN_WARN_TOL * matrix.max_abs() {
            warn!("Dynamical matrix at {:?} is far from hermitian (error {:e})", qpoint, error);
        }
        let matrix = matrix.hermitianize();

        let (eigenvalues, eigenvectors) = {
            matrix.eigensolutions()
                .map_err(|source| DynmatError::NonFinite { qpoint: *qpoint, source })?
        };

        // raw: Hartree / (Bohr² amu)  =>  Hartree²
        let scale = match ddb.is_mass_normalized() {
            true => 1.0,
            false => 1.0 / AMU_TO_ELECTRON_MASS,
        };
        let frequencies = eigenvalues.frequencies(scale);
        let eigendisplacements = {
            eigenvectors.into_iter()
                .map(|ev| eigendisplacement_from_eigenvector(&ev, masses))
                .collect()
        };
        Ok(PhononSolution { qpoint: *qpoint, frequencies, eigendisplacements })
    }
}

fn check_masses(natom: usize, masses: &[f64]) -> Result<(), DynmatError> {
    if masses.len() != natom {
        return Err(DynmatError::MassCount { expected: natom, actual: masses.len() });
    }
    if let Some((atom, &mass)) = masses.iter().enumerate().find(|&(_, &m)| !(m > 0.0)) {
        return Err(DynmatError::BadMass { atom, mass });
    }
    Ok(())
}

/// `u_a = e_a / sqrt(m_a)`, normalized so that `Σ_a m_a |u_a|² = 1`.
pub fn eigendisplacement_from_eigenvector(eigenvector: &[C3], masses: &[f64]) -> Vec<C3> {
    let mut out: Vec<C3> = {
        eigenvector.iter().zip(masses)
            .map(|(e, &m)| e.scale(Complex64::new(1.0 / m.sqrt(), 0.0)))
            .collect()
    };
    normalize_mass_weighted(&mut out, masses);
    out
}

/// Rescale in place to unit mass-weighted norm.  A zero vector is left alone.
pub fn normalize_mass_weighted(displacement: &mut [C3], masses: &[f64]) {
    let norm = mass_weighted_sqnorm(displacement, masses).sqrt();
    if norm > 0.0 {
        let factor = Complex64::new(1.0 / norm, 0.0);
        for u in displacement {
            *u = u.scale(factor);
        }
    }
}

/// `Σ_a m_a |u_a|²`
pub fn mass_weighted_sqnorm(displacement: &[C3], masses: &[f64]) -> f64
{ displacement.iter().zip(masses).map(|(u, &m)| m * u.sqnorm()).sum() }

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;
    use phmodes_ddb::Perturbation;
    use std::f64::consts::PI;

    fn c(re: f64, im: f64) -> Complex64 { Complex64::new(re, im) }

    // The same value along each of the three cartesian directions.
    fn insert_isotropic(ddb: &mut Ddb, q: V3, a: usize, b: usize, value: Complex64) {
        for dir in 0..3 {
            let d = SecondDerivative::new(dir, Perturbation::Atom(a), dir, Perturbation::Atom(b), value);
            ddb.insert(q, d).unwrap();
        }
    }

    // Diatomic molecule, spring constant k along every axis.
    fn diatomic(k: f64, self_error: f64) -> Ddb {
        let mut ddb = Ddb::new(2);
        let complete = |ddb: &mut Ddb, a, b, value| {
            for dir1 in 0..3 {
                for dir2 in 0..3 {
                    let value = if dir1 == dir2 { value } else { 0.0 };
                    let d = SecondDerivative::new(dir1, Perturbation::Atom(a), dir2, Perturbation::Atom(b), c(value, 0.0));
                    ddb.insert(GAMMA, d).unwrap();
                }
            }
        };
        complete(&mut ddb, 0, 0, k + self_error);
        complete(&mut ddb, 1, 1, k + self_error);
        complete(&mut ddb, 0, 1, -k);
        complete(&mut ddb, 1, 0, -k);
        ddb
    }

    fn mass_weighted_dot(u: &[C3], v: &[C3], masses: &[f64]) -> Complex64 {
        u.iter().zip(v).zip(masses)
            .map(|((u, v), &m)| phmodes_array_types::cdot(&[*u], &[*v]) * m)
            .sum()
    }

    #[test]
    fn diatomic_frequencies() {
        let (k, masses) = (0.1, [12.0, 16.0]);
        let ddb = diatomic(k, 0.0);
        let solution = PhononSolver::new(AsrMode::None).solve(&GAMMA, &ddb, &masses).unwrap();

        let optical = f64::sqrt(k * (1.0 / masses[0] + 1.0 / masses[1]) / AMU_TO_ELECTRON_MASS);
        assert_eq!(solution.frequencies.len(), 6);
        for i in 0..3 {
            assert_close!(abs=1e-8, solution.frequencies[i], 0.0);
            assert_close!(rel=1e-10, solution.frequencies[i + 3], optical);
        }
    }

    #[test]
    fn eigendisplacements_are_normalized_and_orthogonal() {
        let masses = [12.0, 16.0];
        let ddb = diatomic(0.1, 0.0);
        let solution = PhononSolver::new(AsrMode::None).solve(&GAMMA, &ddb, &masses).unwrap();

        let disps = &solution.eigendisplacements;
        for u in disps {
            assert_close!(abs=1e-8, mass_weighted_sqnorm(u, &masses), 1.0);
        }
        for acoustic in &disps[..3] {
            for optical in &disps[3..] {
                assert_close!(abs=1e-8, mass_weighted_dot(acoustic, optical, &masses).norm(), 0.0);
            }
        }
        // optical modes move the atoms against each other, conserving momentum
        for optical in &disps[3..] {
            let momentum = optical[0].re() * masses[0] + optical[1].re() * masses[1];
            assert_close!(abs=1e-8, momentum.norm(), 0.0);
        }
    }

    #[test]
    fn complex_block() {
        // two atoms of a linear chain at q = 1/4 along the chain
        let (k, m) = (0.2, 10.0);
        let q = V3([0.25, 0.0, 0.0]);
        let theta = 2.0 * PI * q[0];
        let mut ddb = Ddb::new(2);
        insert_isotropic(&mut ddb, q, 0, 0, c(2.0 * k, 0.0));
        insert_isotropic(&mut ddb, q, 1, 1, c(2.0 * k, 0.0));
        // only one side; the other is filled in by hermiticity
        insert_isotropic(&mut ddb, q, 0, 1, c(-k, 0.0) * (c(1.0, 0.0) + c(0.0, -theta).exp()));

        let solution = PhononSolver::new(AsrMode::None).solve(&q, &ddb, &[m, m]).unwrap();
        let lower = f64::sqrt((2.0 - f64::sqrt(2.0)) * k / m / AMU_TO_ELECTRON_MASS);
        let upper = f64::sqrt((2.0 + f64::sqrt(2.0)) * k / m / AMU_TO_ELECTRON_MASS);
        for i in 0..3 {
            assert_close!(rel=1e-10, solution.frequencies[i], lower);
            assert_close!(rel=1e-10, solution.frequencies[i + 3], upper);
        }
        for u in &solution.eigendisplacements {
            assert_close!(abs=1e-8, mass_weighted_sqnorm(u, &[m, m]), 1.0);
        }
    }

    #[test]
    fn mass_normalized_store() {
        let (k, masses) = (0.1, [12.0, 16.0]);
        let mut ddb = Ddb::new(2);
        for &(a, b, value) in &[(0, 0, k), (1, 1, k), (0, 1, -k), (1, 0, -k)] {
            let value = value / f64::sqrt(masses[a] * masses[b]);
            insert_isotropic(&mut ddb, GAMMA, a, b, c(value, 0.0));
        }
        ddb.set_mass_normalized(true);

        let solution = PhononSolver::new(AsrMode::None).solve(&GAMMA, &ddb, &masses).unwrap();
        let optical = f64::sqrt(k * (1.0 / masses[0] + 1.0 / masses[1]));
        assert_close!(rel=1e-10, solution.frequencies[5], optical);
    }

    #[test]
    fn asr_correction() {
        let masses = [12.0, 16.0];
        let ddb = diatomic(0.1, 1e-3);

        let uncorrected = PhononSolver::new(AsrMode::None).solve(&GAMMA, &ddb, &masses).unwrap();
        assert!(uncorrected.frequencies[0] > 1e-5);

        let correction = AsrCorrection::compute(&ddb, &masses).unwrap();
        assert_close!(abs=1e-12, correction.residuals()[0], M33::eye() * 1e-3);

        for &mode in &[AsrMode::Diagonal, AsrMode::Symmetric] {
            let corrected = PhononSolver::new(mode).solve(&GAMMA, &ddb, &masses).unwrap();
            for i in 0..3 {
                assert_close!(abs=1e-8, corrected.frequencies[i], 0.0);
            }
        }
    }

    #[test]
    fn asr_without_gamma_still_solves() {
        let q = V3([0.5, 0.0, 0.0]);
        let mut ddb = Ddb::new(1);
        insert_isotropic(&mut ddb, q, 0, 0, c(0.3, 0.0));

        match AsrCorrection::compute(&ddb, &[1.0]) {
            Err(AsrUncorrectable::NoGamma) => {},
            r => panic!("unexpected: {:?}", r),
        }
        let solution = PhononSolver::new(AsrMode::Diagonal).solve(&q, &ddb, &[1.0]).unwrap();
        assert_eq!(solution.frequencies.len(), 3);
    }

    #[test]
    fn incomplete_gamma_is_uncorrectable() {
        let mut ddb = Ddb::new(2);
        insert_isotropic(&mut ddb, GAMMA, 0, 0, c(0.3, 0.0));
        match AsrCorrection::compute(&ddb, &[1.0, 1.0]) {
            Err(AsrUncorrectable::MissingEntry { atom1: 0, dir1: 0, atom2: 0, dir2: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn input_errors() {
        let ddb = diatomic(0.1, 0.0);
        let solver = PhononSolver::new(AsrMode::None);
        match solver.solve(&V3([0.5, 0.0, 0.0]), &ddb, &[1.0, 1.0]) {
            Err(DynmatError::QptNotFound(e)) => assert_eq!(e.qpoint, V3([0.5, 0.0, 0.0])),
            r => panic!("unexpected: {:?}", r),
        }
        match solver.solve(&GAMMA, &ddb, &[1.0]) {
            Err(DynmatError::MassCount { expected: 2, actual: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }
        match solver.solve(&GAMMA, &ddb, &[1.0, 0.0]) {
            Err(DynmatError::BadMass { atom: 1, .. }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        let d = SecondDerivative::new(0, Perturbation::Atom(3), 0, Perturbation::Atom(0), c(1.0, 0.0));
        match DynamicalMatrix::from_block(2, &[d]) {
            Err(DynmatError::BadIndex { atom: 3, natom: 2 }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn hermitianize() {
        let mut ddb = Ddb::new(1);
        let d1 = SecondDerivative::new(0, Perturbation::Atom(0), 1, Perturbation::Atom(0), c(1.0, 0.5));
        let d2 = SecondDerivative::new(1, Perturbation::Atom(0), 0, Perturbation::Atom(0), c(3.0, -0.5));
        ddb.insert(GAMMA, d1).unwrap();
        ddb.insert(GAMMA, d2).unwrap();

        let matrix = DynamicalMatrix::from_block(1, ddb.block_for(&GAMMA).unwrap()).unwrap();
        assert_close!(abs=1e-12, matrix.max_hermitian_error(), 2.0);

        let fixed = matrix.hermitianize();
        assert_close!(abs=1e-12, fixed.max_hermitian_error(), 0.0);
        assert_close!(abs=1e-12, fixed.get(0, 1), c(2.0, 0.5));
        assert_close!(abs=1e-12, fixed.get(1, 0), c(2.0, -0.5));
    }
}
