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

//! Random homogeneous strains.

use phmodes_array_types::{V3, M33};
use rand::Rng;
use rand::seq::SliceRandom;

/// Bounds of the random strain applied to each frame.
///
/// Each component is drawn uniformly from `[-bound, bound]`; a zero bound disables it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StrainBounds {
    /// `ε I`
    #[serde(default)]
    pub isotropic: f64,
    /// `ε` along one axis and `-ε/2` along the other two.
    #[serde(default)]
    pub tetragonal: f64,
    /// Axis of the tetragonal component; random if absent.
    #[serde(default)]
    pub axis: Option<usize>,
    /// `ε` on a pair of off-diagonal elements.
    #[serde(default)]
    pub shear: f64,
    /// Plane of the shear component; random if absent.
    #[serde(default)]
    pub plane: Option<[usize; 2]>,
    /// Rotate the tetragonal and shear parts by a random proper rotation of the cube.
    #[serde(default)]
    pub rotate: bool,
}

impl StrainBounds {
    pub fn validate(&self) -> Result<(), String> {
        for &(name, value) in &[("isotropic", self.isotropic), ("tetragonal", self.tetragonal), ("shear", self.shear)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(format!("strain bound `{}` must be finite and non-negative (got {})", name, value));
            }
        }
        if let Some(axis) = self.axis {
            if axis >= 3 {
                return Err(format!("strain axis must be 0, 1, or 2 (got {})", axis));
            }
        }
        if let Some([i, j]) = self.plane {
            if i >= 3 || j >= 3 || i == j {
                return Err(format!("shear plane must be two distinct axes from 0, 1, 2 (got {:?})", [i, j]));
            }
        }
        Ok(())
    }

    /// Draw one symmetric strain tensor.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> M33 {
        let mut draw = |bound: f64| match bound > 0.0 {
            true => rng.gen_range(-bound..=bound),
            false => 0.0,
        };
        let isotropic = draw(self.isotropic);
        let tetragonal = draw(self.tetragonal);
        let shear = draw(self.shear);

        let axis = match self.axis {
            Some(axis) => axis,
            None => rng.gen_range(0..3),
        };
        let [i, j] = match self.plane {
            Some(plane) => plane,
            None => [[0, 1], [1, 2], [2, 0]][rng.gen_range(0..3)],
        };

        let mut anisotropic = M33::from_diag(V3::from_fn(|k| if k == axis { tetragonal } else { -0.5 * tetragonal }));
        anisotropic[i][j] += shear;
        anisotropic[j][i] += shear;
        if self.rotate {
            let rotation = cubic_rotations().choose(rng).cloned().unwrap_or_else(M33::eye);
            anisotropic = rotation * anisotropic * rotation.t();
        }
        M33::eye() * isotropic + anisotropic
    }
}

/// The 24 proper rotations of a cube: signed permutation matrices of determinant 1.
pub fn cubic_rotations() -> Vec<M33> {
    const PERMUTATIONS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut out = vec![];
    for perm in &PERMUTATIONS {
        for signs in 0..8 {
            let sign = |k: usize| if signs & (1 << k) == 0 { 1.0 } else { -1.0 };
            let m = M33::from_fn(|r, c| if perm[r] == c { sign(r) } else { 0.0 });
            if m.det() > 0.0 {
                out.push(m);
            }
        }
    }
    out
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rotations() {
        let rotations = cubic_rotations();
        assert_eq!(rotations.len(), 24);
        for r in &rotations {
            assert_close!(abs=1e-12, *r * r.t(), M33::eye());
            assert_close!(abs=1e-12, r.det(), 1.0);
        }
    }

    #[test]
    fn components() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = StrainBounds { tetragonal: 0.02, axis: Some(2), ..Default::default() };
        for _ in 0..20 {
            let strain = bounds.sample(&mut rng);
            let eps = strain[2][2];
            assert!(eps.abs() <= 0.02);
            assert_close!(abs=1e-15, strain, M33::from_diag(V3([-eps / 2.0, -eps / 2.0, eps])));
        }

        let bounds = StrainBounds { shear: 0.01, plane: Some([0, 2]), isotropic: 0.03, ..Default::default() };
        let strain = bounds.sample(&mut rng);
        assert_eq!(strain[0][2], strain[2][0]);
        assert_eq!(strain[0][1], 0.0);
        assert_eq!(strain[0][0], strain[1][1]);
        assert!(strain[0][0].abs() <= 0.03);
    }

    #[test]
    fn rotated_strain_is_symmetric_and_traceless() {
        let mut rng = StdRng::seed_from_u64(4);
        let bounds = StrainBounds { tetragonal: 0.02, shear: 0.01, rotate: true, ..Default::default() };
        for _ in 0..20 {
            let strain = bounds.sample(&mut rng);
            assert_close!(abs=1e-15, strain, strain.t());
            assert_close!(abs=1e-15, strain.trace(), 0.0);
        }
    }

    #[test]
    fn validation() {
        assert!(StrainBounds { shear: -1.0, ..Default::default() }.validate().is_err());
        assert!(StrainBounds { plane: Some([1, 1]), ..Default::default() }.validate().is_err());
        assert!(StrainBounds { axis: Some(1), ..Default::default() }.validate().is_ok());
    }
}
