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

//! Quantities derived from the zone-center block.

use crate::{Ddb, DdbError, Perturbation, SecondDerivative};

use phmodes_array_types::{V3, M33, mat};
use num_complex::Complex64;
use std::f64::consts::PI;

const GAMMA: V3 = V3([0.0, 0.0, 0.0]);

impl Ddb {
    fn gamma_block(&self) -> Result<&[SecondDerivative], DdbError>
    { Ok(self.block_for(&GAMMA)?) }

    // Looks up a derivative at Γ, falling back to the one with the perturbations
    // swapped (the two are complex conjugates of each other).
    fn gamma_value(
        &self,
        dir1: usize,
        pert1: Perturbation,
        dir2: usize,
        pert2: Perturbation,
        hint: &'static str,
    ) -> Result<Complex64, DdbError> {
        let block = self.gamma_block()?;
        let key = (dir1, pert1, dir2, pert2);
        let swapped = (dir2, pert2, dir1, pert1);
        if let Some(d) = block.iter().find(|d| d.key() == key) {
            return Ok(d.value);
        }
        if let Some(d) = block.iter().find(|d| d.key() == swapped) {
            return Ok(d.value.conj());
        }
        Err(DdbError::MissingComponent { dir1, pert1, dir2, pert2, hint })
    }

    /// Whether the Γ block carries any derivative with respect to the electric field.
    pub fn has_electric_field_response(&self) -> bool {
        match self.block_for(&GAMMA) {
            Ok(block) => block.iter().any(|d| {
                d.pert1 == Perturbation::ElectricField || d.pert2 == Perturbation::ElectricField
            }),
            Err(_) => false,
        }
    }

    /// Born effective charge tensor of an atom, `Z[α][β] = Re Φ(α, E; β, atom) / 2π`.
    ///
    /// Row `α` is the field direction, column `β` the displacement direction.
    pub fn born_charge_of(&self, atom: usize) -> Result<M33, DdbError> {
        if atom >= self.natom() {
            return Err(DdbError::BadIndex { atom, natom: self.natom() });
        }
        let mut rows = [[0.0; 3]; 3];
        for alpha in 0..3 {
            for beta in 0..3 {
                let value = self.gamma_value(
                    alpha, Perturbation::ElectricField,
                    beta, Perturbation::Atom(atom),
                    "Born effective charges require an electric field response calculation",
                )?;
                rows[alpha][beta] = value.re / (2.0 * PI);
            }
        }
        Ok(mat::from_array(rows))
    }

    /// Born effective charges of every atom.
    pub fn born_charges(&self) -> Result<Vec<M33>, DdbError>
    { (0..self.natom()).map(|atom| self.born_charge_of(atom)).collect() }

    /// Electronic (clamped-ion) dielectric tensor,
    /// `ε[α][β] = δ(α, β) - (4π / Ω) Re Φ(α, E; β, E) / (2π)²`.
    pub fn dielectric_tensor_inf(&self) -> Result<M33, DdbError> {
        let volume = self.lattice().ok_or(DdbError::NoLattice)?.volume();
        let mut rows = [[0.0; 3]; 3];
        for alpha in 0..3 {
            for beta in 0..3 {
                let value = self.gamma_value(
                    alpha, Perturbation::ElectricField,
                    beta, Perturbation::ElectricField,
                    "the dielectric tensor requires an electric field response calculation",
                )?;
                let delta = if alpha == beta { 1.0 } else { 0.0 };
                rows[alpha][beta] = delta - 4.0 * PI / volume * value.re / (2.0 * PI).powi(2);
            }
        }
        Ok(mat::from_array(rows))
    }
}
