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

use crate::{Structure, CoordsKind};
use crate::algo::reference::{ReferenceMap};

use phmodes_array_types::{V3, M33};

/// Begin building a diagonal supercell with `dims[k]` images along lattice vector `k`.
pub fn diagonal(dims: [u32; 3]) -> Builder
{ Builder { periods: dims } }

/// Builds supercells in the library's preferred atom order.
///
/// Atoms are ordered by translation cell first, then by unit cell atom:
/// supercell atom `cell_index * num_primitive + a` is the image of unit cell atom `a`
/// in the cell with `cell_index = (i * N2 + j) * N3 + k`.
#[derive(Debug, Clone)]
pub struct Builder {
    periods: [u32; 3],
}

impl Builder {
    pub fn build<M: Clone>(&self, structure: &Structure<M>) -> (Structure<M>, SupercellToken) {
        let periods = self.periods;
        assert!(periods.iter().all(|&n| n > 0), "supercell dimensions must be positive: {:?}", periods);

        let lattice = structure.lattice();
        let prim_carts = structure.to_carts();
        let num_primitive_atoms = prim_carts.len();

        let cells = cell_indices(periods);
        let mut carts = Vec::with_capacity(cells.len() * num_primitive_atoms);
        let mut meta = Vec::with_capacity(cells.len() * num_primitive_atoms);
        for cell in &cells {
            let offset = cell.map(f64::from) * lattice;
            for (cart, m) in prim_carts.iter().zip(structure.metadata()) {
                carts.push(cart + offset);
                meta.push(m.clone());
            }
        }

        let integer_lattice = M33::from_diag(V3(periods).map(f64::from));
        let structure = Structure {
            lattice: &integer_lattice * lattice,
            coords: CoordsKind::Carts(carts),
            meta,
        };
        let token = SupercellToken { periods, num_primitive_atoms };
        (structure, token)
    }
}

/// Contains enough information to deconstruct a supercell produced by this library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupercellToken {
    periods: [u32; 3],
    num_primitive_atoms: usize,
}

impl SupercellToken {
    pub fn periods(&self) -> [u32; 3] { self.periods }

    pub fn num_cells(&self) -> usize
    { self.periods.iter().map(|&n| n as usize).product() }

    pub fn num_primitive_atoms(&self) -> usize { self.num_primitive_atoms }

    pub fn num_supercell_atoms(&self) -> usize
    { self.num_cells() * self.num_primitive_atoms }

    /// Takes data for each atom of the primitive cell and expands it to the
    /// size of the supercell.
    pub fn replicate<M: Clone>(&self, vec: &[M]) -> Vec<M> {
        assert_eq!(vec.len(), self.num_primitive_atoms);
        let mut out = Vec::with_capacity(self.num_supercell_atoms());
        for _ in 0..self.num_cells() {
            out.extend_from_slice(vec);
        }
        out
    }

    /// The unit cell atom of each supercell atom.
    pub fn atom_primitive_atoms(&self) -> Vec<usize> {
        (0..self.num_supercell_atoms()).map(|i| i % self.num_primitive_atoms).collect()
    }

    /// The translation cell of each supercell atom.
    pub fn atom_cells(&self) -> Vec<V3<i32>> {
        let cells = cell_indices(self.periods);
        (0..self.num_supercell_atoms())
            .map(|i| cells[i / self.num_primitive_atoms].map(|x| x as i32))
            .collect()
    }

    /// The reference map of the supercell as it was built.
    pub fn reference_map(&self) -> ReferenceMap {
        ReferenceMap::from_parts(self.periods, self.num_primitive_atoms, self.atom_primitive_atoms(), self.atom_cells())
            .unwrap_or_else(|e| panic!("BUG: supercell token produced an invalid mapping: {}", e))
    }
}

/// Supercell cell indices in the library's preferred order.
pub fn cell_indices(periods: [u32; 3]) -> Vec<V3<u32>> {
    let mut out = Vec::with_capacity(periods.iter().map(|&n| n as usize).product());
    for i in 0..periods[0] {
        for j in 0..periods[1] {
            for k in 0..periods[2] {
                out.push(V3([i, j, k]));
            }
        }
    }
    out
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("qpoint {qpoint:?} is not commensurate with any diagonal supercell: component {axis} ({value}) is neither 0 nor the reciprocal of an integer")]
pub struct NotCommensurate {
    pub qpoint: V3,
    pub axis: usize,
    pub value: f64,
}

/// Smallest diagonal supercell on whose grid `qpoint` lies, for qpoints whose
/// components are each zero or the reciprocal of an integer.
pub fn dims_from_qpoint(qpoint: &V3) -> Result<[u32; 3], NotCommensurate> {
    const TOL: f64 = 1e-6;

    let mut dims = [1; 3];
    for axis in 0..3 {
        let value = qpoint[axis];
        // integers (including zero) are equivalent to zero
        if (value - value.round()).abs() < TOL {
            continue;
        }
        let n = (1.0 / value.abs()).round();
        if n < 1.0 || (value.abs() * n - 1.0).abs() >= TOL {
            return Err(NotCommensurate { qpoint: *qpoint, axis, value });
        }
        dims[axis] = n as u32;
    }
    Ok(dims)
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::{Atom, Element, Lattice};

    fn two_atom_cell() -> Structure<Atom> {
        // nondiagonal lattice so that matrix multiplication order matters
        let lattice = Lattice::from(&[
            [2.0, 2.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 2.0],
        ]);
        let coords = CoordsKind::Fracs(vec![
            V3([ 0.5, -0.5, 0.0]), // cart: [+1.0, -1.0,  0.0]
            V3([ 0.0,  0.5, 0.5]), // cart: [ 0.0, +2.0, +1.0]
        ]);
        let meta = vec![
            Atom::new(Element::from_symbol("Na").unwrap()),
            Atom::new(Element::from_symbol("Cl").unwrap()),
        ];
        Structure::new(lattice, coords, meta)
    }

    #[test]
    fn diagonal_supercell_smoke_test() {
        let original = Structure::new(Lattice::eye(), CoordsKind::Fracs(vec![V3([0.0; 3])]), vec![()]);
        let (supercell, token) = diagonal([2, 2, 2]).build(&original);

        assert_eq!(supercell.num_atoms(), 8);
        assert_eq!(supercell.lattice(), &Lattice::cubic(2.0));
        assert_eq!(token.num_cells(), 8);
        assert_eq!(supercell.to_carts(), vec![
            V3([0.0, 0.0, 0.0]), V3([0.0, 0.0, 1.0]), V3([0.0, 1.0, 0.0]), V3([0.0, 1.0, 1.0]),
            V3([1.0, 0.0, 0.0]), V3([1.0, 0.0, 1.0]), V3([1.0, 1.0, 0.0]), V3([1.0, 1.0, 1.0]),
        ]);
    }

    #[test]
    fn ordering_is_cell_major() {
        let original = two_atom_cell();
        let (supercell, token) = diagonal([3, 1, 2]).build(&original);
        assert_eq!(supercell.num_atoms(), 12);

        let prims = token.atom_primitive_atoms();
        let cells = token.atom_cells();
        let elements = supercell.elements();
        let carts = supercell.to_carts();
        let prim_carts = original.to_carts();
        for i in 0..supercell.num_atoms() {
            assert_eq!(prims[i], i % 2);
            assert_eq!(elements[i], original.metadata()[prims[i]].element);
            let expected = prim_carts[prims[i]] + cells[i].to_f64() * original.lattice();
            assert_eq!(carts[i], expected);
        }
        assert_eq!(cells[2], V3([0, 0, 1]));
        assert_eq!(cells[4], V3([1, 0, 0]));
        assert_eq!(token.replicate(&[1, 2]), vec![1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn dims_from_qpoints() {
        assert_eq!(dims_from_qpoint(&V3([0.0, 0.0, 0.0])).unwrap(), [1, 1, 1]);
        assert_eq!(dims_from_qpoint(&V3([0.5, 0.0, -0.25])).unwrap(), [2, 1, 4]);
        assert_eq!(dims_from_qpoint(&V3([1.0 / 3.0, 1.0, 0.0])).unwrap(), [3, 1, 1]);

        let err = dims_from_qpoint(&V3([0.0, 0.4, 0.0])).unwrap_err();
        assert_eq!(err.axis, 1);
        assert!(dims_from_qpoint(&V3([2.0 / 3.0, 0.0, 0.0])).is_err());
    }
}
