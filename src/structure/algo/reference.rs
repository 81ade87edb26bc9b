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

//! Mapping the atoms of a supercell onto a unit cell and lattice translations.

use crate::{AtomStructure, Element};

use phmodes_array_types::V3;
use ordered_float::NotNan;

/// Per supercell atom, the unit cell atom it is an image of and the translation cell
/// it lives in.
///
/// Invariants: the supercell has `num_primitive_atoms * N1 * N2 * N3` atoms, every
/// translation lies in `[0, N)` along each axis, and every (unit cell atom, cell) pair
/// occurs exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMap {
    periods: [u32; 3],
    num_primitive_atoms: usize,
    primitive_atoms: Vec<usize>,
    cells: Vec<V3<i32>>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MappingFailure {
    #[error("supercell has {supercell} atoms, but a {periods:?} supercell of a {unit}-atom cell must have {expected}")]
    AtomCount { supercell: usize, unit: usize, periods: [u32; 3], expected: usize },

    #[error("supercell atom {atom} ({element}) has no atom of the same species in the unit cell")]
    NoCandidate { atom: usize, element: Element },

    #[error("unit cell atom {ref_atom} was matched by {count} supercell atoms (expected {expected}); the supercell may be too distorted, or not built from this unit cell")]
    Multiplicity { ref_atom: usize, count: usize, expected: usize },

    #[error("supercell atom {atom} maps to unit cell atom {ref_atom} in cell {cell:?}, which is already taken by another atom")]
    Duplicate { atom: usize, ref_atom: usize, cell: V3<i32> },

    #[error("supercell atom {atom} has translation {cell:?} outside of the {periods:?} grid")]
    OutOfGrid { atom: usize, cell: V3<i32>, periods: [u32; 3] },

    #[error("reference map describes {expected} atoms, but the structure has {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl ReferenceMap {
    /// Map every atom of `supercell` onto an atom of `unit` and a cell of the
    /// `periods` grid.
    ///
    /// For each supercell atom, the position is projected onto the unit cell lattice to
    /// guess a cell, and the 27 cells around that guess are searched for the nearest
    /// image of a unit cell atom of the same species.
    pub fn find(
        supercell: &AtomStructure,
        unit: &AtomStructure,
        periods: [u32; 3],
    ) -> Result<Self, MappingFailure> {
        let num_cells = periods.iter().map(|&n| n as usize).product::<usize>();
        if supercell.num_atoms() != unit.num_atoms() * num_cells {
            return Err(MappingFailure::AtomCount {
                supercell: supercell.num_atoms(),
                unit: unit.num_atoms(),
                expected: unit.num_atoms() * num_cells,
                periods,
            });
        }

        let unit_lattice = unit.lattice();
        let unit_fracs = unit.to_fracs();
        let unit_elements = unit.elements();

        let super_elements = supercell.elements();
        let super_fracs: Vec<V3> = {
            supercell.to_carts().iter().map(|c| c / unit_lattice).collect()
        };

        let mut primitive_atoms = Vec::with_capacity(supercell.num_atoms());
        let mut cells = Vec::with_capacity(supercell.num_atoms());
        for (atom, (frac, &element)) in super_fracs.iter().zip(&super_elements).enumerate() {
            let mut best: Option<(NotNan<f64>, usize, V3<i32>)> = None;

            let candidates = unit_elements.iter().enumerate().filter(|&(_, &e)| e == element);
            for (ref_atom, _) in candidates {
                let diff = frac - unit_fracs[ref_atom];
                let guess = diff.round_to_int();
                for offset in neighborhood() {
                    let cell = guess + offset;
                    let cart_dist = ((diff - cell.to_f64()) * unit_lattice).norm();
                    let dist = match NotNan::new(cart_dist) {
                        Ok(d) => d,
                        Err(_) => continue,
                    };
                    if best.map_or(true, |(best_dist, _, _)| dist < best_dist) {
                        best = Some((dist, ref_atom, cell));
                    }
                }
            }

            let (dist, ref_atom, cell) = best.ok_or(MappingFailure::NoCandidate { atom, element })?;
            trace!("supercell atom {} -> unit atom {} in cell {:?} (distance {})", atom, ref_atom, cell, dist);

            let wrapped = V3::from_fn(|k| cell[k].rem_euclid(periods[k] as i32));
            primitive_atoms.push(ref_atom);
            cells.push(wrapped);
        }

        Self::from_parts(periods, unit.num_atoms(), primitive_atoms, cells)
    }

    /// Construct from parallel arrays, verifying the invariants.
    pub fn from_parts(
        periods: [u32; 3],
        num_primitive_atoms: usize,
        primitive_atoms: Vec<usize>,
        cells: Vec<V3<i32>>,
    ) -> Result<Self, MappingFailure> {
        assert_eq!(primitive_atoms.len(), cells.len());
        let map = ReferenceMap { periods, num_primitive_atoms, primitive_atoms, cells };
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<(), MappingFailure> {
        let num_cells = self.num_cells();
        if self.primitive_atoms.len() != self.num_primitive_atoms * num_cells {
            return Err(MappingFailure::AtomCount {
                supercell: self.primitive_atoms.len(),
                unit: self.num_primitive_atoms,
                expected: self.num_primitive_atoms * num_cells,
                periods: self.periods,
            });
        }

        let mut counts = vec![0; self.num_primitive_atoms];
        let mut taken = vec![false; self.num_primitive_atoms * num_cells];
        for (atom, (&ref_atom, &cell)) in self.primitive_atoms.iter().zip(&self.cells).enumerate() {
            let in_grid = (0..3).all(|k| 0 <= cell[k] && cell[k] < self.periods[k] as i32);
            if ref_atom >= self.num_primitive_atoms || !in_grid {
                return Err(MappingFailure::OutOfGrid { atom, cell, periods: self.periods });
            }
            let slot = self.grid_index_of_cell(cell) * self.num_primitive_atoms + ref_atom;
            if taken[slot] {
                return Err(MappingFailure::Duplicate { atom, ref_atom, cell });
            }
            taken[slot] = true;
            counts[ref_atom] += 1;
        }

        for (ref_atom, &count) in counts.iter().enumerate() {
            if count != num_cells {
                return Err(MappingFailure::Multiplicity { ref_atom, count, expected: num_cells });
            }
        }
        Ok(())
    }

    /// Check that this map can describe a structure with the given number of atoms.
    pub fn check_num_atoms(&self, actual: usize) -> Result<(), MappingFailure> {
        match actual == self.num_supercell_atoms() {
            true => Ok(()),
            false => Err(MappingFailure::SizeMismatch { expected: self.num_supercell_atoms(), actual }),
        }
    }

    pub fn periods(&self) -> [u32; 3] { self.periods }

    pub fn num_cells(&self) -> usize
    { self.periods.iter().map(|&n| n as usize).product() }

    pub fn num_primitive_atoms(&self) -> usize { self.num_primitive_atoms }
    pub fn num_supercell_atoms(&self) -> usize { self.primitive_atoms.len() }

    /// Unit cell atom of each supercell atom.
    pub fn primitive_atoms(&self) -> &[usize] { &self.primitive_atoms }

    /// Translation cell of each supercell atom, with each component in `[0, N)`.
    pub fn cells(&self) -> &[V3<i32>] { &self.cells }

    /// Row-major index of the supercell atom's cell in the `N1 x N2 x N3` grid.
    pub fn grid_index(&self, atom: usize) -> usize
    { self.grid_index_of_cell(self.cells[atom]) }

    fn grid_index_of_cell(&self, cell: V3<i32>) -> usize {
        let [_, n2, n3] = self.periods;
        (cell[0] as usize * n2 as usize + cell[1] as usize) * n3 as usize + cell[2] as usize
    }
}

fn neighborhood() -> impl Iterator<Item=V3<i32>> {
    (-1..=1).flat_map(|i| (-1..=1).flat_map(move |j| (-1..=1).map(move |k| V3([i, j, k]))))
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::{Atom, CoordsKind, Lattice, Structure};
    use crate::supercell;

    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

    fn rocksalt_like() -> AtomStructure {
        let lattice = Lattice::from(&[
            [0.0, 2.8, 2.8],
            [2.8, 0.0, 2.8],
            [2.8, 2.8, 0.0],
        ]);
        let coords = CoordsKind::Fracs(vec![V3([0.0; 3]), V3([0.5; 3])]);
        let meta = vec![
            Atom::new(Element::from_symbol("Na").unwrap()),
            Atom::new(Element::from_symbol("Cl").unwrap()),
        ];
        Structure::new(lattice, coords, meta)
    }

    #[test]
    fn built_supercell_maps_to_token() {
        let unit = rocksalt_like();
        let (sc, token) = supercell::diagonal([2, 3, 2]).build(&unit);
        let map = ReferenceMap::find(&sc, &unit, [2, 3, 2]).unwrap();
        assert_eq!(map, token.reference_map());
    }

    #[test]
    fn shuffled_and_wrapped_supercell() {
        let unit = rocksalt_like();
        let (sc, token) = supercell::diagonal([3, 2, 2]).build(&unit);
        let expected = token.reference_map();

        let mut rng = StdRng::seed_from_u64(7);
        let mut order: Vec<usize> = (0..sc.num_atoms()).collect();
        order.shuffle(&mut rng);

        // shuffle atoms, rattle them, and wrap them into the supercell
        let carts = sc.to_carts();
        let meta = sc.metadata();
        let mut shuffled = Structure::new(
            sc.lattice().clone(),
            CoordsKind::Carts(order.iter().map(|&i| {
                carts[i] + V3::from_fn(|_| rng.gen_range(-0.05..0.05))
            }).collect()),
            order.iter().map(|&i| meta[i]),
        );
        shuffled.reduce_positions();

        let map = ReferenceMap::find(&shuffled, &unit, [3, 2, 2]).unwrap();
        for (new, &old) in order.iter().enumerate() {
            assert_eq!(map.primitive_atoms()[new], expected.primitive_atoms()[old]);
            assert_eq!(map.cells()[new], expected.cells()[old]);
        }
    }

    #[test]
    fn wrong_atom_count() {
        let unit = rocksalt_like();
        let (sc, _) = supercell::diagonal([2, 2, 2]).build(&unit);
        match ReferenceMap::find(&sc, &unit, [2, 2, 1]) {
            Err(MappingFailure::AtomCount { supercell: 16, unit: 2, .. }) => {},
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn collapsed_atoms_are_detected() {
        let unit = rocksalt_like();
        let (mut sc, _) = supercell::diagonal([2, 1, 1]).build(&unit);
        // move the second Na onto the first
        let first = sc.to_carts()[0];
        sc.carts_mut()[2] = first;
        assert!(ReferenceMap::find(&sc, &unit, [2, 1, 1]).is_err());
    }
}
