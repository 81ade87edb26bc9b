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

use crate::{Lattice, CoordsKind, Element};

use phmodes_array_types::V3;

/// Pairs [`CoordsKind`] together with their [`Lattice`], and per-atom metadata.
///
/// Positions may be stored in either cartesian or fractional form; whichever is
/// requested by a mutating accessor becomes the stored form.
///
/// [`CoordsKind`]: enum.CoordsKind.html
/// [`Lattice`]: struct.Lattice.html
#[derive(Debug, Clone, PartialEq)]
pub struct Structure<M = ()> {
    pub(crate) lattice: Lattice,
    pub(crate) coords: CoordsKind,
    pub(crate) meta: Vec<M>,
}

/// Per-atom metadata of a crystal: the species, and an optional spin vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Atom {
    pub element: Element,
    pub spin: Option<V3>,
}

impl Atom {
    pub fn new(element: Element) -> Self
    { Atom { element, spin: None } }
}

impl From<Element> for Atom {
    fn from(element: Element) -> Self { Atom::new(element) }
}

/// The structure type used for unit cells, supercells, and trajectory frames.
pub type AtomStructure = Structure<Atom>;

impl<M> Structure<M> {
    pub fn new<Ms>(lattice: Lattice, coords: CoordsKind, meta: Ms) -> Self
    where Ms: IntoIterator<Item=M>,
    {
        let meta: Vec<_> = meta.into_iter().collect();
        assert_eq!(coords.len(), meta.len());
        Self { lattice, coords, meta }
    }

    pub fn num_atoms(&self) -> usize { self.coords.len() }
    pub fn lattice(&self) -> &Lattice { &self.lattice }
    pub fn metadata(&self) -> &[M] { &self.meta }
}

/// Functions for rescaling the structure.
///
/// These functions preserve fractional position while changing the lattice.
impl<M> Structure<M> {
    pub fn set_lattice(&mut self, lattice: &Lattice) {
        self.ensure_only_fracs();
        self.lattice = lattice.clone();
    }
}

// messing around with coords
impl<M> Structure<M> {
    // NOTE: We can produce `Vec<_>` and `&mut [_]`,
    //       but not `&[_]` because the data might not be present.
    //       (`&mut [_]` works because can insert the data)
    pub fn to_carts(&self) -> Vec<V3> { self.coords.to_carts(&self.lattice) }
    pub fn to_fracs(&self) -> Vec<V3> { self.coords.to_fracs(&self.lattice) }

    pub fn carts_mut(&mut self) -> &mut [V3] {
        self.ensure_only_carts(); // 'only' because user modifications will invalidate fracs
        match self.coords {
            CoordsKind::Fracs(_) => unreachable!(),
            CoordsKind::Carts(ref mut c) => c,
        }
    }

    pub fn fracs_mut(&mut self) -> &mut [V3] {
        self.ensure_only_fracs(); // 'only' because user modifications will invalidate carts
        match self.coords {
            CoordsKind::Fracs(ref mut c) => c,
            CoordsKind::Carts(_) => unreachable!(),
        }
    }

    /// Ensure that carts are available, and that fracs are NOT available.
    fn ensure_only_carts(&mut self) {
        let dummy = CoordsKind::Carts(vec![]);
        let coords = std::mem::replace(&mut self.coords, dummy);
        self.coords = CoordsKind::Carts(coords.into_carts(&self.lattice));
    }

    /// Ensure that fracs are available, and that carts are NOT available.
    fn ensure_only_fracs(&mut self) {
        let dummy = CoordsKind::Carts(vec![]);
        let coords = std::mem::replace(&mut self.coords, dummy);
        self.coords = CoordsKind::Fracs(coords.into_fracs(&self.lattice));
    }

    pub fn translate_cart(&mut self, v: &V3) {
        for x in self.carts_mut() {
            *x += v;
        }
    }

    /// Reduces all fractional coordinates into [0.0, 1.0).
    pub fn reduce_positions(&mut self) {
        for v in self.fracs_mut() {
            // the second pass maps values like -1e-20 (which become exactly 1.0) to 0.0
            *v = v.map(|x| x - x.floor()).map(|x| x - x.floor());
        }
    }
}

impl Structure<Atom> {
    pub fn elements(&self) -> Vec<Element>
    { self.meta.iter().map(|a| a.element).collect() }

    /// Build a structure from any crystal source.
    pub fn from_source<S: CrystalSource + ?Sized>(source: &S) -> Self {
        let meta = (0..source.num_atoms()).map(|i| Atom {
            element: source.element(i),
            spin: source.spin(i),
        });
        Structure::new(source.lattice(), CoordsKind::Carts(source.carts()), meta)
    }
}

/// Capability interface for anything that can describe a crystal.
///
/// Readers of external structure formats implement this; the rest of the
/// workspace only ever sees the resulting [`AtomStructure`].
///
/// [`AtomStructure`]: type.AtomStructure.html
pub trait CrystalSource {
    fn num_atoms(&self) -> usize;
    fn element(&self, atom: usize) -> Element;
    fn lattice(&self) -> Lattice;
    /// Cartesian positions.
    fn carts(&self) -> Vec<V3>;
    fn spin(&self, _atom: usize) -> Option<V3> { None }
}

impl CrystalSource for Structure<Atom> {
    fn num_atoms(&self) -> usize { Structure::num_atoms(self) }
    fn element(&self, atom: usize) -> Element { self.meta[atom].element }
    fn lattice(&self) -> Lattice { self.lattice.clone() }
    fn carts(&self) -> Vec<V3> { self.to_carts() }
    fn spin(&self, atom: usize) -> Option<V3> { self.meta[atom].spin }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn lattice_change_keeps_fracs() {
        let mut s = Structure::new(
            Lattice::cubic(2.0),
            CoordsKind::Carts(vec![V3([1.0, 0.5, 0.0])]),
            vec![()],
        );
        s.set_lattice(&Lattice::orthorhombic(4.0, 1.0, 1.0));
        assert_eq!(s.to_fracs(), vec![V3([0.5, 0.25, 0.0])]);
        assert_eq!(s.to_carts(), vec![V3([2.0, 0.25, 0.0])]);
    }

    #[test]
    fn reduce() {
        let mut s = Structure::new(
            Lattice::eye(),
            CoordsKind::Fracs(vec![V3([-0.25, 1.5, -1e-20])]),
            vec![()],
        );
        s.reduce_positions();
        assert_eq!(s.to_fracs(), vec![V3([0.75, 0.5, 0.0])]);
    }

    #[test]
    fn source_round_trip() {
        let element = Element::from_symbol("C").unwrap();
        let s = Structure::new(
            Lattice::cubic(3.0),
            CoordsKind::Fracs(vec![V3([0.0; 3]), V3([0.5; 3])]),
            vec![Atom::new(element), Atom { element, spin: Some(V3([0.0, 0.0, 1.0])) }],
        );
        let copy = Structure::from_source(&s);
        assert_eq!(copy.elements(), vec![element; 2]);
        assert_eq!(copy.to_carts(), s.to_carts());
        assert_eq!(copy.metadata()[1].spin, Some(V3([0.0, 0.0, 1.0])));
    }
}
