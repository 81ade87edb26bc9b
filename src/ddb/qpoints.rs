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

//! Qpoint-keyed tables with tolerance-based lookup.

use phmodes_array_types::V3;

/// Default per-component tolerance for qpoint equality.
pub const DEFAULT_QPT_TOL: f64 = 1e-6;

/// Qpoints are equal if every component agrees within `tol`.
pub fn qpoints_equal(a: &V3, b: &V3, tol: f64) -> bool
{ (0..3).all(|k| (a[k] - b[k]).abs() <= tol) }

/// Qpoints are equivalent if they differ by a reciprocal lattice vector (within `tol`).
pub fn qpoints_equivalent(a: &V3, b: &V3, tol: f64) -> bool {
    let diff = a - b;
    (0..3).all(|k| (diff[k] - diff[k].round()).abs() <= tol)
}

/// Insertion-ordered map from qpoint to `T`.
///
/// Keys are never compared exactly; two qpoints are the same key if
/// `qpoints_equal` says so.
#[derive(Debug, Clone)]
pub struct QptMap<T> {
    tol: f64,
    entries: Vec<(V3, T)>,
}

impl<T> Default for QptMap<T> {
    fn default() -> Self { QptMap::new(DEFAULT_QPT_TOL) }
}

impl<T> QptMap<T> {
    pub fn new(tol: f64) -> Self
    { QptMap { tol, entries: vec![] } }

    pub fn tol(&self) -> f64 { self.tol }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Index of the stored qpoint equal to `qpoint`.
    pub fn position(&self, qpoint: &V3) -> Option<usize>
    { self.entries.iter().position(|(q, _)| qpoints_equal(q, qpoint, self.tol)) }

    /// Index of the stored qpoint equivalent to `qpoint` modulo reciprocal lattice vectors.
    ///
    /// An exact (within tolerance) match is preferred over an image.
    pub fn position_mod_g(&self, qpoint: &V3) -> Option<usize> {
        self.position(qpoint).or_else(|| {
            self.entries.iter().position(|(q, _)| qpoints_equivalent(q, qpoint, self.tol))
        })
    }

    pub fn get(&self, qpoint: &V3) -> Option<&T>
    { self.position(qpoint).map(|i| &self.entries[i].1) }

    pub fn get_index(&self, index: usize) -> Option<(&V3, &T)>
    { self.entries.get(index).map(|(q, x)| (q, x)) }

    /// Insert, replacing the value of an equal qpoint if there is one.
    ///
    /// The originally stored qpoint is kept as the key.
    pub fn insert(&mut self, qpoint: V3, value: T) -> Option<T> {
        match self.position(&qpoint) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((qpoint, value));
                None
            },
        }
    }

    pub fn entry_or_insert_with<F>(&mut self, qpoint: V3, f: F) -> &mut T
    where F: FnOnce() -> T,
    {
        let index = match self.position(&qpoint) {
            Some(index) => index,
            None => {
                self.entries.push((qpoint, f()));
                self.entries.len() - 1
            },
        };
        &mut self.entries[index].1
    }

    pub fn qpoints(&self) -> Vec<V3>
    { self.entries.iter().map(|&(q, _)| q).collect() }

    pub fn iter(&self) -> impl Iterator<Item=(&V3, &T)> + '_
    { self.entries.iter().map(|(q, x)| (q, x)) }

    pub fn values(&self) -> impl Iterator<Item=&T> + '_
    { self.entries.iter().map(|(_, x)| x) }
}

impl<T> IntoIterator for QptMap<T> {
    type Item = (V3, T);
    type IntoIter = std::vec::IntoIter<(V3, T)>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn tolerance() {
        let mut map = QptMap::new(1e-6);
        assert_eq!(map.insert(V3([0.5, 0.0, 0.0]), 1), None);
        assert_eq!(map.insert(V3([0.5 + 1e-7, 0.0, -1e-7]), 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&V3([0.5, 0.0, 0.0])), Some(&2));
        assert_eq!(map.get(&V3([0.5 + 1e-5, 0.0, 0.0])), None);

        // the first key inserted is the one kept
        assert_eq!(map.qpoints(), vec![V3([0.5, 0.0, 0.0])]);
    }

    #[test]
    fn equivalence() {
        let mut map = QptMap::default();
        map.insert(V3([0.5, 0.0, 0.75]), ());
        assert_eq!(map.position(&V3([-0.5, 0.0, -0.25])), None);
        assert_eq!(map.position_mod_g(&V3([-0.5, 0.0, -0.25])), Some(0));
        assert_eq!(map.position_mod_g(&V3([-0.5, 0.0, 0.25])), None);
    }
}
