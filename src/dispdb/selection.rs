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

use phmodes_array_types::V3;
use phmodes_ddb::{QptMap, DEFAULT_QPT_TOL};
use std::collections::BTreeMap;

/// One mode of one qpoint, with the amount of it present in some structure.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    /// Index into the modes of the qpoint, in ascending order of frequency.
    pub index: usize,
    /// In length·√amu; `amplitude × eigendisplacement` is a length.
    pub amplitude: f64,
    /// Signed frequency in Hartree (negative means imaginary).
    pub energy: f64,
}

impl Mode {
    pub fn new(index: usize, amplitude: f64, energy: f64) -> Self
    { Mode { index, amplitude, energy } }
}

/// Which modes are frozen into a structure, by qpoint.
///
/// Modes at each qpoint are kept ordered by index.
#[derive(Debug, Clone, Default)]
#[derive(Serialize, Deserialize)]
#[serde(from = "SelectionCereal", into = "SelectionCereal")]
pub struct CondensedSelection {
    qpoints: QptMap<BTreeMap<usize, Mode>>,
}

impl CondensedSelection {
    pub fn new() -> Self
    { CondensedSelection { qpoints: QptMap::new(DEFAULT_QPT_TOL) } }

    /// Add a mode, replacing any mode with the same index at the same qpoint.
    pub fn insert(&mut self, qpoint: V3, mode: Mode) {
        self.qpoints.entry_or_insert_with(qpoint, BTreeMap::new).insert(mode.index, mode);
    }

    pub fn get(&self, qpoint: &V3, index: usize) -> Option<&Mode>
    { self.qpoints.get(qpoint).and_then(|modes| modes.get(&index)) }

    /// Every `(qpoint, mode)`, qpoints in insertion order and modes by index.
    pub fn iter(&self) -> impl Iterator<Item=(V3, &Mode)> + '_ {
        self.qpoints.iter()
            .flat_map(|(&qpoint, modes)| modes.values().map(move |mode| (qpoint, mode)))
    }

    pub fn modes_at(&self, qpoint: &V3) -> impl Iterator<Item=&Mode> + '_
    { self.qpoints.get(qpoint).into_iter().flat_map(|modes| modes.values()) }

    pub fn num_modes(&self) -> usize
    { self.qpoints.values().map(|modes| modes.len()).sum() }

    pub fn num_qpoints(&self) -> usize
    { self.qpoints.len() }

    pub fn is_empty(&self) -> bool
    { self.num_modes() == 0 }

    pub fn qpoints(&self) -> Vec<V3>
    { self.qpoints.qpoints() }

}

impl std::iter::FromIterator<(V3, Mode)> for CondensedSelection {
    fn from_iter<I: IntoIterator<Item=(V3, Mode)>>(iter: I) -> Self {
        let mut out = CondensedSelection::new();
        for (qpoint, mode) in iter {
            out.insert(qpoint, mode);
        }
        out
    }
}

#[derive(Serialize, Deserialize)]
struct SelectionCereal(Vec<QpointCereal>);

#[derive(Serialize, Deserialize)]
struct QpointCereal {
    qpoint: V3,
    modes: Vec<Mode>,
}

impl From<SelectionCereal> for CondensedSelection {
    fn from(SelectionCereal(qpoints): SelectionCereal) -> Self {
        qpoints.into_iter()
            .flat_map(|QpointCereal { qpoint, modes }| modes.into_iter().map(move |mode| (qpoint, mode)))
            .collect()
    }
}

impl From<CondensedSelection> for SelectionCereal {
    fn from(selection: CondensedSelection) -> Self {
        SelectionCereal({
            selection.qpoints.iter().map(|(&qpoint, modes)| QpointCereal {
                qpoint,
                modes: modes.values().cloned().collect(),
            }).collect()
        })
    }
}
