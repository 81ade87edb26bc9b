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

//! JSON formats read and written by the phmodes binaries.
//!
//! The input of both binaries is
//!
//! ```json
//! {
//!   "unit-cell": {
//!     "lattice": [[5.43, 0, 0], [0, 5.43, 0], [0, 0, 5.43]],
//!     "atoms": [{"element": "Si", "frac": [0, 0, 0]}, {"element": "Si", "frac": [0.25, 0.25, 0.25]}]
//!   },
//!   "ddb": {"natom": 2, "mass-normalized": false, "blocks": [...]}
//! }
//! ```
//!
//! (see `phmodes_ddb::cereal` for the blocks).

use crate::FailResult;
use phmodes_array_types::V3;
use phmodes_structure::{Atom, AtomStructure, CoordsKind, Element, Lattice};
use phmodes_ddb::cereal::DdbCereal;
use phmodes_thermal::{FrameRecord, FrameDecomposition, Trajectory};
use failure::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Input {
    pub unit_cell: UnitCellCereal,
    pub ddb: DdbCereal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitCellCereal {
    pub lattice: [[f64; 3]; 3],
    pub atoms: Vec<AtomCereal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AtomCereal {
    pub element: String,
    pub frac: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin: Option<[f64; 3]>,
}

impl UnitCellCereal {
    pub fn to_structure(&self) -> FailResult<AtomStructure> {
        let atoms = {
            self.atoms.iter().enumerate()
                .map(|(i, atom)| -> FailResult<Atom> {
                    let element: Element = {
                        atom.element.parse::<Element>()
                            .with_context(|e| format!("bad element for atom {}: {}", i, e))?
                    };
                    Ok(Atom { element, spin: atom.spin.map(V3) })
                })
                .collect::<FailResult<Vec<_>>>()?
        };
        let fracs = self.atoms.iter().map(|atom| V3(atom.frac)).collect();
        Ok(AtomStructure::new(Lattice::from(&self.lattice), CoordsKind::Fracs(fracs), atoms))
    }

    pub fn from_structure(structure: &AtomStructure) -> Self {
        let atoms = {
            structure.metadata().iter().zip(structure.to_fracs())
                .map(|(atom, frac)| AtomCereal {
                    element: atom.element.symbol().to_string(),
                    frac: frac.0,
                    spin: atom.spin.map(|v| v.0),
                })
                .collect()
        };
        UnitCellCereal { lattice: lattice_rows(structure.lattice()), atoms }
    }
}

/// One frame of a trajectory, in cartesian coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameCereal {
    pub lattice: [[f64; 3]; 3],
    pub carts: Vec<[f64; 3]>,
    pub elements: Vec<String>,
    /// What was sampled to make this frame; absent for frames from elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<FrameRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrajectoryCereal {
    pub frames: Vec<FrameCereal>,
}

impl TrajectoryCereal {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let frames = {
            trajectory.frames.iter().zip(&trajectory.records)
                .map(|(frame, record)| FrameCereal {
                    lattice: lattice_rows(frame.lattice()),
                    carts: frame.to_carts().into_iter().map(|v| v.0).collect(),
                    elements: frame.elements().iter().map(|e| e.symbol().to_string()).collect(),
                    record: Some(record.clone()),
                })
                .collect()
        };
        TrajectoryCereal { frames }
    }

    pub fn to_structures(&self) -> FailResult<Vec<AtomStructure>> {
        self.frames.iter().enumerate()
            .map(|(i, frame)| -> FailResult<AtomStructure> {
                if frame.carts.len() != frame.elements.len() {
                    bail!(
                        "frame {} has {} positions but {} elements",
                        i, frame.carts.len(), frame.elements.len(),
                    );
                }
                let atoms = {
                    frame.elements.iter()
                        .map(|s| s.parse().map(Atom::new))
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|e| format!("in frame {}: {}", i, e))?
                };
                let carts = frame.carts.iter().cloned().map(V3).collect();
                Ok(AtomStructure::new(Lattice::from(&frame.lattice), CoordsKind::Carts(carts), atoms))
            })
            .collect()
    }
}

/// Output of `phmodes-decompose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecompositionCereal {
    pub frames: Vec<FrameDecomposition>,
}

fn lattice_rows(lattice: &Lattice) -> [[f64; 3]; 3]
{ lattice.matrix().0.map(|row| row.0) }

pub fn read_json<T: DeserializeOwned>(path: &Path) -> FailResult<T> {
    let file = File::open(path).with_context(|e| format!("could not open {}: {}", path.display(), e))?;
    let value = {
        serde_json::from_reader(BufReader::new(file))
            .with_context(|e| format!("could not read {}: {}", path.display(), e))?
    };
    Ok(value)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> FailResult<()> {
    let file = File::create(path).with_context(|e| format!("could not create {}: {}", path.display(), e))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|e| format!("could not write {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;

    fn input_json() -> &'static str {
        r#"{
            "unit-cell": {
                "lattice": [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]],
                "atoms": [
                    {"element": "C", "frac": [0.0, 0.0, 0.0]},
                    {"element": "N", "frac": [0.5, 0.5, 0.5], "spin": [0.0, 0.0, 1.0]}
                ]
            },
            "ddb": {
                "natom": 2,
                "blocks": [{"qpoint": [0.0, 0.0, 0.0], "entries": [[0, 0, 0, 0, 1.0, 0.0], [0, "E", 2, 1, 0.5, 0.0]]}]
            }
        }"#
    }

    #[test]
    fn input() {
        let input: Input = serde_json::from_str(input_json()).unwrap();
        let structure = input.unit_cell.to_structure().unwrap();
        assert_eq!(structure.num_atoms(), 2);
        assert_eq!(structure.metadata()[1].element.symbol(), "N");
        assert_eq!(structure.metadata()[1].spin, Some(V3([0.0, 0.0, 1.0])));
        assert_close!(structure.to_carts()[1], V3([1.5, 1.5, 2.0]));
        assert!(!input.ddb.mass_normalized);
        assert_eq!(input.ddb.to_ddb().unwrap().natom(), 2);

        assert_eq!(UnitCellCereal::from_structure(&structure), input.unit_cell);
    }

    #[test]
    fn bad_element() {
        let mut input: Input = serde_json::from_str(input_json()).unwrap();
        input.unit_cell.atoms[0].element = "Xy".into();
        assert!(input.unit_cell.to_structure().is_err());
    }

    #[test]
    fn frames_without_records() {
        let json = r#"{"frames": [
            {"lattice": [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]], "carts": [[0.1, 0.0, 0.0]], "elements": ["Si"]}
        ]}"#;
        let trajectory: TrajectoryCereal = serde_json::from_str(json).unwrap();
        assert_eq!(trajectory.frames[0].record, None);
        let structures = trajectory.to_structures().unwrap();
        assert_close!(structures[0].to_fracs()[0], V3([0.05, 0.0, 0.0]));

        let mut broken = trajectory.clone();
        broken.frames[0].elements.push("Si".into());
        assert!(broken.to_structures().is_err());
    }
}
