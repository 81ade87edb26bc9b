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

//! Serialized form of a `Ddb`.
//!
//! ```json
//! {
//!   "natom": 2,
//!   "mass-normalized": false,
//!   "lattice": [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]],
//!   "blocks": [
//!     { "qpoint": [0.0, 0.0, 0.0], "entries": [[0, 0, 0, 1, -0.25, 0.0], [0, "E", 2, 1, 1.2, 0.0]] }
//!   ]
//! }
//! ```
//!
//! Each entry is `[dir1, pert1, dir2, pert2, re, im]`, where a perturbation is an atom
//! index, `"E"` for the electric field, or `"strain"`.

use crate::{Ddb, DdbError, Perturbation, SecondDerivative};

use phmodes_array_types::{V3, mat};
use phmodes_structure::Lattice;
use num_complex::Complex64;
use serde::{ser, de};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DdbCereal {
    pub natom: usize,
    #[serde(default)]
    pub mass_normalized: bool,
    #[serde(default)]
    pub lattice: Option<[[f64; 3]; 3]>,
    pub blocks: Vec<BlockCereal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlockCereal {
    pub qpoint: [f64; 3],
    pub entries: Vec<(usize, Perturbation, usize, Perturbation, f64, f64)>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PerturbationCereal {
    Atom(usize),
    Special(String),
}

impl ser::Serialize for Perturbation {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Perturbation::Atom(atom) => PerturbationCereal::Atom(atom),
            Perturbation::ElectricField => PerturbationCereal::Special("E".into()),
            Perturbation::Strain => PerturbationCereal::Special("strain".into()),
        }.serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Perturbation {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PerturbationCereal::deserialize(deserializer)? {
            PerturbationCereal::Atom(atom) => Ok(Perturbation::Atom(atom)),
            PerturbationCereal::Special(s) => match &s[..] {
                "E" => Ok(Perturbation::ElectricField),
                "strain" => Ok(Perturbation::Strain),
                _ => Err(de::Error::invalid_value(
                    de::Unexpected::Str(&s),
                    &"an atom index, \"E\", or \"strain\"",
                )),
            },
        }
    }
}

impl DdbCereal {
    pub fn to_ddb(&self) -> Result<Ddb, DdbError> {
        let mut ddb = Ddb::new(self.natom);
        ddb.set_mass_normalized(self.mass_normalized);
        if let Some(lattice) = self.lattice {
            ddb.set_lattice(Lattice::new(&mat::from_array(lattice)));
        }
        for block in &self.blocks {
            for &(dir1, pert1, dir2, pert2, re, im) in &block.entries {
                let value = Complex64::new(re, im);
                ddb.insert(V3(block.qpoint), SecondDerivative { dir1, pert1, dir2, pert2, value })?;
            }
        }
        Ok(ddb)
    }

    pub fn from_ddb(ddb: &Ddb) -> Self {
        let blocks = ddb.all_qpoints().into_iter().map(|qpoint| {
            let entries = ddb.block_for(&qpoint).map(|block| block.to_vec()).unwrap_or_default();
            BlockCereal {
                qpoint: qpoint.0,
                entries: entries.into_iter()
                    .map(|d| (d.dir1, d.pert1, d.dir2, d.pert2, d.value.re, d.value.im))
                    .collect(),
            }
        }).collect();

        DdbCereal {
            natom: ddb.natom(),
            mass_normalized: ddb.is_mass_normalized(),
            lattice: ddb.lattice().map(|lattice| lattice.matrix().0.map(|row| row.0)),
            blocks,
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn parse_perturbations() {
        let cereal: DdbCereal = serde_json::from_str(r#"{
            "natom": 2,
            "lattice": [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]],
            "blocks": [
                {"qpoint": [0.0, 0.0, 0.0], "entries": [
                    [0, 0, 0, 1, -0.25, 0.0],
                    [0, "E", 2, 1, 1.2, 0.5],
                    [1, "strain", 1, "E", 3.0, 0.0]
                ]}
            ]
        }"#).unwrap();
        assert!(!cereal.mass_normalized);

        let ddb = cereal.to_ddb().unwrap();
        let block = ddb.block_for(&V3([0.0; 3])).unwrap();
        assert_eq!(block.len(), 3);
        assert_eq!(block[1].pert1, Perturbation::ElectricField);
        assert_eq!(block[1].value, Complex64::new(1.2, 0.5));
        assert_eq!(block[2].pert1, Perturbation::Strain);
        assert_eq!(ddb.lattice().unwrap().volume(), 125.0);

        assert_eq!(DdbCereal::from_ddb(&ddb), cereal);
    }

    #[test]
    fn reject_unknown_perturbation() {
        let result = serde_json::from_str::<BlockCereal>(r#"{
            "qpoint": [0.0, 0.0, 0.0], "entries": [[0, "B", 0, 0, 1.0, 0.0]]
        }"#);
        assert!(result.is_err());
    }
}
