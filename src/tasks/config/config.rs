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

//! Settings read from the `-c/--config` YAML file.
//!
//! Every key is kebab-case.  A minimal config is
//!
//! ```yaml
//! supercell: [4, 4, 1]
//! temperature: 300
//! frames: 20
//! ```

pub use phmodes_dynmat::AsrMode;
pub use phmodes_frozen::{Normalization, ProjectionOptions};
pub use phmodes_thermal::{Statistics, Distribution, InstablePolicy, SeedPolicy, StrainBounds};

use std::collections::BTreeMap;

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Periods of the supercell along each unit cell vector.
    pub supercell: [u32; 3],

    /// Kelvin.
    #[serde(default = "_settings__temperature")]
    pub temperature: f64,

    #[serde(default = "_settings__statistics")]
    pub statistics: Statistics,

    #[serde(default = "_settings__distribution")]
    pub distribution: Distribution,

    /// What to do with modes of imaginary frequency.
    #[serde(default = "_settings__instable")]
    pub instable: InstablePolicy,

    /// Number of frames to generate.
    #[serde(default = "_settings__frames")]
    pub frames: usize,

    #[serde(default = "_settings__seed")]
    pub seed: SeedPolicy,

    /// `None` disables strain.
    #[serde(default)]
    pub strain: Option<StrainBounds>,

    #[serde(default)]
    pub asr: AsrMode,

    /// Masses (amu) by element symbol, replacing the standard atomic weights.
    #[serde(default)]
    pub masses: BTreeMap<String, f64>,

    /// How `phmodes-decompose` projects frames onto modes.
    #[serde(default)]
    pub projection: ProjectionOptions,

    /// Length unit of the input and output structures.
    #[serde(default)]
    pub length_unit: LengthUnit,
}
fn _settings__temperature() -> f64 { 300.0 }
fn _settings__statistics() -> Statistics { Statistics::Quantum }
fn _settings__distribution() -> Distribution { Distribution::Normal }
fn _settings__instable() -> InstablePolicy { InstablePolicy::Ignore }
fn _settings__frames() -> usize { 1 }
fn _settings__seed() -> SeedPolicy { SeedPolicy::None }

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LengthUnit {
    Angstrom,
    Bohr,
}

impl Default for LengthUnit {
    fn default() -> Self { LengthUnit::Angstrom }
}

impl LengthUnit {
    pub fn per_bohr(self) -> f64 {
        match self {
            LengthUnit::Angstrom => phmodes_dynmat::units::BOHR_TO_ANGSTROM,
            LengthUnit::Bohr => 1.0,
        }
    }
}

// --------------------------------------------------------

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::YamlRead;

    #[test]
    fn defaults() {
        let settings = Settings::from_str("supercell: [2, 2, 1]").unwrap();
        assert_eq!(settings.supercell, [2, 2, 1]);
        assert_eq!(settings.temperature, 300.0);
        assert_eq!(settings.statistics, Statistics::Quantum);
        assert_eq!(settings.instable, InstablePolicy::Ignore);
        assert_eq!(settings.frames, 1);
        assert_eq!(settings.seed, SeedPolicy::None);
        assert_eq!(settings.strain, None);
        assert_eq!(settings.asr, AsrMode::default());
        assert_eq!(settings.projection, ProjectionOptions::default());
        assert_eq!(settings.length_unit, LengthUnit::Angstrom);
        assert!(crate::from_empty_mapping::<Settings>().is_err());
    }

    #[test]
    fn full() {
        let settings = Settings::from_str("
            supercell: [4, 4, 4]
            temperature: 77
            statistics: classical
            distribution: uniform
            instable: {constant: 0.1}
            frames: 12
            seed: {user: 42}
            strain:
              isotropic: 0.01
              shear: 0.02
              plane: [0, 2]
              rotate: true
            asr: symmetric
            masses: {Si: 28.0}
            projection:
              policy: per-qpoint
              use-modulus: true
            length-unit: bohr
        ").unwrap();
        assert_eq!(settings.temperature, 77.0);
        assert_eq!(settings.statistics, Statistics::Classical);
        assert_eq!(settings.distribution, Distribution::Uniform);
        assert_eq!(settings.instable, InstablePolicy::Constant(0.1));
        assert_eq!(settings.seed, SeedPolicy::User(42));
        assert_eq!(settings.strain.as_ref().map(|s| s.plane), Some(Some([0, 2])));
        assert_eq!(settings.asr, AsrMode::Symmetric);
        assert_eq!(settings.masses["Si"], 28.0);
        assert_eq!(settings.projection.policy, Normalization::PerQpoint);
        assert!(settings.projection.use_modulus);
        assert_eq!(settings.length_unit.per_bohr(), 1.0);
    }
}
