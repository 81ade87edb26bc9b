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

use phmodes_dynmat::units::BOHR_TO_ANGSTROM;
use crate::strain::StrainBounds;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Statistics {
    /// Bose-Einstein occupation, including zero-point motion.
    Quantum,
    /// The high temperature limit, `n + 1/2 → kT/ω`.
    Classical,
}

/// How the sign (and spread) of each sampled amplitude is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// Multiply by a standard normal deviate.
    Normal,
    /// Multiply by a uniformly random ±1.
    Uniform,
}

/// What to do with modes of imaginary frequency.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstablePolicy {
    Ignore,
    /// Treat the mode as though its frequency were `|ω|`.
    Absolute,
    /// Use this amplitude (in length·√amu) in place of the thermal one.
    Constant(f64),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// A fixed seed, so that runs are reproducible by default.
    None,
    Time,
    /// Seed from OS entropy.
    Random,
    User(u64),
}

pub(crate) const DEFAULT_SEED: u64 = 0x5eed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnsembleConfig {
    /// Kelvin.
    pub temperature: f64,
    pub statistics: Statistics,
    pub distribution: Distribution,
    pub instable: InstablePolicy,
    pub num_frames: usize,
    pub seed: SeedPolicy,
    #[serde(default)]
    pub strain: Option<StrainBounds>,
    /// Length unit of the structures, per Bohr.
    #[serde(default = "default_length_per_bohr")]
    pub length_per_bohr: f64,
}

fn default_length_per_bohr() -> f64 { BOHR_TO_ANGSTROM }

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            temperature: 300.0,
            statistics: Statistics::Quantum,
            distribution: Distribution::Normal,
            instable: InstablePolicy::Ignore,
            num_frames: 1,
            seed: SeedPolicy::None,
            strain: None,
            length_per_bohr: default_length_per_bohr(),
        }
    }
}
