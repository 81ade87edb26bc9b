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

//! All of the post-processing that occurs after deserializing a config.

use crate::config::*;
use phmodes_structure::Element;
use phmodes_thermal::EnsembleConfig;
use failure::Error;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Settings that passed `Settings::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(Settings);

impl Deref for ValidatedSettings {
    type Target = Settings;
    fn deref(&self) -> &Settings { &self.0 }
}

impl Settings {
    pub fn validate(self) -> Result<ValidatedSettings, Error> {
        if self.supercell.iter().any(|&n| n == 0) {
            bail!("supercell periods must be positive (got {:?})", self.supercell);
        }
        if !(self.temperature >= 0.0 && self.temperature.is_finite()) {
            bail!("temperature must be finite and non-negative (got {})", self.temperature);
        }
        if self.frames == 0 {
            bail!("`frames` must be at least 1");
        }
        if let InstablePolicy::Constant(amplitude) = self.instable {
            if !amplitude.is_finite() {
                bail!("instable amplitude must be finite (got {})", amplitude);
            }
        }
        if let Some(strain) = &self.strain {
            strain.validate().map_err(|e| format_err!("in `strain`: {}", e))?;
        }
        for (symbol, &mass) in &self.masses {
            symbol.parse::<Element>().map_err(|e| format_err!("in `masses`: {}", e))?;
            if !(mass > 0.0 && mass.is_finite()) {
                bail!("mass of {} must be positive (got {})", symbol, mass);
            }
        }
        Ok(ValidatedSettings(self))
    }
}

impl ValidatedSettings {
    pub fn ensemble_config(&self) -> EnsembleConfig {
        EnsembleConfig {
            temperature: self.temperature,
            statistics: self.statistics,
            distribution: self.distribution,
            instable: self.instable,
            num_frames: self.frames,
            seed: self.seed,
            strain: self.strain.clone(),
            length_per_bohr: self.length_unit.per_bohr(),
        }
    }

    /// Mass of each element in amu, with overrides from the config.
    pub fn mass_of(&self, element: Element) -> f64 {
        self.mass_overrides().get(&element).cloned()
            .unwrap_or_else(|| element.default_mass())
    }

    fn mass_overrides(&self) -> BTreeMap<Element, f64> {
        // validated, so every symbol parses
        self.masses.iter()
            .filter_map(|(symbol, &mass)| Some((symbol.parse().ok()?, mass)))
            .collect()
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::YamlRead;

    fn settings(yaml: &str) -> Settings
    { Settings::from_str(yaml).unwrap() }

    #[test]
    fn rejects() {
        assert!(settings("supercell: [2, 0, 1]").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], temperature: -1}").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], frames: 0}").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], strain: {shear: -0.1}}").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], strain: {axis: 3}}").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], masses: {Qq: 1.0}}").validate().is_err());
        assert!(settings("{supercell: [2, 2, 1], masses: {C: 0.0}}").validate().is_err());
    }

    #[test]
    fn masses() {
        let settings = settings("{supercell: [1, 1, 1], masses: {C: 13.0}}").validate().unwrap();
        let carbon: Element = "C".parse().unwrap();
        let silicon: Element = "Si".parse().unwrap();
        assert_eq!(settings.mass_of(carbon), 13.0);
        assert_eq!(settings.mass_of(silicon), silicon.default_mass());
    }

    #[test]
    fn ensemble_config() {
        let settings = settings("{supercell: [1, 1, 1], frames: 7, length-unit: bohr}").validate().unwrap();
        let config = settings.ensemble_config();
        assert_eq!(config.num_frames, 7);
        assert_eq!(config.length_per_bohr, 1.0);
        assert_eq!(config.temperature, 300.0);
    }
}
