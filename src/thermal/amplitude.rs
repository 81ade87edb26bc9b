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

use crate::config::Statistics;
use phmodes_dynmat::units::{AMU_TO_ELECTRON_MASS, kelvin_to_hartree};

/// Bose-Einstein occupation of a mode of frequency `ω` (Hartree) at temperature `kT` (Hartree).
pub fn bose_occupation(frequency: f64, kt: f64) -> f64 {
    match kt > 0.0 {
        true => 1.0 / f64::exp_m1(frequency / kt),
        false => 0.0,
    }
}

/// Standard deviation of the amplitude of a mode in thermal equilibrium.
///
/// `sqrt((n + 1/2) / (ω m_u))`, with `ω` in Hartree and `m_u` the atomic mass unit in
/// electron masses, gives Bohr·√amu; this is multiplied by `length_per_bohr`.
/// `frequency` must be positive.
pub fn thermal_amplitude(frequency: f64, temperature: f64, statistics: Statistics, length_per_bohr: f64) -> f64 {
    debug_assert!(frequency > 0.0);
    let kt = kelvin_to_hartree(temperature);
    let occupation = match statistics {
        Statistics::Quantum => bose_occupation(frequency, kt) + 0.5,
        Statistics::Classical => kt / frequency,
    };
    f64::sqrt(occupation / (frequency * AMU_TO_ELECTRON_MASS)) * length_per_bohr
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use phmodes_assert_close::assert_close;
    use phmodes_dynmat::units::{cm1_to_hartree, KELVIN_TO_HARTREE};

    #[test]
    fn zero_temperature() {
        let omega = cm1_to_hartree(500.0);
        assert_eq!(thermal_amplitude(omega, 0.0, Statistics::Classical, 1.0), 0.0);
        assert_close!(
            rel=1e-12,
            thermal_amplitude(omega, 0.0, Statistics::Quantum, 1.0),
            f64::sqrt(0.5 / (omega * AMU_TO_ELECTRON_MASS)),
        );
    }

    #[test]
    fn high_temperature_limit() {
        let omega = cm1_to_hartree(100.0);
        let temperature = 1000.0 * omega / KELVIN_TO_HARTREE;
        let quantum = thermal_amplitude(omega, temperature, Statistics::Quantum, 1.0);
        let classical = thermal_amplitude(omega, temperature, Statistics::Classical, 1.0);
        assert_close!(rel=1e-6, quantum, classical);
    }

    #[test]
    fn occupation() {
        assert_close!(rel=1e-12, bose_occupation(1.0, 1.0), 1.0 / (std::f64::consts::E - 1.0));
        assert_eq!(bose_occupation(1.0, 0.0), 0.0);
    }
}
