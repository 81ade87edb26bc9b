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

use std::collections::HashMap;
use std::fmt;
use std::str;

/// Represents a specific atomic number.
///
/// Only the elements in this module's table are supported; this enables
/// methods to return `&'static str` and a default mass.
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Element(u16);

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unable to parse {kind}: {text:?}")]
pub struct ElementParseError {
    text: String,
    kind: &'static str, // "element", "element symbol"
}

impl ElementParseError {
    fn new(kind: &'static str, s: &str) -> Self
    { ElementParseError { text: s.to_string(), kind } }
}

impl Element {
    pub fn from_symbol(s: &str) -> Result<Self, ElementParseError> {
        let &n = SYMBOL_TO_NUMBER.get(s).ok_or_else(|| ElementParseError::new("element symbol", s))?;
        Ok(Element(n))
    }

    pub fn symbol(&self) -> &'static str
    { NUMBER_TO_INFO[&self.0].symbol }

    pub fn name(&self) -> &'static str
    { NUMBER_TO_INFO[&self.0].name }

    /// Standard atomic weight in amu.
    ///
    /// For elements without stable isotopes this is the mass number of the
    /// longest-lived isotope.
    pub fn default_mass(&self) -> f64
    { NUMBER_TO_INFO[&self.0].mass }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Display::fmt(self.symbol(), f) }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.alternate() {
            false => fmt::Debug::fmt(self.symbol(), f),
            true  => fmt::Debug::fmt(self.name(), f),
        }
    }
}

/// Accepts symbols and (case-insensitive) names.
impl str::FromStr for Element {
    type Err = ElementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(&n) = SYMBOL_TO_NUMBER.get(s) {
            return Ok(Element(n));
        }
        let &n = LOWER_NAME_TO_NUMBER.get(&s.to_lowercase()[..])
            .ok_or_else(|| ElementParseError::new("element", s))?;
        Ok(Element(n))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Serialize, Deserialize, ser, de};

    impl Serialize for Element {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.symbol().serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Element {
        fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(|_| {
                de::Error::invalid_value(de::Unexpected::Str(&raw), &"an element name or symbol")
            })
        }
    }
}

struct Info {
    symbol: &'static str,
    name: &'static str,
    mass: f64,
}

const TABLE: &[(u16, &str, &str, f64)] = &[
    (1,  "H",  "Hydrogen",      1.008),
    (2,  "He", "Helium",        4.002602),
    (3,  "Li", "Lithium",       6.94),
    (4,  "Be", "Beryllium",     9.0121831),
    (5,  "B",  "Boron",         10.81),
    (6,  "C",  "Carbon",        12.011),
    (7,  "N",  "Nitrogen",      14.007),
    (8,  "O",  "Oxygen",        15.999),
    (9,  "F",  "Fluorine",      18.998403163),
    (10, "Ne", "Neon",          20.1797),
    (11, "Na", "Sodium",        22.98976928),
    (12, "Mg", "Magnesium",     24.305),
    (13, "Al", "Aluminum",      26.9815385),
    (14, "Si", "Silicon",       28.085),
    (15, "P",  "Phosphorus",    30.973761998),
    (16, "S",  "Sulfur",        32.06),
    (17, "Cl", "Chlorine",      35.45),
    (18, "Ar", "Argon",         39.948),
    (19, "K",  "Potassium",     39.0983),
    (20, "Ca", "Calcium",       40.078),
    (21, "Sc", "Scandium",      44.955908),
    (22, "Ti", "Titanium",      47.867),
    (23, "V",  "Vanadium",      50.9415),
    (24, "Cr", "Chromium",      51.9961),
    (25, "Mn", "Manganese",     54.938044),
    (26, "Fe", "Iron",          55.845),
    (27, "Co", "Cobalt",        58.933194),
    (28, "Ni", "Nickel",        58.6934),
    (29, "Cu", "Copper",        63.546),
    (30, "Zn", "Zinc",          65.38),
    (31, "Ga", "Gallium",       69.723),
    (32, "Ge", "Germanium",     72.630),
    (33, "As", "Arsenic",       74.921595),
    (34, "Se", "Selenium",      78.971),
    (35, "Br", "Bromine",       79.904),
    (36, "Kr", "Krypton",       83.798),
    (37, "Rb", "Rubidium",      85.4678),
    (38, "Sr", "Strontium",     87.62),
    (39, "Y",  "Yttrium",       88.90584),
    (40, "Zr", "Zirconium",     91.224),
    (41, "Nb", "Niobium",       92.90637),
    (42, "Mo", "Molybdenum",    95.95),
    (43, "Tc", "Technetium",    98.0),
    (44, "Ru", "Ruthenium",     101.07),
    (45, "Rh", "Rhodium",       102.90550),
    (46, "Pd", "Palladium",     106.42),
    (47, "Ag", "Silver",        107.8682),
    (48, "Cd", "Cadmium",       112.414),
    (49, "In", "Indium",        114.818),
    (50, "Sn", "Tin",           118.710),
    (51, "Sb", "Antimony",      121.760),
    (52, "Te", "Tellurium",     127.60),
    (53, "I",  "Iodine",        126.90447),
    (54, "Xe", "Xenon",         131.293),
    (55, "Cs", "Caesium",       132.90545196),
    (56, "Ba", "Barium",        137.327),
    (57, "La", "Lanthanum",     138.90547),
    (58, "Ce", "Cerium",        140.116),
    (59, "Pr", "Praseodymium",  140.90766),
    (60, "Nd", "Neodymium",     144.242),
    (61, "Pm", "Promethium",    145.0),
    (62, "Sm", "Samarium",      150.36),
    (63, "Eu", "Europium",      151.964),
    (64, "Gd", "Gadolinium",    157.25),
    (65, "Tb", "Terbium",       158.92535),
    (66, "Dy", "Dysprosium",    162.500),
    (67, "Ho", "Holmium",       164.93033),
    (68, "Er", "Erbium",        167.259),
    (69, "Tm", "Thulium",       168.93422),
    (70, "Yb", "Ytterbium",     173.045),
    (71, "Lu", "Lutetium",      174.9668),
    (72, "Hf", "Hafnium",       178.49),
    (73, "Ta", "Tantalum",      180.94788),
    (74, "W",  "Tungsten",      183.84),
    (75, "Re", "Rhenium",       186.207),
    (76, "Os", "Osmium",        190.23),
    (77, "Ir", "Iridium",       192.217),
    (78, "Pt", "Platinum",      195.084),
    (79, "Au", "Gold",          196.966569),
    (80, "Hg", "Mercury",       200.592),
    (81, "Tl", "Thallium",      204.38),
    (82, "Pb", "Lead",          207.2),
    (83, "Bi", "Bismuth",       208.98040),
    (84, "Po", "Polonium",      209.0),
    (85, "At", "Astatine",      210.0),
    (86, "Rn", "Radon",         222.0),
    (87, "Fr", "Francium",      223.0),
    (88, "Ra", "Radium",        226.0),
    (89, "Ac", "Actinium",      227.0),
    (90, "Th", "Thorium",       232.0377),
    (91, "Pa", "Protactinium",  231.03588),
    (92, "U",  "Uranium",       238.02891),
];

lazy_static! {
    static ref NUMBER_TO_INFO: HashMap<u16, Info> = {
        TABLE.iter().map(|&(n, symbol, name, mass)| (n, Info { symbol, name, mass })).collect()
    };

    static ref SYMBOL_TO_NUMBER: HashMap<&'static str, u16> = {
        TABLE.iter().map(|&(n, symbol, _, _)| (symbol, n)).collect()
    };

    static ref LOWER_NAME_TO_NUMBER: HashMap<String, u16> = {
        TABLE.iter().map(|&(n, _, name, _)| (name.to_lowercase(), n)).collect()
    };
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let carbon = Element::from_symbol("C").unwrap();
        assert_eq!(carbon.name(), "Carbon");
        assert_eq!("carbon".parse::<Element>().unwrap(), carbon);
        assert_eq!("Carbon".parse::<Element>().unwrap(), carbon);
        assert!(Element::from_symbol("c").is_err());
        assert!("Xx".parse::<Element>().is_err());
    }

    #[test]
    fn format() {
        let si = Element::from_symbol("Si").unwrap();
        assert_eq!(format!("{}", si), "Si");
        assert_eq!(format!("{:?}", si), "\"Si\"");
        assert_eq!(format!("{:#?}", si), "\"Silicon\"");
        assert_eq!(si.default_mass(), 28.085);
    }
}
