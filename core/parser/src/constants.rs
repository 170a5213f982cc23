//! FILENAME: core/parser/src/constants.rs
//! PURPOSE: Read-only catalog of physical constants usable in formulas.
//! CONTEXT: A constant is written as the marker `#` followed by its symbol,
//! e.g. `#c` or `#eps_0`. Symbols may use letters, digits and the special
//! characters listed in `SYMBOL_SPECIALS`. The display name is a lookup key;
//! turning it into user-facing text is the host's localization concern.

use serde::Serialize;

/// Character that introduces a constant symbol in formula text.
pub const CONSTANT_MARKER: char = '#';

/// Non-alphanumeric characters allowed inside a constant symbol.
/// `_` marks a subscript, `~` an overscript.
pub const SYMBOL_SPECIALS: &[char] = &['_', '~'];

/// One entry of the constant catalog (SI units).
#[derive(Debug, PartialEq, Serialize)]
pub struct PhysicalConstant {
    pub display_name_key: &'static str,
    pub symbol: &'static str,
    pub value: f64,
}

pub static CONSTANTS: &[PhysicalConstant] = &[
    PhysicalConstant {
        display_name_key: "constant.elementary_charge",
        symbol: "e",
        value: 1.602_176_634e-19,
    },
    PhysicalConstant {
        display_name_key: "constant.vacuum_permittivity",
        symbol: "eps_0",
        value: 8.854_187_812_8e-12,
    },
    PhysicalConstant {
        display_name_key: "constant.speed_of_light",
        symbol: "c",
        value: 299_792_458.0,
    },
    PhysicalConstant {
        display_name_key: "constant.vacuum_permeability",
        symbol: "mu_0",
        value: 1.256_637_062_12e-6,
    },
    PhysicalConstant {
        display_name_key: "constant.gravitational_acceleration",
        symbol: "g",
        value: 9.806_65,
    },
    PhysicalConstant {
        display_name_key: "constant.planck",
        symbol: "h",
        value: 6.626_070_15e-34,
    },
    PhysicalConstant {
        display_name_key: "constant.electron_mass",
        symbol: "m_e",
        value: 9.109_383_701_5e-31,
    },
    PhysicalConstant {
        display_name_key: "constant.gravitational_constant",
        symbol: "G",
        value: 6.674_30e-11,
    },
    PhysicalConstant {
        display_name_key: "constant.compton_wavelength",
        symbol: "lambda_C",
        value: 2.426_310_238_67e-12,
    },
];

/// Returns true if `ch` may appear in a constant symbol.
pub fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || SYMBOL_SPECIALS.contains(&ch)
}

/// Looks up a constant by symbol (without the marker).
///
/// An exact match wins, so `g` and `G` stay distinct. Otherwise the symbol is
/// compared case-insensitively and accepted only if exactly one entry matches.
pub fn lookup_constant(symbol: &str) -> Option<&'static PhysicalConstant> {
    if let Some(exact) = CONSTANTS.iter().find(|c| c.symbol == symbol) {
        return Some(exact);
    }

    let mut matches = CONSTANTS
        .iter()
        .filter(|c| c.symbol.eq_ignore_ascii_case(symbol));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}
