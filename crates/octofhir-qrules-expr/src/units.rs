//! Static unit conversion table
//!
//! Factors are kept as the exact decimal literals that appear in generated
//! expressions, and matched by string equality in both directions. This
//! means `"1.0"` and `"1"` are distinct keys; the brittleness is deliberate,
//! preserved for behavior parity with the documents already in circulation.

/// One tabulated conversion out of a source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Destination UCUM unit
    pub unit: &'static str,
    /// Multiplication factor as a decimal literal
    pub factor: &'static str,
}

/// Source UCUM unit → ordered conversions
pub static UNIT_CONVERSION: &[(&str, &[Conversion])] = &[
    (
        "kg",
        &[Conversion {
            unit: "[lb_av]",
            factor: "2.20462",
        }],
    ),
    (
        "[lb_av]",
        &[Conversion {
            unit: "kg",
            factor: "0.453592",
        }],
    ),
    (
        "cm",
        &[Conversion {
            unit: "[in_i]",
            factor: "0.393701",
        }],
    ),
    (
        "[in_i]",
        &[Conversion {
            unit: "cm",
            factor: "2.54",
        }],
    ),
];

/// The tabulated conversions out of a source unit, if any
pub fn conversions_for(source: &str) -> Option<&'static [Conversion]> {
    UNIT_CONVERSION
        .iter()
        .find(|(unit, _)| *unit == source)
        .map(|(_, conversions)| *conversions)
}

/// Resolve a source unit and factor literal into the destination unit.
/// The factor is compared as a string, not numerically.
pub fn destination_for_factor(source: &str, factor: &str) -> Option<&'static str> {
    conversions_for(source)?
        .iter()
        .find(|conversion| conversion.factor == factor)
        .map(|conversion| conversion.unit)
}

/// The factor literal converting `source` into `destination`. `None` when
/// the pair is untabulated; callers must check unit provenance before
/// relying on the result.
pub fn factor_between(source: &str, destination: &str) -> Option<&'static str> {
    conversions_for(source)?
        .iter()
        .find(|conversion| conversion.unit == destination)
        .map(|conversion| conversion.factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_tabulated_factors() {
        assert_eq!(destination_for_factor("kg", "2.20462"), Some("[lb_av]"));
        assert_eq!(destination_for_factor("[in_i]", "2.54"), Some("cm"));
    }

    #[test]
    fn factor_match_is_string_exact() {
        assert_eq!(destination_for_factor("[in_i]", "2.540"), None);
        assert_eq!(destination_for_factor("[in_i]", "2.54"), Some("cm"));
    }

    #[test]
    fn untabulated_pairs_fail() {
        assert_eq!(destination_for_factor("kg", "3"), None);
        assert_eq!(destination_for_factor("mmHg", "2.54"), None);
        assert_eq!(factor_between("kg", "cm"), None);
    }

    #[test]
    fn factor_between_round_trips_the_table() {
        assert_eq!(factor_between("kg", "[lb_av]"), Some("2.20462"));
        assert_eq!(factor_between("cm", "[in_i]"), Some("0.393701"));
    }
}
