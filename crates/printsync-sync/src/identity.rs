// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manufacturer and model extraction from a probed printer's name and
// sysDescr.

use printsync_core::classify::{MODEL_NOISE, match_manufacturer};

/// Used when no manufacturer keyword matches, and as the model of last resort.
pub const UNKNOWN: &str = "Unknown";

/// Derive (manufacturer, model).
///
/// 1. A manufacturer keyword in the declared `name`: the model is the name
///    without the keyword and the "Multifunction ..." suffixes.
/// 2. A keyword in the `description`: the model is the first `;`-separated
///    field without the keyword.
/// 3. Otherwise the model is the name itself, and the manufacturer is
///    whatever matched earlier or "Unknown".
pub fn extract_manufacturer_model(description: &str, name: &str) -> (String, String) {
    let mut manufacturer = UNKNOWN;

    if let Some((keyword, canonical)) = match_manufacturer(name) {
        manufacturer = canonical;
        let mut model = remove_ignore_case(name, keyword);
        for noise in MODEL_NOISE {
            model = remove_ignore_case(&model, noise);
        }
        let model = tidy(&model);
        if !model.is_empty() {
            return (manufacturer.to_string(), model);
        }
    }

    if let Some((keyword, canonical)) = match_manufacturer(description) {
        manufacturer = canonical;
        let first_field = description.split(';').next().unwrap_or_default();
        let model = tidy(&remove_ignore_case(first_field, keyword));
        if !model.is_empty() && model != UNKNOWN {
            return (manufacturer.to_string(), model);
        }
    }

    let model = tidy(name);
    let model = if model.is_empty() { UNKNOWN.to_string() } else { model };
    (manufacturer.to_string(), model)
}

/// Remove every ASCII-case-insensitive occurrence of `needle`.
fn remove_ignore_case(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let upper = haystack.to_ascii_uppercase();
    let needle = needle.to_ascii_uppercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0;
    while let Some(pos) = upper[rest..].find(&needle) {
        out.push_str(&haystack[rest..rest + pos]);
        rest += pos + needle.len();
    }
    out.push_str(&haystack[rest..]);
    out
}

/// Trim and collapse internal whitespace runs.
fn tidy(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_declared_name() {
        assert_eq!(
            extract_manufacturer_model("HP ETHERNET MULTI-ENVIRONMENT", "HP Color LaserJet MFP M477fdw"),
            ("HP".to_string(), "Color LaserJet MFP M477fdw".to_string())
        );
        assert_eq!(
            extract_manufacturer_model("", "Brother MFC-L8900CDW Multifunction Printer"),
            ("Brother".to_string(), "MFC-L8900CDW".to_string())
        );
    }

    #[test]
    fn fuji_xerox_name_strips_whole_brand() {
        assert_eq!(
            extract_manufacturer_model("", "FUJI XEROX DocuCentre-VI C2271"),
            ("Fuji Xerox".to_string(), "DocuCentre-VI C2271".to_string())
        );
    }

    #[test]
    fn model_from_description_first_field() {
        assert_eq!(
            extract_manufacturer_model("RICOH MP C3004 1.03 / RICOH Network Printer;serial", "Printer-10.0.0.5"),
            ("Ricoh".to_string(), "MP C3004 1.03 / Network Printer".to_string())
        );
    }

    #[test]
    fn name_beats_description() {
        let (manufacturer, model) =
            extract_manufacturer_model("Canon iR-ADV C5535", "Xerox WorkCentre 6515");
        assert_eq!(manufacturer, "Xerox");
        assert_eq!(model, "WorkCentre 6515");
    }

    #[test]
    fn name_that_is_only_a_brand_falls_through_to_description() {
        assert_eq!(
            extract_manufacturer_model("EPSON ET-5800 Series", "EPSON"),
            ("Epson".to_string(), "ET-5800 Series".to_string())
        );
    }

    #[test]
    fn unknown_brand_uses_name_as_model() {
        assert_eq!(
            extract_manufacturer_model("KYOCERA Document Solutions Printing System", "ECOSYS M2540dn"),
            ("Unknown".to_string(), "ECOSYS M2540dn".to_string())
        );
        assert_eq!(
            extract_manufacturer_model("generic print server", ""),
            ("Unknown".to_string(), "Unknown".to_string())
        );
    }

    #[test]
    fn brand_only_everywhere_keeps_brand_as_model() {
        assert_eq!(
            extract_manufacturer_model("HP", "HP"),
            ("HP".to_string(), "HP".to_string())
        );
    }

    #[test]
    fn removal_is_case_insensitive() {
        assert_eq!(remove_ignore_case("hp LaserJet hp", "HP"), " LaserJet ");
        assert_eq!(remove_ignore_case("abc", ""), "abc");
    }
}
