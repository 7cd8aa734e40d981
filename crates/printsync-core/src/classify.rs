// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyword classification rules.
//
// Every substring-based decision in the pipeline (is this a printer, which
// toner color is this, who made it, is this status label usable) is driven
// by one of the ordered tables below. Rules are evaluated top to bottom and
// the first match wins, so more specific keywords must precede the shorter
// ones they contain.

/// sysDescr keywords that mark a device as a printer.
pub const PRINTER_KEYWORDS: &[&str] = &[
    "printer", "print", "xerox", "konica", "canon", "brother", "epson", "ricoh", "lexmark",
    "samsung", "hp",
];

/// How a color rule keyword is compared against a supply name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMatch {
    /// Keyword appears anywhere in the name.
    Substring,
    /// Keyword equals one whole alphanumeric word of the name. Used for the
    /// one- and two-letter abbreviations, which would otherwise match almost
    /// any supply description.
    Word,
}

/// (keyword, match kind, color) rules for supply names. Full color names come
/// first so "Yellow Toner Kit" is not claimed by an abbreviation.
pub const COLOR_RULES: &[(&str, ColorMatch, &str)] = &[
    ("black", ColorMatch::Substring, "black"),
    ("cyan", ColorMatch::Substring, "cyan"),
    ("magenta", ColorMatch::Substring, "magenta"),
    ("yellow", ColorMatch::Substring, "yellow"),
    ("bk", ColorMatch::Word, "black"),
    ("k", ColorMatch::Word, "black"),
    ("c", ColorMatch::Word, "cyan"),
    ("m", ColorMatch::Word, "magenta"),
    ("y", ColorMatch::Word, "yellow"),
];

/// Fixed marker-supply slots and the color conventionally stored there.
pub const FIXED_SUPPLY_SLOTS: &[(u32, &str)] =
    &[(1, "black"), (2, "cyan"), (3, "magenta"), (4, "yellow")];

/// (upper-case keyword, canonical manufacturer name). "FUJI XEROX" must be
/// tried before "XEROX".
pub const MANUFACTURER_RULES: &[(&str, &str)] = &[
    ("FUJI XEROX", "Fuji Xerox"),
    ("XEROX", "Xerox"),
    ("HP", "HP"),
    ("CANON", "Canon"),
    ("BROTHER", "Brother"),
    ("EPSON", "Epson"),
    ("RICOH", "Ricoh"),
    ("KONICA MINOLTA", "Konica Minolta"),
    ("SAMSUNG", "Samsung"),
    ("LEXMARK", "Lexmark"),
];

/// Marketing suffixes stripped from a declared name when deriving the model.
pub const MODEL_NOISE: &[&str] = &["Multifunction Printer", "Multifunction System"];

/// Status-label names containing any of these are never chosen as the
/// deployable status.
pub const DISQUALIFIED_STATUS_TERMS: &[&str] =
    &["recycle", "archived", "broken", "lost", "repair", "dispose"];

/// Status-label name keywords that suggest "ready for use".
pub const DEPLOYABLE_STATUS_KEYWORDS: &[&str] =
    &["ready", "deploy", "active", "available", "in stock", "stock"];

/// Whether a sysDescr string looks like a printer.
pub fn is_printer_description(description: &str) -> bool {
    contains_any(description, PRINTER_KEYWORDS)
}

/// Map a supply name to a color, or return the name unchanged.
pub fn identify_color(supply_name: &str) -> String {
    let lower = supply_name.to_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).collect();
    COLOR_RULES
        .iter()
        .find(|(keyword, kind, _)| match kind {
            ColorMatch::Substring => lower.contains(keyword),
            ColorMatch::Word => words.contains(keyword),
        })
        .map(|(_, _, color)| (*color).to_string())
        .unwrap_or_else(|| supply_name.to_string())
}

/// First manufacturer rule matching `text`: (matched keyword, canonical name).
pub fn match_manufacturer(text: &str) -> Option<(&'static str, &'static str)> {
    let upper = text.to_uppercase();
    MANUFACTURER_RULES
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .copied()
}

/// Whether a status-label name is ruled out for deployable use.
pub fn is_disqualified_status(name: &str) -> bool {
    contains_any(name, DISQUALIFIED_STATUS_TERMS)
}

/// Whether a status-label name suggests a deployable state.
pub fn has_deployable_keyword(name: &str) -> bool {
    contains_any(name, DEPLOYABLE_STATUS_KEYWORDS)
}

/// Case-insensitive substring test against lower-case keywords.
fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printer_descriptions() {
        assert!(is_printer_description("HP ETHERNET MULTI-ENVIRONMENT"));
        assert!(is_printer_description("Brother NC-8300h"));
        assert!(is_printer_description("FUJI XEROX DocuCentre-V"));
        assert!(!is_printer_description("Linux gw 5.15.0 x86_64"));
        assert!(!is_printer_description("Cisco IOS Software"));
    }

    #[test]
    fn colors_from_supply_names() {
        assert_eq!(identify_color("Black Toner Cartridge"), "black");
        assert_eq!(identify_color("Cyan Cartridge HP CF411A"), "cyan");
        assert_eq!(identify_color("MAGENTA TONER"), "magenta");
        assert_eq!(identify_color("Yellow Toner Kit"), "yellow");
        assert_eq!(identify_color("Toner BK"), "black");
        assert_eq!(identify_color("Ink C (PGI-580)"), "cyan");
        assert_eq!(identify_color("y toner"), "yellow");
    }

    #[test]
    fn unknown_supply_keeps_reported_name() {
        assert_eq!(identify_color("Waste Toner Box"), "Waste Toner Box");
        assert_eq!(identify_color("Drum Unit"), "Drum Unit");
        assert_eq!(identify_color("Maintenance Kit"), "Maintenance Kit");
    }

    #[test]
    fn fuji_xerox_beats_xerox() {
        assert_eq!(
            match_manufacturer("Fuji Xerox DocuPrint CM315"),
            Some(("FUJI XEROX", "Fuji Xerox"))
        );
        assert_eq!(
            match_manufacturer("Xerox WorkCentre 6515"),
            Some(("XEROX", "Xerox"))
        );
        assert_eq!(match_manufacturer("hp laserjet"), Some(("HP", "HP")));
        assert_eq!(match_manufacturer("Kyocera ECOSYS"), None);
    }

    #[test]
    fn status_terms() {
        assert!(is_disqualified_status("Out for Repair"));
        assert!(is_disqualified_status("Recycled"));
        assert!(!is_disqualified_status("Ready to Deploy"));
        assert!(has_deployable_keyword("In Stock"));
        assert!(has_deployable_keyword("Ready to Deploy"));
        assert!(!has_deployable_keyword("Pending"));
    }
}
