// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable asset notes: address, identity, scan time, usage and the
// consumable report.

use std::collections::BTreeMap;

use printsync_core::types::{ConsumableLevel, DeviceRecord};

/// Description characters kept in the notes.
pub const DESCRIPTION_LIMIT: usize = 100;

/// Render the notes field written to the asset.
///
/// ```text
/// IP Address: 192.168.1.245
/// Description: HP ETHERNET MULTI-ENVIRONMENT
/// Last Scanned: 2026-03-01 09:30:00 UTC
/// Total Pages: 12,345
///
/// Toner Status:
/// BLACK: 20.0% (20/100) ⚠ LOW
/// ```
pub fn render_notes(device: &DeviceRecord) -> String {
    let mut lines = vec![
        format!("IP Address: {}", device.ip),
        format!("Description: {}", truncate_chars(&device.description, DESCRIPTION_LIMIT)),
        format!(
            "Last Scanned: {}",
            device.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];
    if let Some(pages) = device.page_count {
        lines.push(format!("Total Pages: {}", thousands(pages)));
    }
    if !device.consumables.is_empty() {
        lines.push(String::new());
        lines.push("Toner Status:".to_string());
        lines.push(supply_report(&device.consumables));
    }
    lines.join("\n")
}

/// One line per consumable channel, sorted by channel name.
pub fn supply_report(consumables: &BTreeMap<String, ConsumableLevel>) -> String {
    if consumables.is_empty() {
        return "No toner data available".to_string();
    }
    consumables
        .iter()
        .map(|(channel, level)| {
            let mut line = format!(
                "{}: {:.1}% ({}/{}) {}",
                channel.to_uppercase(),
                level.percentage,
                level.current,
                level.max,
                level.status().label()
            );
            if let Some(reported) = level.reported_name.as_deref() {
                if !reported.eq_ignore_ascii_case(channel) {
                    line.push_str(&format!(" [{reported}]"));
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::net::Ipv4Addr;

    fn device() -> DeviceRecord {
        let mut device =
            DeviceRecord::new(Ipv4Addr::new(192, 168, 1, 245), "HP ETHERNET MULTI-ENVIRONMENT");
        device.scanned_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("valid time");
        device
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(12_345), "12,345");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn minimal_notes() {
        assert_eq!(
            render_notes(&device()),
            "IP Address: 192.168.1.245\n\
             Description: HP ETHERNET MULTI-ENVIRONMENT\n\
             Last Scanned: 2026-03-01 09:30:00 UTC"
        );
    }

    #[test]
    fn full_notes_with_pages_and_supplies() {
        let mut device = device();
        device.page_count = Some(12_345);
        device.consumables.insert("yellow".into(), ConsumableLevel::new(80, 100));
        device.consumables.insert("black".into(), ConsumableLevel::new(20, 100));
        device.consumables.insert("cyan".into(), ConsumableLevel::new(1, 10));

        let notes = render_notes(&device);
        let expected_tail = "Total Pages: 12,345\n\
                             \n\
                             Toner Status:\n\
                             BLACK: 20.0% (20/100) \u{26a0} LOW\n\
                             CYAN: 10.0% (1/10) \u{2717} CRITICAL\n\
                             YELLOW: 80.0% (80/100) \u{2713} OK";
        assert!(notes.ends_with(expected_tail), "notes were:\n{notes}");
    }

    #[test]
    fn zero_pages_still_reported() {
        let mut device = device();
        device.page_count = Some(0);
        assert!(render_notes(&device).ends_with("Total Pages: 0"));
    }

    #[test]
    fn reported_name_shown_when_it_differs() {
        let mut supplies = BTreeMap::new();
        supplies.insert(
            "cyan".to_string(),
            ConsumableLevel::new(300, 1000).with_reported_name("Cyan Toner"),
        );
        supplies.insert(
            "Drum Unit".to_string(),
            ConsumableLevel::new(60, 0).with_reported_name("Drum Unit"),
        );
        // Raw names sort before lower-case color keys.
        assert_eq!(
            supply_report(&supplies),
            "DRUM UNIT: 60.0% (60/0) \u{2713} OK\n\
             CYAN: 30.0% (300/1000) \u{26a0} LOW [Cyan Toner]"
        );
    }

    #[test]
    fn long_description_is_cut_at_100_chars() {
        let mut device = device();
        device.description = "é".repeat(150);
        let notes = render_notes(&device);
        let line = notes.lines().nth(1).expect("description line");
        assert_eq!(line.chars().count(), "Description: ".len() + DESCRIPTION_LIMIT);
    }

    #[test]
    fn empty_report_placeholder() {
        assert_eq!(supply_report(&BTreeMap::new()), "No toner data available");
    }
}
