//! Parsers for smartctl and nvme-cli output.
//!
//! The attribute table (`smartctl -A`) is the structured source. When it is
//! missing or carries no temperature, looser line patterns over
//! `smartctl -a`, `nvme smart-log` and `smartctl -l scttemp` output are tried.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{first_match, leading_number, Strategy};

/// Line after which attribute rows appear in `smartctl -A` output.
pub const ATTRIBUTES_MARKER: &str = "SMART Attributes Data Structure";

/// One row of the SMART attribute table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartAttribute {
    pub id: u32,
    pub name: String,
    pub value: u32,
    pub threshold: u32,
    pub raw: String,
}

/// Summary of a drive's SMART data. Absent values serialize as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSummary {
    pub temperature: Option<u32>,
    pub power_on_hours: Option<u64>,
    pub reallocated_sectors: Option<u64>,
    pub ssd_life_left: Option<u64>,
    pub attributes: Vec<SmartAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmartField {
    Temperature,
    PowerOnHours,
    ReallocatedSectors,
    SsdLifeLeft,
}

/// Well-known attributes: field, vendor-neutral ID, name substring.
///
/// The ID is authoritative; the name match covers vendors that number the
/// attribute differently and never overrides an ID match.
const WELL_KNOWN: &[(SmartField, u32, &str)] = &[
    (SmartField::Temperature, 194, "Temperature"),
    (SmartField::PowerOnHours, 9, "Power_On_Hours"),
    (SmartField::ReallocatedSectors, 5, "Reallocated"),
    (SmartField::SsdLifeLeft, 231, "SSD_Life_Left"),
];

static ATTRIBUTE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s").expect("attribute row regex"));

#[derive(Default)]
struct FieldSlot {
    value: Option<u64>,
    by_id: bool,
}

/// Parses the attribute table of `smartctl -A` output.
///
/// Rows are only considered after `ATTRIBUTES_MARKER`. Rows with fewer than
/// ten columns are skipped. The result has empty `attributes` when no table
/// was found.
pub fn parse_attribute_table(text: &str) -> SmartSummary {
    let mut attributes = Vec::new();
    let mut slots: [FieldSlot; 4] = Default::default();
    let mut in_table = false;

    for line in text.lines() {
        if line.contains(ATTRIBUTES_MARKER) {
            in_table = true;
            continue;
        }
        if !in_table || !ATTRIBUTE_ROW.is_match(line) {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }
        let Ok(id) = parts[0].parse::<u32>() else {
            continue;
        };
        let attribute = SmartAttribute {
            id,
            name: parts[1].to_string(),
            value: parts[3].parse().unwrap_or(0),
            threshold: parts[5].parse().unwrap_or(0),
            raw: parts[9..].join(" "),
        };

        for (idx, (_, known_id, name_part)) in WELL_KNOWN.iter().enumerate() {
            let by_id = attribute.id == *known_id;
            let by_name = attribute.name.contains(name_part);
            let slot = &mut slots[idx];
            if by_id || (by_name && !slot.by_id) {
                if let Some(n) = leading_number(&attribute.raw) {
                    slot.value = Some(n);
                    slot.by_id |= by_id;
                }
            }
        }

        attributes.push(attribute);
    }

    let field = |f: SmartField| {
        WELL_KNOWN
            .iter()
            .position(|(k, _, _)| *k == f)
            .and_then(|idx| slots[idx].value)
    };

    SmartSummary {
        temperature: field(SmartField::Temperature).and_then(|t| u32::try_from(t).ok()),
        power_on_hours: field(SmartField::PowerOnHours),
        reallocated_sectors: field(SmartField::ReallocatedSectors),
        ssd_life_left: field(SmartField::SsdLifeLeft),
        attributes,
    }
}

static TEMP_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Temperature:\s+(\d+)").expect("temperature regex"));
static TEMP_CELSIUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+Celsius").expect("celsius regex"));
static DRIVE_TEMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Drive Temperature:\s+(\d+)").expect("drive temperature regex"));
static NVME_TEMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*temperature\s*:\s*(\d+)\s*°?\s*C").expect("nvme temperature regex")
});

/// Lines mentioning a temperature, like `grep -i temperature`.
fn temperature_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| line.to_lowercase().contains("temperature"))
}

fn capture_on_temperature_lines(text: &str, re: &Regex) -> Option<u32> {
    temperature_lines(text)
        .find_map(|line| re.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

fn temperature_colon(text: &str) -> Option<u32> {
    capture_on_temperature_lines(text, &TEMP_COLON)
}

fn temperature_celsius(text: &str) -> Option<u32> {
    capture_on_temperature_lines(text, &TEMP_CELSIUS)
}

fn drive_temperature(text: &str) -> Option<u32> {
    capture_on_temperature_lines(text, &DRIVE_TEMP)
}

/// Line patterns tried against `smartctl -a` output, in order.
pub const SMARTCTL_TEMPERATURE_PATTERNS: &[Strategy<u32>] = &[
    Strategy::new("temperature-colon", temperature_colon),
    Strategy::new("celsius-suffix", temperature_celsius),
    Strategy::new("drive-temperature", drive_temperature),
];

/// Extracts a temperature from free-form `smartctl -a` output.
pub fn parse_smartctl_temperature(text: &str) -> Option<u32> {
    first_match(text, SMARTCTL_TEMPERATURE_PATTERNS).map(|(_, t)| t)
}

/// Extracts the temperature from `nvme smart-log` output
/// ("temperature : 35 C (308 Kelvin)").
pub fn parse_nvme_temperature(text: &str) -> Option<u32> {
    NVME_TEMP
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Extracts the current temperature from `smartctl -l scttemp` output.
pub fn parse_scttemp(text: &str) -> Option<u32> {
    capture_on_temperature_lines(text, &TEMP_CELSIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATA_ATTRIBUTES: &str = "\
smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)
Copyright (C) 2002-22, Bruce Allen, Christian Franke, www.smartmontools.org

=== START OF READ SMART DATA SECTION ===
SMART Attributes Data Structure revision number: 16
Vendor Specific SMART Attributes with Thresholds:
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  1 Raw_Read_Error_Rate     0x002f   100   100   000    Pre-fail  Always       -       0
  9 Power_On_Hours          0x0032   097   097   000    Old_age   Always       -       12345
 12 Power_Cycle_Count       0x0032   099   099   000    Old_age   Always       -       1021
190 Airflow_Temperature_Cel 0x0032   064   052   000    Old_age   Always       -       36
194 Temperature_Celsius     0x0022   065   053   000    Old_age   Always       -       35 (0 18 0 0 0)
196 Reallocated_Event_Count 0x0032   100   100   000    Old_age   Always       -       0
";

    #[test]
    fn test_attribute_table() {
        let summary = parse_attribute_table(ATA_ATTRIBUTES);
        assert_eq!(summary.attributes.len(), 6);
        assert_eq!(summary.temperature, Some(35));
        assert_eq!(summary.power_on_hours, Some(12345));
        assert_eq!(summary.ssd_life_left, None);

        let temp = summary.attributes.iter().find(|a| a.id == 194).unwrap();
        assert_eq!(temp.name, "Temperature_Celsius");
        assert_eq!(temp.value, 65);
        assert_eq!(temp.threshold, 0);
        assert_eq!(temp.raw, "35 (0 18 0 0 0)");
    }

    #[test]
    fn test_name_match_fallback_and_id_priority() {
        // No ID 5 row: Reallocated_Event_Count matches by name.
        let summary = parse_attribute_table(ATA_ATTRIBUTES);
        assert_eq!(summary.reallocated_sectors, Some(0));

        let text = "\
SMART Attributes Data Structure revision number: 1
  5 Reallocated_Sector_Ct   0x0033   100   100   010    Pre-fail  Always       -       8
196 Reallocated_Event_Count 0x0032   100   100   000    Old_age   Always       -       2
";
        assert_eq!(parse_attribute_table(text).reallocated_sectors, Some(8));
    }

    #[test]
    fn test_rows_before_marker_ignored() {
        let text = "194 Temperature_Celsius 0x0022 065 053 000 Old_age Always - 99\n";
        let summary = parse_attribute_table(text);
        assert!(summary.attributes.is_empty());
        assert_eq!(summary.temperature, None);
    }

    #[test]
    fn test_missing_fields_serialize_as_null() {
        let summary = parse_attribute_table(ATA_ATTRIBUTES);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["temperature"], 35);
        assert_eq!(json["powerOnHours"], 12345);
        assert!(json["ssdLifeLeft"].is_null());
        assert_eq!(json["attributes"][0]["raw"], "0");
    }

    #[test]
    fn test_smartctl_temperature_patterns() {
        let nvme = "Temperature:                        41 Celsius\nTemperature Sensor 1:               41 Celsius\n";
        assert_eq!(parse_smartctl_temperature(nvme), Some(41));

        let sas = "Current Drive Temperature:     33 C\nDrive Trip Temperature:        65 C\n";
        assert_eq!(parse_smartctl_temperature(sas), Some(33));

        let sensor_only = "Temperature Sensor 2:               44 Celsius\n";
        assert_eq!(parse_smartctl_temperature(sensor_only), Some(44));

        assert_eq!(parse_smartctl_temperature("Model: foo\n"), None);
    }

    #[test]
    fn test_nvme_smart_log() {
        let old = "Smart Log for NVME device:nvme0 namespace-id:ffffffff\ncritical_warning\t\t\t: 0\ntemperature\t\t\t\t: 38 C\navailable_spare\t\t\t\t: 100%\n";
        assert_eq!(parse_nvme_temperature(old), Some(38));

        let new = "temperature                             : 37 °C (310 K)\n";
        assert_eq!(parse_nvme_temperature(new), Some(37));

        assert_eq!(parse_nvme_temperature("Warning Temperature Time : 0\n"), None);
    }

    #[test]
    fn test_scttemp() {
        let text = "SCT Status Version:                  3\nCurrent Temperature:                    36 Celsius\nPower Cycle Min/Max Temperature:     21/41 Celsius\n";
        assert_eq!(parse_scttemp(text), Some(36));
        assert_eq!(parse_scttemp("SCT Commands not supported\n"), None);
    }
}
