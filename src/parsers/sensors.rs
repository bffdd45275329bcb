//! Parsers for lm-sensors output.
//!
//! `sensors -j` groups readings by chip; chips are assigned to a category by
//! the `CHIP_RULES` table. Supporting a new vendor means adding a row there.
//! Plain `sensors` output is only used for its "Core N: +NN.N°C" lines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CollectError;

/// Where a temperature reading comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Gpu,
    System,
    Drive,
}

/// A single temperature in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub name: String,
    pub value: f64,
    #[serde(skip)]
    pub category: Option<Category>,
    /// Device path, set for drive readings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
}

impl TemperatureReading {
    pub fn new(name: impl Into<String>, value: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            value,
            category: Some(category),
            path: None,
        }
    }

    pub fn drive(name: impl Into<String>, value: f64, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            category: Some(Category::Drive),
            path: Some(path.into()),
        }
    }
}

/// How a chip name is matched (always against the lowercased name).
#[derive(Debug, Clone, Copy)]
pub enum ChipMatch {
    Prefix(&'static str),
    Contains(&'static str),
}

impl ChipMatch {
    fn matches(&self, chip_lower: &str) -> bool {
        match self {
            ChipMatch::Prefix(p) => chip_lower.starts_with(p),
            ChipMatch::Contains(s) => chip_lower.contains(s),
        }
    }
}

/// Which features of a matched chip become readings.
#[derive(Debug, Clone, Copy)]
pub enum FeatureSelect {
    /// One reading per feature starting with the prefix, named after the feature.
    PerCore(&'static str),
    /// Listed features in order, each named "<label> <feature>".
    Named {
        label: &'static str,
        features: &'static [&'static str],
    },
    /// The first listed feature present, named "<label> <chip>".
    FirstOf {
        label: &'static str,
        features: &'static [&'static str],
    },
    /// Every feature whose name contains "temp", named "<chip> <feature>".
    AllTemps,
}

/// One row of the chip classification table.
#[derive(Debug, Clone, Copy)]
pub struct ChipRule {
    pub pattern: ChipMatch,
    pub category: Category,
    pub select: FeatureSelect,
}

const GPU_FEATURES: &[&str] = &["temp1", "edge"];

/// Chip classification table, first matching row wins.
pub const CHIP_RULES: &[ChipRule] = &[
    ChipRule {
        pattern: ChipMatch::Prefix("coretemp"),
        category: Category::Cpu,
        select: FeatureSelect::PerCore("Core"),
    },
    ChipRule {
        pattern: ChipMatch::Prefix("k10temp"),
        category: Category::Cpu,
        select: FeatureSelect::Named {
            label: "CPU",
            features: &["Tctl", "Tdie", "temp1"],
        },
    },
    ChipRule {
        pattern: ChipMatch::Prefix("zenpower"),
        category: Category::Cpu,
        select: FeatureSelect::Named {
            label: "CPU",
            features: &["Tctl", "Tdie"],
        },
    },
    ChipRule {
        pattern: ChipMatch::Contains("radeon"),
        category: Category::Gpu,
        select: FeatureSelect::FirstOf {
            label: "GPU",
            features: GPU_FEATURES,
        },
    },
    ChipRule {
        pattern: ChipMatch::Contains("amdgpu"),
        category: Category::Gpu,
        select: FeatureSelect::FirstOf {
            label: "GPU",
            features: GPU_FEATURES,
        },
    },
    ChipRule {
        pattern: ChipMatch::Contains("nvidia"),
        category: Category::Gpu,
        select: FeatureSelect::FirstOf {
            label: "GPU",
            features: GPU_FEATURES,
        },
    },
    ChipRule {
        pattern: ChipMatch::Contains("nouveau"),
        category: Category::Gpu,
        select: FeatureSelect::FirstOf {
            label: "GPU",
            features: GPU_FEATURES,
        },
    },
    ChipRule {
        pattern: ChipMatch::Contains("acpi"),
        category: Category::System,
        select: FeatureSelect::AllTemps,
    },
    ChipRule {
        pattern: ChipMatch::Contains("sys"),
        category: Category::System,
        select: FeatureSelect::AllTemps,
    },
    ChipRule {
        pattern: ChipMatch::Contains("mobo"),
        category: Category::System,
        select: FeatureSelect::AllTemps,
    },
];

/// Returns the first rule matching `chip`.
pub fn classify_chip(chip: &str) -> Option<&'static ChipRule> {
    let lower = chip.to_lowercase();
    CHIP_RULES.iter().find(|rule| rule.pattern.matches(&lower))
}

/// Extracts the current value of a feature object.
///
/// Prefers a `*_input` subfeature, then `input`, then the first numeric value.
fn feature_value(feature: &Value) -> Option<f64> {
    let obj = feature.as_object()?;
    obj.iter()
        .find(|(k, v)| k.ends_with("_input") && v.is_number())
        .or_else(|| obj.get_key_value("input").filter(|(_, v)| v.is_number()))
        .or_else(|| obj.iter().find(|(_, v)| v.is_number()))
        .and_then(|(_, v)| v.as_f64())
}

/// Number following the prefix in a feature name ("Core 11" -> 11).
fn core_index(feature: &str, prefix: &str) -> u32 {
    feature[prefix.len()..].trim().parse().unwrap_or(u32::MAX)
}

fn readings_for_chip(
    chip: &str,
    features: &Map<String, Value>,
    rule: &ChipRule,
) -> Vec<TemperatureReading> {
    let mut out = Vec::new();
    match rule.select {
        FeatureSelect::PerCore(prefix) => {
            let mut cores: Vec<(&String, f64)> = features
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .filter_map(|(k, v)| feature_value(v).map(|t| (k, t)))
                .collect();
            cores.sort_by_key(|(k, _)| core_index(k, prefix));
            out.extend(
                cores
                    .into_iter()
                    .map(|(k, t)| TemperatureReading::new(k.clone(), t, rule.category)),
            );
        }
        FeatureSelect::Named { label, features: wanted } => {
            for name in wanted {
                if let Some(t) = features.get(*name).and_then(feature_value) {
                    out.push(TemperatureReading::new(
                        format!("{} {}", label, name),
                        t,
                        rule.category,
                    ));
                }
            }
        }
        FeatureSelect::FirstOf { label, features: wanted } => {
            if let Some(t) = wanted
                .iter()
                .find_map(|name| features.get(*name).and_then(feature_value))
            {
                out.push(TemperatureReading::new(
                    format!("{} {}", label, chip),
                    t,
                    rule.category,
                ));
            }
        }
        FeatureSelect::AllTemps => {
            for (key, value) in features {
                if !key.contains("temp") {
                    continue;
                }
                if let Some(t) = feature_value(value) {
                    out.push(TemperatureReading::new(
                        format!("{} {}", chip, key),
                        t,
                        rule.category,
                    ));
                }
            }
        }
    }
    out
}

/// Parses `sensors -j` output into classified readings.
///
/// Chips not covered by `CHIP_RULES` are ignored. Invalid JSON is a parse error.
pub fn parse_sensors_json(text: &str) -> Result<Vec<TemperatureReading>, CollectError> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| CollectError::parse("sensors -j", e.to_string()))?;
    let chips = root
        .as_object()
        .ok_or_else(|| CollectError::parse("sensors -j", "top level is not an object"))?;

    let mut readings = Vec::new();
    for (chip, features) in chips {
        let (Some(rule), Some(features)) = (classify_chip(chip), features.as_object()) else {
            continue;
        };
        readings.extend(readings_for_chip(chip, features, rule));
    }
    Ok(readings)
}

static CORE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Core \d+):\s+\+(\d+(?:\.\d+)?)°C").expect("core line regex")
});

/// Parses "Core N: +NN.N°C" lines from plain `sensors` output.
pub fn parse_core_lines(text: &str) -> Vec<TemperatureReading> {
    text.lines()
        .filter_map(|line| {
            let caps = CORE_LINE.captures(line.trim_start())?;
            let value = caps[2].parse::<f64>().ok()?;
            Some(TemperatureReading::new(&caps[1], value, Category::Cpu))
        })
        .collect()
}
