//! Temperature collection across CPU, GPU, system sensors and drives.
//!
//! CPU/GPU/system readings come from lm-sensors (`sensors -j`, then plain
//! `sensors` core lines when the JSON dump had no CPU entries). Drive
//! temperatures always come from the SMART chain and are merged in.

use serde::Serialize;
use tracing::debug;

use crate::collectors::drives::collect_drive_temperatures;
use crate::command::{CommandRunner, Invocation};
use crate::parsers::sensors::{parse_core_lines, parse_sensors_json, Category, TemperatureReading};

pub const SENSORS: &str = "sensors";
pub const SMARTCTL: &str = "smartctl";

pub const TOOLS_MISSING_ERROR: &str =
    "Temperature monitoring tools not found. Please install lm-sensors and smartmontools.";
pub const TOOLS_MISSING_INSTRUCTIONS: &str =
    "You can install these with: sudo apt-get install lm-sensors smartmontools && sudo sensors-detect";

/// Readings grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemperatureReport {
    pub cpu: Vec<TemperatureReading>,
    pub gpu: Vec<TemperatureReading>,
    pub system: Vec<TemperatureReading>,
    pub drives: Vec<TemperatureReading>,
}

impl TemperatureReport {
    fn add(&mut self, reading: TemperatureReading) {
        match reading.category {
            Some(Category::Cpu) => self.cpu.push(reading),
            Some(Category::Gpu) => self.gpu.push(reading),
            Some(Category::System) | None => self.system.push(reading),
            Some(Category::Drive) => self.drives.push(reading),
        }
    }
}

/// Payload returned when no temperature tool is installed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureUnavailable {
    pub error: String,
    pub instructions: String,
}

impl Default for TemperatureUnavailable {
    fn default() -> Self {
        Self {
            error: TOOLS_MISSING_ERROR.to_string(),
            instructions: TOOLS_MISSING_INSTRUCTIONS.to_string(),
        }
    }
}

/// Either a report or the remediation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemperatureResponse {
    Report(TemperatureReport),
    Unavailable(TemperatureUnavailable),
}

/// CPU, GPU and system readings from lm-sensors.
pub async fn sensor_readings(runner: &dyn CommandRunner) -> Vec<TemperatureReading> {
    let mut readings = match runner.run(&Invocation::new(SENSORS).args(["-j"])).await {
        Ok(text) => parse_sensors_json(&text).unwrap_or_else(|e| {
            debug!("Ignoring sensors -j output: {}", e);
            Vec::new()
        }),
        Err(e) => {
            debug!("sensors -j failed: {}", e);
            Vec::new()
        }
    };

    if !readings.iter().any(|r| r.category == Some(Category::Cpu)) {
        debug!("No CPU readings in sensors -j output, trying core lines");
        match runner.run(&Invocation::new(SENSORS)).await {
            Ok(text) => readings.extend(parse_core_lines(&text)),
            Err(e) => debug!("sensors failed: {}", e),
        }
    }

    readings
}

/// Collects all temperatures, or the remediation payload when neither
/// lm-sensors nor smartmontools is installed.
pub async fn collect_temperatures(runner: &dyn CommandRunner, sudo: bool) -> TemperatureResponse {
    let has_sensors = runner.tool_available(SENSORS);
    let has_smartctl = runner.tool_available(SMARTCTL);

    if !has_sensors && !has_smartctl {
        return TemperatureResponse::Unavailable(TemperatureUnavailable::default());
    }

    let sensors = async {
        if has_sensors {
            sensor_readings(runner).await
        } else {
            debug!("sensors not installed, collecting drive temperatures only");
            Vec::new()
        }
    };
    let drives = async {
        if has_smartctl {
            collect_drive_temperatures(runner, sudo).await
        } else {
            Vec::new()
        }
    };
    let (sensor_list, drive_list) = tokio::join!(sensors, drives);

    let mut report = TemperatureReport::default();
    for reading in sensor_list.into_iter().chain(drive_list) {
        report.add(reading);
    }
    TemperatureResponse::Report(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_payload_shape() {
        let json = serde_json::to_value(TemperatureResponse::Unavailable(
            TemperatureUnavailable::default(),
        ))
        .unwrap();
        assert_eq!(json["error"], TOOLS_MISSING_ERROR);
        assert!(json["instructions"].as_str().unwrap().contains("lm-sensors"));
    }

    #[test]
    fn test_report_groups_by_category() {
        let mut report = TemperatureReport::default();
        report.add(TemperatureReading::new("Core 0", 40.0, Category::Cpu));
        report.add(TemperatureReading::new("GPU x", 50.0, Category::Gpu));
        report.add(TemperatureReading::drive("sda", 30.0, "/dev/sda"));
        assert_eq!(report.cpu.len(), 1);
        assert_eq!(report.gpu.len(), 1);
        assert_eq!(report.drives.len(), 1);
        assert!(report.system.is_empty());

        let json = serde_json::to_value(TemperatureResponse::Report(report)).unwrap();
        assert_eq!(json["drives"][0]["path"], "/dev/sda");
        assert_eq!(json["cpu"][0]["name"], "Core 0");
    }
}
