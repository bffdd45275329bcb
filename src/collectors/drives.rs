//! Drive discovery, SMART data and drive temperatures.
//!
//! Each disk is queried independently and concurrently; results are merged
//! only after every per-disk query has finished or failed.

use futures_util::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::command::{CommandError, CommandRunner, Invocation};
use crate::parsers::df::{parse_df, Partition};
use crate::parsers::lsblk::{parse_lsblk, BlockDevice, LSBLK_ARGS};
use crate::parsers::sensors::TemperatureReading;
use crate::parsers::smart::{
    parse_attribute_table, parse_nvme_temperature, parse_scttemp, parse_smartctl_temperature,
    SmartSummary,
};

const SMARTCTL: &str = "smartctl";

/// One step of the drive temperature fallback chain.
pub struct DriveStep {
    pub name: &'static str,
    pub applies: fn(&BlockDevice) -> bool,
    pub program: &'static str,
    /// Arguments placed before the device path.
    pub args: &'static [&'static str],
    pub parse: fn(&str) -> Option<u32>,
}

fn any_device(_: &BlockDevice) -> bool {
    true
}

fn nvme_device(device: &BlockDevice) -> bool {
    device.is_nvme()
}

fn attribute_table_temperature(text: &str) -> Option<u32> {
    parse_attribute_table(text).temperature
}

/// Drive temperature sources, most structured first.
pub const DRIVE_TEMPERATURE_CHAIN: &[DriveStep] = &[
    DriveStep {
        name: "smart-attributes",
        applies: any_device,
        program: SMARTCTL,
        args: &["-A"],
        parse: attribute_table_temperature,
    },
    DriveStep {
        name: "smartctl-all",
        applies: any_device,
        program: SMARTCTL,
        args: &["-a"],
        parse: parse_smartctl_temperature,
    },
    DriveStep {
        name: "nvme-smart-log",
        applies: nvme_device,
        program: "nvme",
        args: &["smart-log"],
        parse: parse_nvme_temperature,
    },
    DriveStep {
        name: "sct-temperature",
        applies: any_device,
        program: SMARTCTL,
        args: &["-l", "scttemp"],
        parse: parse_scttemp,
    },
];

fn step_invocation(step: &DriveStep, device: &BlockDevice, sudo: bool) -> Invocation {
    let mut args: Vec<String> = step.args.iter().map(|a| a.to_string()).collect();
    args.push(device.device_path());
    Invocation::new(step.program)
        .args(args)
        .sudo(sudo)
        .allow_nonzero_exit()
}

/// Runs `steps` in order until one yields a temperature.
pub async fn drive_temperature(
    runner: &dyn CommandRunner,
    device: &BlockDevice,
    sudo: bool,
    steps: &[DriveStep],
) -> Option<(&'static str, u32)> {
    for step in steps.iter().filter(|s| (s.applies)(device)) {
        match runner.run(&step_invocation(step, device, sudo)).await {
            Ok(text) => {
                if let Some(t) = (step.parse)(&text) {
                    debug!("{}: temperature {}°C from {}", device.name, t, step.name);
                    return Some((step.name, t));
                }
                debug!("{}: no temperature in {} output", device.name, step.name);
            }
            Err(e) => debug!("{}: {} failed: {}", device.name, step.name, e),
        }
    }
    None
}

/// Lists whole disks via lsblk.
pub async fn list_disks(runner: &dyn CommandRunner) -> Result<Vec<BlockDevice>, CommandError> {
    let output = runner
        .run(&Invocation::new("lsblk").args(LSBLK_ARGS.iter().copied()))
        .await?;
    Ok(parse_lsblk(&output))
}

/// Temperatures of every disk that reports one.
pub async fn collect_drive_temperatures(
    runner: &dyn CommandRunner,
    sudo: bool,
) -> Vec<TemperatureReading> {
    let disks = match list_disks(runner).await {
        Ok(disks) => disks,
        Err(e) => {
            debug!("Drive listing failed: {}", e);
            return Vec::new();
        }
    };

    let results = join_all(disks.iter().map(|disk| async move {
        drive_temperature(runner, disk, sudo, DRIVE_TEMPERATURE_CHAIN)
            .await
            .map(|(_, t)| TemperatureReading::drive(&disk.name, t as f64, disk.device_path()))
    }))
    .await;

    results.into_iter().flatten().collect()
}

/// Solid state or rotational, by heuristic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveKind {
    Ssd,
    Hdd,
}

/// Guesses the drive kind from the model string, the NVMe device name and the
/// presence of an SSD wear attribute. Not a guarantee: unlabeled SATA SSDs
/// without attribute 231 are reported as HDD.
pub fn classify_drive(device: &BlockDevice, smart: Option<&SmartSummary>) -> DriveKind {
    let ssd = device.model.to_lowercase().contains("ssd")
        || device.is_nvme()
        || smart.is_some_and(|s| s.ssd_life_left.is_some());
    if ssd {
        DriveKind::Ssd
    } else {
        DriveKind::Hdd
    }
}

/// Partition usage of a disk, or why it is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiskUsage {
    Partitions { partitions: Vec<Partition> },
    Unavailable { error: String },
}

/// SMART data of a disk, or why it is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SmartData {
    Available(SmartSummary),
    Unavailable { error: String },
}

/// Disk descriptor returned by the disks query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub name: String,
    pub device_path: String,
    pub size: String,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: DriveKind,
    pub usage: DiskUsage,
    pub smart: SmartData,
}

/// Reads SMART data for one disk.
///
/// The attribute table is tried first; when it has no temperature the rest
/// of the drive temperature chain fills it in. Other fields stay as parsed.
pub async fn smart_data(runner: &dyn CommandRunner, device: &BlockDevice, sudo: bool) -> SmartData {
    let table = Invocation::new(SMARTCTL)
        .args(["-A".to_string(), device.device_path()])
        .sudo(sudo)
        .allow_nonzero_exit();

    let (mut summary, table_ok) = match runner.run(&table).await {
        Ok(text) => (parse_attribute_table(&text), true),
        Err(CommandError::ToolNotFound { .. }) => {
            return SmartData::Unavailable {
                error: "smartctl not installed".to_string(),
            }
        }
        Err(e) => {
            debug!("{}: smartctl -A failed: {}", device.name, e);
            (SmartSummary::default(), false)
        }
    };

    if summary.temperature.is_none() {
        summary.temperature = drive_temperature(runner, device, sudo, &DRIVE_TEMPERATURE_CHAIN[1..])
            .await
            .map(|(_, t)| t);
    }

    if !table_ok && summary.temperature.is_none() {
        return SmartData::Unavailable {
            error: "Cannot get SMART data".to_string(),
        };
    }
    SmartData::Available(summary)
}

/// Describes every disk with usage and SMART data.
///
/// `df` runs once; SMART queries run concurrently per disk.
pub async fn collect_disks(
    runner: &dyn CommandRunner,
    sudo: bool,
) -> Result<Vec<DiskInfo>, CommandError> {
    let disks = list_disks(runner).await?;
    let df_output = runner.run(&Invocation::new("df").args(["-h"])).await;
    if let Err(e) = &df_output {
        debug!("df failed: {}", e);
    }
    let smartctl_present = runner.tool_available(SMARTCTL);

    let infos = join_all(disks.into_iter().map(|disk| {
        let df_output = &df_output;
        async move {
            let device_path = disk.device_path();
            let usage = match df_output {
                Ok(text) => DiskUsage::Partitions {
                    partitions: parse_df(text, &device_path),
                },
                Err(_) => DiskUsage::Unavailable {
                    error: "Cannot get usage info".to_string(),
                },
            };
            let smart = if smartctl_present {
                smart_data(runner, &disk, sudo).await
            } else {
                SmartData::Unavailable {
                    error: "smartctl not installed".to_string(),
                }
            };
            let kind = match &smart {
                SmartData::Available(s) => classify_drive(&disk, Some(s)),
                SmartData::Unavailable { .. } => classify_drive(&disk, None),
            };
            DiskInfo {
                name: disk.name,
                device_path,
                size: disk.size,
                model: disk.model,
                kind,
                usage,
                smart,
            }
        }
    }))
    .await;

    Ok(infos)
}
