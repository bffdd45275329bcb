//! Parser for `df -h` output, filtered to the partitions of one disk.

use serde::{Deserialize, Serialize};

/// Usage of one mounted partition, sizes as printed by `df -h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub filesystem: String,
    pub size: String,
    pub used: String,
    pub available: String,
    pub percentage: String,
    pub mountpoint: String,
}

/// Whether `filesystem` is `device` itself or one of its partitions
/// (`/dev/sda1`, `/dev/nvme0n1p2`, `/dev/mmcblk0p1`).
fn belongs_to(filesystem: &str, device: &str) -> bool {
    let Some(rest) = filesystem.strip_prefix(device) else {
        return false;
    };
    // Only names ending in a digit separate partitions with 'p'
    let rest = if device.ends_with(|c: char| c.is_ascii_digit()) {
        match rest.strip_prefix('p') {
            Some(digits) if digits.is_empty() => return false,
            Some(digits) => digits,
            None => rest,
        }
    } else {
        rest
    };
    rest.chars().all(|c| c.is_ascii_digit())
}

/// Parses `df -h` output and keeps the rows of `device_path`'s partitions.
pub fn parse_df(text: &str, device_path: &str) -> Vec<Partition> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                return None;
            }
            let filesystem = parts[0];
            if filesystem.starts_with("/dev/loop") || !belongs_to(filesystem, device_path) {
                return None;
            }
            Some(Partition {
                filesystem: filesystem.to_string(),
                size: parts[1].to_string(),
                used: parts[2].to_string(),
                available: parts[3].to_string(),
                percentage: parts[4].to_string(),
                // Mount points may contain spaces
                mountpoint: parts[5..].join(" "),
            })
        })
        .collect()
}
