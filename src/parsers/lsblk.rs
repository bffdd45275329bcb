//! Parser for `lsblk -d -n -o NAME,TYPE,SIZE,MODEL` output.

/// A whole-disk block device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub name: String,
    pub size: String,
    pub model: String,
}

impl BlockDevice {
    pub fn device_path(&self) -> String {
        format!("/dev/{}", self.name)
    }

    pub fn is_nvme(&self) -> bool {
        self.name.starts_with("nvme")
    }
}

/// Arguments producing the format `parse_lsblk` expects.
pub const LSBLK_ARGS: &[&str] = &["-d", "-n", "-o", "NAME,TYPE,SIZE,MODEL"];

/// Parses disk rows; partitions, loop devices, ROMs and udev entries are skipped.
pub fn parse_lsblk(text: &str) -> Vec<BlockDevice> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || parts[1] != "disk" || parts[0].contains("udev") {
                return None;
            }
            let model = parts[3..].join(" ");
            Some(BlockDevice {
                name: parts[0].to_string(),
                size: parts[2].to_string(),
                model: if model.is_empty() {
                    "Unknown".to_string()
                } else {
                    model
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lsblk() {
        let text = "\
sda     disk 931.5G Samsung SSD 860 EVO 1TB
sr0     rom   1024M DVD-RW
loop0   loop   55.4M
nvme0n1 disk 476.9G
";
        let disks = parse_lsblk(text);
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].name, "sda");
        assert_eq!(disks[0].size, "931.5G");
        assert_eq!(disks[0].model, "Samsung SSD 860 EVO 1TB");
        assert_eq!(disks[0].device_path(), "/dev/sda");
        assert_eq!(disks[1].model, "Unknown");
        assert!(disks[1].is_nvme());
    }

    #[test]
    fn test_header_and_blank_lines_skipped() {
        let text = "NAME TYPE SIZE MODEL\n\nsdb disk 2T WDC WD20EFRX\n";
        let disks = parse_lsblk(text);
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].name, "sdb");
    }
}
