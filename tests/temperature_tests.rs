//! Temperature collection through a scripted command runner.

mod common;

use common::ScriptedRunner;
use herakles_host_monitor::collectors::temperature::{
    collect_temperatures, TemperatureReport, TemperatureResponse, TOOLS_MISSING_ERROR,
    TOOLS_MISSING_INSTRUCTIONS,
};

const CORETEMP_JSON: &str = r#"{
    "coretemp-isa-0000": {
        "Adapter": "ISA adapter",
        "Package id 0": {"temp1_input": 47.0, "temp1_max": 100.0},
        "Core 0": {"temp2_input": 45.0, "temp2_max": 100.0},
        "Core 1": {"temp3_input": 45.0, "temp3_max": 100.0},
        "Core 2": {"temp4_input": 45.0, "temp4_max": 100.0},
        "Core 3": {"temp5_input": 45.0, "temp5_max": 100.0}
    }
}"#;

const PLAIN_SENSORS: &str = "\
coretemp-isa-0000
Adapter: ISA adapter
Package id 0:  +52.0°C  (high = +100.0°C, crit = +100.0°C)
Core 0:        +50.0°C  (high = +100.0°C, crit = +100.0°C)
";

const SMART_TABLE: &str = "\
=== START OF READ SMART DATA SECTION ===
SMART Attributes Data Structure revision number: 16
Vendor Specific SMART Attributes with Thresholds:
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  9 Power_On_Hours          0x0032   096   096   000    Old_age   Always       -       17920
194 Temperature_Celsius     0x0022   065   052   000    Old_age   Always       -       35 (0 18 0 0 0)
";

fn report(response: TemperatureResponse) -> TemperatureReport {
    match response {
        TemperatureResponse::Report(report) => report,
        TemperatureResponse::Unavailable(payload) => {
            panic!("unexpected unavailable payload: {}", payload.error)
        }
    }
}

#[tokio::test]
async fn test_coretemp_json_gives_one_reading_per_core() {
    let runner = ScriptedRunner::new()
        .installed(&["sensors"])
        .reply("sensors -j", CORETEMP_JSON);

    let report = report(collect_temperatures(&runner, false).await);

    assert_eq!(report.cpu.len(), 4);
    assert!(report.cpu.iter().all(|r| r.value == 45.0));
    assert_eq!(report.cpu[0].name, "Core 0");
    assert_eq!(report.cpu[3].name, "Core 3");
    assert!(report.drives.is_empty());
    // JSON had CPU entries, so plain sensors is never run
    assert_eq!(runner.calls(), vec!["sensors -j"]);
}

#[tokio::test]
async fn test_invalid_json_falls_back_to_core_lines() {
    let runner = ScriptedRunner::new()
        .installed(&["sensors"])
        .reply("sensors -j", "")
        .reply("sensors", PLAIN_SENSORS);

    let report = report(collect_temperatures(&runner, false).await);

    assert_eq!(report.cpu.len(), 1);
    assert_eq!(report.cpu[0].name, "Core 0");
    assert_eq!(report.cpu[0].value, 50.0);
}

#[tokio::test]
async fn test_no_tools_returns_remediation_payload() {
    let runner = ScriptedRunner::new();

    match collect_temperatures(&runner, false).await {
        TemperatureResponse::Unavailable(payload) => {
            assert_eq!(payload.error, TOOLS_MISSING_ERROR);
            assert_eq!(payload.instructions, TOOLS_MISSING_INSTRUCTIONS);
        }
        other => panic!("expected unavailable payload, got {other:?}"),
    }
    assert!(runner.calls().is_empty());

    let json = serde_json::to_value(collect_temperatures(&runner, false).await).unwrap();
    assert_eq!(json["error"], TOOLS_MISSING_ERROR);
    assert!(json.get("cpu").is_none());
}

#[tokio::test]
async fn test_drive_temperatures_merge_with_sensor_readings() {
    let runner = ScriptedRunner::new()
        .installed(&["sensors", "smartctl", "lsblk"])
        .reply("sensors -j", CORETEMP_JSON)
        .reply(
            "lsblk -d -n -o NAME,TYPE,SIZE,MODEL",
            "sda  disk 465.8G Samsung SSD 860\nsdb  disk   1.8T WDC WD20EFRX\nsr0  rom  1024M DVD\n",
        )
        .reply("smartctl -A /dev/sda", SMART_TABLE)
        .reply("smartctl -A /dev/sdb", "SMART Attributes Data Structure revision number: 16\n")
        .reply("smartctl -a /dev/sdb", "Current Drive Temperature:     38 C\nTemperature: 38 Celsius\n");

    let report = report(collect_temperatures(&runner, false).await);

    assert_eq!(report.cpu.len(), 4);
    let mut drives: Vec<(String, f64)> = report
        .drives
        .iter()
        .map(|r| (r.name.clone(), r.value))
        .collect();
    drives.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(drives, vec![("sda".to_string(), 35.0), ("sdb".to_string(), 38.0)]);
    assert_eq!(report.drives[0].path.as_deref().map(|p| p.starts_with("/dev/")), Some(true));
}

#[tokio::test]
async fn test_drive_chain_reaches_sct_temperature() {
    let runner = ScriptedRunner::new()
        .installed(&["smartctl", "lsblk"])
        .reply("lsblk -d -n -o NAME,TYPE,SIZE,MODEL", "sdc disk 4T ST4000\n")
        .fail("smartctl -A /dev/sdc", 2)
        .reply("smartctl -a /dev/sdc", "no useful lines here\n")
        .reply(
            "smartctl -l scttemp /dev/sdc",
            "SCT Status Version:                  3\nCurrent Temperature:                    41 Celsius\n",
        );

    let report = report(collect_temperatures(&runner, false).await);

    assert!(report.cpu.is_empty());
    assert_eq!(report.drives.len(), 1);
    assert_eq!(report.drives[0].value, 41.0);
    // nvme smart-log only applies to nvme devices
    assert!(!runner.calls().iter().any(|c| c.starts_with("nvme")));
}

#[tokio::test]
async fn test_sudo_prefixes_smart_commands() {
    let runner = ScriptedRunner::new()
        .installed(&["smartctl", "lsblk"])
        .reply("lsblk -d -n -o NAME,TYPE,SIZE,MODEL", "sda disk 500G Disk\n")
        .reply("sudo -n smartctl -A /dev/sda", SMART_TABLE);

    let report = report(collect_temperatures(&runner, true).await);

    assert_eq!(report.drives.len(), 1);
    assert_eq!(report.drives[0].value, 35.0);
}
