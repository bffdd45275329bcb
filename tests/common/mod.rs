//! Scripted fakes shared by the integration tests.

#![allow(dead_code)]

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use herakles_host_monitor::collectors::host::HostProbe;
use herakles_host_monitor::command::{CommandError, CommandRunner, Invocation};
use herakles_host_monitor::error::CollectError;
use herakles_host_monitor::parsers::procfs::{LoadAverage, MemoryInfo, NetDevStats};

/// Canned result for one command line.
#[derive(Clone)]
pub enum Reply {
    Stdout(String),
    Exit(i32),
}

/// Command runner answering from a table keyed by the full command line
/// (`Invocation`'s Display form, e.g. `smartctl -A /dev/sda`).
///
/// Unscripted commands fail with `ToolNotFound` when their program is not in
/// the installed set, and with exit status 1 otherwise.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: HashMap<String, Reply>,
    installed: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installed(mut self, tools: &[&str]) -> Self {
        self.installed.extend(tools.iter().map(|t| t.to_string()));
        self
    }

    pub fn reply(mut self, command_line: &str, stdout: &str) -> Self {
        self.replies
            .insert(command_line.to_string(), Reply::Stdout(stdout.to_string()));
        self
    }

    pub fn fail(mut self, command_line: &str, code: i32) -> Self {
        self.replies
            .insert(command_line.to_string(), Reply::Exit(code));
        self
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
        let line = invocation.to_string();
        self.calls.lock().unwrap().push(line.clone());

        match self.replies.get(&line) {
            Some(Reply::Stdout(text)) => Ok(text.clone()),
            Some(Reply::Exit(code)) => Err(CommandError::ExitNonZero {
                program: invocation.program.clone(),
                code: *code,
                stderr: String::new(),
            }),
            None if !self.tool_available(&invocation.program) => Err(CommandError::ToolNotFound {
                tool: invocation.program.clone(),
            }),
            None => Err(CommandError::ExitNonZero {
                program: invocation.program.clone(),
                code: 1,
                stderr: "unscripted".to_string(),
            }),
        }
    }

    fn tool_available(&self, tool: &str) -> bool {
        self.installed.iter().any(|t| t == tool)
    }
}

/// Host probe replaying a fixed sequence of CPU values. Memory is constant
/// and every interface's counters grow by 1000 bytes per read.
pub struct ScriptedProbe {
    cpu: Mutex<VecDeque<f64>>,
    interfaces: Vec<String>,
    reads: Mutex<u64>,
}

impl ScriptedProbe {
    pub fn new(cpu: &[f64], interfaces: &[&str]) -> Self {
        Self {
            cpu: Mutex::new(cpu.iter().copied().collect()),
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            reads: Mutex::new(0),
        }
    }
}

#[async_trait]
impl HostProbe for ScriptedProbe {
    async fn load_average(&self) -> Result<LoadAverage, CollectError> {
        Err(CollectError::parse("loadavg", "not scripted"))
    }

    async fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
        Ok(MemoryInfo {
            total_bytes: 1000,
            available_bytes: 400,
        })
    }

    async fn network_counters(&self) -> Result<HashMap<String, NetDevStats>, CollectError> {
        let mut reads = self.reads.lock().unwrap();
        *reads += 1;
        let mut map = HashMap::new();
        map.insert(
            "lo".to_string(),
            NetDevStats {
                rx_bytes: 1,
                ..Default::default()
            },
        );
        for name in &self.interfaces {
            map.insert(
                name.clone(),
                NetDevStats {
                    rx_bytes: *reads * 1000,
                    tx_bytes: *reads * 500,
                    ..Default::default()
                },
            );
        }
        Ok(map)
    }

    fn cpu_count(&self) -> usize {
        1
    }

    async fn cpu_load_percent(&self) -> Result<f64, CollectError> {
        self.cpu
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CollectError::parse("loadavg", "script exhausted"))
    }
}
