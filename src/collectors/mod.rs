//! Collectors module for host and hardware metrics.
//!
//! This module contains the host probe (CPU load, memory, network counters
//! from /proc) and the hardware collectors (temperatures, disks, SMART) that
//! drive external tools through the command gateway.

pub mod drives;
pub mod host;
pub mod temperature;
