//! Check command implementation.
//!
//! Reports which external tools and proc sources are usable.

use herakles_host_monitor::command::SystemCommandRunner;

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{check_proc_sources, check_tools, check_user_privileges};

/// Validates system requirements and configuration.
pub fn command_check(
    proc: bool,
    tools: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Host Monitor - System Check");
    println!("=======================================");

    // Neither flag means check everything
    let all = !proc && !tools;
    let mut all_ok = true;

    if proc || all {
        let root = config.proc_root();
        println!("\n📁 Checking proc sources under {}...", root.display());
        let problems = check_proc_sources(&root);
        if problems.is_empty() {
            println!("   ✅ loadavg, meminfo and net/dev readable");
        }
        for problem in &problems {
            println!("   ❌ {}", problem);
        }
        all_ok &= problems.is_empty();
    }

    if tools || all {
        println!("\n🧰 Checking hardware tools...");
        let runner = SystemCommandRunner::new(config.command_timeout());
        let problems = check_tools(&runner);
        if problems.is_empty() {
            println!("   ✅ All hardware tools found");
        }
        // Missing tools degrade features; they do not fail the check
        for problem in &problems {
            println!("   ⚠️  {}", problem);
        }

        if let Err(e) = check_user_privileges(config.use_sudo()) {
            println!("   ⚠️  {}", e);
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
