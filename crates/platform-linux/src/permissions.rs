//! Capability detection and guidance for Linux.
//!
//! Recording needs a pointer tool and a display; the estimator
//! additionally needs a working screenshot command.

use std::process::Command;

use crate::display::{detect_display_server, DisplayServer};

/// A system capability pathreplay may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities(screenshot_command: &str) -> Vec<Capability> {
    vec![
        check_display(),
        check_xdotool(),
        check_screenshot(screenshot_command),
    ]
}

/// Whether every required capability is available.
pub fn all_required_available(caps: &[Capability]) -> bool {
    caps.iter().filter(|c| c.required).all(|c| c.available)
}

/// Print a human-readable capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = match (cap.available, cap.required) {
            (true, _) => "[OK]",
            (false, true) => "[MISSING - REQUIRED]",
            (false, false) => "[MISSING - OPTIONAL]",
        };
        println!("  {} {}: {}", status, cap.name, cap.description);
        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

fn check_display() -> Capability {
    let server = detect_display_server();
    let available = server.supports_xdotool();

    Capability {
        name: "X11 Display".to_string(),
        description: format!("Pointer I/O needs an X11 session (detected: {server:?})"),
        available,
        required: true,
        fix_instructions: match server {
            DisplayServer::X11 => None,
            DisplayServer::Wayland => Some(
                "Run under an X11 session, or start the target app under XWayland".to_string(),
            ),
            DisplayServer::Unknown => Some("Set DISPLAY to a running X server".to_string()),
        },
    }
}

fn check_xdotool() -> Capability {
    let available = command_exists("xdotool");

    Capability {
        name: "xdotool".to_string(),
        description: "Reads and moves the pointer".to_string(),
        available,
        required: true,
        fix_instructions: (!available)
            .then(|| "Install xdotool: sudo apt install xdotool".to_string()),
    }
}

fn check_screenshot(command: &str) -> Capability {
    let binary = command.split_whitespace().next().unwrap_or_default();
    let available = !binary.is_empty() && command_exists(binary);

    Capability {
        name: "Screenshot Command".to_string(),
        description: format!("Captures frames for the estimator ({command})"),
        available,
        required: false,
        fix_instructions: (!available).then(|| {
            "Install ImageMagick (sudo apt install imagemagick) or set \
             platform.screenshot_command in config.json"
                .to_string()
        }),
    }
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
