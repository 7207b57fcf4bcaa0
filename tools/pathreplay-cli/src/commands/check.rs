//! Check system capabilities.

use pathreplay_common::config::{config_file_path, AppConfig};
use pathreplay_platform_linux::permissions::{
    all_required_available, check_capabilities, print_capability_report,
};
use pathreplay_platform_linux::{detect_display_server, CommandFrameSource, DisplayServer};

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("pathreplay System Check");
    println!("{}", "=".repeat(50));

    match detect_display_server() {
        DisplayServer::Wayland => println!("[WARN] Display server: Wayland"),
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        DisplayServer::Unknown => println!("[WARN] Display server: Unknown"),
    }

    let mut frames = CommandFrameSource::new(config.platform.screenshot_command.clone())?;
    match super::resolve_geometry(&mut frames, true) {
        Ok(geometry) => {
            let (sx, sy) = geometry.scale();
            println!("[OK] Logical size: {}", geometry.logical);
            println!("[OK] Physical size: {}", geometry.physical);
            println!("     Scale: {sx:.3} x {sy:.3}");
        }
        Err(e) => println!("[FAIL] Screen geometry: {e}"),
    }

    let capabilities = check_capabilities(&config.platform.screenshot_command);
    println!();
    print_capability_report(&capabilities);

    println!();
    if all_required_available(&capabilities) {
        println!("All required capabilities are available. pathreplay is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    if write_config {
        config.save()?;
        println!("Config written to: {}", config_file_path().display());
    }

    Ok(())
}
