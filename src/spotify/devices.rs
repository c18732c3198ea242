use std::fmt::Write;

use super::types::Device;

/// Two-column device table: name (active one suffixed `(*)`) and the id to pass
/// as `--device`. Restricted devices cannot be controlled and show `X`.
pub fn render_device_table(devices: &[Device]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<30} ID (pass this with `--device=ID`)", "Device (*=active)");

    for device in devices {
        let id = if device.is_restricted {
            "X"
        } else {
            device.id.as_deref().filter(|id| !id.is_empty()).unwrap_or("?")
        };

        let mut name = device.name.clone();
        if device.is_active {
            name.push_str(" (*)");
        }

        let _ = writeln!(out, "{name:<30} {id}");
    }
    out
}
