use std::path::Path;

use super::error::{AppError, Result};

pub fn detect_system_dark_mode() -> bool {
    // Windows: AppsUseLightTheme registry value (0 = dark)
    #[cfg(target_os = "windows")]
    {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        if let Ok(hkcu) = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
        {
            if let Ok(value) = hkcu.get_value::<u32, _>("AppsUseLightTheme") {
                return value == 0;
            }
        }
    }

    // Linux: GNOME color scheme, then GTK theme name
    #[cfg(target_os = "linux")]
    {
        use std::process::Command;

        if let Ok(output) = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
        {
            if String::from_utf8_lossy(&output.stdout).contains("prefer-dark") {
                return true;
            }
        }

        if let Ok(output) = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "gtk-theme"])
            .output()
        {
            if String::from_utf8_lossy(&output.stdout).to_lowercase().contains("dark") {
                return true;
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        if let Ok(output) = Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
        {
            if output.status.success()
                && String::from_utf8_lossy(&output.stdout).to_lowercase().contains("dark")
            {
                return true;
            }
        }
    }

    false
}

/// Open a local file in the user's default browser.
///
/// This is the desktop counterpart of opening a new browser tab: a failure
/// here means no viewer could be launched, and the caller reports it.
pub fn open_in_browser(path: &Path) -> Result<()> {
    open::that(path).map_err(|e| {
        tracing::warn!(path = %path.display(), "Failed to open viewer: {}", e);
        AppError::Print(format!("Could not open {}: {}", path.display(), e))
    })
}
