/// Generates the default `config.toml` contents with explanatory comments.
///
/// This is used by `halo init` to create a starter config file that
/// users can immediately edit.
pub fn generate_config() -> String {
    r##"# Halo configuration
# Location: ~/.config/halo/config.toml

[caption]
# Draw a separator border under the caption bar.
show_caption_border = true
# Allow maximizing via the maximize button and caption double-click.
can_maximize = true
# Show the close and minimize buttons.
show_close_button = true
show_minimize_button = true
# Window border color (hex).
border_color = "#2d2d30"

# Caption menu entries, in display order:
# [[caption.menu]]
# id = "settings"
# label = "Settings"

[glow]
# Draw the glow halo around the window.
enabled = true
# Glow color (hex).
color = "#3c8ce7"
# Halo width around the window, in device-independent units (0 to 64).
margin = 10.0
# Delay after a restore before the glow reappears, in ms (0 to 2000).
# Covers the system restore animation; set to 0 if animations are off.
settle_ms = 150

[logging]
# Enable file logging to ~/.config/halo/logs/halo.log.
enabled = false
# Minimum log level: "debug", "info", "warn", or "error".
level = "info"
# Size of the live log file in MB before it is rotated (0 = never).
max_file_mb = 10
# Rotated files to keep (halo.log.1, halo.log.2, ...).
backups = 1
"##
    .to_string()
}
