//! Build script for strutlight-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates installation.toml at compile time
//! - Generates geometry.rs with the buffer sizes

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIO pins usable for strand output on the RP2040
const MAX_GPIO: i64 = 29;

fn main() {
    setup_linker();
    let total = validate_config();
    generate_geometry(total);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Write the compile-time pixel count for buffer sizing
fn generate_geometry(total: usize) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("geometry.rs")).unwrap();
    writeln!(f, "/// Pixels in the installation (from installation.toml)").unwrap();
    writeln!(f, "pub const TOTAL_LEDS: usize = {};", total).unwrap();
    writeln!(f, "/// Bytes in one full frame").unwrap();
    writeln!(f, "pub const FRAME_BYTES: usize = {};", total * 3).unwrap();
}

/// Print a boxed error report and abort the build
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate installation.toml, returning the total pixel count
fn validate_config() -> usize {
    println!("cargo:rerun-if-changed=installation.toml");

    let config_path = Path::new("installation.toml");

    if !config_path.exists() {
        fail(
            "installation.toml not found",
            &["Create one in the strutlight-firmware directory".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read installation.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e
                .to_string()
                .lines()
                .map(|line| {
                    if line.len() > 62 {
                        format!("{}...", &line[..59])
                    } else {
                        line.to_string()
                    }
                })
                .collect();
            fail("Invalid TOML syntax in installation.toml", &lines);
        }
    };

    let total = validate_leds(&config);
    validate_transport(&config);
    validate_segments(&config, total);

    println!("cargo:warning=installation.toml validated successfully");
    total as usize
}

fn int_in_range(
    table: &toml::Table,
    key: &str,
    section: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => None,
    }
}

/// Validate the [leds] section, returning the total
fn validate_leds(config: &toml::Value) -> i64 {
    let leds = match config.get("leds") {
        Some(toml::Value::Table(t)) => t,
        _ => fail(
            "Missing required sections in installation.toml",
            &["Missing [leds] section".to_string()],
        ),
    };

    let mut errors = Vec::new();

    let total = int_in_range(leds, "total", "leds", 1..=u16::MAX as i64, &mut errors);
    if leds.get("total").is_none() {
        errors.push("[leds] missing 'total'".to_string());
    }

    if let Some(bpp) = int_in_range(leds, "bytes_per_pixel", "leds", 0..=255, &mut errors) {
        if bpp != 3 {
            errors.push("[leds] bytes_per_pixel must be 3".to_string());
        }
    }

    if let Some(order) = leds.get("color_order") {
        let valid = ["rgb", "rbg", "grb", "gbr", "brg", "bgr"];
        match order.as_str() {
            Some(o) if valid.contains(&o.to_ascii_lowercase().as_str()) => {}
            _ => errors.push("[leds] color_order must be one of rgb, grb, bgr, ...".to_string()),
        }
    }

    int_in_range(leds, "brightness", "leds", 0..=255, &mut errors);
    int_in_range(leds, "fps", "leds", 1..=1000, &mut errors);

    if !errors.is_empty() {
        fail("Invalid [leds] configuration", &errors);
    }

    total.unwrap_or(0)
}

/// Validate the optional [transport] section
fn validate_transport(config: &toml::Value) {
    let transport = match config.get("transport") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail(
            "Invalid [transport] configuration",
            &["[transport] must be a table".to_string()],
        ),
        None => return,
    };

    let mut errors = Vec::new();

    if let Some(kind) = transport.get("kind") {
        match kind.as_str() {
            Some("udp" | "websocket" | "tcp" | "serial") => {}
            _ => errors.push("[transport] kind must be 'udp', 'websocket' or 'serial'".to_string()),
        }
    }

    int_in_range(transport, "udp_port", "transport", 1..=65535, &mut errors);
    int_in_range(transport, "websocket_port", "transport", 1..=65535, &mut errors);
    int_in_range(transport, "baud_rate", "transport", 300..=4_000_000, &mut errors);
    int_in_range(
        transport,
        "serial_idle_timeout_ms",
        "transport",
        0..=u32::MAX as i64,
        &mut errors,
    );

    if !errors.is_empty() {
        fail("Invalid [transport] configuration", &errors);
    }
}

/// Validate [segment.*] sections and the partition of the pixel buffer
fn validate_segments(config: &toml::Value, total: i64) {
    let segments = match config.get("segment") {
        Some(toml::Value::Table(t)) if !t.is_empty() => t,
        _ => fail(
            "Missing required sections in installation.toml",
            &["Missing [segment.*] section - at least one segment is required".to_string()],
        ),
    };

    let mut errors = Vec::new();
    let mut pins = HashSet::new();
    let mut sum = 0i64;

    if segments.len() > 8 {
        errors.push("At most 8 segments are supported".to_string());
    }

    for (name, segment) in segments {
        let segment = match segment {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[segment.{}] must be a table", name));
                continue;
            }
        };

        match segment.get("pin").and_then(|p| p.as_str()) {
            Some(pin) => match pin.strip_prefix("gpio").and_then(|n| n.parse::<i64>().ok()) {
                Some(n) if (0..=MAX_GPIO).contains(&n) => {
                    if !pins.insert(n) {
                        errors.push(format!("[segment.{}] pin gpio{} is already used", name, n));
                    }
                }
                _ => errors.push(format!("[segment.{}] pin must be \"gpio0\"-\"gpio29\"", name)),
            },
            None => errors.push(format!("[segment.{}] missing 'pin'", name)),
        }

        match segment.get("length") {
            Some(toml::Value::Integer(len)) if *len > 0 => sum += len,
            Some(_) => errors.push(format!("[segment.{}] length must be positive", name)),
            None => errors.push(format!("[segment.{}] missing 'length'", name)),
        }
    }

    if errors.is_empty() && sum != total {
        errors.push(format!(
            "Segment lengths sum to {} but [leds] total is {}",
            sum, total
        ));
    }

    if !errors.is_empty() {
        fail("Invalid segment configuration", &errors);
    }
}
