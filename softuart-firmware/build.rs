//! Build script for softuart-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates softuart.toml at compile time
//! - Generates `port_config.rs` constants from softuart.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Core clock the demo runs SysTick from
const CORE_CLOCK_HZ: i64 = 125_000_000;
/// SysTick reload bounds (24-bit counter, minimum leaves room for the tick handler)
const SYSTICK_MIN_PERIOD: i64 = 1_000;
const SYSTICK_MAX_PERIOD: i64 = (1 << 24) - 1;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated contents of softuart.toml
struct PortConfig {
    baud_rate: u32,
    banner: String,
    ping_interval_ms: u64,
}

/// Print a boxed error panel and abort the build
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate softuart.toml configuration at compile time
fn validate_config() -> PortConfig {
    // Re-run if softuart.toml changes
    println!("cargo:rerun-if-changed=softuart.toml");

    let config_path = Path::new("softuart.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: softuart.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a softuart.toml configuration file.       ║\n\
            ║  Please create one in the softuart-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read softuart.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid TOML syntax in softuart.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    let baud_rate = validate_port(&config);
    let (banner, ping_interval_ms) = validate_demo(&config);

    PortConfig {
        baud_rate,
        banner,
        ping_interval_ms,
    }
}

/// Validate the [port] section
fn validate_port(config: &toml::Value) -> u32 {
    let mut errors = Vec::new();

    let port = match config.get("port") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail("Invalid port configuration", &["[port] must be a table".into()]),
        None => fail("Invalid port configuration", &["missing [port] section".into()]),
    };

    let baud_rate = match port.get("baud_rate") {
        Some(toml::Value::Integer(baud)) => *baud,
        Some(_) => {
            errors.push("[port] baud_rate must be an integer".to_string());
            0
        }
        None => {
            errors.push("[port] missing 'baud_rate'".to_string());
            0
        }
    };

    if errors.is_empty() {
        if baud_rate <= 0 {
            errors.push("[port] baud_rate must be positive".to_string());
        } else {
            // Same rounding as the runtime period derivation
            let tick_hz = baud_rate * 3;
            let period = (CORE_CLOCK_HZ + tick_hz / 2) / tick_hz;
            if period < SYSTICK_MIN_PERIOD {
                errors.push(format!(
                    "[port] baud_rate {} too fast for SysTick (period {})",
                    baud_rate, period
                ));
            } else if period > SYSTICK_MAX_PERIOD {
                errors.push(format!(
                    "[port] baud_rate {} too slow for SysTick (period {})",
                    baud_rate, period
                ));
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid port configuration", &errors);
    }

    baud_rate as u32
}

/// Validate the [demo] section
fn validate_demo(config: &toml::Value) -> (String, u64) {
    let mut errors = Vec::new();

    let demo = match config.get("demo") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail("Invalid demo configuration", &["[demo] must be a table".into()]),
        None => fail("Invalid demo configuration", &["missing [demo] section".into()]),
    };

    let banner = match demo.get("banner") {
        Some(toml::Value::String(s)) => s.clone(),
        Some(_) => {
            errors.push("[demo] banner must be a string".to_string());
            String::new()
        }
        None => {
            errors.push("[demo] missing 'banner'".to_string());
            String::new()
        }
    };
    if !banner.is_ascii() {
        errors.push("[demo] banner must be ASCII".to_string());
    }

    let ping_interval_ms = match demo.get("ping_interval_ms") {
        Some(toml::Value::Integer(ms)) if (10..=3_600_000).contains(ms) => *ms as u64,
        Some(toml::Value::Integer(_)) => {
            errors.push("[demo] ping_interval_ms must be 10-3600000".to_string());
            0
        }
        Some(_) => {
            errors.push("[demo] ping_interval_ms must be an integer".to_string());
            0
        }
        None => {
            errors.push("[demo] missing 'ping_interval_ms'".to_string());
            0
        }
    };

    if !errors.is_empty() {
        fail("Invalid demo configuration", &errors);
    }

    (banner, ping_interval_ms)
}

/// Write the validated settings as Rust constants into OUT_DIR
fn generate_constants(config: &PortConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("port_config.rs")).unwrap();

    writeln!(f, "// Generated from softuart.toml by build.rs").unwrap();
    writeln!(f, "pub const BAUD_RATE: u32 = {};", config.baud_rate).unwrap();
    writeln!(f, "pub const BANNER: &str = {:?};", config.banner).unwrap();
    writeln!(
        f,
        "pub const PING_INTERVAL_MS: u64 = {};",
        config.ping_interval_ms
    )
    .unwrap();
}
