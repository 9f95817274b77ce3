//! Demo settings generated from softuart.toml by build.rs

include!(concat!(env!("OUT_DIR"), "/port_config.rs"));
