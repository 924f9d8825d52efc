//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Manage BLE devices through BlueZ", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Adapter object path to prefer
    #[arg(short, long, global = true)]
    pub adapter: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover nearby devices
    Scan {
        /// Only report devices advertising this service UUID
        #[arg(short, long)]
        uuid: Option<String>,
        /// How long to scan
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,
    },
    /// List devices the adapter already knows
    Devices {
        /// Only list devices advertising this service UUID
        #[arg(short, long)]
        uuid: Option<String>,
    },
    /// Connect to a device
    Connect {
        /// Device address (AA:BB:CC:DD:EE:FF)
        address: String,
        /// MTU to request once connected
        #[arg(short, long)]
        mtu: Option<u16>,
    },
    /// Disconnect from a device
    Disconnect { address: String },
    /// Remove a device and its pairing
    Forget { address: String },
    /// List the GATT services of a connected device
    Services { address: String },
    /// List the characteristics of a service
    Characteristics { service_path: String },
    /// Read a characteristic value
    Read { characteristic_path: String },
    /// Write a hex-encoded value to a characteristic
    Write {
        characteristic_path: String,
        /// Value as hex, e.g. 0102ff
        value: String,
    },
    /// Print notifications from a characteristic
    Monitor {
        characteristic_path: String,
        /// How long to listen
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
    },
}
