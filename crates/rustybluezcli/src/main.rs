//! RustyBlueZ CLI - scan, connect, and talk GATT to BLE devices

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rustybluez::{BluetoothManager, DbusGateway, ManagerConfig};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = ManagerConfig::default();
    if let Some(adapter) = &cli.adapter {
        config = config.with_adapter_path(adapter.clone());
    }

    let bus = DbusGateway::system().context("Failed to connect to the system bus")?;
    let mut manager = BluetoothManager::new(bus, config)?;

    run(&mut manager, cli.command)
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

fn run(manager: &mut BluetoothManager<DbusGateway>, command: Commands) -> Result<()> {
    match command {
        Commands::Scan { uuid, seconds } => {
            if !manager.start_discovery(uuid.as_deref()) {
                bail!("Failed to start discovery");
            }
            info!("Scanning for {} seconds...", seconds);
            thread::sleep(Duration::from_secs(seconds));
            manager.stop_discovery();
            print_devices(manager, uuid.as_deref());
        }
        Commands::Devices { uuid } => print_devices(manager, uuid.as_deref()),
        Commands::Connect { address, mtu } => {
            if !manager.connect(&address) {
                bail!("Failed to connect to {}", address);
            }
            if let Some(mtu) = mtu {
                manager.request_mtu(&address, mtu);
            }
            println!("Connected to {}", address);
        }
        Commands::Disconnect { address } => {
            if !manager.disconnect(&address) {
                bail!("Failed to disconnect from {}", address);
            }
        }
        Commands::Forget { address } => {
            if !manager.remove(&address) {
                bail!("Failed to remove {}", address);
            }
        }
        Commands::Services { address } => {
            for service in manager.list_services(&address) {
                println!("{}  {}", service.uuid, service.path);
            }
        }
        Commands::Characteristics { service_path } => {
            for characteristic in manager.list_characteristics(&service_path) {
                println!(
                    "{}  {}  [{}]",
                    characteristic.uuid,
                    characteristic.path,
                    characteristic.flags.join(", ")
                );
            }
        }
        Commands::Read {
            characteristic_path,
        } => {
            let value = manager.read(&characteristic_path)?;
            println!("{}", hex::encode(value));
        }
        Commands::Write {
            characteristic_path,
            value,
        } => {
            let data = hex::decode(value.trim_start_matches("0x"))
                .context("Value must be hex encoded")?;
            if !manager.write(&characteristic_path, &data) {
                bail!("Failed to write {}", characteristic_path);
            }
        }
        Commands::Monitor {
            characteristic_path,
            seconds,
        } => monitor(manager, &characteristic_path, Duration::from_secs(seconds))?,
    }

    Ok(())
}

fn print_devices(manager: &BluetoothManager<DbusGateway>, uuid: Option<&str>) {
    for device in manager.list_devices(uuid) {
        println!(
            "{}  {:>4} dBm  {}{}",
            device.address,
            device.rssi,
            device.display_name(),
            if device.connected { "  (connected)" } else { "" }
        );
    }
}

fn monitor(
    manager: &mut BluetoothManager<DbusGateway>,
    characteristic_path: &str,
    duration: Duration,
) -> Result<()> {
    let enabled = manager.enable_notifications(characteristic_path, |value: &[u8]| {
        println!("{}", hex::encode(value));
    });
    if !enabled {
        bail!("Failed to enable notifications on {}", characteristic_path);
    }

    let timeout = manager.config().event_timeout;
    let deadline = Instant::now() + duration;
    let mut pumped = Ok(0);
    while pumped.is_ok() && Instant::now() < deadline {
        pumped = manager.try_process_events(timeout);
    }

    manager.disable_notifications(characteristic_path);
    pumped
        .map(|_| ())
        .context("Lost the bus while monitoring")
}
