use rustybluez::{BluetoothManager, DbusGateway, ManagerConfig};
use std::error::Error;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    // Connect to BlueZ and pick an adapter
    let bus = DbusGateway::system()?;
    let manager = BluetoothManager::new(bus, ManagerConfig::default())?;
    println!("Using adapter {}", manager.adapter_path());

    // Optional service UUID filter from the command line
    let filter = std::env::args().nth(1);

    println!("Starting device discovery...");
    if !manager.start_discovery(filter.as_deref()) {
        return Err("Failed to start discovery".into());
    }

    for i in 0..10 {
        println!("Scanning... {}/10", i + 1);
        thread::sleep(Duration::from_secs(1));
    }

    manager.stop_discovery();
    println!("Discovery stopped");

    let devices = manager.list_devices(filter.as_deref());
    println!("\nDiscovered {} device(s):", devices.len());

    for (i, device) in devices.iter().enumerate() {
        println!("{}. {} - {}", i + 1, device.address, device.display_name());
        println!("   RSSI: {} dBm", device.rssi);
        println!(
            "   Paired: {}, Trusted: {}, Connected: {}",
            device.paired, device.trusted, device.connected
        );
        if !device.uuids.is_empty() {
            println!("   Service UUIDs: {:?}", device.uuids);
        }
        println!();
    }

    Ok(())
}
