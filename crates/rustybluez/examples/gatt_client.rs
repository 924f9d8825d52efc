use rustybluez::{BluetoothManager, DbusGateway, ManagerConfig};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = DbusGateway::system()?;
    let mut manager = BluetoothManager::new(bus, ManagerConfig::default())?;

    // Ask user which device to connect to
    println!("Enter MAC address of device to connect to (format: XX:XX:XX:XX:XX:XX):");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let address = input.trim().to_uppercase();

    println!("Connecting to {}...", address);
    if !manager.connect(&address) {
        return Err(format!("Could not connect to {}", address).into());
    }
    manager.request_mtu(&address, 247);

    let device = manager.device_path(&address);
    manager.register_disconnect_watch(&device, |path: &str| {
        println!("{} disconnected", path);
    });

    // Walk the GATT hierarchy, remembering the first notify characteristic
    let mut notify_path = None;
    for service in manager.list_services(&address) {
        println!("Service {}", service);
        for characteristic in manager.list_characteristics(&service.path) {
            println!("  Characteristic {}", characteristic);

            let flags = characteristic.properties();
            if flags.can_read() {
                match manager.read(&characteristic.path) {
                    Ok(value) => println!("    Value: {}", hex::encode(value)),
                    Err(e) => println!("    Read failed: {}", e),
                }
            }
            if flags.can_notify() && notify_path.is_none() {
                notify_path = Some(characteristic.path.clone());
            }
        }
    }

    if let Some(path) = notify_path {
        println!("\nListening for notifications on {} for 10 seconds...", path);
        manager.enable_notifications(&path, |value: &[u8]| {
            println!("Notification: {}", hex::encode(value));
        });

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline && manager.has_disconnect_watch(&device) {
            manager.process_events(Duration::from_millis(100));
        }

        manager.disable_notifications(&path);
        manager.cleanup_device(&device);
    }

    manager.disconnect(&address);
    Ok(())
}
