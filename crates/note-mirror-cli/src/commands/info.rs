use note_mirror::DeviceConfig;
use note_mirror_device::{DeviceInfo, device_info};

pub async fn run(config: &DeviceConfig, host: &str, port: u16) -> DeviceInfo {
    let info = device_info(config).await;

    println!("Device IP:       {host}");
    println!("Port:            {port}");
    println!("URL:             {}", info.remote_root);
    println!("Status:          {}", info.status);
    println!("Local directory: {}", config.local_root.display());

    info
}
