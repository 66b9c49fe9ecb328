use std::net::IpAddr;

use note_mirror::DeviceLocator;

/// Run discovery and print what it found.
pub async fn run(locator: &dyn DeviceLocator) -> Option<IpAddr> {
    println!("Scanning the local network for a device...");

    let found = locator.locate().await;
    match found {
        Some(ip) => println!("Found device at {ip}"),
        None => println!("No device found."),
    }

    found
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    struct Fixed(Option<IpAddr>);

    #[async_trait::async_trait]
    impl DeviceLocator for Fixed {
        async fn locate(&self) -> Option<IpAddr> {
            self.0
        }
    }

    #[tokio::test]
    async fn returns_located_address() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(run(&Fixed(Some(ip))).await, Some(ip));
    }

    #[tokio::test]
    async fn nothing_found_is_none() {
        assert_eq!(run(&Fixed(None)).await, None);
    }
}
