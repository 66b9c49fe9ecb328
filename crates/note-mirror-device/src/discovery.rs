use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use note_mirror::{DEFAULT_PORT, DeviceLocator};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("could not determine local address: {0}")]
    LocalAddress(#[from] std::io::Error),

    #[error("local address {0} is not IPv4")]
    NotIpv4(IpAddr),
}

/// Finds the device by probing every host on the local /24 for an open
/// listing port.
#[derive(Debug, Clone)]
pub struct PortScanLocator {
    pub port: u16,
    pub connect_timeout: Duration,
    pub max_attempts: usize,
}

impl Default for PortScanLocator {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(1),
            max_attempts: 100,
        }
    }
}

impl PortScanLocator {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Try `hosts` concurrently and return the first that accepts a
    /// connection on the configured port.
    pub async fn scan(&self, hosts: Vec<IpAddr>) -> Option<IpAddr> {
        let permits = Arc::new(Semaphore::new(self.max_attempts.max(1)));
        let mut attempts = JoinSet::new();

        for host in hosts {
            let permits = Arc::clone(&permits);
            let addr = SocketAddr::new(host, self.port);
            let timeout = self.connect_timeout;

            attempts.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                accepts(addr, timeout).await.then_some(host)
            });
        }

        while let Some(result) = attempts.join_next().await {
            if let Ok(Some(host)) = result {
                tracing::info!(%host, port = self.port, "found open port");
                attempts.abort_all();
                return Some(host);
            }
        }

        tracing::warn!(port = self.port, "no device found");
        None
    }
}

#[async_trait::async_trait]
impl DeviceLocator for PortScanLocator {
    async fn locate(&self) -> Option<IpAddr> {
        let local = match local_ipv4() {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(error = %e, "cannot scan for device");
                return None;
            }
        };

        tracing::info!(network = %format!("{}/24", network_base(local)), port = self.port, "scanning");
        self.scan(subnet_hosts(local)).await
    }
}

async fn accepts(addr: SocketAddr, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// The address the OS would use to reach the internet. A UDP "connect"
/// only selects a route; nothing is sent.
pub fn local_ipv4() -> Result<Ipv4Addr, DiscoveryError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) => Ok(ip),
        other => Err(DiscoveryError::NotIpv4(other)),
    }
}

fn network_base(ip: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = ip.octets();
    Ipv4Addr::new(a, b, c, 0)
}

/// Host addresses `.1` through `.254` of the /24 containing `ip`.
pub fn subnet_hosts(ip: Ipv4Addr) -> Vec<IpAddr> {
    let [a, b, c, _] = ip.octets();
    (1..=254)
        .map(|d| IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn subnet_hosts_cover_slash_24() {
        let hosts = subnet_hosts(Ipv4Addr::new(192, 168, 1, 37));
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts[0], IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(hosts[253], IpAddr::V4(Ipv4Addr::new(192, 168, 1, 254)));
    }

    #[test]
    fn network_base_zeroes_last_octet() {
        assert_eq!(
            network_base(Ipv4Addr::new(10, 0, 7, 99)),
            Ipv4Addr::new(10, 0, 7, 0)
        );
    }

    #[tokio::test]
    async fn scan_finds_listening_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let locator = PortScanLocator {
            port,
            connect_timeout: Duration::from_millis(500),
            max_attempts: 4,
        };

        let found = locator
            .scan(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
            .await;
        assert_eq!(found, Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[tokio::test]
    async fn scan_without_listener_finds_nothing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let locator = PortScanLocator {
            port,
            connect_timeout: Duration::from_millis(200),
            max_attempts: 4,
        };

        assert_eq!(
            locator.scan(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]).await,
            None
        );
    }
}
