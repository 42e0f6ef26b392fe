/// SSDP discovery of Roku devices
///
/// Sends an M-SEARCH for the `roku:ecp` search target and collects the
/// `LOCATION` of every distinct responder until either enough devices have
/// answered or the collection window closes.
use rokuecp_core::{Result, RokuError};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Search target advertised by devices that speak ECP
pub const ECP_SEARCH_TARGET: &str = "roku:ecp";

/// Default collection window
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

const SSDP_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);
const SSDP_MX: u8 = 3; // Max wait time in seconds
const RESEND_INTERVAL: Duration = Duration::from_secs(1);
const ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// What to look for and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// IPv4 address of the interface to search on (`None` for the default route)
    pub interface: Option<Ipv4Addr>,
    /// Stop as soon as this many devices have answered
    pub max_devices: usize,
    pub timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            interface: None,
            max_devices: 8,
            timeout: DISCOVERY_TIMEOUT,
        }
    }
}

/// Source of SSDP responses
pub trait SsdpSource {
    /// Send (or re-send) the M-SEARCH request
    fn search(&mut self) -> io::Result<()>;

    /// Wait up to `wait` for the next datagram; `Ok(None)` when none arrived
    fn recv(&mut self, wait: Duration) -> io::Result<Option<String>>;
}

/// SSDP over a UDP socket
pub struct UdpSsdpSource {
    socket: UdpSocket,
}

impl UdpSsdpSource {
    /// Bind a socket for SSDP search on `interface` (any interface when `None`)
    pub fn bind(interface: Option<Ipv4Addr>) -> io::Result<Self> {
        let interface_addr = interface.unwrap_or(Ipv4Addr::UNSPECIFIED);

        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )?;

        // Coexist with other SSDP clients on the same host
        socket.set_reuse_address(true)?;

        let addr = SocketAddr::V4(SocketAddrV4::new(interface_addr, 0));
        socket.bind(&addr.into())?;

        if interface.is_some() {
            socket.set_multicast_if_v4(&interface_addr)?;
        }
        socket.set_multicast_ttl_v4(2)?;

        let socket: UdpSocket = socket.into();
        info!("SSDP socket bound to: {}", socket.local_addr()?);

        Ok(Self { socket })
    }
}

impl SsdpSource for UdpSsdpSource {
    fn search(&mut self) -> io::Result<()> {
        let bytes_sent = self.socket.send_to(msearch_request().as_bytes(), SSDP_ADDR)?;
        debug!("Sent M-SEARCH for {} ({} bytes to {})", ECP_SEARCH_TARGET, bytes_sent, SSDP_ADDR);
        Ok(())
    }

    fn recv(&mut self, wait: Duration) -> io::Result<Option<String>> {
        // A zero read timeout is rejected by the OS
        self.socket.set_read_timeout(Some(wait.max(Duration::from_millis(1))))?;

        let mut buf = [0u8; 2048];
        match self.socket.recv_from(&mut buf) {
            Ok((len, addr)) => {
                debug!("Received SSDP response from {} ({} bytes)", addr, len);
                Ok(Some(String::from_utf8_lossy(&buf[..len]).into_owned()))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// M-SEARCH request for ECP devices
pub fn msearch_request() -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         \r\n",
        SSDP_ADDR, SSDP_MX, ECP_SEARCH_TARGET
    )
}

/// `LOCATION` of an SSDP search response for ECP, if it is one
///
/// The search socket listens on an ephemeral port, so only unicast answers to
/// the M-SEARCH arrive there; multicast NOTIFY announcements are rejected.
pub fn parse_ssdp_location(message: &str) -> Option<String> {
    let mut lines = message.lines();
    let start_line = lines.next()?.trim();
    if !start_line.starts_with("HTTP/1.1 200") && !start_line.starts_with("HTTP/1.0 200") {
        return None;
    }

    let mut location = None;
    let mut target_matches = false;

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "location" => location = Some(value.to_string()),
            "st" => target_matches = value.eq_ignore_ascii_case(ECP_SEARCH_TARGET),
            _ => {}
        }
    }

    if !target_matches {
        return None;
    }
    location.filter(|l| !l.is_empty())
}

/// Collect up to `max` distinct ECP locations from `source` within `timeout`
///
/// Returns early once `max` devices answered; otherwise runs until the window
/// closes, re-sending the search every second.
pub fn collect_locations<S: SsdpSource>(source: &mut S, max: usize, timeout: Duration) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    if max == 0 {
        return locations;
    }

    let deadline = Instant::now() + timeout;
    let mut next_search = Instant::now();

    while locations.len() < max {
        let now = Instant::now();
        if now >= deadline {
            break;
        }

        if now >= next_search {
            if let Err(e) = source.search() {
                warn!("Failed to send M-SEARCH: {}", e);
            }
            next_search = now + RESEND_INTERVAL;
        }

        let wait = deadline.min(next_search).saturating_duration_since(now);
        match source.recv(wait) {
            Ok(Some(message)) => {
                if let Some(location) = parse_ssdp_location(&message) {
                    if !locations.contains(&location) {
                        info!("Discovered Roku device at {}", location);
                        locations.push(location);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Socket error during discovery: {}", e);
                std::thread::sleep(ERROR_BACKOFF.min(deadline.saturating_duration_since(Instant::now())));
            }
        }
    }

    locations
}

/// Find Roku devices on the local network
///
/// Returns the ECP base URLs of up to `options.max_devices` devices; an empty
/// list means nobody answered. Failing to set up the socket is an error.
pub fn find_devices(options: &DiscoveryOptions) -> Result<Vec<String>> {
    info!(
        "Starting Roku discovery ({}s timeout, max {} device(s))",
        options.timeout.as_secs_f32(),
        options.max_devices
    );

    let mut source = UdpSsdpSource::bind(options.interface).map_err(|e| {
        warn!("Failed to open SSDP socket: {}", e);
        RokuError::Discovery(e)
    })?;

    let locations = collect_locations(&mut source, options.max_devices, options.timeout);
    info!("Roku discovery complete, found {} device(s)", locations.len());
    Ok(locations)
}

/// Find up to `max_devices` Roku devices on any interface with the default window
pub fn find_roku_devices(max_devices: usize) -> Result<Vec<String>> {
    find_devices(&DiscoveryOptions {
        max_devices,
        ..Default::default()
    })
}
