//! Listening-socket lookup.

use std::io;

/// TCP state code for LISTEN in the kernel socket tables
const TCP_LISTEN: &str = "0A";

/// Whether something on this host is listening on TCP `port`.
#[cfg(target_os = "linux")]
pub fn is_port_listening(port: u16) -> io::Result<bool> {
    let mut last_error = None;
    let mut read_any = false;

    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        match std::fs::read_to_string(table) {
            Ok(content) => {
                read_any = true;
                if listening_ports(&content).any(|p| p == port) {
                    return Ok(true);
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    match (read_any, last_error) {
        (false, Some(e)) => Err(e),
        _ => Ok(false),
    }
}

/// Whether something on this host is listening on TCP `port`.
///
/// Without kernel socket tables, probe with a short loopback connect.
#[cfg(not(target_os = "linux"))]
pub fn is_port_listening(port: u16) -> io::Result<bool> {
    use std::net::{Ipv4Addr, SocketAddr, TcpStream};
    use std::time::Duration;

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
        Ok(_) => Ok(true),
        Err(e) if matches!(
            e.kind(),
            io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut
        ) =>
        {
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Local ports in LISTEN state from a `/proc/net/tcp`-formatted table.
pub fn listening_ports(content: &str) -> impl Iterator<Item = u16> + '_ {
    content.lines().skip(1).filter_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[3] != TCP_LISTEN {
            return None;
        }

        let (_, port_hex) = fields[1].rsplit_once(':')?;
        u16::from_str_radix(port_hex, 16).ok().filter(|p| *p != 0)
    })
}
