//! Neighbor connector: establishes one bidirectional, non-blocking TCP
//! stream per direct neighbor using a symmetric connect-or-listen
//! bootstrap (spec.md §4.B) — every neighbor link has one listener and
//! one connector, with no central coordination, provided both sides'
//! init files agree on the port pair.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};

use socket2::{Domain, SockAddr, Socket, Type};
use tracing::debug;

use crate::error::SocketBootstrapError;
use crate::model::link::Link;
use crate::model::node_id::NodeId;

/// One stream per direct neighbor, in the same order as the `Link`s
/// passed to [`connect_all`].
pub type PeerMap = Vec<(NodeId, TcpStream)>;

pub fn connect_all(links: &[Link]) -> Result<PeerMap, SocketBootstrapError> {
    let mut peers = Vec::with_capacity(links.len());
    for link in links {
        let stream = bootstrap_one(link)?;
        stream
            .set_nonblocking(true)
            .map_err(|source| SocketBootstrapError::Socket {
                neighbor: link.dest_id.to_string(),
                source,
            })?;
        peers.push((link.dest_id, stream));
    }
    Ok(peers)
}

/// Binds the local port, then attempts a connect; if the peer isn't
/// listening yet, turns the same socket into a listener and accepts.
/// This is the `{AttemptingConnect -> Connected} ∪ {Listening ->
/// Accepted}` state machine from spec.md §9, expressed as two
/// branches on one bound socket rather than exception control flow.
fn bootstrap_one(link: &Link) -> Result<TcpStream, SocketBootstrapError> {
    let local = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, link.out_port));
    let remote = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, link.dest_port));

    let socket = Socket::new(Domain::IPV4, Type::STREAM, None).map_err(|source| {
        SocketBootstrapError::Socket {
            neighbor: link.dest_id.to_string(),
            source,
        }
    })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| SocketBootstrapError::Socket {
            neighbor: link.dest_id.to_string(),
            source,
        })?;
    socket
        .bind(&SockAddr::from(local))
        .map_err(|source| SocketBootstrapError::Bind {
            neighbor: link.dest_id.to_string(),
            port: link.out_port,
            source,
        })?;

    debug!(
        neighbor = %link.dest_id,
        local_port = link.out_port,
        remote_port = link.dest_port,
        "attempting connect"
    );

    match socket.connect(&SockAddr::from(remote)) {
        Ok(()) => {
            debug!(neighbor = %link.dest_id, "connected");
            Ok(TcpStream::from(socket))
        }
        Err(_connect_err) => {
            debug!(neighbor = %link.dest_id, "connect failed, listening instead");
            socket
                .listen(10)
                .map_err(|source| SocketBootstrapError::Listen {
                    neighbor: link.dest_id.to_string(),
                    source,
                })?;
            let (accepted, _addr) =
                socket
                    .accept()
                    .map_err(|source| SocketBootstrapError::Accept {
                        neighbor: link.dest_id.to_string(),
                        source,
                    })?;
            Ok(TcpStream::from(accepted))
        }
    }
}
