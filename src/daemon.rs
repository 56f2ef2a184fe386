//! The router's event loop: periodic self-advertisement, per-neighbor
//! frame polling, and the kill/exit shutdown paths.
//!
//! Mirrors `original_source/routed_LS.c`'s single `while (!done)` loop
//! (advertise check, then one non-blocking read per neighbor socket,
//! then one non-blocking check of stdin) rather than spreading the same
//! logic across threads — there is exactly one router per process and
//! nothing here blocks for long enough to need one.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::codec;
use crate::command::{is_exit_command, CommandReader};
use crate::dedup::DuplicateCache;
use crate::model::link::Link;
use crate::model::lsp::{LSPEntry, LSPPacket, FLAG_KILL, INITIAL_TTL};
use crate::model::node_id::NodeId;
use crate::net::connector::PeerMap;
use crate::routing::RoutingTable;

/// How often this router re-floods its own (fixed, startup-computed)
/// link-state advertisement. The reference checks wall-clock time
/// against a 5-second threshold each loop iteration rather than using a
/// sleeping timer thread; kept as-is since nothing here needs sub-second
/// advertisement precision.
const ADVERTISE_INTERVAL: Duration = Duration::from_secs(5);

pub struct Router {
    self_id: NodeId,
    peers: PeerMap,
    table: RoutingTable,
    dedup: DuplicateCache,
    own_packet: LSPPacket,
    sequence_num: i32,
    last_advertise: Instant,
}

impl Router {
    pub fn new(self_id: NodeId, links: Vec<Link>, peers: PeerMap) -> Self {
        let table = RoutingTable::seeded_from_links(&links);
        let entries = links
            .iter()
            .map(|l| LSPEntry {
                id: l.dest_id,
                cost: l.cost,
            })
            .collect();
        let own_packet = LSPPacket::new(self_id, 0, 0, INITIAL_TTL, entries);

        info!(router = %self_id, links = links.len(), "router initialized");
        log_table(&self_id, &table);

        Self {
            self_id,
            peers,
            table,
            dedup: DuplicateCache::new(),
            own_packet,
            sequence_num: 0,
            // Set to "now", matching the reference's `old_time = new_time
            // = time(NULL)` at loop entry: the first periodic
            // advertisement only fires once a full interval has elapsed,
            // not immediately at startup.
            last_advertise: Instant::now(),
        }
    }

    /// Runs until a kill packet, the `exit` command, or `shutdown` being
    /// raised (a SIGINT handler, say) ends this router's participation.
    /// Never blocks for longer than `poll_interval`.
    pub fn run(&mut self, commands: &CommandReader, poll_interval: Duration, shutdown: &AtomicBool) {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!(router = %self.self_id, "shutdown signal received, flooding kill packet");
                self.send_kill();
                return;
            }

            self.maybe_advertise();

            let done = self.poll_peers();

            if let Some(line) = commands.try_recv() {
                if is_exit_command(&line) {
                    info!(router = %self.self_id, "exit command received, flooding kill packet");
                    self.send_kill();
                    return;
                }
                trace!(router = %self.self_id, command = %line, "unrecognized stdin command");
            }

            if done {
                return;
            }

            std::thread::sleep(poll_interval);
        }
    }

    /// Re-floods the fixed self-advertisement if the interval has
    /// elapsed, bumping the sequence number. The advertised entry list
    /// itself never changes after startup (spec §4.F: no dynamic
    /// topology beyond the kill protocol).
    fn maybe_advertise(&mut self) {
        if self.last_advertise.elapsed() < ADVERTISE_INTERVAL {
            return;
        }
        self.last_advertise = Instant::now();
        self.sequence_num += 1;
        self.own_packet.header.seq_num = self.sequence_num;
        info!(router = %self.self_id, seq = self.sequence_num, "sending advertisement");
        self.broadcast(&self.own_packet, None);
    }

    /// Polls every neighbor socket once for a pending frame, draining
    /// all of them before returning — a kill packet reaching its
    /// terminal point partway through does not cut the sweep short, so
    /// every neighbor still gets its one read this iteration (matching
    /// `original_source/routed_LS.c`'s `for` loop, where `done = 1` does
    /// not `break`). Returns `true` if this router should stop running
    /// once the current iteration finishes.
    fn poll_peers(&mut self) -> bool {
        let peer_ids: Vec<NodeId> = self.peers.iter().map(|(id, _)| *id).collect();
        let mut done = false;
        for from in peer_ids {
            match self.read_frame(from) {
                Ok(Some(packet)) => {
                    if self.handle_frame(from, packet) {
                        done = true;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(router = %self.self_id, neighbor = %from, error = %err, "peer read error");
                }
            }
        }
        done
    }

    fn read_frame(&mut self, from: NodeId) -> std::io::Result<Option<LSPPacket>> {
        let stream = self
            .peers
            .iter_mut()
            .find(|(id, _)| *id == from)
            .map(|(_, s)| s)
            .expect("from is drawn from self.peers");

        let mut buf = vec![0_u8; codec::FRAME_LEN];
        match stream.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => match codec::decode(&buf[..n]) {
                Ok(packet) => Ok(Some(packet)),
                Err(err) => {
                    debug!(router = %self.self_id, neighbor = %from, error = %err, "dropped malformed frame");
                    Ok(None)
                }
            },
            Err(err) if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Applies the freshness/forwarding/termination rules for one
    /// incoming packet. Returns `true` if the caller should stop the
    /// event loop (this node has now relayed its own kill-chain
    /// contribution and is done).
    fn handle_frame(&mut self, from: NodeId, packet: LSPPacket) -> bool {
        let src_id = packet.header.src_id;
        if !self.dedup.is_fresh(src_id, packet.header.seq_num) {
            return false;
        }

        info!(router = %self.self_id, from = %from, source = %src_id, "received LSP");
        for entry in packet.entries() {
            info!(router = %self.self_id, source = %src_id, id = %entry.id, cost = entry.cost, "LSP entry");
        }

        if packet.header.is_kill() {
            info!(router = %self.self_id, source = %src_id, "kill packet received");
            let mut relayed = packet;
            relayed.header.src_id = self.self_id;
            relayed.header.ttl -= 1;
            if relayed.header.ttl > 0 {
                self.broadcast(&relayed, Some(from));
            }
            return true;
        }

        self.dedup.record(src_id, packet.header.seq_num);
        let is_direct_neighbor = self.peers.iter().any(|(id, _)| *id == src_id);
        self.table.apply_update(&packet, self.self_id, is_direct_neighbor);
        log_table(&self.self_id, &self.table);

        let mut forwarded = packet;
        forwarded.header.ttl -= 1;
        if forwarded.header.ttl > 0 {
            info!(router = %self.self_id, "forwarding...");
            self.broadcast(&forwarded, Some(src_id));
        }
        false
    }

    /// Builds this router's own kill packet (full TTL, `src_id` =
    /// self) and floods it to every neighbor. Used by the `exit`
    /// command path; there is no `from` to exclude since the kill
    /// originates here.
    fn send_kill(&self) {
        let kill = LSPPacket::new(self.self_id, i32::MAX, FLAG_KILL, INITIAL_TTL, Vec::new());
        self.broadcast(&kill, None);
    }

    /// Sends `packet` to every neighbor except `exclude` (forwarding
    /// exclusion is by the logical source id carried in the frame, not
    /// by which socket physically delivered it).
    fn broadcast(&self, packet: &LSPPacket, exclude: Option<NodeId>) {
        let frame = codec::encode(packet);
        for (id, stream) in &self.peers {
            if Some(*id) == exclude {
                continue;
            }
            if let Err(err) = write_frame(stream, &frame) {
                warn!(router = %self.self_id, neighbor = %id, error = %err, "send failed");
            }
        }
    }
}

fn write_frame(mut stream: &TcpStream, frame: &[u8]) -> std::io::Result<()> {
    match stream.write_all(frame) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(()),
        Err(err) => Err(err),
    }
}

fn log_table(self_id: &NodeId, table: &RoutingTable) {
    for entry in table.snapshot() {
        info!(
            router = %self_id,
            dest = %entry.dest_id,
            cost = entry.cost,
            out_port = entry.out_port,
            dest_port = entry.dest_port,
            "route"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{TcpListener, TcpStream};

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        client.set_nonblocking(true).unwrap();
        server.set_nonblocking(true).unwrap();
        (client, server)
    }

    fn link(dest: &str, cost: i32, out_port: u16, dest_port: u16) -> Link {
        Link {
            dest_id: NodeId::new(dest),
            cost,
            out_port,
            dest_port,
        }
    }

    #[test]
    fn forwards_a_fresh_lsp_to_other_neighbors_but_not_the_sender() {
        let (b_side, b_far) = loopback_pair(); // router <-> B
        let (c_side, c_far) = loopback_pair(); // router <-> C

        let links = vec![link("B", 1, 0, 0), link("C", 1, 0, 0)];
        let peers = vec![(NodeId::new("B"), b_side), (NodeId::new("C"), c_side)];
        let mut router = Router::new(NodeId::new("A"), links, peers);

        let incoming = LSPPacket::new(
            NodeId::new("B"),
            1,
            0,
            6,
            vec![LSPEntry {
                id: NodeId::new("D"),
                cost: 9,
            }],
        );
        let stopped = router.handle_frame(NodeId::new("B"), incoming);
        assert!(!stopped);

        // C should have received the forwarded frame...
        let mut buf = vec![0_u8; codec::FRAME_LEN];
        let mut c_far = c_far;
        let n = c_far.read(&mut buf).expect("C should receive a forward");
        let forwarded = codec::decode(&buf[..n]).unwrap();
        assert_eq!(forwarded.header.src_id, NodeId::new("B"));
        assert_eq!(forwarded.header.ttl, 5);

        // ...but B (the sender) should not have received its own LSP back.
        let mut b_far = b_far;
        let err = b_far.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);

        let route = router.table.get(NodeId::new("D")).expect("D should be routable");
        assert_eq!(route.cost, 10);
    }

    #[test]
    fn kill_packet_rewrites_source_and_decrements_ttl_before_relaying() {
        let (b_side, b_far) = loopback_pair();
        let (c_side, c_far) = loopback_pair();
        let links = vec![link("B", 1, 0, 0), link("C", 1, 0, 0)];
        let peers = vec![(NodeId::new("B"), b_side), (NodeId::new("C"), c_side)];
        let mut router = Router::new(NodeId::new("A"), links, peers);

        let kill = LSPPacket::new(NodeId::new("Z"), i32::MAX, FLAG_KILL, 6, Vec::new());
        let stopped = router.handle_frame(NodeId::new("B"), kill);
        assert!(stopped);

        let mut buf = vec![0_u8; codec::FRAME_LEN];
        let mut c_far = c_far;
        let n = c_far.read(&mut buf).expect("C should receive the relayed kill");
        let relayed = codec::decode(&buf[..n]).unwrap();
        assert!(relayed.header.is_kill());
        assert_eq!(relayed.header.src_id, NodeId::new("A"));
        assert_eq!(relayed.header.ttl, 5);

        let mut b_far = b_far;
        let err = b_far.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
    }

    #[test]
    fn duplicate_lsp_is_dropped_without_a_second_forward() {
        let (b_side, _b_far) = loopback_pair();
        let (c_side, c_far) = loopback_pair();
        let links = vec![link("B", 1, 0, 0), link("C", 1, 0, 0)];
        let peers = vec![(NodeId::new("B"), b_side), (NodeId::new("C"), c_side)];
        let mut router = Router::new(NodeId::new("A"), links, peers);

        let packet = LSPPacket::new(NodeId::new("B"), 4, 0, 6, Vec::new());
        assert!(!router.handle_frame(NodeId::new("B"), packet.clone()));
        assert!(!router.handle_frame(NodeId::new("B"), packet));

        let mut buf = vec![0_u8; codec::FRAME_LEN];
        let mut c_far = c_far;
        c_far.read(&mut buf).expect("first forward should arrive");
        let err = c_far.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
    }

    #[test]
    fn poll_peers_drains_every_neighbor_even_after_a_kill_arrives_mid_sweep() {
        let (b_side, mut b_far) = loopback_pair();
        let (c_side, c_far) = loopback_pair();
        let (d_side, mut d_far) = loopback_pair();
        let links = vec![link("B", 1, 0, 0), link("C", 1, 0, 0), link("D", 1, 0, 0)];
        let peers = vec![
            (NodeId::new("B"), b_side),
            (NodeId::new("C"), c_side),
            (NodeId::new("D"), d_side),
        ];
        let mut router = Router::new(NodeId::new("A"), links, peers);

        // B (polled first) delivers a kill; D (polled last) delivers a
        // regular, still-fresh LSP in the same sweep.
        let kill = LSPPacket::new(NodeId::new("Z"), i32::MAX, FLAG_KILL, 6, Vec::new());
        b_far.write_all(&codec::encode(&kill)).unwrap();
        let regular = LSPPacket::new(
            NodeId::new("D"),
            1,
            0,
            6,
            vec![LSPEntry {
                id: NodeId::new("E"),
                cost: 2,
            }],
        );
        d_far.write_all(&codec::encode(&regular)).unwrap();

        let done = router.poll_peers();
        assert!(done, "a kill reaching its terminal point should report done");

        // D's frame must still have been applied and forwarded, proving
        // the sweep did not stop at B.
        let route = router.table.get(NodeId::new("E")).expect("E should be routable via D");
        assert_eq!(route.cost, 3);

        let mut buf = vec![0_u8; codec::FRAME_LEN];
        let mut c_far = c_far;
        let n = c_far
            .read(&mut buf)
            .expect("C should receive D's forwarded LSP");
        let forwarded = codec::decode(&buf[..n]).unwrap();
        assert_eq!(forwarded.header.src_id, NodeId::new("D"));
    }
}
