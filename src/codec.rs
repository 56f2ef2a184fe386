//! Fixed-size LSP frame encode/decode.
//!
//! The wire layout is little-endian regardless of host byte order,
//! resolving the open question left by the reference implementation
//! (which transmitted its in-memory struct layout verbatim and only
//! worked between same-endian hosts).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ProtocolError;
use crate::model::lsp::{LSPEntry, LSPHeader, LSPPacket, MAX_LSP_ENTRIES};
use crate::model::node_id::{NodeId, MAX_ID_LEN};

const HEADER_LEN: usize = 4 + MAX_ID_LEN + 4 + 4 + 4 + 4;
const ENTRY_LEN: usize = MAX_ID_LEN + 4;

/// Total size of one frame on the wire: the header plus a full-width
/// (always 64-element) entry array.
pub const FRAME_LEN: usize = HEADER_LEN + MAX_LSP_ENTRIES * ENTRY_LEN;

/// Encodes `packet` into a freshly allocated, always-[`FRAME_LEN`]-byte
/// buffer. Entries beyond `packet.header.entries` are zero-filled.
pub fn encode(packet: &LSPPacket) -> Vec<u8> {
    let mut buf = vec![0_u8; FRAME_LEN];
    encode_into(packet, &mut buf);
    buf
}

/// Encodes `packet` into `buf`, which must be exactly [`FRAME_LEN`] bytes.
pub fn encode_into(packet: &LSPPacket, buf: &mut [u8]) {
    assert_eq!(buf.len(), FRAME_LEN, "encode_into requires a FRAME_LEN buffer");

    let h = &packet.header;
    LittleEndian::write_i32(&mut buf[0..4], h.seq_num);
    buf[4..4 + MAX_ID_LEN].copy_from_slice(h.src_id.as_bytes());
    let mut off = 4 + MAX_ID_LEN;
    LittleEndian::write_i32(&mut buf[off..off + 4], h.flags);
    off += 4;
    LittleEndian::write_i32(&mut buf[off..off + 4], h.length);
    off += 4;
    LittleEndian::write_i32(&mut buf[off..off + 4], h.entries);
    off += 4;
    LittleEndian::write_i32(&mut buf[off..off + 4], h.ttl);
    off += 4;
    debug_assert_eq!(off, HEADER_LEN);

    for slot in 0..MAX_LSP_ENTRIES {
        let entry_off = HEADER_LEN + slot * ENTRY_LEN;
        if let Some(entry) = packet.data.get(slot) {
            buf[entry_off..entry_off + MAX_ID_LEN].copy_from_slice(entry.id.as_bytes());
            LittleEndian::write_i32(
                &mut buf[entry_off + MAX_ID_LEN..entry_off + ENTRY_LEN],
                entry.cost,
            );
        }
        // Slots beyond packet.data.len() stay zeroed; they carry no
        // meaning per header.entries, matching the reference's
        // always-full-width frame.
    }
}

/// Decodes a single [`FRAME_LEN`]-byte frame. Rejects frames whose
/// `entries` field is out of the valid `0..=64` range.
pub fn decode(buf: &[u8]) -> Result<LSPPacket, ProtocolError> {
    if buf.len() != FRAME_LEN {
        return Err(ProtocolError::ShortFrame {
            got: buf.len(),
            want: FRAME_LEN,
        });
    }

    let seq_num = LittleEndian::read_i32(&buf[0..4]);
    let mut id_buf = [0_u8; MAX_ID_LEN];
    id_buf.copy_from_slice(&buf[4..4 + MAX_ID_LEN]);
    let src_id = NodeId::from_raw(id_buf);

    let mut off = 4 + MAX_ID_LEN;
    let flags = LittleEndian::read_i32(&buf[off..off + 4]);
    off += 4;
    let length = LittleEndian::read_i32(&buf[off..off + 4]);
    off += 4;
    let entries = LittleEndian::read_i32(&buf[off..off + 4]);
    off += 4;
    let ttl = LittleEndian::read_i32(&buf[off..off + 4]);
    off += 4;
    debug_assert_eq!(off, HEADER_LEN);

    if entries < 0 {
        return Err(ProtocolError::NegativeEntries(entries));
    }
    if entries as usize > MAX_LSP_ENTRIES {
        return Err(ProtocolError::TooManyEntries(entries));
    }

    let mut data = Vec::with_capacity(entries as usize);
    for slot in 0..entries as usize {
        let entry_off = HEADER_LEN + slot * ENTRY_LEN;
        let mut eid = [0_u8; MAX_ID_LEN];
        eid.copy_from_slice(&buf[entry_off..entry_off + MAX_ID_LEN]);
        let cost = LittleEndian::read_i32(&buf[entry_off + MAX_ID_LEN..entry_off + ENTRY_LEN]);
        data.push(LSPEntry {
            id: NodeId::from_raw(eid),
            cost,
        });
    }

    Ok(LSPPacket {
        header: LSPHeader {
            seq_num,
            src_id,
            flags,
            length,
            entries,
            ttl,
        },
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lsp::LSPPacket;

    #[test]
    fn round_trips_a_populated_packet() {
        let packet = LSPPacket::new(
            NodeId::new("A"),
            3,
            0,
            6,
            vec![
                LSPEntry {
                    id: NodeId::new("B"),
                    cost: 1,
                },
                LSPEntry {
                    id: NodeId::new("C"),
                    cost: 4,
                },
            ],
        );
        let encoded = encode(&packet);
        assert_eq!(encoded.len(), FRAME_LEN);
        let decoded = decode(&encoded).expect("decode should succeed");
        assert_eq!(decoded.header.seq_num, 3);
        assert_eq!(decoded.header.src_id, NodeId::new("A"));
        assert_eq!(decoded.header.entries, 2);
        assert_eq!(decoded.data, packet.data);
    }

    #[test]
    fn round_trips_an_empty_packet() {
        let packet = LSPPacket::new(NodeId::new("A"), i32::MAX, 1, 6, Vec::new());
        let encoded = encode(&packet);
        let decoded = decode(&encoded).expect("decode should succeed");
        assert_eq!(decoded.header.entries, 0);
        assert!(decoded.header.is_kill());
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn rejects_oversized_entries_field() {
        let mut buf = vec![0_u8; FRAME_LEN];
        LittleEndian::write_i32(&mut buf[4 + MAX_ID_LEN + 8..4 + MAX_ID_LEN + 12], 65);
        let err = decode(&buf).unwrap_err();
        assert_eq!(err, ProtocolError::TooManyEntries(65));
    }

    #[test]
    fn rejects_short_frames() {
        let err = decode(&[0_u8; 10]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::ShortFrame {
                got: 10,
                want: FRAME_LEN
            }
        );
    }
}
