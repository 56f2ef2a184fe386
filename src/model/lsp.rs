use crate::model::node_id::NodeId;

/// Width of the fixed-size entry array carried by every [`LSPPacket`] on
/// the wire, regardless of how many entries are actually meaningful.
pub const MAX_LSP_ENTRIES: usize = 64;

/// Number of hops an LSP may travel before it is dropped.
pub const INITIAL_TTL: i32 = 6;

/// Bit 0 of [`LSPHeader::flags`]: this is a kill (shutdown) packet.
pub const FLAG_KILL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LSPHeader {
    pub seq_num: i32,
    pub src_id: NodeId,
    pub flags: i32,
    pub length: i32,
    pub entries: i32,
    pub ttl: i32,
}

impl LSPHeader {
    pub fn is_kill(&self) -> bool {
        self.flags & FLAG_KILL != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LSPEntry {
    pub id: NodeId,
    pub cost: i32,
}

/// A full link-state advertisement: a fixed-size header plus a
/// fixed-width entry array. Only `header.entries` of `data` carry
/// meaning; the remainder is always transmitted but ignored on receipt.
#[derive(Debug, Clone)]
pub struct LSPPacket {
    pub header: LSPHeader,
    pub data: Vec<LSPEntry>,
}

impl LSPPacket {
    /// Builds a packet from the first `entries.len()` meaningful slots,
    /// computing `header.length` from the given entry count.
    pub fn new(src_id: NodeId, seq_num: i32, flags: i32, ttl: i32, entries: Vec<LSPEntry>) -> Self {
        let length = (std::mem::size_of::<i32>() * 4
            + crate::model::node_id::MAX_ID_LEN
            + entries.len() * (crate::model::node_id::MAX_ID_LEN + std::mem::size_of::<i32>()))
            as i32;
        Self {
            header: LSPHeader {
                seq_num,
                src_id,
                flags,
                length,
                entries: entries.len() as i32,
                ttl,
            },
            data: entries,
        }
    }

    pub fn entries(&self) -> &[LSPEntry] {
        &self.data
    }
}
