use std::fmt;

/// Maximum length of a router identifier, matching the wire layout's
/// fixed 24-byte field.
pub const MAX_ID_LEN: usize = 24;

/// A router identifier: a short ASCII string, compared bytewise.
///
/// Stored as a fixed 24-byte null-padded buffer so it round-trips onto
/// the wire without allocation or re-encoding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId([u8; MAX_ID_LEN]);

impl NodeId {
    pub fn new(text: &str) -> Self {
        let mut buf = [0_u8; MAX_ID_LEN];
        let bytes = text.as_bytes();
        let n = bytes.len().min(MAX_ID_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        Self(buf)
    }

    pub fn from_raw(raw: [u8; MAX_ID_LEN]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; MAX_ID_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(MAX_ID_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeId {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for NodeId {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_ids() {
        let id = NodeId::new("A");
        assert_eq!(id.as_str(), "A");
        assert_eq!(id, NodeId::new("A"));
    }

    #[test]
    fn truncates_overlong_ids() {
        let long = "X".repeat(40);
        let id = NodeId::new(&long);
        assert_eq!(id.as_str().len(), MAX_ID_LEN);
    }

    #[test]
    fn orders_bytewise() {
        assert!(NodeId::new("A") < NodeId::new("B"));
        assert!(NodeId::new("B") < NodeId::new("C"));
    }
}
