use crate::model::node_id::NodeId;

/// A direct neighbor record read from the initialization file.
///
/// Immutable after load; owned by the router process for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub dest_id: NodeId,
    pub cost: i32,
    pub out_port: u16,
    pub dest_port: u16,
}

/// A routing-table entry: same shape as [`Link`], but `out_port`/
/// `dest_port` identify the first hop used to reach `dest_id`, not
/// necessarily a direct link to `dest_id` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub dest_id: NodeId,
    pub cost: i32,
    pub out_port: u16,
    pub dest_port: u16,
}

impl From<Link> for RouteEntry {
    fn from(link: Link) -> Self {
        Self {
            dest_id: link.dest_id,
            cost: link.cost,
            out_port: link.out_port,
            dest_port: link.dest_port,
        }
    }
}
