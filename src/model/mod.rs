pub mod link;
pub mod lsp;
pub mod node_id;
