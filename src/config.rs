//! Loads this router's direct neighbor links from an initialization
//! file.
//!
//! Each line is `SRC OUT_PORT DEST DEST_PORT COST`, tokens separated by
//! any of the delimiters ` `, `,`, `<`, `>`. A line is kept only when
//! its first token equals this router's id.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::model::link::Link;
use crate::model::node_id::NodeId;

const DELIMITERS: [char; 4] = [' ', ',', '<', '>'];

pub fn load_links(path: &Path, router_id: &str) -> Result<Vec<Link>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_links(&text, router_id)
}

pub fn parse_links(text: &str, router_id: &str) -> Result<Vec<Link>, ConfigError> {
    let mut links = Vec::new();
    let mut seen_dest: BTreeSet<NodeId> = BTreeSet::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = raw_line.split(|c: char| DELIMITERS.contains(&c)).filter(|t| !t.is_empty());

        let Some(src) = tokens.next() else {
            continue;
        };
        if src != router_id {
            continue;
        }

        let rest: Vec<&str> = tokens.collect();
        if rest.len() < 4 {
            return Err(ConfigError::TooFewTokens {
                line_no,
                line: raw_line.to_string(),
            });
        }
        let (out_port_tok, dest_tok, dest_port_tok, cost_tok) =
            (rest[0], rest[1], rest[2], rest[3]);

        let out_port: u16 = out_port_tok
            .parse()
            .map_err(|_| ConfigError::NotAnInteger {
                line_no,
                token: out_port_tok.to_string(),
            })?;
        let dest_port: u16 = dest_port_tok
            .parse()
            .map_err(|_| ConfigError::NotAnInteger {
                line_no,
                token: dest_port_tok.to_string(),
            })?;
        let cost: i32 = cost_tok.parse().map_err(|_| ConfigError::NotAnInteger {
            line_no,
            token: cost_tok.to_string(),
        })?;

        let dest_id = NodeId::new(dest_tok);
        if !seen_dest.insert(dest_id) {
            return Err(ConfigError::DuplicateNeighbor {
                line_no,
                dest_id: dest_tok.to_string(),
            });
        }

        links.push(Link {
            dest_id,
            cost,
            out_port,
            dest_port,
        });
    }

    Ok(links)
}
