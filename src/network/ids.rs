//! Node identity and id allocation.

use std::fmt;
use std::str::FromStr;

/// File-level node identity: `(domain, local_id)`, ordered domain-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub domain: u32,
    pub local_id: u32,
}

impl NodeId {
    pub const fn new(domain: u32, local_id: u32) -> Self {
        Self { domain, local_id }
    }

    /// True for ids minted for periodic mirror nodes.
    pub fn is_ghost(&self) -> bool {
        self.domain == GHOST_DOMAIN
    }
}

/// Domain reserved for nodes synthesized by periodic wrapping.
pub const GHOST_DOMAIN: u32 = u32::MAX;

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.domain, self.local_id)
    }
}

impl FromStr for NodeId {
    type Err = ();

    /// Parses the dump's `domain,local_id` tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, local) = s.split_once(',').ok_or(())?;
        Ok(Self {
            domain: domain.parse().map_err(|_| ())?,
            local_id: local.parse().map_err(|_| ())?,
        })
    }
}

/// Undirected edge between two node ids, stored with the smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Neighbor(pub NodeId, pub NodeId);

impl Neighbor {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Hands out segment and arm ids for one `DataSet`.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next_segment: i32,
    next_arm: i32,
    next_ghost: u32,
}

impl IdAllocator {
    pub fn next_segment(&mut self) -> i32 {
        let id = self.next_segment;
        self.next_segment += 1;
        id
    }

    pub fn next_arm(&mut self) -> i32 {
        let id = self.next_arm;
        self.next_arm += 1;
        id
    }

    pub fn next_ghost_node(&mut self) -> NodeId {
        let id = NodeId::new(GHOST_DOMAIN, self.next_ghost);
        self.next_ghost += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_order_is_domain_major() {
        let a = NodeId::new(0, 99);
        let b = NodeId::new(1, 0);
        let c = NodeId::new(1, 5);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!("3,17".parse::<NodeId>(), Ok(NodeId::new(3, 17)));
        assert!("317".parse::<NodeId>().is_err());
        assert!("3,x".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_neighbor_is_canonical() {
        let a = NodeId::new(0, 1);
        let b = NodeId::new(0, 2);
        assert_eq!(Neighbor::new(a, b), Neighbor::new(b, a));
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_segment(), 0);
        assert_eq!(ids.next_segment(), 1);
        assert_eq!(ids.next_arm(), 0);
        let ghost = ids.next_ghost_node();
        assert!(ghost.is_ghost());
        assert_ne!(ghost, ids.next_ghost_node());
    }
}
