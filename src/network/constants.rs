//! Node-type taxonomy and classification tolerances.

// Node types. Plain nodes use their degree (0..=8); junction patterns
// override it with a negative code.

/// Type-3 node paired with a type-3 partner across a "100" arm whose four
/// outer segments carry four distinct "111" Burgers vectors.
pub const BUTTERFLY_NODE: i8 = -3;

/// Type-3 node whose "100" arm leads to a mixed monster junction.
pub const SPECIAL_BUTTERFLY_NODE: i8 = -33;

/// Four-valent junction of four distinct "111" segments.
pub const MONSTER_111_NODE: i8 = -4;

/// Four-valent junction of two "111" and two "100" segments, all distinct.
pub const MONSTER_MIXED_NODE: i8 = -44;

/// Transient marker for nodes slated for pruning.
pub const USELESS_NODE: i8 = i8::MIN;

/// Largest plain node type; higher degrees are clamped here.
pub const MAX_NODE_TYPE: i8 = 8;

/// ParaDiS constraint value for a node pinned in place.
pub const PINNED_CONSTRAINT: i32 = 7;

// Burgers component buckets. Components are compared by magnitude:
// below ZERO_TOL is zero, inside the 111 band is +-1/sqrt(3) style,
// inside the 100 band is a full lattice step (1 or 2/sqrt(3)).

pub const BURGERS_ZERO_TOL: f64 = 0.1;
pub const BURGERS_111_MIN: f64 = 0.4;
pub const BURGERS_111_MAX: f64 = 0.8;
pub const BURGERS_100_MIN: f64 = 0.8;
pub const BURGERS_100_MAX: f64 = 1.3;

/// Burgers type reserved for vectors matching no known pattern.
pub const BURGERS_UNKNOWN: u8 = 8;

/// Largest Burgers type that is a "100" vector.
pub const BURGERS_MAX_100: u8 = 3;

/// Returns true for butterfly and monster junction codes.
pub fn is_type_m(node_type: i8) -> bool {
    matches!(
        node_type,
        BUTTERFLY_NODE | SPECIAL_BUTTERFLY_NODE | MONSTER_111_NODE | MONSTER_MIXED_NODE
    )
}

/// Returns true for every other classified node code.
pub fn is_type_n(node_type: i8) -> bool {
    !is_type_m(node_type) && (0..=MAX_NODE_TYPE).contains(&node_type)
}

/// Returns true if `node_type` belongs to the closed taxonomy.
pub fn is_valid_node_type(node_type: i8) -> bool {
    is_type_m(node_type) || (0..=MAX_NODE_TYPE).contains(&node_type)
}
