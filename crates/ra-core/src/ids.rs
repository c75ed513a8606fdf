//! Index types for the road network and damage clusters.
//!
//! Nodes, edges and clusters are all dense `u32` indices into per-graph (or
//! per-run) arrays.  Wrapping them keeps a node index from being used where
//! an edge index is expected; `.index()` and `from_index` convert at the
//! array boundary.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Marks a slot with no id, e.g. an unreached node's predecessor.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Wrap a position in a dense array.  Networks never approach
            /// `u32::MAX` elements.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                debug_assert!(i < u32::MAX as usize, "{} overflow: {i}", stringify!($name));
                $name(i as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A road-network node: one deduplicated coordinate, rounded to six
    /// decimal digits.
    pub struct NodeId;
}

typed_id! {
    /// A directed road segment.  Edges leaving one node are contiguous.
    pub struct EdgeId;
}

typed_id! {
    /// A damage cluster, numbered from 0 in the order clusters are found.
    pub struct ClusterId;
}
