//! On-disk encoding of leaf and inner nodes inside a pool's data region.
//!
//! Both node kinds are fixed-size blocks whose byte layout is entirely
//! determined by a pool's [`Geometry`]: `DEGREE`, `KEY_MAX`, and `VALUE_MAX`.
//! Every mutation reads a node's full block, decodes it into an owned
//! in-memory struct, mutates that struct, then re-encodes and writes the
//! whole block back — there is no partial in-place field update, which keeps
//! the encode/decode pair the single place that understands the byte
//! layout.

use byteorder::{ByteOrder, NativeEndian};
use sortkv_core::Comparator;
use std::cmp::Ordering;

pub const LEAF_TAG: u8 = 0;
pub const INNER_TAG: u8 = 1;

/// The structural parameters of a pool's tree, read back from the pool
/// header on open (or chosen by the engine on first create).
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub degree: u32,
    pub key_max: u64,
    pub value_max: u64,
}

impl Geometry {
    pub fn leaf_cap(&self) -> usize {
        self.degree as usize - 1
    }

    pub fn inner_cap(&self) -> usize {
        self.degree as usize - 1
    }

    /// Minimum occupancy for a non-root node: `ceil(cap / 2)`.
    pub fn min_occupancy(&self, cap: usize) -> usize {
        (cap + 1) / 2
    }

    fn leaf_header_size(&self) -> usize {
        1 + 8 + 8 + 4 // tag + seq + next + count
    }

    fn leaf_slot_size(&self) -> usize {
        4 + 4 + self.key_max as usize + self.value_max as usize
    }

    pub fn leaf_block_size(&self) -> usize {
        self.leaf_header_size() + self.leaf_cap() * self.leaf_slot_size()
    }

    fn inner_header_size(&self) -> usize {
        1 + 4 // tag + count
    }

    fn inner_key_slot_size(&self) -> usize {
        4 + self.key_max as usize
    }

    fn inner_children_offset(&self) -> usize {
        self.inner_header_size() + self.inner_cap() * self.inner_key_slot_size()
    }

    pub fn inner_block_size(&self) -> usize {
        self.inner_children_offset() + self.degree as usize * 8
    }
}

/// An ordered, in-memory view of a leaf block's entries.
#[derive(Debug, Clone)]
pub struct LeafNode {
    pub seq: u64,
    pub next: u64,
    pub entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl LeafNode {
    pub fn new(seq: u64, next: u64) -> Self {
        Self {
            seq,
            next,
            entries: Vec::new(),
        }
    }

    pub fn binary_search(&self, key: &[u8], cmp: &dyn Comparator) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(k, _)| cmp.compare(k, key))
    }

    pub fn decode(geo: &Geometry, buf: &[u8]) -> Self {
        debug_assert_eq!(buf[0], LEAF_TAG);
        let seq = NativeEndian::read_u64(&buf[1..9]);
        let next = NativeEndian::read_u64(&buf[9..17]);
        let count = NativeEndian::read_u32(&buf[17..21]) as usize;

        let mut entries = Vec::with_capacity(count);
        let mut off = geo.leaf_header_size();
        for _ in 0..count {
            let klen = NativeEndian::read_u32(&buf[off..off + 4]) as usize;
            let vlen = NativeEndian::read_u32(&buf[off + 4..off + 8]) as usize;
            off += 8;
            let key = buf[off..off + klen].to_vec();
            off += geo.key_max as usize;
            let value = buf[off..off + vlen].to_vec();
            off += geo.value_max as usize;
            entries.push((key, value));
        }
        Self { seq, next, entries }
    }

    pub fn encode(&self, geo: &Geometry) -> Vec<u8> {
        let mut buf = vec![0u8; geo.leaf_block_size()];
        buf[0] = LEAF_TAG;
        NativeEndian::write_u64(&mut buf[1..9], self.seq);
        NativeEndian::write_u64(&mut buf[9..17], self.next);
        NativeEndian::write_u32(&mut buf[17..21], self.entries.len() as u32);

        let mut off = geo.leaf_header_size();
        for (key, value) in &self.entries {
            NativeEndian::write_u32(&mut buf[off..off + 4], key.len() as u32);
            NativeEndian::write_u32(&mut buf[off + 4..off + 8], value.len() as u32);
            off += 8;
            buf[off..off + key.len()].copy_from_slice(key);
            off += geo.key_max as usize;
            buf[off..off + value.len()].copy_from_slice(value);
            off += geo.value_max as usize;
        }
        buf
    }
}

/// An in-memory view of an inner node: `separators.len()` keys partitioning
/// `children.len() == separators.len() + 1` child pointers.
#[derive(Debug, Clone)]
pub struct InnerNode {
    pub separators: Vec<Vec<u8>>,
    pub children: Vec<u64>,
}

impl InnerNode {
    /// The child index to descend into for `key`: the smallest `i` with
    /// `key < separators[i]`, or the last child if no separator exceeds it.
    pub fn child_index_for(&self, key: &[u8], cmp: &dyn Comparator) -> usize {
        for (i, sep) in self.separators.iter().enumerate() {
            if cmp.compare(key, sep) == Ordering::Less {
                return i;
            }
        }
        self.separators.len()
    }

    pub fn decode(geo: &Geometry, buf: &[u8]) -> Self {
        debug_assert_eq!(buf[0], INNER_TAG);
        let count = NativeEndian::read_u32(&buf[1..5]) as usize;

        let mut separators = Vec::with_capacity(count);
        let key_slot = geo.inner_key_slot_size();
        let mut off = geo.inner_header_size();
        for _ in 0..count {
            let klen = NativeEndian::read_u32(&buf[off..off + 4]) as usize;
            let key = buf[off + 4..off + 4 + klen].to_vec();
            separators.push(key);
            off += key_slot;
        }

        let children_off = geo.inner_children_offset();
        let mut children = Vec::with_capacity(count + 1);
        for i in 0..count + 1 {
            let o = children_off + i * 8;
            children.push(NativeEndian::read_u64(&buf[o..o + 8]));
        }

        Self {
            separators,
            children,
        }
    }

    pub fn encode(&self, geo: &Geometry) -> Vec<u8> {
        let mut buf = vec![0u8; geo.inner_block_size()];
        buf[0] = INNER_TAG;
        NativeEndian::write_u32(&mut buf[1..5], self.separators.len() as u32);

        let key_slot = geo.inner_key_slot_size();
        let mut off = geo.inner_header_size();
        for key in &self.separators {
            NativeEndian::write_u32(&mut buf[off..off + 4], key.len() as u32);
            buf[off + 4..off + 4 + key.len()].copy_from_slice(key);
            off += key_slot;
        }

        let children_off = geo.inner_children_offset();
        for (i, child) in self.children.iter().enumerate() {
            let o = children_off + i * 8;
            NativeEndian::write_u64(&mut buf[o..o + 8], *child);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortkv_core::ByteComparator;

    fn geo() -> Geometry {
        Geometry {
            degree: 8,
            key_max: 16,
            value_max: 32,
        }
    }

    #[test]
    fn leaf_round_trips_through_bytes() {
        let geo = geo();
        let mut leaf = LeafNode::new(3, 777);
        leaf.entries.push((b"a".to_vec(), b"1".to_vec()));
        leaf.entries.push((b"b".to_vec(), b"22".to_vec()));

        let buf = leaf.encode(&geo);
        assert_eq!(buf.len(), geo.leaf_block_size());
        let back = LeafNode::decode(&geo, &buf);
        assert_eq!(back.seq, 3);
        assert_eq!(back.next, 777);
        assert_eq!(back.entries, leaf.entries);
    }

    #[test]
    fn leaf_handles_empty_key_and_value() {
        let geo = geo();
        let mut leaf = LeafNode::new(1, u64::MAX);
        leaf.entries.push((Vec::new(), Vec::new()));
        let back = LeafNode::decode(&geo, &leaf.encode(&geo));
        assert_eq!(back.entries, vec![(Vec::new(), Vec::new())]);
    }

    #[test]
    fn inner_round_trips_through_bytes() {
        let geo = geo();
        let inner = InnerNode {
            separators: vec![b"m".to_vec(), b"t".to_vec()],
            children: vec![10, 20, 30],
        };
        let buf = inner.encode(&geo);
        assert_eq!(buf.len(), geo.inner_block_size());
        let back = InnerNode::decode(&geo, &buf);
        assert_eq!(back.separators, inner.separators);
        assert_eq!(back.children, inner.children);
    }

    #[test]
    fn child_index_picks_smallest_separator_exceeding_key() {
        let cmp = ByteComparator;
        let inner = InnerNode {
            separators: vec![b"m".to_vec(), b"t".to_vec()],
            children: vec![10, 20, 30],
        };
        assert_eq!(inner.child_index_for(b"a", &cmp), 0);
        assert_eq!(inner.child_index_for(b"m", &cmp), 1);
        assert_eq!(inner.child_index_for(b"n", &cmp), 1);
        assert_eq!(inner.child_index_for(b"z", &cmp), 2);
    }
}
