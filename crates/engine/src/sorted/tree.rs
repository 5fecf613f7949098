//! Structural algorithms over a pool-backed B+-tree: descent, splitting
//! insert, underflow-aware remove, and chain-walking range scans.
//!
//! Every function here takes the pool, geometry, and comparator explicitly
//! rather than bundling them into a struct, so the read path (point lookups,
//! range scans — no transaction) and the write path (put, remove — one
//! transaction per call) stay visibly distinct at every call site.

use crate::sorted::node::{Geometry, InnerNode, LeafNode, INNER_TAG, LEAF_TAG};
use sortkv_core::{Comparator, Error, RangeBound, Result};
use sortkv_pool::{Pool, PoolRead, Transaction, NULL};
use std::cmp::Ordering;

struct PathEntry {
    ptr: u64,
    child_index: usize,
}

fn load_leaf(tx: &Transaction<'_>, geo: &Geometry, ptr: u64) -> LeafNode {
    LeafNode::decode(geo, &tx.read(ptr, geo.leaf_block_size()))
}

fn load_inner(tx: &Transaction<'_>, geo: &Geometry, ptr: u64) -> InnerNode {
    InnerNode::decode(geo, &tx.read(ptr, geo.inner_block_size()))
}

/// Descend from the root to the leaf that would contain `key`, recording
/// the inner nodes visited (and the child index taken at each) so a split
/// or underflow can be propagated back up without a second descent.
fn descend_with_path(
    tx: &Transaction<'_>,
    geo: &Geometry,
    cmp: &dyn Comparator,
    key: &[u8],
) -> (u64, Vec<PathEntry>) {
    let mut ptr = tx.root();
    let mut path = Vec::new();
    loop {
        let tag = tx.read(ptr, 1)[0];
        if tag == LEAF_TAG {
            return (ptr, path);
        }
        debug_assert_eq!(tag, INNER_TAG);
        let inner = load_inner(tx, geo, ptr);
        let idx = inner.child_index_for(key, cmp);
        let child = inner.children[idx];
        path.push(PathEntry {
            ptr,
            child_index: idx,
        });
        ptr = child;
    }
}

fn lookup(read: &PoolRead<'_>, geo: &Geometry, cmp: &dyn Comparator, key: &[u8]) -> Option<Vec<u8>> {
    let mut ptr = read.root();
    if ptr == NULL {
        return None;
    }
    loop {
        let tag = read.bytes(ptr, 1)[0];
        if tag == LEAF_TAG {
            let leaf = LeafNode::decode(geo, read.bytes(ptr, geo.leaf_block_size()));
            return leaf
                .binary_search(key, cmp)
                .ok()
                .map(|i| leaf.entries[i].1.clone());
        }
        let inner = InnerNode::decode(geo, read.bytes(ptr, geo.inner_block_size()));
        ptr = inner.children[inner.child_index_for(key, cmp)];
    }
}

pub fn get(pool: &Pool, geo: &Geometry, cmp: &dyn Comparator, key: &[u8]) -> Result<Vec<u8>> {
    let read = pool.read();
    lookup(&read, geo, cmp, key).ok_or(Error::NotFound)
}

pub fn exists(pool: &Pool, geo: &Geometry, cmp: &dyn Comparator, key: &[u8]) -> Result<()> {
    let read = pool.read();
    if lookup(&read, geo, cmp, key).is_some() {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}

pub fn count_all(pool: &Pool) -> Result<u64> {
    Ok(pool.element_count())
}

/// Validate a key/value pair against the geometry's compile-time size caps,
/// before any transaction is opened.
fn check_sizes(geo: &Geometry, key: &[u8], value: &[u8]) -> Result<()> {
    if key.len() as u64 > geo.key_max {
        return Err(Error::InvalidArgument(format!(
            "key of {} bytes exceeds KEY_MAX of {}",
            key.len(),
            geo.key_max
        )));
    }
    if value.len() as u64 > geo.value_max {
        return Err(Error::InvalidArgument(format!(
            "value of {} bytes exceeds VALUE_MAX of {}",
            value.len(),
            geo.value_max
        )));
    }
    Ok(())
}

pub fn put(
    pool: &Pool,
    geo: &Geometry,
    cmp: &dyn Comparator,
    key: &[u8],
    value: &[u8],
) -> Result<()> {
    check_sizes(geo, key, value)?;

    let mut tx = pool.begin();
    if tx.root() == NULL {
        let mut leaf = LeafNode::new(1, NULL);
        leaf.entries.push((key.to_vec(), value.to_vec()));
        let ptr = tx.alloc_leaf(geo.leaf_block_size())?;
        tx.write(ptr, &leaf.encode(geo));
        tx.set_root(ptr);
        tx.increment_count();
        return tx.commit();
    }

    let (leaf_ptr, path) = descend_with_path(&tx, geo, cmp, key);
    let mut leaf = load_leaf(&tx, geo, leaf_ptr);

    match leaf.binary_search(key, cmp) {
        Ok(i) => {
            // Replacement: same key, no change to the element count.
            leaf.entries[i].1 = value.to_vec();
            leaf.seq = leaf.seq.wrapping_add(1);
            tx.write(leaf_ptr, &leaf.encode(geo));
            tx.commit()
        }
        Err(i) if leaf.entries.len() < geo.leaf_cap() => {
            leaf.entries.insert(i, (key.to_vec(), value.to_vec()));
            leaf.seq = leaf.seq.wrapping_add(1);
            tx.write(leaf_ptr, &leaf.encode(geo));
            tx.increment_count();
            tx.commit()
        }
        Err(i) => {
            leaf.entries.insert(i, (key.to_vec(), value.to_vec()));
            let mid = leaf.entries.len() / 2;
            let right_entries = leaf.entries.split_off(mid);

            let right_ptr = tx.alloc_leaf(geo.leaf_block_size())?;
            let right = LeafNode {
                seq: 1,
                next: leaf.next,
                entries: right_entries,
            };
            leaf.next = right_ptr;
            leaf.seq = leaf.seq.wrapping_add(1);

            tx.write(leaf_ptr, &leaf.encode(geo));
            tx.write(right_ptr, &right.encode(geo));
            tx.increment_count();

            let sep_key = right.entries[0].0.clone();
            insert_into_parent(&mut tx, geo, path, leaf_ptr, sep_key, right_ptr)?;
            tx.commit()
        }
    }
}

/// Propagate a leaf (or inner) split upward, splitting ancestors in turn
/// until one has room, or the root itself splits and grows the tree by one
/// level.
fn insert_into_parent(
    tx: &mut Transaction<'_>,
    geo: &Geometry,
    mut path: Vec<PathEntry>,
    mut left_ptr: u64,
    mut sep_key: Vec<u8>,
    mut right_ptr: u64,
) -> Result<()> {
    loop {
        match path.pop() {
            None => {
                let inner = InnerNode {
                    separators: vec![sep_key],
                    children: vec![left_ptr, right_ptr],
                };
                let new_root = tx.alloc_inner(geo.inner_block_size())?;
                tx.write(new_root, &inner.encode(geo));
                tx.set_root(new_root);
                return Ok(());
            }
            Some(PathEntry { ptr, child_index }) => {
                let mut parent = load_inner(tx, geo, ptr);
                parent.separators.insert(child_index, sep_key);
                parent.children.insert(child_index + 1, right_ptr);

                if parent.separators.len() <= geo.inner_cap() {
                    tx.write(ptr, &parent.encode(geo));
                    return Ok(());
                }

                let mid = parent.separators.len() / 2;
                let right_seps = parent.separators.split_off(mid + 1);
                let up_key = parent.separators.pop().unwrap();
                let right_children = parent.children.split_off(mid + 1);

                let new_right_ptr = tx.alloc_inner(geo.inner_block_size())?;
                let right_inner = InnerNode {
                    separators: right_seps,
                    children: right_children,
                };
                tx.write(ptr, &parent.encode(geo));
                tx.write(new_right_ptr, &right_inner.encode(geo));

                left_ptr = ptr;
                sep_key = up_key;
                right_ptr = new_right_ptr;
            }
        }
    }
}

pub fn remove(pool: &Pool, geo: &Geometry, cmp: &dyn Comparator, key: &[u8]) -> Result<()> {
    // Absent-key removal never opens a transaction.
    {
        let read = pool.read();
        if lookup(&read, geo, cmp, key).is_none() {
            return Err(Error::NotFound);
        }
    }

    let mut tx = pool.begin();
    let (leaf_ptr, mut path) = descend_with_path(&tx, geo, cmp, key);
    let mut leaf = load_leaf(&tx, geo, leaf_ptr);
    let idx = leaf.binary_search(key, cmp).map_err(|_| Error::NotFound)?;
    leaf.entries.remove(idx);
    leaf.seq = leaf.seq.wrapping_add(1);
    tx.decrement_count();

    if path.is_empty() {
        // The leaf is the root: no minimum occupancy is enforced.
        tx.write(leaf_ptr, &leaf.encode(geo));
        return tx.commit();
    }

    let min_leaf = geo.min_occupancy(geo.leaf_cap());
    if leaf.entries.len() >= min_leaf {
        tx.write(leaf_ptr, &leaf.encode(geo));
        return tx.commit();
    }

    let PathEntry {
        ptr: parent_ptr,
        child_index,
    } = path.pop().unwrap();
    let mut parent = load_inner(&tx, geo, parent_ptr);
    let has_left = child_index > 0;
    let has_right = child_index + 1 < parent.children.len();

    if has_left {
        let left_ptr = parent.children[child_index - 1];
        let mut left = load_leaf(&tx, geo, left_ptr);
        if left.entries.len() > min_leaf {
            let borrowed = left.entries.pop().unwrap();
            left.seq = left.seq.wrapping_add(1);
            leaf.entries.insert(0, borrowed);
            parent.separators[child_index - 1] = leaf.entries[0].0.clone();
            tx.write(left_ptr, &left.encode(geo));
            tx.write(leaf_ptr, &leaf.encode(geo));
            tx.write(parent_ptr, &parent.encode(geo));
            return tx.commit();
        }
    }
    if has_right {
        let right_ptr = parent.children[child_index + 1];
        let mut right = load_leaf(&tx, geo, right_ptr);
        if right.entries.len() > min_leaf {
            let borrowed = right.entries.remove(0);
            right.seq = right.seq.wrapping_add(1);
            leaf.entries.push(borrowed);
            parent.separators[child_index] = right.entries[0].0.clone();
            tx.write(leaf_ptr, &leaf.encode(geo));
            tx.write(right_ptr, &right.encode(geo));
            tx.write(parent_ptr, &parent.encode(geo));
            return tx.commit();
        }
    }

    // Both siblings are at minimum occupancy (or one does not exist): merge.
    if has_left {
        let left_ptr = parent.children[child_index - 1];
        let mut left = load_leaf(&tx, geo, left_ptr);
        left.entries.append(&mut leaf.entries);
        left.next = leaf.next;
        left.seq = left.seq.wrapping_add(1);
        tx.write(left_ptr, &left.encode(geo));
        tx.free_leaf(leaf_ptr);
        parent.separators.remove(child_index - 1);
        parent.children.remove(child_index);
    } else {
        let right_ptr = parent.children[child_index + 1];
        let mut right = load_leaf(&tx, geo, right_ptr);
        leaf.entries.append(&mut right.entries);
        leaf.next = right.next;
        tx.write(leaf_ptr, &leaf.encode(geo));
        tx.free_leaf(right_ptr);
        parent.separators.remove(child_index);
        parent.children.remove(child_index + 1);
    }

    fix_inner_underflow(&mut tx, geo, path, parent_ptr, parent)?;
    tx.commit()
}

/// Repair (possibly cascading) underflow starting at an inner node whose
/// child count just shrank by one, walking the ancestor path iteratively
/// rather than recursively.
fn fix_inner_underflow(
    tx: &mut Transaction<'_>,
    geo: &Geometry,
    mut path: Vec<PathEntry>,
    mut ptr: u64,
    mut node: InnerNode,
) -> Result<()> {
    let min_inner = geo.min_occupancy(geo.inner_cap());
    loop {
        if path.is_empty() {
            if node.separators.is_empty() && node.children.len() == 1 {
                // The tree shrinks by one level: the sole child becomes root.
                tx.set_root(node.children[0]);
                tx.free_inner(ptr);
            } else {
                tx.write(ptr, &node.encode(geo));
            }
            return Ok(());
        }

        if node.separators.len() >= min_inner {
            tx.write(ptr, &node.encode(geo));
            return Ok(());
        }

        let PathEntry {
            ptr: parent_ptr,
            child_index,
        } = path.pop().unwrap();
        let mut parent = load_inner(tx, geo, parent_ptr);
        let has_left = child_index > 0;
        let has_right = child_index + 1 < parent.children.len();

        if has_left {
            let left_ptr = parent.children[child_index - 1];
            let mut left = load_inner(tx, geo, left_ptr);
            if left.separators.len() > min_inner {
                let borrowed_child = left.children.pop().unwrap();
                let borrowed_sep = left.separators.pop().unwrap();
                let down_sep = parent.separators[child_index - 1].clone();
                node.separators.insert(0, down_sep);
                node.children.insert(0, borrowed_child);
                parent.separators[child_index - 1] = borrowed_sep;
                tx.write(left_ptr, &left.encode(geo));
                tx.write(ptr, &node.encode(geo));
                tx.write(parent_ptr, &parent.encode(geo));
                return Ok(());
            }
        }
        if has_right {
            let right_ptr = parent.children[child_index + 1];
            let mut right = load_inner(tx, geo, right_ptr);
            if right.separators.len() > min_inner {
                let borrowed_child = right.children.remove(0);
                let borrowed_sep = right.separators.remove(0);
                let down_sep = parent.separators[child_index].clone();
                node.separators.push(down_sep);
                node.children.push(borrowed_child);
                parent.separators[child_index] = borrowed_sep;
                tx.write(right_ptr, &right.encode(geo));
                tx.write(ptr, &node.encode(geo));
                tx.write(parent_ptr, &parent.encode(geo));
                return Ok(());
            }
        }

        if has_left {
            let left_ptr = parent.children[child_index - 1];
            let mut left = load_inner(tx, geo, left_ptr);
            let down_sep = parent.separators[child_index - 1].clone();
            left.separators.push(down_sep);
            left.separators.append(&mut node.separators);
            left.children.append(&mut node.children);
            tx.write(left_ptr, &left.encode(geo));
            tx.free_inner(ptr);
            parent.separators.remove(child_index - 1);
            parent.children.remove(child_index);
            ptr = left_ptr;
            node = left;
        } else {
            let right_ptr = parent.children[child_index + 1];
            let mut right = load_inner(tx, geo, right_ptr);
            let down_sep = parent.separators[child_index].clone();
            node.separators.push(down_sep);
            node.separators.append(&mut right.separators);
            node.children.append(&mut right.children);
            tx.write(ptr, &node.encode(geo));
            tx.free_inner(right_ptr);
            parent.separators.remove(child_index);
            parent.children.remove(child_index + 1);
        }
        ptr = parent_ptr;
        node = parent;
    }
}

fn first_leaf_for(
    read: &PoolRead<'_>,
    geo: &Geometry,
    cmp: &dyn Comparator,
    lo: &RangeBound,
) -> Option<u64> {
    let mut ptr = read.root();
    if ptr == NULL {
        return None;
    }
    loop {
        let tag = read.bytes(ptr, 1)[0];
        if tag == LEAF_TAG {
            return Some(ptr);
        }
        let inner = InnerNode::decode(geo, read.bytes(ptr, geo.inner_block_size()));
        let idx = match lo {
            RangeBound::Min => 0,
            RangeBound::Max => inner.children.len() - 1,
            RangeBound::Key(k) => inner.child_index_for(k, cmp),
        };
        ptr = inner.children[idx];
    }
}

/// Walk the leaf chain delivering every entry in `(lo, hi)` (both endpoints
/// exclusive) to `callback`, stopping as soon as an entry reaches `hi` since
/// leaves are visited in ascending order. `count_range` reuses this by
/// passing a counting callback, so both share one traversal.
pub fn get_range(
    pool: &Pool,
    geo: &Geometry,
    cmp: &dyn Comparator,
    lo: &RangeBound,
    hi: &RangeBound,
    callback: &mut dyn FnMut(&[u8], &[u8]) -> i32,
) -> Result<()> {
    if lo.compare_bounds(hi, cmp) != Ordering::Less {
        return Ok(());
    }

    let read = pool.read();
    let mut ptr = match first_leaf_for(&read, geo, cmp, lo) {
        Some(p) => p,
        None => return Ok(()),
    };

    loop {
        let leaf = LeafNode::decode(geo, read.bytes(ptr, geo.leaf_block_size()));
        for (k, v) in &leaf.entries {
            if lo.compare_to_key(k, cmp) != Ordering::Less {
                continue;
            }
            if hi.compare_to_key(k, cmp) != Ordering::Greater {
                return Ok(());
            }
            if callback(k, v) != 0 {
                return Err(Error::StoppedByCallback);
            }
        }
        if leaf.next == NULL {
            return Ok(());
        }
        ptr = leaf.next;
    }
}

pub fn count_range(
    pool: &Pool,
    geo: &Geometry,
    cmp: &dyn Comparator,
    lo: &RangeBound,
    hi: &RangeBound,
) -> Result<u64> {
    let mut n: u64 = 0;
    get_range(pool, geo, cmp, lo, hi, &mut |_, _| {
        n += 1;
        0
    })?;
    Ok(n)
}
