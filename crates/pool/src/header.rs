//! On-disk layout of the pool's root object: a fixed-size header immediately
//! followed (logically) by the root node pointer.
//!
//! All multi-byte integers are native-endian, matching the rest of the
//! storage format: the pool is never meant to move between machines of
//! differing endianness.

use byteorder::{ByteOrder, NativeEndian};
use sortkv_core::{Error, Result};

pub const MAGIC: [u8; 8] = *b"SORTKV01";
pub const FORMAT_VERSION: u32 = 1;
pub const COMPARATOR_NAME_CAP: usize = 256;

pub const HEADER_SIZE: usize = 8 // magic
    + 4 // version
    + 4 // degree
    + 8 // key_max
    + 8 // value_max
    + 8 // element_count
    + 1 // comparator name length
    + COMPARATOR_NAME_CAP
    + 8; // root pointer

/// Sentinel for "no node here" in every pointer field the pool hands out:
/// the root pointer, child pointers, and free-list links. Offset 0 of the
/// data region is a legal allocation, so null cannot be zero.
pub const NULL: u64 = u64::MAX;

#[derive(Debug, Clone)]
pub struct PoolHeader {
    pub version: u32,
    pub degree: u32,
    pub key_max: u64,
    pub value_max: u64,
    pub element_count: u64,
    pub comparator_name: String,
    pub root_ptr: u64,
}

impl PoolHeader {
    pub fn new(degree: u32, key_max: u64, value_max: u64, comparator_name: &str) -> Result<Self> {
        if comparator_name.len() >= COMPARATOR_NAME_CAP {
            return Err(Error::InvalidArgument(format!(
                "comparator name {} bytes exceeds cap of {}",
                comparator_name.len(),
                COMPARATOR_NAME_CAP - 1
            )));
        }
        Ok(Self {
            version: FORMAT_VERSION,
            degree,
            key_max,
            value_max,
            element_count: 0,
            comparator_name: comparator_name.to_string(),
            root_ptr: NULL,
        })
    }

    pub fn write_to(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..8].copy_from_slice(&MAGIC);
        NativeEndian::write_u32(&mut buf[8..12], self.version);
        NativeEndian::write_u32(&mut buf[12..16], self.degree);
        NativeEndian::write_u64(&mut buf[16..24], self.key_max);
        NativeEndian::write_u64(&mut buf[24..32], self.value_max);
        NativeEndian::write_u64(&mut buf[32..40], self.element_count);

        let name_bytes = self.comparator_name.as_bytes();
        buf[40] = name_bytes.len() as u8;
        let name_area = &mut buf[41..41 + COMPARATOR_NAME_CAP];
        name_area.fill(0);
        name_area[..name_bytes.len()].copy_from_slice(name_bytes);

        NativeEndian::write_u64(&mut buf[297..305], self.root_ptr);
    }

    pub fn read_from(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE || buf[0..8] != MAGIC {
            return Err(Error::Failed("pool file is not a sortkv pool".into()));
        }
        let version = NativeEndian::read_u32(&buf[8..12]);
        if version != FORMAT_VERSION {
            return Err(Error::Failed(format!(
                "pool format version {version} is not supported (expected {FORMAT_VERSION})"
            )));
        }
        let degree = NativeEndian::read_u32(&buf[12..16]);
        let key_max = NativeEndian::read_u64(&buf[16..24]);
        let value_max = NativeEndian::read_u64(&buf[24..32]);
        let element_count = NativeEndian::read_u64(&buf[32..40]);

        let name_len = buf[40] as usize;
        if name_len >= COMPARATOR_NAME_CAP {
            return Err(Error::Failed("corrupt comparator name length".into()));
        }
        let name_bytes = &buf[41..41 + name_len];
        let comparator_name = std::str::from_utf8(name_bytes)
            .map_err(|_| Error::Failed("corrupt comparator name bytes".into()))?
            .to_string();

        let root_ptr = NativeEndian::read_u64(&buf[297..305]);

        Ok(Self {
            version,
            degree,
            key_max,
            value_max,
            element_count,
            comparator_name,
            root_ptr,
        })
    }
}
