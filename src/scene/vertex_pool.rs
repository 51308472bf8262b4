//! Host stand-in for buffer device addresses.
//!
//! Every vertex buffer lives inside one byte arena. An allocation's address
//! is the byte offset of its first record, so resolving `address + index *
//! STRIDE` is the same arithmetic the vertex stage performs through a buffer
//! reference, and the arena can be bound verbatim as the storage buffer the
//! WGSL program indexes.

use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::gpu::layout::BufferAddress;
use log::debug;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Allocation {
    records: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    bytes: Vec<u8>,
    live: BTreeMap<BufferAddress, Allocation>,
    released: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub live_allocations: usize,
    pub released_allocations: usize,
    pub live_vertices: usize,
    pub arena_bytes: usize,
}

/// Shared, append-only vertex arena.
///
/// Uploads take a write lock; draws resolve under a read lock, so many draws
/// can fetch concurrently.
#[derive(Debug)]
pub struct VertexPool {
    state: RwLock<PoolState>,
}

impl Default for VertexPool {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexPool {
    pub fn new() -> Self {
        // Slot 0 is never handed out so that address 0 stays null.
        Self {
            state: RwLock::new(PoolState {
                bytes: vec![0; Vertex::STRIDE],
                ..PoolState::default()
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, PoolState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PoolState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Copies `vertices` into the arena and returns the address of the first
    /// record.
    pub fn upload(&self, vertices: &[Vertex]) -> Result<BufferAddress> {
        if vertices.is_empty() {
            return Err(Error::EmptyBuffer);
        }

        let raw: &[u8] = bytemuck::cast_slice(vertices);
        let mut state = self.write();
        let offset = state.bytes.len() as u64;
        let end = offset + raw.len() as u64;
        // WGSL addresses the arena with 32-bit indices.
        if end > u64::from(u32::MAX) {
            return Err(Error::PoolExhausted {
                offset,
                requested: raw.len() as u64,
            });
        }

        state.bytes.extend_from_slice(raw);
        state.live.insert(
            offset,
            Allocation {
                records: vertices.len(),
            },
        );
        debug!("Uploaded {} vertices at {:#x}", vertices.len(), offset);
        Ok(offset)
    }

    /// Invalidates an allocation. Its bytes are not reused.
    pub fn release(&self, address: BufferAddress) -> Result<()> {
        let mut state = self.write();
        state
            .live
            .remove(&address)
            .ok_or(Error::InvalidBufferHandle(address))?;
        state.released += 1;
        Ok(())
    }

    pub fn is_live(&self, address: BufferAddress) -> bool {
        self.read().live.contains_key(&address)
    }

    /// Number of records behind a live address.
    pub fn len(&self, address: BufferAddress) -> Result<usize> {
        self.read()
            .live
            .get(&address)
            .map(|a| a.records)
            .ok_or(Error::InvalidBufferHandle(address))
    }

    /// Bounds-checked view of one allocation.
    pub fn resolve(&self, address: BufferAddress) -> Result<VertexView<'_>> {
        let state = self.read();
        let records = state
            .live
            .get(&address)
            .map(|a| a.records)
            .ok_or(Error::InvalidBufferHandle(address))?;
        Ok(VertexView {
            state,
            address,
            records,
        })
    }

    pub fn fetch(&self, address: BufferAddress, index: u32) -> Result<Vertex> {
        self.resolve(address)?.fetch(index)
    }

    /// Whole arena, ready to be copied into a GPU storage buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.read().bytes.clone()
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.read();
        PoolStats {
            live_allocations: state.live.len(),
            released_allocations: state.released,
            live_vertices: state.live.values().map(|a| a.records).sum(),
            arena_bytes: state.bytes.len(),
        }
    }
}

/// Read access to one allocation; holds the pool's read lock.
pub struct VertexView<'a> {
    state: std::sync::RwLockReadGuard<'a, PoolState>,
    address: BufferAddress,
    records: usize,
}

impl VertexView<'_> {
    pub fn address(&self) -> BufferAddress {
        self.address
    }

    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn fetch(&self, index: u32) -> Result<Vertex> {
        let i = index as usize;
        if i >= self.records {
            return Err(Error::VertexIndexOutOfBounds {
                handle: self.address,
                index,
                len: self.records,
            });
        }
        let start = self.address as usize + i * Vertex::STRIDE;
        Ok(bytemuck::pod_read_unaligned(
            &self.state.bytes[start..start + Vertex::STRIDE],
        ))
    }
}
