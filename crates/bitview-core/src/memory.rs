//! # Snapshot Memory
//!
//! A [`MemoryReader`] over a set of captured memory regions. Used by tests
//! and by the CLI, which maps a raw dump file at a base address.
//!
//! Reads must fall entirely inside one region; anything touching unmapped
//! bytes fails with [`DecodeError::ReadFailed`], just like a read of an
//! unmapped page in a live process.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::host::MemoryReader;
use crate::types::Address;

/// Captured memory, keyed by region start address
#[derive(Debug, Default, Clone)]
pub struct SnapshotMemory
{
    regions: BTreeMap<u64, Vec<u8>>,
}

impl SnapshotMemory
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Map `bytes` at `base`. A region already starting at `base` is replaced.
    pub fn add_region(&mut self, base: u64, bytes: Vec<u8>)
    {
        tracing::trace!(base = format_args!("{base:#x}"), len = bytes.len(), "mapped region");
        self.regions.insert(base, bytes);
    }

    /// Load a raw dump file and map it at `base`.
    ///
    /// ## Errors
    ///
    /// Returns `Io` if the file cannot be read.
    pub fn from_dump_file(path: impl AsRef<Path>, base: u64) -> DecodeResult<Self>
    {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            base = format_args!("{base:#x}"),
            len = bytes.len(),
            "loaded memory dump"
        );
        let mut memory = Self::new();
        memory.add_region(base, bytes);
        Ok(memory)
    }

    /// Overwrite mapped bytes at `address`.
    ///
    /// ## Errors
    ///
    /// Returns `ReadFailed` if the range is not fully mapped by one region.
    pub fn write(&mut self, address: Address, bytes: &[u8]) -> DecodeResult<()>
    {
        let (start, region) = self
            .regions
            .range_mut(..=address.value())
            .next_back()
            .ok_or_else(|| unmapped(address, bytes.len()))?;
        let offset = region_offset(*start, region.len(), address, bytes.len())?;
        region[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn region_count(&self) -> usize
    {
        self.regions.len()
    }
}

impl MemoryReader for SnapshotMemory
{
    fn read_memory(&self, address: Address, len: usize) -> DecodeResult<Vec<u8>>
    {
        let (start, region) = self
            .regions
            .range(..=address.value())
            .next_back()
            .ok_or_else(|| unmapped(address, len))?;
        let offset = region_offset(*start, region.len(), address, len)?;
        Ok(region[offset..offset + len].to_vec())
    }
}

fn region_offset(start: u64, region_len: usize, address: Address, len: usize) -> DecodeResult<usize>
{
    let offset = usize::try_from(address.value() - start).map_err(|_| unmapped(address, len))?;
    match offset.checked_add(len) {
        Some(end) if end <= region_len => Ok(offset),
        _ => Err(unmapped(address, len)),
    }
}

fn unmapped(address: Address, len: usize) -> DecodeError
{
    DecodeError::ReadFailed {
        address,
        len,
        reason: "address range not mapped".to_string(),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_reads_inside_regions()
    {
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x1000, vec![1, 2, 3, 4]);
        memory.add_region(0x2000, vec![9; 16]);

        assert_eq!(memory.read_memory(Address::new(0x1001), 2).unwrap(), vec![2, 3]);
        assert_eq!(memory.read_memory(Address::new(0x2000), 16).unwrap().len(), 16);
        assert_eq!(memory.region_count(), 2);
    }

    #[test]
    fn test_unmapped_and_straddling_reads_fail()
    {
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x1000, vec![0; 8]);

        for (address, len) in [(0x0FFF, 1), (0x1006, 4), (0x5000, 1)] {
            assert!(matches!(
                memory.read_memory(Address::new(address), len),
                Err(DecodeError::ReadFailed { .. })
            ));
        }
    }

    #[test]
    fn test_write_patches_region()
    {
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x1000, vec![0; 4]);
        memory.write(Address::new(0x1002), &[0xAB, 0xCD]).unwrap();
        assert_eq!(memory.read_memory(Address::new(0x1000), 4).unwrap(), vec![0, 0, 0xAB, 0xCD]);
        assert!(memory.write(Address::new(0x1003), &[1, 2]).is_err());
    }
}
