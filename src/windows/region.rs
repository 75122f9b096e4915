//! Read-only views of named file mappings

use std::ptr::NonNull;

use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use crate::providers::{Region, RegionOpener};
use crate::{Result, TelemetryError};

/// Session-local namespace the producer creates its mappings in.
const MAPPING_NAMESPACE: &str = "Local\\";

/// Opens `Local\{name}` mappings created by the running simulator.
#[derive(Debug, Default, Clone, Copy)]
pub struct MappedRegionOpener;

impl RegionOpener for MappedRegionOpener {
    fn open(&mut self, name: &str, size: usize) -> Result<Box<dyn Region>> {
        Ok(Box::new(MappedRegion::open(name, size)?))
    }
}

/// A mapped view of `size` bytes at the start of a named mapping.
pub struct MappedRegion {
    mapping: HANDLE,
    base: NonNull<u8>,
    len: usize,
}

impl MappedRegion {
    pub fn open(name: &str, size: usize) -> Result<Self> {
        let full_name = format!("{MAPPING_NAMESPACE}{name}");
        trace!(name = %full_name, size, "Opening shared memory mapping");

        let mapping = unsafe {
            let wide_name = wide_string(&full_name);
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| TelemetryError::windows_api_error("OpenFileMappingW", e))?
        };

        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, size) };
        let Some(base) = NonNull::new(view.Value as *mut u8) else {
            let win_err = windows::core::Error::from_thread();
            unsafe {
                let _ = CloseHandle(mapping);
            }
            return Err(TelemetryError::windows_api_error("MapViewOfFile", win_err));
        };

        debug!(name = %full_name, size, "Mapped shared memory view");
        Ok(Self { mapping, base, len: size })
    }
}

impl Region for MappedRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read_into(&self, offset: usize, out: &mut [u8]) -> bool {
        let Some(end) = offset.checked_add(out.len()) else {
            return false;
        };
        if end > self.len {
            return false;
        }
        // SAFETY: the view is at least `len` bytes and stays mapped until drop.
        // The producer may write concurrently; the copy is checked by the caller.
        unsafe {
            std::ptr::copy_nonoverlapping(self.base.as_ptr().add(offset), out.as_mut_ptr(), out.len());
        }
        true
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: the region only holds a mapping handle and a read-only view pointer.
unsafe impl Send for MappedRegion {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn missing_mapping_is_a_windows_error() {
        let err = MappedRegion::open("pacenote_missing_region_for_tests", 16).err().unwrap();
        assert!(matches!(err, TelemetryError::WindowsApi { .. }));
    }

    #[test]
    #[ignore = "simulator_required"]
    fn maps_live_physics_page() {
        let region = MappedRegion::open("acpmf_physics", 276).expect("simulator running");
        let mut packet_id = [0u8; 4];
        assert!(region.read_into(0, &mut packet_id));
        assert!(!region.read_into(270, &mut [0u8; 8]));
    }
}
