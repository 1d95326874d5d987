//! Typed views over host memory that survive reallocation.
//!
//! A view is an export name plus a shape. Its resolved offset is only
//! trusted while the memory length equals the length recorded when the view
//! was built; any change means the buffer may have moved, and every view is
//! rebuilt before any of them is read again.
//!
//! Callers hold `ViewHandle`s. Offsets never leave this module.

use std::collections::HashMap;
use std::ops::Range;

use bytemuck::Pod;
use tracing::debug;

use crate::error::HostError;
use crate::memory::{read_u32, ForeignMemory};

/// Global holding the address of the pointer to the RGBA framebuffer.
pub const FRAMEBUFFER_EXPORT: &str = "imageData";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// The export's value is the start of the data.
    Direct,
    /// The export's value is the address of a `u32` holding the start.
    Indirect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub export: String,
    pub addressing: Addressing,
    pub count: usize,
    /// Bytes per element.
    pub width: usize,
}

impl ViewDescriptor {
    pub fn direct(export: &str, count: usize, width: usize) -> Self {
        Self {
            export: export.to_string(),
            addressing: Addressing::Direct,
            count,
            width,
        }
    }

    pub fn indirect(export: &str, count: usize, width: usize) -> Self {
        Self {
            addressing: Addressing::Indirect,
            ..Self::direct(export, count, width)
        }
    }

    pub fn byte_len(&self) -> usize {
        self.count * self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(u32);

#[derive(Debug)]
struct Slot {
    desc: ViewDescriptor,
    offset: usize,
    built_at: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Framebuffer {
    handle: ViewHandle,
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
pub struct MemoryBridge {
    slots: HashMap<ViewHandle, Slot>,
    next: u32,
    /// Memory length at the last full rebuild.
    recorded_len: Option<usize>,
    rebuilds: u64,
    framebuffer: Option<Framebuffer>,
}

fn resolve(mem: &mut dyn ForeignMemory, desc: &ViewDescriptor) -> Result<usize, HostError> {
    let value = mem.export_value(&desc.export)? as usize;
    let offset = match desc.addressing {
        Addressing::Direct => value,
        Addressing::Indirect => read_u32(mem, value)? as usize,
    };
    let memory = mem.byte_len();
    let len = desc.byte_len();
    match offset.checked_add(len) {
        Some(end) if end <= memory => Ok(offset),
        _ => Err(HostError::OutOfBounds {
            offset,
            len,
            memory,
        }),
    }
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &mut self,
        mem: &mut dyn ForeignMemory,
        desc: ViewDescriptor,
    ) -> Result<ViewHandle, HostError> {
        self.revalidate(mem)?;
        let offset = resolve(mem, &desc)?;
        let handle = ViewHandle(self.next);
        self.next += 1;
        debug!(export = %desc.export, offset, len = desc.byte_len(), "view built");
        self.slots.insert(
            handle,
            Slot {
                desc,
                offset,
                built_at: mem.byte_len(),
            },
        );
        Ok(handle)
    }

    pub fn release(&mut self, handle: ViewHandle) -> bool {
        if self.framebuffer.is_some_and(|fb| fb.handle == handle) {
            self.framebuffer = None;
        }
        self.slots.remove(&handle).is_some()
    }

    /// Rebuilds every view if the memory length moved since the last check.
    /// Returns whether a rebuild happened.
    pub fn revalidate(&mut self, mem: &mut dyn ForeignMemory) -> Result<bool, HostError> {
        let len = mem.byte_len();
        let stale = self.recorded_len != Some(len) || self.slots.values().any(|s| s.built_at != len);
        if !stale {
            return Ok(false);
        }
        self.rebuild_all(mem)?;
        Ok(true)
    }

    /// Re-resolves every view. Either all views move to their new offsets or,
    /// on the first failure, none do.
    fn rebuild_all(&mut self, mem: &mut dyn ForeignMemory) -> Result<(), HostError> {
        let len = mem.byte_len();
        let mut fresh = Vec::with_capacity(self.slots.len());
        for (handle, slot) in &self.slots {
            fresh.push((*handle, resolve(mem, &slot.desc)?));
        }
        for (handle, offset) in fresh {
            if let Some(slot) = self.slots.get_mut(&handle) {
                slot.offset = offset;
                slot.built_at = len;
            }
        }
        if self.recorded_len.is_some() {
            debug!(from = ?self.recorded_len, to = len, views = self.slots.len(), "memory length changed, views rebuilt");
        }
        self.recorded_len = Some(len);
        self.rebuilds += 1;
        Ok(())
    }

    fn live_range(&self, handle: ViewHandle, len: usize) -> Result<Range<usize>, HostError> {
        let slot = self.slots.get(&handle).ok_or(HostError::UnknownView)?;
        if slot.built_at != len {
            return Err(HostError::ViewStale);
        }
        Ok(slot.offset..slot.offset + slot.desc.byte_len())
    }

    fn checked_range(
        &mut self,
        mem: &mut dyn ForeignMemory,
        handle: ViewHandle,
    ) -> Result<Range<usize>, HostError> {
        match self.live_range(handle, mem.byte_len()) {
            Err(HostError::ViewStale) => {
                self.rebuild_all(mem)?;
                self.live_range(handle, mem.byte_len())
            }
            other => other,
        }
    }

    pub fn bytes<'m>(
        &mut self,
        mem: &'m mut dyn ForeignMemory,
        handle: ViewHandle,
    ) -> Result<&'m [u8], HostError> {
        let range = self.checked_range(mem, handle)?;
        let mem: &'m dyn ForeignMemory = mem;
        Ok(&mem.bytes()[range])
    }

    pub fn bytes_mut<'m>(
        &mut self,
        mem: &'m mut dyn ForeignMemory,
        handle: ViewHandle,
    ) -> Result<&'m mut [u8], HostError> {
        let range = self.checked_range(mem, handle)?;
        Ok(&mut mem.bytes_mut()[range])
    }

    /// The view as a slice of `T`. Fails with `Misaligned` when the host
    /// placed the data at an address `T` cannot be read from in place.
    pub fn slice<'m, T: Pod>(
        &mut self,
        mem: &'m mut dyn ForeignMemory,
        handle: ViewHandle,
    ) -> Result<&'m [T], HostError> {
        let bytes = self.bytes(mem, handle)?;
        bytemuck::try_cast_slice(bytes).map_err(|_| HostError::Misaligned)
    }

    /// First element of the view, copied out. Works at any alignment.
    pub fn read<T: Pod>(
        &mut self,
        mem: &mut dyn ForeignMemory,
        handle: ViewHandle,
    ) -> Result<T, HostError> {
        let bytes = self.bytes(mem, handle)?;
        let size = std::mem::size_of::<T>();
        if bytes.len() < size {
            return Err(HostError::Misaligned);
        }
        Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
    }

    /// (Re)builds the framebuffer view for a `width` x `height` RGBA canvas,
    /// dropping the previous one.
    ///
    /// The old view is taken out before the other views are revalidated: at
    /// its old size it may no longer fit behind a relocated pointer. If the
    /// new view cannot be built the old one is put back.
    pub fn bind_framebuffer(
        &mut self,
        mem: &mut dyn ForeignMemory,
        width: u32,
        height: u32,
    ) -> Result<ViewHandle, HostError> {
        let old = self
            .framebuffer
            .take()
            .and_then(|fb| self.slots.remove(&fb.handle).map(|slot| (fb, slot)));
        let desc = ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, width as usize * height as usize, 4);
        let handle = match self.view(mem, desc) {
            Ok(handle) => handle,
            Err(e) => {
                if let Some((fb, slot)) = old {
                    self.slots.insert(fb.handle, slot);
                    self.framebuffer = Some(fb);
                }
                return Err(e);
            }
        };
        if let Some((fb, _)) = old {
            debug!(from = ?(fb.width, fb.height), to = ?(width, height), "framebuffer rebound");
        }
        self.framebuffer = Some(Framebuffer {
            handle,
            width,
            height,
        });
        Ok(handle)
    }

    pub fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.framebuffer.map(|fb| (fb.width, fb.height))
    }

    pub fn framebuffer_pixels<'m>(
        &mut self,
        mem: &'m mut dyn ForeignMemory,
    ) -> Result<&'m [u8], HostError> {
        let fb = self.framebuffer.ok_or(HostError::UnknownView)?;
        self.bytes(mem, fb.handle)
    }

    pub fn view_len(&self, handle: ViewHandle) -> Option<usize> {
        self.slots.get(&handle).map(|s| s.desc.byte_len())
    }

    pub fn views(&self) -> usize {
        self.slots.len()
    }

    pub fn recorded_len(&self) -> Option<usize> {
        self.recorded_len
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}
