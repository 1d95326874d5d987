use elementum_host::{
    ForeignMemory, HostEngine, HostError, HostLink, LinearMemory, MemoryBridge, ViewDescriptor,
    FRAMEBUFFER_EXPORT,
};

const FB_PTR_ADDR: usize = 16;
const FB_START: usize = 1024;

/// Memory laid out like the simulation: `imageData` holds the address of a
/// word pointing at the framebuffer.
fn sim_memory(len: usize) -> LinearMemory {
    let mut mem = LinearMemory::new(len);
    mem.set_export(FRAMEBUFFER_EXPORT, FB_PTR_ADDR as u32);
    mem.write_u32(FB_PTR_ADDR, FB_START as u32);
    mem
}

/// Engine whose every `tick` grows memory and moves the framebuffer, leaving
/// zeros where it used to be.
struct RelocatingEngine {
    mem: LinearMemory,
    size: (u32, u32),
    fb_at: usize,
    generation: u8,
    snapshot: Vec<u8>,
}

impl RelocatingEngine {
    fn new() -> Self {
        Self {
            mem: sim_memory(4096),
            size: (0, 0),
            fb_at: FB_START,
            generation: 0,
            snapshot: vec![1, 2, 3],
        }
    }

    fn fb_len(&self) -> usize {
        self.size.0 as usize * self.size.1 as usize * 4
    }

    fn paint(&mut self, value: u8) {
        let (at, len) = (self.fb_at, self.fb_len());
        self.mem.write(at, &vec![value; len]);
    }
}

impl HostEngine for RelocatingEngine {
    fn seed(&mut self, _seed: [u32; 6]) -> Result<(), HostError> {
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) -> Result<(), HostError> {
        self.size = (width, height);
        let need = self.fb_at + self.fb_len();
        if need > self.mem.byte_len() {
            self.mem.grow(need - self.mem.byte_len());
        }
        Ok(())
    }

    fn canvas_size(&mut self) -> Result<(u32, u32), HostError> {
        Ok(self.size)
    }

    fn tick(&mut self) -> Result<(), HostError> {
        let len = self.fb_len();
        let old = self.fb_at;
        self.mem.write(old, &vec![0; len]);
        self.mem.grow(4096);
        self.fb_at = self.mem.byte_len() - len - 8;
        self.mem.write_u32(FB_PTR_ADDR, self.fb_at as u32);
        self.generation += 1;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), HostError> {
        let g = 0xA0 + self.generation;
        self.paint(g);
        Ok(())
    }

    fn change_scene(&mut self, _scene: i32) -> Result<(), HostError> {
        Ok(())
    }

    fn frame_peak(&mut self) -> Result<f32, HostError> {
        Ok(self.generation as f32)
    }

    fn export_snapshot(&mut self) -> Result<Vec<u8>, HostError> {
        Ok(self.snapshot.clone())
    }

    /// `[b'S', w, h]` imports a canvas of another size: memory grows and the
    /// new framebuffer lands at its very end.
    fn import_snapshot(&mut self, bytes: &[u8]) -> Result<bool, HostError> {
        if let [b'S', w, h] = *bytes {
            self.size = (u32::from(w), u32::from(h));
            self.mem.grow(4096);
            self.fb_at = self.mem.byte_len() - self.fb_len();
            self.mem.write_u32(FB_PTR_ADDR, self.fb_at as u32);
        }
        self.snapshot = bytes.to_vec();
        Ok(true)
    }

    fn memory(&mut self) -> &mut dyn ForeignMemory {
        &mut self.mem
    }
}

// ============================================================================
// MemoryBridge - View Construction
// ============================================================================

#[test]
fn test_direct_view_reads_scalar() {
    let mut mem = sim_memory(256);
    mem.set_export("counter", 40);
    mem.write_u32(40, 0xdead_beef);
    let mut bridge = MemoryBridge::new();
    let h = bridge
        .view(&mut mem, ViewDescriptor::direct("counter", 1, 4))
        .unwrap();
    assert_eq!(bridge.read::<u32>(&mut mem, h).unwrap(), 0xdead_beef);
}

#[test]
fn test_indirect_view_follows_pointer() {
    let mut mem = sim_memory(2048);
    mem.write(FB_START, &[7, 8, 9, 10]);
    let mut bridge = MemoryBridge::new();
    let h = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 1, 4))
        .unwrap();
    assert_eq!(bridge.bytes(&mut mem, h).unwrap(), &[7, 8, 9, 10]);
}

#[test]
fn test_view_past_end_is_out_of_bounds() {
    let mut mem = sim_memory(1100);
    let mut bridge = MemoryBridge::new();
    let err = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 100, 4))
        .unwrap_err();
    assert!(matches!(err, HostError::OutOfBounds { offset: 1024, len: 400, memory: 1100 }));
}

#[test]
fn test_missing_export() {
    let mut mem = LinearMemory::new(64);
    let mut bridge = MemoryBridge::new();
    let err = bridge
        .view(&mut mem, ViewDescriptor::direct("nope", 1, 4))
        .unwrap_err();
    assert_eq!(err, HostError::MissingExport("nope".into()));
}

#[test]
fn test_released_handle_is_unknown() {
    let mut mem = sim_memory(2048);
    let mut bridge = MemoryBridge::new();
    let h = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 1, 4))
        .unwrap();
    assert!(bridge.release(h));
    assert_eq!(bridge.bytes(&mut mem, h).unwrap_err(), HostError::UnknownView);
}

#[test]
fn test_framebuffer_length_for_four_units() {
    let mut mem = sim_memory(FB_START + 300 * 300 * 4);
    let mut bridge = MemoryBridge::new();
    let h = bridge.bind_framebuffer(&mut mem, 300, 300).unwrap();
    assert_eq!(bridge.view_len(h), Some(300 * 300 * 4));
    assert_eq!(bridge.framebuffer_pixels(&mut mem).unwrap().len(), 360_000);
    assert_eq!(bridge.framebuffer_size(), Some((300, 300)));
}

#[test]
fn test_rebinding_framebuffer_replaces_old_view() {
    let mut mem = sim_memory(FB_START + 64 * 64 * 4);
    let mut bridge = MemoryBridge::new();
    let old = bridge.bind_framebuffer(&mut mem, 32, 32).unwrap();
    bridge.bind_framebuffer(&mut mem, 64, 64).unwrap();
    assert_eq!(bridge.views(), 1);
    assert_eq!(bridge.view_len(old), None);
    assert_eq!(bridge.framebuffer_pixels(&mut mem).unwrap().len(), 64 * 64 * 4);
}

#[test]
fn test_rebinding_smaller_framebuffer_after_relocation() {
    let mut mem = sim_memory(4096);
    let mut bridge = MemoryBridge::new();
    bridge.bind_framebuffer(&mut mem, 8, 8).unwrap();

    // Grown memory, framebuffer moved to the end and now only 2x2.
    mem.grow(4096);
    let at = mem.byte_len() - 2 * 2 * 4;
    mem.write_u32(FB_PTR_ADDR, at as u32);
    assert!(matches!(bridge.revalidate(&mut mem), Err(HostError::OutOfBounds { .. })));

    bridge.bind_framebuffer(&mut mem, 2, 2).unwrap();
    assert_eq!(bridge.views(), 1);
    assert_eq!(bridge.framebuffer_size(), Some((2, 2)));
    assert_eq!(bridge.framebuffer_pixels(&mut mem).unwrap().len(), 16);
    assert_eq!(bridge.revalidate(&mut mem), Ok(false));
}

#[test]
fn test_failed_rebind_keeps_old_framebuffer() {
    let mut mem = sim_memory(FB_START + 4 * 4 * 4);
    let mut bridge = MemoryBridge::new();
    let old = bridge.bind_framebuffer(&mut mem, 4, 4).unwrap();

    assert!(bridge.bind_framebuffer(&mut mem, 64, 64).is_err());
    assert_eq!(bridge.framebuffer_size(), Some((4, 4)));
    assert_eq!(bridge.view_len(old), Some(64));
    assert_eq!(bridge.framebuffer_pixels(&mut mem).unwrap().len(), 64);
}

// ============================================================================
// MemoryBridge - Revalidation
// ============================================================================

#[test]
fn test_revalidate_only_on_length_change() {
    let mut mem = sim_memory(2048);
    let mut bridge = MemoryBridge::new();
    bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 4, 4))
        .unwrap();
    assert!(!bridge.revalidate(&mut mem).unwrap());
    let before = bridge.rebuild_count();

    mem.grow(4096);
    assert!(bridge.revalidate(&mut mem).unwrap());
    assert_eq!(bridge.rebuild_count(), before + 1);
    assert_eq!(bridge.recorded_len(), Some(2048 + 4096));
    assert!(!bridge.revalidate(&mut mem).unwrap());
}

#[test]
fn test_read_after_relocation_without_revalidate_sees_new_location() {
    let mut mem = sim_memory(2048);
    mem.write(FB_START, &[1; 16]);
    let mut bridge = MemoryBridge::new();
    let fb = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 4, 4))
        .unwrap();

    // Host grows and moves the buffer; nobody calls revalidate.
    mem.grow(4096);
    mem.write(FB_START, &[0; 16]);
    mem.write(5000, &[2; 16]);
    mem.write_u32(FB_PTR_ADDR, 5000);

    assert_eq!(bridge.bytes(&mut mem, fb).unwrap(), &[2; 16]);
}

#[test]
fn test_every_view_rebuilt_not_just_one() {
    let mut mem = sim_memory(2048);
    mem.set_export("scalar", 64);
    let mut bridge = MemoryBridge::new();
    let fb = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 1, 4))
        .unwrap();
    let scalar = bridge
        .view(&mut mem, ViewDescriptor::direct("scalar", 1, 4))
        .unwrap();

    mem.grow(1024);
    mem.set_export("scalar", 2100);
    mem.write_u32(2100, 99);
    // Reading the framebuffer triggers the rebuild; the scalar moved too.
    bridge.bytes(&mut mem, fb).unwrap();
    let rebuilds = bridge.rebuild_count();
    assert_eq!(bridge.read::<u32>(&mut mem, scalar).unwrap(), 99);
    assert_eq!(bridge.rebuild_count(), rebuilds);
}

#[test]
fn test_failed_rebuild_commits_nothing() {
    let mut mem = sim_memory(2048);
    mem.write(FB_START, &[5; 4]);
    let mut bridge = MemoryBridge::new();
    let fb = bridge
        .view(&mut mem, ViewDescriptor::indirect(FRAMEBUFFER_EXPORT, 1, 4))
        .unwrap();

    mem.grow(16);
    mem.write_u32(FB_PTR_ADDR, 1_000_000);
    assert!(matches!(
        bridge.revalidate(&mut mem),
        Err(HostError::OutOfBounds { .. })
    ));
    assert_eq!(bridge.recorded_len(), Some(2048));

    mem.write_u32(FB_PTR_ADDR, FB_START as u32);
    assert!(bridge.revalidate(&mut mem).unwrap());
    assert_eq!(bridge.bytes(&mut mem, fb).unwrap(), &[5; 4]);
}

// ============================================================================
// HostLink
// ============================================================================

#[test]
fn test_link_not_ready_before_attach() {
    let mut link = HostLink::new();
    assert!(!link.is_ready());
    assert_eq!(
        link.view(ViewDescriptor::direct("x", 1, 4)).unwrap_err(),
        HostError::NotReady
    );
    assert_eq!(link.revalidate().unwrap_err(), HostError::NotReady);
    assert_eq!(link.framebuffer().unwrap_err(), HostError::NotReady);
    assert!(link.engine().is_err());
}

#[test]
fn test_link_never_serves_stale_pixels() {
    let mut link = HostLink::new();
    link.attach(Box::new(RelocatingEngine::new()));
    link.set_canvas_size(4, 4).unwrap();

    for generation in 1..=5u8 {
        let engine = link.engine().unwrap();
        engine.tick().unwrap();
        engine.draw().unwrap();
        let (pixels, w, h) = link.framebuffer().unwrap();
        assert_eq!((w, h), (4, 4));
        assert_eq!(pixels.len(), 64);
        assert!(pixels.iter().all(|p| *p == 0xA0 + generation));
    }
}

#[test]
fn test_link_sync_canvas_rebinds_on_host_size_change() {
    let mut link = HostLink::new();
    link.attach(Box::new(RelocatingEngine::new()));
    link.set_canvas_size(4, 4).unwrap();
    assert!(!link.sync_canvas().unwrap());

    link.engine().unwrap().set_size(8, 8).unwrap();
    assert!(link.sync_canvas().unwrap());
    assert_eq!(link.canvas_size(), Some((8, 8)));
    assert_eq!(link.framebuffer().unwrap().0.len(), 8 * 8 * 4);
}

#[test]
fn test_link_recovers_from_import_that_shrinks_canvas() {
    let mut link = HostLink::new();
    link.attach(Box::new(RelocatingEngine::new()));
    link.set_canvas_size(8, 8).unwrap();

    assert!(link.engine().unwrap().import_snapshot(&[b'S', 2, 2]).unwrap());
    assert!(link.sync_canvas().unwrap());
    assert_eq!(link.canvas_size(), Some((2, 2)));
    assert_eq!(link.revalidate(), Ok(false));

    link.engine().unwrap().draw().unwrap();
    let (pixels, w, h) = link.framebuffer().unwrap();
    assert_eq!((w, h), (2, 2));
    assert_eq!(pixels.len(), 2 * 2 * 4);
    assert!(pixels.iter().all(|p| *p == 0xA0));
}
