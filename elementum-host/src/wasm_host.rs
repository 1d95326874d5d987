use tracing::{debug, info};
use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, TypedFunc, Val};

use crate::engine::HostEngine;
use crate::error::HostError;
use crate::memory::ForeignMemory;

/// Compiles and instantiates simulation modules.
pub struct WasmHost {
    engine: Engine,
}

impl std::fmt::Debug for WasmHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmHost").finish()
    }
}

impl WasmHost {
    pub fn new() -> Result<Self, HostError> {
        let engine = Engine::default();
        Ok(Self { engine })
    }

    /// Instantiates `wasm_bytes` with the `env` imports the simulation
    /// expects and binds every export the UI uses.
    pub fn instantiate(&self, wasm_bytes: &[u8]) -> Result<WasmEngine, HostError> {
        let load = |e: wasmtime::Error| HostError::Load(format!("{e:#}"));

        let module = Module::new(&self.engine, wasm_bytes).map_err(load)?;
        let mut store = Store::new(&self.engine, ());
        let mut linker = Linker::new(&self.engine);

        linker
            .func_wrap("env", "log", |value: i32| debug!(target: "elementum::host", value, "host log"))
            .map_err(load)?;
        linker.func_wrap("env", "cos", |x: f32| x.cos()).map_err(load)?;
        linker.func_wrap("env", "sin", |x: f32| x.sin()).map_err(load)?;
        linker
            .func_wrap("env", "atan2", |y: f32, x: f32| y.atan2(x))
            .map_err(load)?;

        let instance = linker.instantiate(&mut store, &module).map_err(load)?;
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| HostError::MissingExport("memory".into()))?;

        macro_rules! func {
            ($name:literal) => {
                instance
                    .get_typed_func(&mut store, $name)
                    .map_err(|_| HostError::MissingExport($name.into()))?
            };
        }

        let exports = Exports {
            seed: func!("seed"),
            set_size: func!("setSize"),
            tick: func!("tick"),
            draw: func!("draw"),
            change_scene: func!("changeScene"),
            frame_peak: func!("getFrameExplosionPower"),
            export_data: func!("exportData"),
            export_len: func!("exportDataLength"),
            alloc_import: func!("allocImport"),
            import_data: func!("importData"),
        };

        info!(bytes = wasm_bytes.len(), "host module instantiated");
        Ok(WasmEngine {
            store,
            instance,
            memory,
            exports,
            requested: (0, 0),
        })
    }
}

struct Exports {
    seed: TypedFunc<(i32, i32, i32, i32, i32, i32), ()>,
    set_size: TypedFunc<(i32, i32), ()>,
    tick: TypedFunc<(), ()>,
    draw: TypedFunc<(), ()>,
    change_scene: TypedFunc<i32, ()>,
    frame_peak: TypedFunc<(), f32>,
    export_data: TypedFunc<(), i32>,
    export_len: TypedFunc<(), i32>,
    alloc_import: TypedFunc<i32, i32>,
    import_data: TypedFunc<i32, i32>,
}

/// A live simulation instance.
pub struct WasmEngine {
    store: Store<()>,
    instance: Instance,
    memory: Memory,
    exports: Exports,
    /// Last size passed to `setSize`, reported when the module has no
    /// `canvasWidth`/`canvasHeight` globals.
    requested: (u32, u32),
}

impl std::fmt::Debug for WasmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmEngine")
            .field("memory_bytes", &self.memory.data_size(&self.store))
            .field("requested", &self.requested)
            .finish()
    }
}

impl WasmEngine {
    fn global_u32(&mut self, name: &str) -> Option<u32> {
        let global = self.instance.get_global(&mut self.store, name)?;
        match global.get(&mut self.store) {
            Val::I32(v) => Some(v as u32),
            _ => None,
        }
    }

    fn checked_range(&self, ptr: i32, len: usize) -> Result<std::ops::Range<usize>, HostError> {
        let memory = self.memory.data_size(&self.store);
        let start = ptr as u32 as usize;
        match start.checked_add(len) {
            Some(end) if end <= memory => Ok(start..end),
            _ => Err(HostError::OutOfBounds {
                offset: start,
                len,
                memory,
            }),
        }
    }
}

impl HostEngine for WasmEngine {
    fn seed(&mut self, seed: [u32; 6]) -> Result<(), HostError> {
        let [a, b, c, d, e, f] = seed.map(|w| w as i32);
        self.exports
            .seed
            .call(&mut self.store, (a, b, c, d, e, f))
            .map_err(|e| HostError::call("seed", e))
    }

    fn set_size(&mut self, width: u32, height: u32) -> Result<(), HostError> {
        self.exports
            .set_size
            .call(&mut self.store, (width as i32, height as i32))
            .map_err(|e| HostError::call("setSize", e))?;
        self.requested = (width, height);
        Ok(())
    }

    fn canvas_size(&mut self) -> Result<(u32, u32), HostError> {
        match (self.global_u32("canvasWidth"), self.global_u32("canvasHeight")) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Ok(self.requested),
        }
    }

    fn tick(&mut self) -> Result<(), HostError> {
        self.exports
            .tick
            .call(&mut self.store, ())
            .map_err(|e| HostError::call("tick", e))
    }

    fn draw(&mut self) -> Result<(), HostError> {
        self.exports
            .draw
            .call(&mut self.store, ())
            .map_err(|e| HostError::call("draw", e))
    }

    fn change_scene(&mut self, scene: i32) -> Result<(), HostError> {
        self.exports
            .change_scene
            .call(&mut self.store, scene)
            .map_err(|e| HostError::call("changeScene", e))
    }

    fn frame_peak(&mut self) -> Result<f32, HostError> {
        self.exports
            .frame_peak
            .call(&mut self.store, ())
            .map_err(|e| HostError::call("getFrameExplosionPower", e))
    }

    fn export_snapshot(&mut self) -> Result<Vec<u8>, HostError> {
        let ptr = self
            .exports
            .export_data
            .call(&mut self.store, ())
            .map_err(|e| HostError::call("exportData", e))?;
        let len = self
            .exports
            .export_len
            .call(&mut self.store, ())
            .map_err(|e| HostError::call("exportDataLength", e))?;
        let range = self.checked_range(ptr, len.max(0) as usize)?;
        Ok(self.memory.data(&self.store)[range].to_vec())
    }

    fn import_snapshot(&mut self, bytes: &[u8]) -> Result<bool, HostError> {
        let len = i32::try_from(bytes.len()).map_err(|_| HostError::OutOfBounds {
            offset: 0,
            len: bytes.len(),
            memory: self.memory.data_size(&self.store),
        })?;
        let ptr = self
            .exports
            .alloc_import
            .call(&mut self.store, len)
            .map_err(|e| HostError::call("allocImport", e))?;
        // allocImport may have grown memory; resolve the range afterwards.
        let range = self.checked_range(ptr, bytes.len())?;
        self.memory.data_mut(&mut self.store)[range].copy_from_slice(bytes);
        let accepted = self
            .exports
            .import_data
            .call(&mut self.store, len)
            .map_err(|e| HostError::call("importData", e))?;
        Ok(accepted != 0)
    }

    fn memory(&mut self) -> &mut dyn ForeignMemory {
        self
    }
}

impl ForeignMemory for WasmEngine {
    fn byte_len(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    fn export_value(&mut self, name: &str) -> Result<u32, HostError> {
        self.global_u32(name)
            .ok_or_else(|| HostError::MissingExport(name.to_string()))
    }

    fn bytes(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }
}
