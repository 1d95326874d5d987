use std::any::Any;

use tracing_subscriber::EnvFilter;

/// Used when neither `ELEMENTUM_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,wgpu=warn,naga=warn,wasmtime=warn,cranelift=warn";

pub fn init_tracing() {
    // ELEMENTUM_LOG=elementum_bridge=debug,elementum_host=debug
    let filter = EnvFilter::try_from_env("ELEMENTUM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .compact()
        .try_init();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

/// Routes panics through tracing, then on to the previous hook so the
/// default stderr report still appears.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "<unknown>".to_string());
        let thread = std::thread::current();
        tracing::error!(
            %location,
            thread = thread.name().unwrap_or("<unnamed>"),
            payload = panic_message(info.payload()),
            "panic"
        );
        previous(info);
    }));
}
