use rhai::{Dynamic, Engine};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

use crate::{capture::OutputCapture, record::register_record, types::ScriptLimits};

/// Token carried by `ErrorTerminated` when the wall-clock deadline passes.
pub(crate) const DEADLINE_TOKEN: &str = "deadline exceeded";

/// The deadline is only sampled every this many operations.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Symbols scripts may not use
const DISABLED_SYMBOLS: &[&str] = &["eval", "import", "export"];

/// Creates a Rhai engine bound to one output capture.
///
/// Registers the ordered `Record` type. `print` goes to the capture's stdout; `debug` and `eprint` go to its stderr.
/// `operations` receives the running operation count for stats.
pub fn create_engine(
    limits: &ScriptLimits,
    capture: &OutputCapture,
    deadline: Instant,
    operations: Arc<AtomicU64>,
) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_operations(limits.max_operations);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);
    // Built-in operators only report an error position on the regular call path.
    engine.set_fast_operators(false);

    for &symbol in DISABLED_SYMBOLS {
        engine.disable_symbol(symbol);
    }

    register_record(&mut engine, limits.max_map_size);

    let stdout = capture.clone();
    engine.on_print(move |text| stdout.write_stdout(text));

    let stderr = capture.clone();
    engine.on_debug(move |text, _source, _pos| stderr.write_stderr(text));

    let stderr = capture.clone();
    engine.register_fn("eprint", move |value: Dynamic| {
        stderr.write_stderr(&value.to_string());
    });

    engine.on_progress(move |count| {
        operations.store(count, Ordering::Relaxed);
        if count % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
            Some(Dynamic::from(DEADLINE_TOKEN))
        } else {
            None
        }
    });

    engine
}
