use std::sync::{Arc, Mutex, MutexGuard};

/// Per-call output buffers handed to the engine callbacks.
///
/// Clones share the same buffers; separate `new()` calls never do.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line to the captured stdout
    pub fn write_stdout(&self, text: &str) {
        push_line(&mut lock(&self.stdout), text);
    }

    /// Append one line to the captured stderr
    pub fn write_stderr(&self, text: &str) {
        push_line(&mut lock(&self.stderr), text);
    }

    pub fn stdout(&self) -> String {
        lock(&self.stdout).clone()
    }

    pub fn stderr(&self) -> String {
        lock(&self.stderr).clone()
    }
}

fn push_line(buffer: &mut String, text: &str) {
    buffer.push_str(text);
    buffer.push('\n');
}

// A poisoned buffer still holds valid text.
fn lock(buffer: &Mutex<String>) -> MutexGuard<'_, String> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
