//! Shared test helpers
//!
//! A scripted driver standing in for the live GL implementation. Tests
//! queue per-entry-point results, seed mappings and error codes, then
//! inspect exactly which calls reached the driver.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::driver::{BufferRef, Driver};
use crate::types::{Call, GL_NO_ERROR, Value};

pub struct MockDriver {
    /// Every call that reached `invoke`, in order
    pub calls: Vec<Call>,
    results: HashMap<String, VecDeque<Value>>,
    errors: VecDeque<u32>,
    mappings: HashMap<BufferRef, u64>,
    /// Reported data store size for any buffer
    pub buffer_size: i64,
    pub compile_ok: bool,
    pub link_ok: bool,
    pub info_log: String,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            results: HashMap::new(),
            errors: VecDeque::new(),
            mappings: HashMap::new(),
            buffer_size: 256,
            compile_ok: true,
            link_ok: true,
            info_log: String::new(),
        }
    }

    /// Queue a result for the next invocation of `name`
    pub fn script_result(&mut self, name: &str, value: Value) {
        self.results.entry(name.to_string()).or_default().push_back(value);
    }

    /// Queue an error code for the next `get_error` drain
    pub fn push_error(&mut self, error: u32) {
        self.errors.push_back(error);
    }

    /// Seed an active mapping the driver will report
    pub fn set_mapping(&mut self, buffer: BufferRef, pointer: u64) {
        self.mappings.insert(buffer, pointer);
    }

    pub fn clear_mapping(&mut self, buffer: BufferRef) {
        self.mappings.remove(&buffer);
    }

    /// Names of all calls that reached the driver
    pub fn invoked_names(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Driver for MockDriver {
    fn invoke(&mut self, call: &Call) -> Option<Value> {
        self.calls.push(call.clone());
        self.results
            .get_mut(&call.name)
            .and_then(|queue| queue.pop_front())
    }

    fn get_error(&mut self) -> u32 {
        self.errors.pop_front().unwrap_or(GL_NO_ERROR)
    }

    fn buffer_size(&mut self, _buffer: BufferRef) -> i64 {
        self.buffer_size
    }

    fn mapped_pointer(&mut self, buffer: BufferRef) -> Option<u64> {
        self.mappings.get(&buffer).copied()
    }

    fn shader_compile_status(&mut self, _shader: u32) -> bool {
        self.compile_ok
    }

    fn shader_info_log(&mut self, _shader: u32) -> String {
        self.info_log.clone()
    }

    fn program_link_status(&mut self, _program: u32) -> bool {
        self.link_ok
    }

    fn program_info_log(&mut self, _program: u32) -> String {
        self.info_log.clone()
    }
}
