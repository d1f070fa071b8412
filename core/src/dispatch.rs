//! Execution dispatch strategies
//!
//! Almost every call goes straight to the driver. The one exception is
//! `glCreateShaderProgramv` under state dumping: the composite call is
//! rewritten into its constituent calls so the intermediate shader object
//! (and its source) stays inspectable afterwards.

use crate::config::ReplayConfig;
use crate::driver::Driver;
use crate::types::{Call, GL_PROGRAM_SEPARABLE, GL_TRUE, Value};

/// How a call reaches the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchStrategy {
    /// One driver invocation, unmodified
    Direct,
    /// Rewrite into the equivalent create/source/compile/link sequence
    DecomposeShaderProgram,
}

impl DispatchStrategy {
    pub(crate) fn select(call: &Call, config: &ReplayConfig) -> Self {
        if config.dump_state && call.name == "glCreateShaderProgramv" {
            DispatchStrategy::DecomposeShaderProgram
        } else {
            DispatchStrategy::Direct
        }
    }
}

/// Invoke a call through the chosen strategy and return its result
pub(crate) fn dispatch<D: Driver>(
    driver: &mut D,
    call: &Call,
    strategy: DispatchStrategy,
) -> Option<Value> {
    match strategy {
        DispatchStrategy::Direct => driver.invoke(call),
        DispatchStrategy::DecomposeShaderProgram => decompose_shader_program(driver, call),
    }
}

// glCreateShaderProgramv(type, count, strings) rewritten as the sequence
// the GL specification defines it as, minus the shader deletion so the
// source remains attached for state dumps. Synthesized calls reuse the
// originating call number.
fn decompose_shader_program<D: Driver>(driver: &mut D, call: &Call) -> Option<Value> {
    let shader_type = call.arg(0).cloned().unwrap_or(Value::Null);
    let count = call.arg(1).cloned().unwrap_or(Value::Null);
    let strings = call.arg(2).cloned().unwrap_or(Value::Null);

    let shader = driver
        .invoke(&Call::new(call.no, "glCreateShader", vec![shader_type]))
        .and_then(|v| v.as_uint())
        .unwrap_or(0) as u32;
    if shader == 0 {
        log::warn!("call {}: glCreateShader failed during decomposition", call.no);
        return Some(Value::UInt(0));
    }

    driver.invoke(&Call::new(
        call.no,
        "glShaderSource",
        vec![Value::UInt(shader as u64), count, strings, Value::Null],
    ));
    driver.invoke(&Call::new(
        call.no,
        "glCompileShader",
        vec![Value::UInt(shader as u64)],
    ));

    let program = driver
        .invoke(&Call::new(call.no, "glCreateProgram", vec![]))
        .and_then(|v| v.as_uint())
        .unwrap_or(0) as u32;
    if program != 0 {
        let compiled = driver.shader_compile_status(shader);
        driver.invoke(&Call::new(
            call.no,
            "glProgramParameteri",
            vec![
                Value::UInt(program as u64),
                Value::UInt(GL_PROGRAM_SEPARABLE as u64),
                Value::UInt(GL_TRUE as u64),
            ],
        ));
        if compiled {
            driver.invoke(&Call::new(
                call.no,
                "glAttachShader",
                vec![Value::UInt(program as u64), Value::UInt(shader as u64)],
            ));
            driver.invoke(&Call::new(
                call.no,
                "glLinkProgram",
                vec![Value::UInt(program as u64)],
            ));
        }
    }

    Some(Value::UInt(program as u64))
}
