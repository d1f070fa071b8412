//! Post-call diagnostics
//!
//! Observability only: compile/link failures, map failures and mismatches
//! against the recorded results are surfaced as warnings, never aborts.
//! Skipped entirely inside a begin/end bracket, where the queries they
//! rely on are invalid.

use crate::classify::CallCategories;
use crate::driver::{Driver, FrameSink, gl_error_name};
use crate::profile::Profiler;
use crate::types::{Call, GL_FRAMEBUFFER_COMPLETE, GL_NO_ERROR, Value};

use super::ReplayEngine;

impl<D: Driver, P: Profiler, F: FrameSink> ReplayEngine<D, P, F> {
    pub(super) fn run_diagnostics(
        &mut self,
        call: &Call,
        cats: CallCategories,
        result: Option<&Value>,
    ) {
        if !call.name.starts_with("gl") {
            return;
        }

        self.drain_driver_errors(call);

        match call.name.as_str() {
            "glCompileShader" | "glCompileShaderARB" => {
                let shader = call.arg_uint(0).unwrap_or(0) as u32;
                if !self.driver.shader_compile_status(shader) {
                    let info_log = self.driver.shader_info_log(shader);
                    log::warn!(
                        "call {} ({}): shader {shader} failed to compile: {}",
                        call.no,
                        call.name,
                        info_log.trim_end()
                    );
                }
            }
            "glLinkProgram" | "glLinkProgramARB" => {
                let program = call.arg_uint(0).unwrap_or(0) as u32;
                self.check_link_status(call, program);
            }
            "glCreateShaderProgramv" | "glCreateShaderProgramEXT" => {
                // The program handle is the replayed result here
                let program = result.and_then(Value::as_uint).unwrap_or(0) as u32;
                self.check_link_status(call, program);
            }
            "glGetAttribLocation" | "glGetAttribLocationARB" => {
                let replayed = result.and_then(Value::as_sint);
                let recorded = call.ret.as_ref().and_then(Value::as_sint);
                if let (Some(new), Some(orig)) = (replayed, recorded) {
                    if new != orig {
                        log::warn!(
                            "call {} ({}): vertex attrib location mismatch {orig} -> {new}",
                            call.no,
                            call.name
                        );
                    }
                }
            }
            "glCheckFramebufferStatus"
            | "glCheckFramebufferStatusEXT"
            | "glCheckNamedFramebufferStatusEXT" => {
                let replayed = result.and_then(Value::as_uint);
                let recorded = call.ret.as_ref().and_then(Value::as_uint);
                if recorded == Some(GL_FRAMEBUFFER_COMPLETE as u64)
                    && replayed.is_some()
                    && replayed != Some(GL_FRAMEBUFFER_COMPLETE as u64)
                {
                    log::warn!(
                        "call {} ({}): incomplete framebuffer ({:#06x})",
                        call.no,
                        call.name,
                        replayed.unwrap_or(0)
                    );
                }
            }
            _ => {}
        }

        if cats.contains(CallCategories::BUFFER_MAP) {
            let failed = result.map(Value::is_null).unwrap_or(true);
            if failed {
                log::warn!("call {} ({}): failed to map buffer", call.no, call.name);
            }
        }
        if cats.contains(CallCategories::BUFFER_UNMAP) {
            // Only unmap variants that return a status can report failure
            if let Some(value) = result {
                if value.as_uint() == Some(0) {
                    log::warn!("call {} ({}): failed to unmap buffer", call.no, call.name);
                }
            }
        }
    }

    fn check_link_status(&mut self, call: &Call, program: u32) {
        if !self.driver.program_link_status(program) {
            let info_log = self.driver.program_info_log(program);
            log::warn!(
                "call {} ({}): program {program} failed to link: {}",
                call.no,
                call.name,
                info_log.trim_end()
            );
        }
    }

    fn drain_driver_errors(&mut self, call: &Call) {
        loop {
            let error = self.driver.get_error();
            if error == GL_NO_ERROR {
                break;
            }
            log::warn!(
                "call {}: glGetError({}) = {}",
                call.no,
                call.name,
                gl_error_name(error)
            );
        }
    }
}
