//! Inspection context handed to every expansion
//!
//! The context carries the evaluation flags of the request, a handle to the
//! debuggee process for capability queries, and an optional cancellation token
//! the host can trip from another thread.

use crate::error::CapabilityError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

bitflags! {
    /// Flags controlling how a request may touch the debuggee
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EvaluationFlags: u32 {
        /// The request must not run code or query native runtime state
        const NO_SIDE_EFFECTS = 1 << 0;
        /// Non-public members are left out of member expansions
        const HIDE_NON_PUBLIC = 1 << 1;
    }
}

impl Default for EvaluationFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pointer width of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    /// Pointer width of the process this code runs in
    pub fn host() -> Self {
        if cfg!(target_pointer_width = "32") {
            PointerWidth::Bits32
        } else {
            PointerWidth::Bits64
        }
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(PointerWidth::Bits32),
            64 => Some(PointerWidth::Bits64),
            _ => None,
        }
    }

    /// Number of hex digits in a zero-padded address
    pub fn hex_digits(self) -> usize {
        match self {
            PointerWidth::Bits32 => 8,
            PointerWidth::Bits64 => 16,
        }
    }
}

/// The debuggee process, as far as expansions need to know about it
pub trait Process: fmt::Debug + Send + Sync {
    /// Confirm the native runtime of the process can be inspected
    fn native_runtime(&self) -> Result<(), CapabilityError>;

    /// Width used when printing native addresses
    fn pointer_width(&self) -> PointerWidth {
        PointerWidth::host()
    }
}

/// A process described by static settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggeeProcess {
    native_debugging: bool,
    pointer_width: PointerWidth,
    exited: bool,
}

impl DebuggeeProcess {
    pub fn new(native_debugging: bool) -> Self {
        Self {
            native_debugging,
            pointer_width: PointerWidth::host(),
            exited: false,
        }
    }

    pub fn with_pointer_width(mut self, pointer_width: PointerWidth) -> Self {
        self.pointer_width = pointer_width;
        self
    }

    /// Mark the process as gone; every capability query fails afterwards
    pub fn exited(mut self) -> Self {
        self.exited = true;
        self
    }
}

impl Process for DebuggeeProcess {
    fn native_runtime(&self) -> Result<(), CapabilityError> {
        if self.exited {
            Err(CapabilityError::ProcessExited)
        } else if !self.native_debugging {
            Err(CapabilityError::NativeDebuggingUnavailable)
        } else {
            Ok(())
        }
    }

    fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }
}

/// Host-owned flag used to abandon a request
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Ambient settings for one evaluation request
#[derive(Debug, Clone)]
pub struct InspectionContext {
    flags: EvaluationFlags,
    process: Arc<dyn Process>,
    cancellation: Option<CancellationToken>,
}

impl InspectionContext {
    pub fn new(process: Arc<dyn Process>) -> Self {
        Self {
            flags: EvaluationFlags::empty(),
            process,
            cancellation: None,
        }
    }

    pub fn with_flags(mut self, flags: EvaluationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn flags(&self) -> EvaluationFlags {
        self.flags
    }

    pub fn process(&self) -> &dyn Process {
        self.process.as_ref()
    }

    pub fn is_side_effect_free(&self) -> bool {
        self.flags.contains(EvaluationFlags::NO_SIDE_EFFECTS)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
