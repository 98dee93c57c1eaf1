//! watchview - paginated value expansion for debugger watch windows
//!
//! An inspected value is turned into rows on demand. Each value gets an
//! [`Expansion`] that knows how to produce its children; pages of children are
//! cut out of the expansion tree with a shared [`Cursor`] so rows outside the
//! requested [`Window`] are counted but never built.
//!
//! Runtime callable wrappers additionally get a "Native View" row exposing the
//! native interface pointer, or an explanatory placeholder when the process is
//! not being debugged natively.
//!
//! ```
//! use std::sync::Arc;
//! use watchview::{DebugValue, DebuggeeProcess, InspectionContext, Member, ResultProvider};
//!
//! let value = DebugValue::object(
//!     "System.__ComObject",
//!     vec![Member::field("Name", DebugValue::string("shell"))],
//! )
//! .with_native_com_pointer(0xABCD);
//!
//! let provider = ResultProvider::default();
//! let ctx = InspectionContext::new(Arc::new(DebuggeeProcess::new(true)));
//! let root = provider.evaluate("obj", Some("obj".to_string()), value);
//!
//! let children = provider.get_children(&ctx, &root, 0, 10).unwrap();
//! assert_eq!(children[0].name(), "Name");
//! assert!(children[1].name().starts_with("(IUnknown*)0x"));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod expansion;
pub mod provider;
pub mod remote;
pub mod result;
pub mod snapshot;
pub mod value;

// Re-export commonly used types
pub use config::Config;
pub use context::{
    CancellationToken, DebuggeeProcess, EvaluationFlags, InspectionContext, PointerWidth, Process,
};
pub use error::{CapabilityError, ExpansionError, ExpansionResult};
pub use expansion::{
    create_expansion, AggregateExpansion, ArrayExpansion, Cursor, Expansion, ExpansionOptions,
    MemberExpansion, NativeViewExpansion, Window,
};
pub use provider::{DefaultFormatter, Formatter, ResultProvider};
pub use result::{Category, EvalResult, ExpansionKind, ResultFlags};
pub use snapshot::{ProcessSettings, Snapshot};
pub use value::{DebugValue, Dimension, Member, TypeRef, ValueKind, Visibility};

/// watchview version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
