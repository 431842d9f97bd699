pub use crate::data_adapter::DataAdapter;
pub use crate::error::{CsResult, Error};
pub use crate::path::{Path, Route, LEVELS};
pub use crate::perm::{Perm, PERM_DEFAULT, PERM_STORE, PERM_WEBSITE};
pub use crate::scope::{ScopeId, ScopeKind};

pub use tracing::{
	debug_span, info_span, warn_span, error_span,
	debug, info, warn, error,
};

// vim: ts=4
