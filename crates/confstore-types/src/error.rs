use tracing::warn;

pub type CsResult<T> = std::result::Result<T, Error>;

/// Error kinds of the configuration service. Callers match on the variant,
/// not on the message.
#[derive(Debug)]
pub enum Error {
	/// A key, observer type or event name does not exist
	NotFound,
	/// Input failed validation (route grammar, observer condition, decode)
	NotValid(String),
	/// A name is known but the implementation does not support it
	NotSupported(String),
	/// Required input was empty
	Empty(String),
	/// A document or value could not be decoded
	BadEncoding(String),
	/// Close was called twice
	AlreadyClosed,
	/// Unrecoverable internal state
	Fatal(String),
	/// Database error, details already logged
	Db,

	// externals
	Io(std::io::Error),
}

impl Error {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Error::NotFound)
	}

	pub fn is_not_valid(&self) -> bool {
		matches!(self, Error::NotValid(_))
	}

	pub fn is_not_supported(&self) -> bool {
		matches!(self, Error::NotSupported(_))
	}

	pub fn is_empty_input(&self) -> bool {
		matches!(self, Error::Empty(_))
	}

	pub fn is_bad_encoding(&self) -> bool {
		matches!(self, Error::BadEncoding(_))
	}

	pub fn is_already_closed(&self) -> bool {
		matches!(self, Error::AlreadyClosed)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{:?}", self)
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		warn!("io error: {}", err);
		Self::Io(err)
	}
}

impl From<std::num::ParseIntError> for Error {
	fn from(err: std::num::ParseIntError) -> Self {
		Error::NotValid(format!("integer: {}", err))
	}
}

impl From<std::num::ParseFloatError> for Error {
	fn from(err: std::num::ParseFloatError) -> Self {
		Error::NotValid(format!("float: {}", err))
	}
}

impl From<std::str::Utf8Error> for Error {
	fn from(err: std::str::Utf8Error) -> Self {
		Error::BadEncoding(format!("utf-8: {}", err))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::BadEncoding(err.to_string())
	}
}

// vim: ts=4
