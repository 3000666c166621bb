//! The crate’s error type.
//!
//! Most modules have their own, more specific error types. They all
//! convert into [`Error`], which is what the resolver returns.

use crate::base::name::NameError;
use crate::base::scan::ScanError;
use crate::base::wire::{ComposeError, FormError, ParseError};
use crate::resolv::conf::ConfError;
use std::{fmt, io};

/// A `Result` with the crate’s error type.
pub type Result<T> = std::result::Result<T, Error>;

//------------ Error ---------------------------------------------------------

/// An error happened while talking DNS.
#[derive(Debug)]
pub enum Error {
    /// A domain name or its presentation format was malformed.
    MalformedName(NameError),

    /// A message could not be encoded.
    Encoding(ComposeError),

    /// A message ended before all its declared records were read.
    TruncatedMessage,

    /// A compressed domain name followed too many pointers.
    CompressionLoop,

    /// A message or some data was not formatted correctly.
    Form(String),

    /// The resolver configuration was invalid.
    Configuration(String),

    /// A socket operation failed.
    Transport(io::Error),

    /// No answer arrived in time.
    Timeout,

    /// None of the name servers produced an answer.
    AllNameserversFailed,

    /// Iterative resolution found no name server to ask.
    NoAuthorityFound,

    /// Iterative resolution went too deep.
    RecursionTooDeep,

    /// A zone transfer ended prematurely.
    ZoneTransferAborted(String),
}

//--- From

impl From<NameError> for Error {
    fn from(err: NameError) -> Self {
        Error::MalformedName(err)
    }
}

impl From<ComposeError> for Error {
    fn from(err: ComposeError) -> Self {
        Error::Encoding(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::ShortInput => Error::TruncatedMessage,
            ParseError::CompressionLoop => Error::CompressionLoop,
            ParseError::Form(err) => err.into(),
        }
    }
}

impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        Error::Form(err.to_string())
    }
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        Error::Form(err.to_string())
    }
}

impl From<ConfError> for Error {
    fn from(err: ConfError) -> Self {
        match err {
            ConfError::Io(err) => Error::Transport(err),
            other => Error::Configuration(other.to_string()),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Error::Timeout
            }
            _ => Error::Transport(err),
        }
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::MalformedName(ref err) => {
                write!(f, "malformed domain name: {}", err)
            }
            Error::Encoding(ref err) => write!(f, "encoding error: {}", err),
            Error::TruncatedMessage => f.write_str("truncated message"),
            Error::CompressionLoop => f.write_str("compression loop"),
            Error::Form(ref msg) => write!(f, "format error: {}", msg),
            Error::Configuration(ref msg) => {
                write!(f, "configuration error: {}", msg)
            }
            Error::Transport(ref err) => write!(f, "transport error: {}", err),
            Error::Timeout => f.write_str("query timed out"),
            Error::AllNameserversFailed => {
                f.write_str("all nameservers failed")
            }
            Error::NoAuthorityFound => f.write_str("no authority found"),
            Error::RecursionTooDeep => f.write_str("recursion too deep"),
            Error::ZoneTransferAborted(ref msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::MalformedName(ref err) => Some(err),
            Error::Encoding(ref err) => Some(err),
            Error::Transport(ref err) => Some(err),
            _ => None,
        }
    }
}

//============ Testing =======================================================
