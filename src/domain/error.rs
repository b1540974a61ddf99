use std::{error, fmt, io};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classifies an [`Error`] without pinning down its formatted message.
///
/// A caller that only cares whether, say, an add-feed call failed because of a
/// duplicate name matches on this instead of parsing `Display` output.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ErrorKind {
    ConfigNotFound,
    ProcessAlreadyRunning,
    FailedToReadConfig,
    FailedToUpdateStatus,
    FeedNotFound,
    FeedNotUnique,
    InvalidInterval,
    InvalidWorkerCount,
    NoFeeds,
    NoArticles,
    FetchFailed,
    ParseFailed,
    EmptyFeed,
    BlacklistedUrl,
    InternalError,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    IoError(io::Error),
    DbError(diesel::result::Error),
    PoolError(diesel::r2d2::Error),
    ConfigError(config::ConfigError),
    HttpError(reqwest::Error),
    XmlError(quick_xml::de::DeError),
}

pub struct Error {
    repr: ErrorRepr,
}

impl Error {
    pub fn new(kind: ErrorKind, desc: &'static str) -> Error {
        Error {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }

    pub fn with_detail(kind: ErrorKind, desc: &'static str, detail: impl Into<String>) -> Error {
        Error {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail.into()),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _) => Some(kind),
            ErrorRepr::WithDescriptionAndDetail(kind, _, _) => Some(kind),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Error {
        Error {
            repr: ErrorRepr::DbError(err),
        }
    }
}

impl From<diesel::r2d2::Error> for Error {
    fn from(err: diesel::r2d2::Error) -> Error {
        Error {
            repr: ErrorRepr::PoolError(err),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Error {
        Error {
            repr: ErrorRepr::ConfigError(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error {
            repr: ErrorRepr::HttpError(err),
        }
    }
}

impl From<quick_xml::de::DeError> for Error {
    fn from(err: quick_xml::de::DeError) -> Error {
        Error {
            repr: ErrorRepr::XmlError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for Error {
    fn from((kind, desc): (ErrorKind, &'static str)) -> Error {
        Error {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for Error {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> Error {
        Error {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            ErrorRepr::DbError(ref err) => Some(err),
            ErrorRepr::PoolError(ref err) => Some(err),
            ErrorRepr::ConfigError(ref err) => Some(err),
            ErrorRepr::HttpError(ref err) => Some(err),
            ErrorRepr::XmlError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
            ErrorRepr::WithDescriptionAndDetail(_, desc, ref detail) => {
                desc.fmt(f)?;
                f.write_str(": ")?;
                detail.fmt(f)
            }
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::DbError(ref err) => err.fmt(f),
            ErrorRepr::PoolError(ref err) => err.fmt(f),
            ErrorRepr::ConfigError(ref err) => err.fmt(f),
            ErrorRepr::HttpError(ref err) => err.fmt(f),
            ErrorRepr::XmlError(ref err) => err.fmt(f),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
