// src/error.rs

//! Fatal errors. Failures confined to a single revision pair never surface here.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Failed to open repository at {location}")]
    Open {
        location: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to clone {url}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to walk history of {label}")]
    History {
        label: String,
        #[source]
        source: git2::Error,
    },

    #[error("IO error while {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("Invalid dataset {path:?}: {message}")]
    Dataset { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io { context: context.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv { path: path.into(), source }
    }
}
