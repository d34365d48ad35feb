//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration, mismatched mask shapes and degenerate candidate
//! pools or graphs, plus IO, JSON encoding and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("mask shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("no candidate sites satisfy the walkability, wall-clearance and placeability filters")]
    NoCandidateSites,

    #[error("object count {required} exceeds the {available} available candidate sites")]
    InsufficientSites { required: usize, available: usize },

    #[error("navigation graph has no nodes; the walkability mask is fully blocked")]
    EmptyGraph,

    #[error("at least one entrance is required")]
    NoEntrances,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
