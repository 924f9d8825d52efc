//! Error types for the rustybluez library
//!
//! This module defines the error types used throughout the library.

use crate::bus::BusError;
use thiserror::Error;

/// Errors that can occur while managing adapters, devices and characteristics
#[derive(Error, Debug)]
pub enum Error {
    #[error("No Bluetooth adapter found")]
    NoAdapter,

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
