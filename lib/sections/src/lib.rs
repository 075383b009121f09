pub use anyhow::Result;

use std::fmt;
use fnv::FnvHashMap as Map;

#[derive(Debug, Clone)]
pub enum Error {
  UnkownInstanceName,
  IndexOutOfRange,
  InvalidInput(String),
}


impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
      _ => fmt::Debug::fmt(self, f),
    }
  }
}

impl std::error::Error for Error {}

pub(crate) fn invalid<T>(msg: String) -> Result<T> {
  Err(Error::InvalidInput(msg).into())
}


pub mod dataset;
pub mod raw;

mod parsers;
pub use parsers::{ParseInstance, SectionFmt, SectionText};
