use std::borrow::Cow;
use crate::Result;

/// Conversion from a freshly parsed record into a checked instance.
pub trait FromRaw<T> where Self: Sized {
  fn from_raw(raw: T, id: Cow<str>) -> Result<Self>;
}

pub mod section;
