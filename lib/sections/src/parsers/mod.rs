mod section;
pub use section::{SectionFmt, SectionText};


mod nom_prelude {
  pub use nom::{
    IResult, Parser,
    branch::alt,
    error::{
      self,
      ParseError,
      FromExternalError,
      context,
    },
    sequence::*,
    multi::*,
    combinator::*,
    character::complete::*,
    number::complete::double,
    Finish,
  };
  pub use std::str::FromStr;
  pub use std::num::ParseIntError;
}

mod common;

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
