use std::path::Path;
use anyhow::Context;
use crate::Result;
use crate::raw::section::*;
use super::{
  ParseInstance,
  nom_prelude::*
};

/// A section file on disk.
#[derive(Debug, Copy, Clone)]
pub struct SectionFmt<P>(pub P);

/// Section file contents already held in memory.
#[derive(Debug, Copy, Clone)]
pub struct SectionText<'a>(pub &'a str);

impl<'a> ParseInstance<SectionText<'a>> for SectionRecord {
  fn parse(text: SectionText<'a>) -> Result<SectionRecord> {
    match parsers::section(text.0).finish() {
      Ok((_, record)) => Ok(record),
      Err(e) => Err(
        anyhow::Error::msg(error::convert_error(text.0, e))
      ),
    }
  }
}

impl<P: AsRef<Path>> ParseInstance<SectionFmt<P>> for SectionRecord {
  fn parse(path: SectionFmt<P>) -> Result<SectionRecord> {
    let path = path.0.as_ref();
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("try read section file {:?}", path))?;
    SectionRecord::parse(SectionText(&data))
  }
}


mod parsers {
  use super::*;
  use crate::parsers::common::*;

  fn pairs<'a, E>(input: &'a str) -> IResult<&'a str, RawPairs, E>
    where
      E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
  {
    separated_pair(isize_, space1, isize_)(input)
  }

  //  cargo   0 1   10 1   5 2   0 1
  fn direction<'a, E>(input: &'a str) -> IResult<&'a str, DirectionRecord, E>
    where
      E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
  {
    let (input, (motion, primary_heavy, primary, secondary, suburban)) = preceded(space0, tuple((
      alpha1,
      preceded(space1, pairs),
      preceded(space1, pairs),
      preceded(space1, pairs),
      preceded(space1, pairs),
    )))(input)?;

    Ok((input, DirectionRecord {
      motion: motion.to_string(),
      primary_heavy,
      primary,
      secondary,
      suburban,
    }))
  }

  pub fn section(input: &str) -> IResult<&str, SectionRecord, error::VerboseError<&str>> {
    //  120 0.9 0.95 0.98 15
    let (input, (window, alpha_s, alpha_t, alpha_u, expected_interval)) = context(
      "general parameters",
      preceded(multispace0, terminated(tuple((
        isize_,
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, isize_),
      )), line_end)),
    )(input)?;

    //  20.0 1 1
    let (input, (period, odd_present, even_present)) = context(
      "period and route presence",
      preceded(space0, terminated(tuple((
        double,
        preceded(space1, flag),
        preceded(space1, flag),
      )), line_end)),
    )(input)?;

    let (input, odd) = context("odd direction", terminated(direction, line_end))(input)?;
    let (input, even) = context("even direction", terminated(direction, line_end))(input)?;
    let (input, _) = preceded(multispace0, eof)(input)?;

    Ok((input, SectionRecord {
      window,
      alpha_s,
      alpha_t,
      alpha_u,
      expected_interval,
      period,
      odd_present,
      even_present,
      odd,
      even,
    }))
  }
}
