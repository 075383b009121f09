use super::nom_prelude::*;

pub fn isize_<'a, E>(input: &'a str) -> IResult<&'a str, isize, E>
  where
    E: ParseError<&'a str> + error::FromExternalError<&'a str, ParseIntError>
{
  map_res(
    recognize(
      pair(
        opt(char('-')),
        digit1
      )
    ), isize::from_str)(input)
}

/// A `0`/`1` presence flag.
pub fn flag<'a, E>(input: &'a str) -> IResult<&'a str, bool, E>
  where
    E: ParseError<&'a str>
{
  map(one_of("01"), |c| c == '1')(input)
}

/// Trailing blanks followed by a newline, or the end of input.
pub fn line_end<'a, E>(input: &'a str) -> IResult<&'a str, (), E>
  where
    E: ParseError<&'a str>
{
  value((), pair(space0, alt((line_ending, eof))))(input)
}
