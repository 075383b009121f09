/// Counts for one train category exactly as written in the file: `(qty, removal coefficient)`.
pub type RawPairs = (isize, isize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionRecord {
  pub motion: String,
  pub primary_heavy: RawPairs,
  pub primary: RawPairs,
  pub secondary: RawPairs,
  pub suburban: RawPairs,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionRecord {
  pub window: isize,
  pub alpha_s: f64,
  pub alpha_t: f64,
  pub alpha_u: f64,
  pub expected_interval: isize,
  pub period: f64,
  pub odd_present: bool,
  pub even_present: bool,
  pub odd: DirectionRecord,
  pub even: DirectionRecord,
}
