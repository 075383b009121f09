use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use super::*;
use crate::{invalid, Error};
use crate::parsers::{ParseInstance, SectionFmt};
use crate::raw::{FromRaw, section::*};

/// Minutes of the day.
pub type Minutes = i32;
/// Train pairs per day.
pub type Pairs = i32;

pub const MINUTES_PER_DAY: Minutes = 1440;

/// Scheduling parameters shared by both directions of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralParameters {
  /// Minutes per day reserved for maintenance.
  pub window: Minutes,
  /// Heterogeneity loss.
  pub alpha_s: f64,
  /// Technical-state loss.
  pub alpha_t: f64,
  /// Unevenness loss.
  pub alpha_u: f64,
  /// Nominal headway reserved for each secondary-category train.
  pub expected_interval: Minutes,
}

impl GeneralParameters {
  pub fn validate(&self) -> Result<()> {
    if !(0..=MINUTES_PER_DAY).contains(&self.window) {
      return invalid(format!("window must lie in 0..={}, got {}", MINUTES_PER_DAY, self.window));
    }
    for (name, alpha) in [("alpha_s", self.alpha_s), ("alpha_t", self.alpha_t), ("alpha_u", self.alpha_u)].iter() {
      if !(*alpha > 0.0 && *alpha <= 1.0) {
        return invalid(format!("{} must lie in (0, 1], got {}", name, alpha));
      }
    }
    if self.expected_interval < 0 {
      return invalid(format!("expected_interval must be non-negative, got {}", self.expected_interval));
    }
    Ok(())
  }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MotionType {
  Cargo,
  Passenger,
}

impl FromStr for MotionType {
  type Err = Error;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s {
      "cargo" => Ok(MotionType::Cargo),
      "passenger" => Ok(MotionType::Passenger),
      s => Err(Error::InvalidInput(format!("unknown motion type `{}`", s))),
    }
  }
}

impl fmt::Display for MotionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MotionType::Cargo => f.write_str("cargo"),
      MotionType::Passenger => f.write_str("passenger"),
    }
  }
}


/// Daily train pairs of one category.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TrainPairs {
  pub qty: Pairs,
  /// Converts `qty` into primary-category-equivalent headway consumption.
  pub removal_coefficient: Pairs,
}

impl TrainPairs {
  pub fn new(qty: Pairs, removal_coefficient: Pairs) -> Self {
    TrainPairs { qty, removal_coefficient }
  }

  #[inline]
  pub fn rated_qty(&self) -> Pairs {
    self.qty * self.removal_coefficient
  }

  /// `None` if `qty * removal_coefficient` does not fit in [`Pairs`].
  #[inline]
  pub fn checked_rated_qty(&self) -> Option<Pairs> {
    self.qty.checked_mul(self.removal_coefficient)
  }

  pub fn validate(&self) -> Result<()> {
    if self.qty < 0 || self.removal_coefficient < 0 {
      return invalid(format!("train pairs must be non-negative, got {:?}", self));
    }
    if self.checked_rated_qty().is_none() {
      return invalid(format!("rated quantity overflows, got {:?}", self));
    }
    Ok(())
  }
}


/// Traffic mix of one direction of travel.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UnidirectionalMotionDimensions {
  pub primary_motion_type: MotionType,
  pub primary_heavy: TrainPairs,
  pub primary: TrainPairs,
  pub secondary: TrainPairs,
  pub suburban: TrainPairs,
}

impl UnidirectionalMotionDimensions {
  pub fn categories(&self) -> [(&'static str, &TrainPairs); 4] {
    [
      ("primary_heavy", &self.primary_heavy),
      ("primary", &self.primary),
      ("secondary", &self.secondary),
      ("suburban", &self.suburban),
    ]
  }

  /// Minutes reserved for secondary-rank traffic at headway `expected_interval`, if it fits in
  /// [`Minutes`].
  pub fn checked_reserved_minutes(&self, expected_interval: Minutes) -> Option<Minutes> {
    let rated = self.secondary.checked_rated_qty()?.checked_add(self.suburban.checked_rated_qty()?)?;
    expected_interval.checked_mul(rated)
  }

  /// Checks each category, and that the per-rank totals the capacity formulas form stay in range.
  pub fn validate_with(&self, expected_interval: Minutes) -> Result<()> {
    for (name, pairs) in self.categories().iter() {
      pairs.validate().with_context(|| format!("{} trains", name))?;
    }
    if self.primary.qty.checked_add(self.primary_heavy.qty).is_none() {
      return invalid("primary train pairs overflow".to_string());
    }
    if self.secondary.qty.checked_add(self.suburban.qty).is_none() {
      return invalid("secondary train pairs overflow".to_string());
    }
    if self.checked_reserved_minutes(expected_interval).is_none() {
      return invalid(format!("reserved minutes overflow at expected interval {}", expected_interval));
    }
    Ok(())
  }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MotionDimensions {
  pub odd: UnidirectionalMotionDimensions,
  pub even: UnidirectionalMotionDimensions,
}


/// One track section: everything needed to compute its capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionInstance {
  pub id: String,
  pub params: GeneralParameters,
  pub motion: MotionDimensions,
  pub odd_routes_present: bool,
  pub even_routes_present: bool,
  /// Minimum headway between consecutive primary train pairs, in minutes.
  pub period: f64,
}

impl SectionInstance {
  /// Checks the documented input ranges. A negative `period` is accepted.
  pub fn validate(&self) -> Result<()> {
    self.params.validate()?;
    let interval = self.params.expected_interval;
    self.motion.odd.validate_with(interval).context("odd direction")?;
    self.motion.even.validate_with(interval).context("even direction")?;
    if !self.period.is_finite() {
      return invalid(format!("period must be finite, got {}", self.period));
    }
    Ok(())
  }
}


fn narrow(value: isize, what: &str) -> Result<i32> {
  i32::try_from(value).map_err(|_| Error::InvalidInput(format!("{} out of range: {}", what, value)).into())
}

fn pairs_from_raw((qty, rc): RawPairs) -> Result<TrainPairs> {
  Ok(TrainPairs::new(narrow(qty, "qty")?, narrow(rc, "removal coefficient")?))
}

fn direction_from_raw(raw: DirectionRecord) -> Result<UnidirectionalMotionDimensions> {
  Ok(UnidirectionalMotionDimensions {
    primary_motion_type: raw.motion.parse()?,
    primary_heavy: pairs_from_raw(raw.primary_heavy)?,
    primary: pairs_from_raw(raw.primary)?,
    secondary: pairs_from_raw(raw.secondary)?,
    suburban: pairs_from_raw(raw.suburban)?,
  })
}

impl FromRaw<SectionRecord> for SectionInstance {
  fn from_raw(raw: SectionRecord, id: Cow<str>) -> Result<SectionInstance> {
    let params = GeneralParameters {
      window: narrow(raw.window, "window")?,
      alpha_s: raw.alpha_s,
      alpha_t: raw.alpha_t,
      alpha_u: raw.alpha_u,
      expected_interval: narrow(raw.expected_interval, "expected_interval")?,
    };
    let motion = MotionDimensions {
      odd: direction_from_raw(raw.odd).context("odd direction")?,
      even: direction_from_raw(raw.even).context("even direction")?,
    };
    let instance = SectionInstance {
      id: id.into_owned(),
      params,
      motion,
      odd_routes_present: raw.odd_present,
      even_routes_present: raw.even_present,
      period: raw.period,
    };
    instance.validate()?;
    Ok(instance)
  }
}


/// Marker for datasets made of `.sec` section files.
pub enum SectionFiles {}

pub type RouteLayout = StdLayout<SectionFiles>;

impl RouteLayout {
  pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
    StdLayout::new(dir, "sec")
  }
}

fn load_section(path: &Path, name: Cow<str>) -> Result<SectionInstance> {
  let raw = SectionRecord::parse(SectionFmt(path)).context(format!("failed to load {:?}", path))?;
  SectionInstance::from_raw(raw, name).context(format!("failed to load {:?}", path))
}

impl Dataset for StdLayout<SectionFiles> {
  type Instance = SectionInstance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    load_section(&self.instance_path(idx)?, self.index_to_name(idx)?)
  }
}

impl Dataset for DynLayout<SectionFiles> {
  type Instance = SectionInstance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    load_section(self.instance_path(idx)?, self.index_to_name(idx)?)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsers::SectionText;

  fn params() -> GeneralParameters {
    GeneralParameters { window: 120, alpha_s: 0.9, alpha_t: 0.95, alpha_u: 0.98, expected_interval: 15 }
  }

  fn from_text(text: &str) -> Result<SectionInstance> {
    SectionInstance::from_raw(SectionRecord::parse(SectionText(text))?, Cow::Borrowed("test"))
  }

  #[test]
  fn rated_qty() {
    assert_eq!(TrainPairs::new(5, 2).rated_qty(), 10);
    assert_eq!(TrainPairs::new(7, 0).rated_qty(), 0);
  }

  #[test]
  fn motion_type_keywords() {
    assert_eq!("cargo".parse::<MotionType>().unwrap(), MotionType::Cargo);
    assert_eq!("passenger".parse::<MotionType>().unwrap(), MotionType::Passenger);
    assert!("freight".parse::<MotionType>().is_err());
    assert_eq!(MotionType::Passenger.to_string(), "passenger");
  }

  #[test]
  fn parameter_ranges() {
    assert!(params().validate().is_ok());
    assert!(GeneralParameters { window: 1440, ..params() }.validate().is_ok());
    assert!(GeneralParameters { alpha_u: 1.0, ..params() }.validate().is_ok());
    assert!(GeneralParameters { window: 1441, ..params() }.validate().is_err());
    assert!(GeneralParameters { window: -1, ..params() }.validate().is_err());
    assert!(GeneralParameters { alpha_s: 0.0, ..params() }.validate().is_err());
    assert!(GeneralParameters { alpha_t: 1.01, ..params() }.validate().is_err());
    assert!(GeneralParameters { alpha_u: f64::NAN, ..params() }.validate().is_err());
    assert!(GeneralParameters { expected_interval: -5, ..params() }.validate().is_err());
  }

  #[test]
  fn section_from_text() -> Result<()> {
    let s = from_text("120 0.9 0.95 0.98 15\n20.0 1 0\ncargo 0 1 10 1 5 2 0 1\npassenger 1 3 8 1 3 1 2 1\n")?;
    assert_eq!(s.id, "test");
    assert_eq!(s.params, params());
    assert_eq!(s.motion.odd.primary_motion_type, MotionType::Cargo);
    assert_eq!(s.motion.odd.secondary, TrainPairs::new(5, 2));
    assert_eq!(s.motion.even.primary_motion_type, MotionType::Passenger);
    assert_eq!(s.motion.even.primary_heavy, TrainPairs::new(1, 3));
    assert!(s.odd_routes_present);
    assert!(!s.even_routes_present);
    assert_eq!(s.period, 20.0);
    Ok(())
  }

  #[test]
  fn negative_period_is_accepted() -> Result<()> {
    let s = from_text("120 0.9 0.95 0.98 15\n-1.0 1 1\ncargo 0 1 10 1 5 2 0 1\ncargo 0 1 0 1 0 1 0 1\n")?;
    assert_eq!(s.period, -1.0);
    Ok(())
  }

  #[test]
  fn invalid_sections_are_rejected() {
    // unknown motion keyword
    assert!(from_text("120 0.9 0.95 0.98 15\n20 1 1\nfreight 0 1 10 1 5 2 0 1\ncargo 0 1 0 1 0 1 0 1\n").is_err());
    // negative count
    let err = from_text("120 0.9 0.95 0.98 15\n20 1 1\ncargo 0 1 10 1 -5 2 0 1\ncargo 0 1 0 1 0 1 0 1\n").unwrap_err();
    assert!(format!("{:#}", err).contains("odd direction"));
    // window beyond a day
    assert!(from_text("1500 0.9 0.95 0.98 15\n20 1 1\ncargo 0 1 10 1 5 2 0 1\ncargo 0 1 0 1 0 1 0 1\n").is_err());
    // count overflowing the model's integer width
    assert!(from_text("120 0.9 0.95 0.98 15\n20 1 1\ncargo 0 1 99999999999 1 0 1 0 1\ncargo 0 1 0 1 0 1 0 1\n").is_err());
  }

  #[test]
  fn oversized_counts_are_rejected() {
    const LINE_1: &str = "120 0.9 0.95 0.98 15\n20.0 1 1\n";
    const EVEN: &str = "cargo 0 1 0 1 0 1 0 1\n";
    // rated quantity 100000 * 100000
    let err = from_text(&format!("{}cargo 0 1 10 1 100000 100000 0 1\n{}", LINE_1, EVEN)).unwrap_err();
    assert!(format!("{:#}", err).contains("rated quantity overflows"));
    // rated quantity fits, reserved minutes 15 * 200000000 do not
    let err = from_text(&format!("{}cargo 0 1 10 1 200000000 1 0 1\n{}", LINE_1, EVEN)).unwrap_err();
    assert!(format!("{:#}", err).contains("reserved minutes overflow"));
    // secondary plus suburban count
    let err = from_text(&format!("0 1 1 1 0\n20.0 1 1\ncargo 0 1 10 1 2000000000 0 2000000000 0\n{}", EVEN)).unwrap_err();
    assert!(format!("{:#}", err).contains("secondary train pairs overflow"));
    // primary plus heavy count
    let err = from_text(&format!("{}{}passenger 2000000000 1 2000000000 1 0 1 0 1\n", LINE_1, EVEN)).unwrap_err();
    assert!(format!("{:#}", err).contains("even direction"));
  }

  #[test]
  fn large_counts_within_range_load() -> Result<()> {
    let s = from_text("120 0.9 0.95 0.98 15\n20.0 1 1\ncargo 0 1 10 1 100000 1000 0 1\ncargo 0 1 0 1 0 1 0 1\n")?;
    assert_eq!(s.motion.odd.checked_reserved_minutes(s.params.expected_interval), Some(1_500_000_000));
    Ok(())
  }

  #[test]
  fn load_sample_route() -> Result<()> {
    let route = RouteLayout::open(crate::dataset::sample_route_dir())?;
    let sections = route.load_all()?;
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].id, "s01_junction");
    assert_eq!(sections[0].motion.odd.primary, TrainPairs::new(10, 1));
    assert!(!sections[2].even_routes_present);
    Ok(())
  }
}
