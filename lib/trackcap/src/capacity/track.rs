use std::iter::Sum;
use std::ops::{Add, AddAssign};
use num::Zero;
use rayon::prelude::*;
use tracing::*;

use crate::data::*;
use super::CapacityTerm;

/// Capacity of one track section, both directions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TrackCapacity {
    /// The section could not be evaluated. Absorbs everything it is added to.
    Failed,
    Ok { odd: CapacityTerm, even: CapacityTerm },
}

impl TrackCapacity {
    /// Required capacity of a section: each present direction goes through
    /// [`CapacityTerm::required`], absent directions are `NotModeled`.
    ///
    /// A negative (or NaN) `period` fails the whole section.
    #[instrument(level="debug", skip(gp, md))]
    pub fn new(
        gp: &GeneralParameters,
        md: &MotionDimensions,
        odd_routes_present: bool,
        even_routes_present: bool,
        period: f64,
    ) -> Self {
        if !(period >= 0.0) {
            debug!(period, "invalid headway period, section failed");
            return TrackCapacity::Failed
        }

        let term = |present: bool, md: &UnidirectionalMotionDimensions| {
            if present { CapacityTerm::required(gp, md, period) } else { CapacityTerm::NotModeled }
        };
        return TrackCapacity::Ok {
            odd: term(odd_routes_present, &md.odd),
            even: term(even_routes_present, &md.even),
        }
    }

    pub fn for_section(section: &SectionInstance) -> Self {
        let s = span!(Level::DEBUG, "section", id=%section.id);
        let _g = s.enter();
        TrackCapacity::new(
            &section.params,
            &section.motion,
            section.odd_routes_present,
            section.even_routes_present,
            section.period,
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TrackCapacity::Failed)
    }

    pub fn odd(&self) -> Option<CapacityTerm> {
        match *self {
            TrackCapacity::Ok { odd, .. } => Some(odd),
            TrackCapacity::Failed => None,
        }
    }

    pub fn even(&self) -> Option<CapacityTerm> {
        match *self {
            TrackCapacity::Ok { even, .. } => Some(even),
            TrackCapacity::Failed => None,
        }
    }

    /// Like `+`, but `None` if a slot of either direction overflows. `Failed` still absorbs.
    pub fn checked_add(self, other: TrackCapacity) -> Option<TrackCapacity> {
        match (self, other) {
            (TrackCapacity::Failed, _) | (_, TrackCapacity::Failed) => Some(TrackCapacity::Failed),
            (TrackCapacity::Ok { odd: o1, even: e1 }, TrackCapacity::Ok { odd: o2, even: e2 }) =>
                Some(TrackCapacity::Ok { odd: o1.checked_add(o2)?, even: e1.checked_add(e2)? }),
        }
    }

    /// [`par_total`](TrackCapacity::par_total) with overflow detection. A route containing a
    /// `Failed` section totals to `Failed` whatever the other sections hold.
    pub fn par_checked_total(capacities: &[TrackCapacity]) -> Option<TrackCapacity> {
        if capacities.par_iter().any(TrackCapacity::is_failed) {
            return Some(TrackCapacity::Failed)
        }
        capacities.par_iter()
            .map(|&c| Some(c))
            .reduce(|| Some(TrackCapacity::zero()), |a, b| a?.checked_add(b?))
    }

    /// Tree-reduces the capacities of many sections in parallel. Same result as `iter().sum()`.
    pub fn par_total(capacities: &[TrackCapacity]) -> TrackCapacity {
        capacities.par_iter()
            .copied()
            .reduce(TrackCapacity::zero, Add::add)
    }
}

impl Add for TrackCapacity {
    type Output = TrackCapacity;

    fn add(self, other: TrackCapacity) -> TrackCapacity {
        match (self, other) {
            (TrackCapacity::Failed, _) | (_, TrackCapacity::Failed) => TrackCapacity::Failed,
            (TrackCapacity::Ok { odd: o1, even: e1 }, TrackCapacity::Ok { odd: o2, even: e2 }) =>
                TrackCapacity::Ok { odd: o1 + o2, even: e1 + e2 },
        }
    }
}

impl AddAssign for TrackCapacity {
    fn add_assign(&mut self, other: TrackCapacity) {
        *self = *self + other;
    }
}

/// The empty route: both directions unmodeled.
impl Zero for TrackCapacity {
    fn zero() -> Self {
        TrackCapacity::Ok { odd: CapacityTerm::NotModeled, even: CapacityTerm::NotModeled }
    }

    fn is_zero(&self) -> bool {
        *self == TrackCapacity::zero()
    }
}

impl Sum for TrackCapacity {
    fn sum<I: Iterator<Item=TrackCapacity>>(iter: I) -> Self {
        iter.fold(TrackCapacity::zero(), Add::add)
    }
}

impl<'a> Sum<&'a TrackCapacity> for TrackCapacity {
    fn sum<I: Iterator<Item=&'a TrackCapacity>>(iter: I) -> Self {
        iter.copied().sum()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::term::strategies::*;
    use crate::data::test_data;
    use crate::init_test_logging;
    use proptest::prelude::*;

    fn track() -> impl Strategy<Value=TrackCapacity> {
        prop_oneof![
            1 => Just(TrackCapacity::Failed),
            6 => (term(), term()).prop_map(|(odd, even)| TrackCapacity::Ok { odd, even }),
        ]
    }

    fn motion() -> impl Strategy<Value=MotionDimensions> {
        (direction(), direction()).prop_map(|(odd, even)| MotionDimensions { odd, even })
    }

    #[test]
    fn both_directions_present() {
        let _g = init_test_logging(None::<&str>);
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), true, true, 20.0);
        // passenger: s = 15 * (4 + 6) = 150
        assert_eq!(cap, TrackCapacity::Ok {
            odd: CapacityTerm::measured(47, 5, 0, 0),
            even: CapacityTerm::measured(0, 0, 47, 10),
        });
    }

    #[test]
    fn absent_direction_not_modeled() {
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), true, false, 20.0);
        assert_eq!(cap.even(), Some(CapacityTerm::NotModeled));
        assert_eq!(cap.odd(), Some(CapacityTerm::measured(47, 5, 0, 0)));

        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), false, false, 20.0);
        assert!(cap.is_zero());
    }

    #[test]
    fn negative_period_fails() {
        let _g = init_test_logging(None::<&str>);
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), true, true, -1.0);
        assert_eq!(cap, TrackCapacity::Failed);
        assert!(cap.is_failed());
        assert_eq!(cap.odd(), None);
        // no direction is evaluated, so nothing panics either
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), false, false, -0.5);
        assert_eq!(cap, TrackCapacity::Failed);
    }

    #[test]
    fn nan_period_fails() {
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), true, true, f64::NAN);
        assert_eq!(cap, TrackCapacity::Failed);
    }

    #[test]
    fn zero_period_is_not_failure() {
        let cap = TrackCapacity::new(&test_data::params(), &test_data::motion(), true, false, 0.0);
        assert_eq!(cap, TrackCapacity::Ok { odd: CapacityTerm::zero_measured(), even: CapacityTerm::NotModeled });
    }

    #[test]
    fn route_total() {
        let gp = test_data::params();
        let md = test_data::motion();
        let route = vec![
            TrackCapacity::new(&gp, &md, true, true, 20.0),
            TrackCapacity::new(&gp, &md, true, false, 20.0),
            TrackCapacity::new(&gp, &md, false, true, 0.0),
        ];
        let expected = TrackCapacity::Ok {
            odd: CapacityTerm::measured(94, 10, 0, 0),
            even: CapacityTerm::measured(0, 0, 47, 10),
        };
        assert_eq!(route.iter().sum::<TrackCapacity>(), expected);
        assert_eq!(TrackCapacity::par_total(&route), expected);

        let mut failed_route = route.clone();
        failed_route.push(TrackCapacity::new(&gp, &md, true, true, -3.0));
        failed_route.extend(route);
        assert_eq!(failed_route.iter().sum::<TrackCapacity>(), TrackCapacity::Failed);
        assert_eq!(TrackCapacity::par_total(&failed_route), TrackCapacity::Failed);
    }

    #[test]
    fn checked_total_reports_overflow() {
        let big = TrackCapacity::Ok { odd: CapacityTerm::measured(Pairs::MAX, 0, 0, 0), even: CapacityTerm::NotModeled };
        assert_eq!(TrackCapacity::par_checked_total(&[big, big]), None);
        assert_eq!(TrackCapacity::par_checked_total(&[big]), Some(big));
        // a failed section wins over overflow elsewhere in the route
        assert_eq!(TrackCapacity::par_checked_total(&[big, TrackCapacity::Failed, big]), Some(TrackCapacity::Failed));
        assert_eq!(big.checked_add(TrackCapacity::Failed), Some(TrackCapacity::Failed));
    }

    #[test]
    fn empty_route() {
        assert_eq!(TrackCapacity::par_total(&[]), TrackCapacity::zero());
        assert_eq!(Vec::<TrackCapacity>::new().into_iter().sum::<TrackCapacity>(), TrackCapacity::zero());
    }

    #[test]
    fn sample_route_sections() -> anyhow::Result<()> {
        let sections = load_route(test_data::sample_route_dir(), None, None)?;
        let caps: Vec<_> = sections.iter().map(TrackCapacity::for_section).collect();
        assert_eq!(caps[0].odd(), Some(CapacityTerm::measured(47, 5, 0, 0)));
        assert_eq!(caps[2].even(), Some(CapacityTerm::NotModeled));
        assert!(!TrackCapacity::par_total(&caps).is_failed());
        Ok(())
    }

    proptest! {
        #[test]
        fn failed_absorbs(x in track()) {
            prop_assert_eq!(TrackCapacity::Failed + x, TrackCapacity::Failed);
            prop_assert_eq!(x + TrackCapacity::Failed, TrackCapacity::Failed);
        }

        #[test]
        fn zero_is_identity(x in track()) {
            prop_assert_eq!(x + TrackCapacity::zero(), x);
            prop_assert_eq!(TrackCapacity::zero() + x, x);
        }

        #[test]
        fn add_commutes(a in track(), b in track()) {
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn add_associates(a in track(), b in track(), c in track()) {
            prop_assert_eq!((a + b) + c, a + (b + c));
        }

        #[test]
        fn checked_total_matches_fold(route in prop::collection::vec(track(), 0..64)) {
            prop_assert_eq!(TrackCapacity::par_checked_total(&route), Some(route.iter().sum::<TrackCapacity>()));
        }

        #[test]
        fn par_total_matches_fold(route in prop::collection::vec(track(), 0..64)) {
            prop_assert_eq!(TrackCapacity::par_total(&route), route.iter().sum::<TrackCapacity>());
        }

        #[test]
        fn negative_period_always_fails(gp in params(), md in motion(), odd in any::<bool>(), even in any::<bool>(), period in -1000.0..-0.001f64) {
            prop_assert_eq!(TrackCapacity::new(&gp, &md, odd, even, period), TrackCapacity::Failed);
        }

        #[test]
        fn presence_flags(gp in params(), md in motion(), period in 0.0..120.0f64) {
            match TrackCapacity::new(&gp, &md, false, true, period) {
                TrackCapacity::Ok { odd, even } => {
                    prop_assert_eq!(odd, CapacityTerm::NotModeled);
                    prop_assert_eq!(even, CapacityTerm::required(&gp, &md.even, period));
                }
                TrackCapacity::Failed => { prop_assert!(false, "non-negative period never fails"); }
            }
        }
    }
}
