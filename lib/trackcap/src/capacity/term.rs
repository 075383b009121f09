use std::iter::Sum;
use std::ops::{Add, AddAssign};
use num::Zero;
use tracing::*;

use crate::data::*;

/// Capacity of one direction, in train pairs per day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CapacityTerm {
    /// The direction was left out of the calculation. Identity of `+`.
    NotModeled,
    /// Capacity by (motion type x rank). Negative values mean the schedule is over-subscribed.
    Measured {
        primary_cargo: Pairs,
        secondary_passenger: Pairs,
        primary_passenger: Pairs,
        secondary_cargo: Pairs,
    },
}

impl CapacityTerm {
    #[inline]
    pub const fn measured(primary_cargo: Pairs, secondary_passenger: Pairs, primary_passenger: Pairs, secondary_cargo: Pairs) -> Self {
        CapacityTerm::Measured { primary_cargo, secondary_passenger, primary_passenger, secondary_cargo }
    }

    /// Places primary- and secondary-rank counts into the slots belonging to `primary_motion_type`.
    ///
    /// On a cargo-primary direction secondary traffic is booked as secondary *passenger* capacity,
    /// on a passenger-primary direction as secondary *cargo* capacity.
    // FIXME: the cargo mapping crosses motion types while the passenger one does not; awaiting
    //  confirmation from the timetabling side before changing either.
    pub fn dispatch(primary_motion_type: MotionType, prim: Pairs, sec: Pairs) -> Self {
        match primary_motion_type {
            MotionType::Cargo => CapacityTerm::measured(prim, sec, 0, 0),
            MotionType::Passenger => CapacityTerm::measured(0, 0, prim, sec),
        }
    }

    /// Capacity that could be scheduled on one direction with headway `period` (minutes).
    ///
    /// Exploitable time is what remains of the day after the maintenance window, scaled by the
    /// three loss coefficients. Secondary traffic reserves `expected_interval` minutes per rated
    /// train pair; the primary capacity is the remaining time divided by `period`, truncated
    /// toward zero and *not* clamped. Secondary capacity is the plain secondary count.
    ///
    /// A zero `period` gives an all-zero measurement rather than `NotModeled`.
    ///
    /// # Panics
    /// If `period` is negative or NaN. [`TrackCapacity::new`](crate::TrackCapacity::new) turns
    /// that case into a `Failed` section instead.
    #[instrument(level="trace", skip(gp, md))]
    pub fn required(gp: &GeneralParameters, md: &UnidirectionalMotionDimensions, period: f64) -> Self {
        assert!(period >= 0.0, "headway period must be non-negative, got {}", period);
        if period == 0.0 {
            return CapacityTerm::zero_measured()
        }

        let t = (MINUTES_PER_DAY - gp.window) as f64 * gp.alpha_s * gp.alpha_t * gp.alpha_u;
        // exact for every section that passed validation, and cannot overflow for any other
        let s = gp.expected_interval as f64 * (rated_qty(&md.secondary) + rated_qty(&md.suburban));
        let prim = ((t - s) / period) as Pairs;
        let sec = md.secondary.qty.saturating_add(md.suburban.qty);
        trace!(t, s, prim, sec);
        if prim < 0 {
            debug!(prim, reserved=s, available=t, "over-subscribed: secondary reservations exceed exploitable time");
        }

        return CapacityTerm::dispatch(md.primary_motion_type, prim, sec)
    }

    /// Like `+`, but `None` if any slot overflows.
    pub fn checked_add(self, other: CapacityTerm) -> Option<CapacityTerm> {
        match (self, other) {
            (CapacityTerm::NotModeled, t) | (t, CapacityTerm::NotModeled) => Some(t),
            (
                CapacityTerm::Measured { primary_cargo: pc1, secondary_passenger: sp1, primary_passenger: pp1, secondary_cargo: sc1 },
                CapacityTerm::Measured { primary_cargo: pc2, secondary_passenger: sp2, primary_passenger: pp2, secondary_cargo: sc2 },
            ) => Some(CapacityTerm::measured(
                pc1.checked_add(pc2)?,
                sp1.checked_add(sp2)?,
                pp1.checked_add(pp2)?,
                sc1.checked_add(sc2)?,
            )),
        }
    }

    #[inline]
    pub const fn zero_measured() -> Self {
        CapacityTerm::measured(0, 0, 0, 0)
    }

    /// `true` for a measurement of exactly zero everywhere. `NotModeled` is never trivial.
    pub fn is_trivial(&self) -> bool {
        match *self {
            CapacityTerm::Measured { primary_cargo, secondary_passenger, primary_passenger, secondary_cargo } =>
                primary_cargo == 0 && secondary_passenger == 0 && primary_passenger == 0 && secondary_cargo == 0,
            CapacityTerm::NotModeled => false,
        }
    }

    pub fn is_modeled(&self) -> bool {
        !matches!(self, CapacityTerm::NotModeled)
    }
}

#[inline]
fn rated_qty(pairs: &TrainPairs) -> f64 {
    pairs.qty as f64 * pairs.removal_coefficient as f64
}

impl Add for CapacityTerm {
    type Output = CapacityTerm;

    fn add(self, other: CapacityTerm) -> CapacityTerm {
        match (self, other) {
            (CapacityTerm::NotModeled, t) | (t, CapacityTerm::NotModeled) => t,
            (
                CapacityTerm::Measured { primary_cargo: pc1, secondary_passenger: sp1, primary_passenger: pp1, secondary_cargo: sc1 },
                CapacityTerm::Measured { primary_cargo: pc2, secondary_passenger: sp2, primary_passenger: pp2, secondary_cargo: sc2 },
            ) => CapacityTerm::measured(pc1 + pc2, sp1 + sp2, pp1 + pp2, sc1 + sc2),
        }
    }
}

impl AddAssign for CapacityTerm {
    fn add_assign(&mut self, other: CapacityTerm) {
        *self = *self + other;
    }
}

impl Zero for CapacityTerm {
    fn zero() -> Self { CapacityTerm::NotModeled }

    fn is_zero(&self) -> bool { !self.is_modeled() }
}

impl Sum for CapacityTerm {
    fn sum<I: Iterator<Item=CapacityTerm>>(iter: I) -> Self {
        iter.fold(CapacityTerm::zero(), Add::add)
    }
}

impl<'a> Sum<&'a CapacityTerm> for CapacityTerm {
    fn sum<I: Iterator<Item=&'a CapacityTerm>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
