use std::path::Path;
use anyhow::Result;
use sections::dataset::{Dataset, DynLayout, Subset};
use sections::dataset::section::{SectionFiles, RouteLayout};

use crate::{CapacityTerm, TrackCapacity};

pub use sections::dataset::section::{
    GeneralParameters,
    MotionDimensions,
    MotionType,
    Minutes,
    Pairs,
    SectionInstance,
    TrainPairs,
    UnidirectionalMotionDimensions,
    MINUTES_PER_DAY,
};

/// Direct summation of scheduled train pairs: the capacity currently in use, as opposed to
/// [`CapacityTerm::required`].
pub trait UnidirectionalMotionExt {
    fn to_capacity_term(&self) -> CapacityTerm;
}

impl UnidirectionalMotionExt for UnidirectionalMotionDimensions {
    fn to_capacity_term(&self) -> CapacityTerm {
        let prim = self.primary.qty.saturating_add(self.primary_heavy.qty);
        let sec = self.secondary.qty.saturating_add(self.suburban.qty);
        return CapacityTerm::dispatch(self.primary_motion_type, prim, sec)
    }
}

pub trait MotionDimensionsExt {
    fn to_track_capacity(&self) -> TrackCapacity;
}

impl MotionDimensionsExt for MotionDimensions {
    fn to_track_capacity(&self) -> TrackCapacity {
        return TrackCapacity::Ok {
            odd: self.odd.to_capacity_term(),
            even: self.even.to_capacity_term(),
        }
    }
}


fn load_from<D>(dset: D, only: Option<Vec<usize>>) -> Result<Vec<SectionInstance>>
    where D: Dataset<Instance=SectionInstance>
{
    match only {
        Some(indices) => Subset::new(dset, indices)?.load_all(),
        None => dset.load_all(),
    }
}

/// Loads the sections of a route directory, in route order.
///
/// Without a `pattern` the directory must carry an `INDEX.txt`; with one, every matching file is a
/// section and the order is by file name. `only` restricts the route to the given indices.
pub fn load_route(dir: impl AsRef<Path>, pattern: Option<&str>, only: Option<Vec<usize>>) -> Result<Vec<SectionInstance>> {
    match pattern {
        Some(patt) => load_from(DynLayout::<SectionFiles>::new(dir, patt)?, only),
        None => load_from(RouteLayout::open(dir)?, only),
    }
}
