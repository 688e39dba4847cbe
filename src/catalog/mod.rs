//! Station catalog and random station assignment

mod exercises;

use std::borrow::Cow;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use exercises::EXERCISES;

/// Number of stations in the catalog
pub const CATALOG_SIZE: usize = 10;

/// One circuit station with its three difficulty variations.
///
/// Catalog entries borrow static strings; entries decoded from a snapshot
/// own theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exercise {
    pub id: u32,
    pub regression: Cow<'static, str>,
    pub main: Cow<'static, str>,
    pub progression: Cow<'static, str>,
}

impl Exercise {
    pub const fn new(
        id: u32,
        regression: &'static str,
        main: &'static str,
        progression: &'static str,
    ) -> Self {
        Self {
            id,
            regression: Cow::Borrowed(regression),
            main: Cow::Borrowed(main),
            progression: Cow::Borrowed(progression),
        }
    }

    /// Look up a catalog entry by id
    pub fn by_id(id: u32) -> Option<&'static Exercise> {
        EXERCISES.iter().find(|exercise| exercise.id == id)
    }
}

/// Pick `participants` distinct stations in random order.
///
/// Asking for more stations than the catalog holds returns the whole
/// catalog, shuffled.
pub fn randomize<R: Rng + ?Sized>(participants: usize, rng: &mut R) -> Vec<Exercise> {
    let mut shuffled: Vec<Exercise> = EXERCISES.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(participants.min(CATALOG_SIZE));
    shuffled
}
