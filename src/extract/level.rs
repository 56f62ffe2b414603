//! Recipe level adjustment
//!
//! Recipes at the level cap of each expansion (and the levels just above it)
//! display a base level far below their effective level. The effective level
//! is the base level plus an offset chosen by the recipe's star count.

use crate::ScrapeError;

/// Base level → offset by star count
///
/// Rows with five entries were verified in game; single-entry rows come from
/// desynthesis results.
const LEVEL_OFFSETS: &[(u32, &[u32])] = &[
    (50, &[0, 5, 20, 40, 60]),
    (51, &[69]),
    (52, &[73]),
    (53, &[77]),
    (54, &[79]),
    (55, &[81]),
    (56, &[83]),
    (57, &[85]),
    (58, &[87]),
    (59, &[89]),
    (60, &[90, 100, 120, 150, 190]),
    (61, &[199]),
    (62, &[203]),
    (63, &[207]),
    (64, &[209]),
    (65, &[211]),
    (66, &[213]),
    (67, &[215]),
    (68, &[217]),
    (69, &[219]),
    (70, &[220, 230, 250, 280, 310]),
    (71, &[319]),
    (72, &[323]),
    (73, &[327]),
    (74, &[329]),
    (75, &[331]),
    (76, &[333]),
    (77, &[335]),
    (78, &[337]),
    (79, &[339]),
    (80, &[350, 360, 370, 400, 430]),
];

/// A flat correction for recipes whose listed data disagrees with the table
struct LevelCorrection {
    base_level: u32,
    stars: Option<u32>,
    difficulties: &'static [u32],
    delta: i32,
}

const LEVEL_CORRECTIONS: &[LevelCorrection] = &[
    // Adjusted to 115 instead of the 120 other level 51 recipes get
    LevelCorrection {
        base_level: 51,
        stars: None,
        difficulties: &[169, 339],
        delta: -5,
    },
    LevelCorrection {
        base_level: 61,
        stars: None,
        difficulties: &[1116, 558],
        delta: -5,
    },
    LevelCorrection {
        base_level: 60,
        stars: Some(3),
        difficulties: &[1764],
        delta: 10,
    },
];

/// Outcome of adjusting a recipe's base level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelAdjustment {
    /// Effective recipe level
    pub level: u32,

    /// Star count, present only when the base level uses star ratings
    pub stars: Option<u32>,
}

/// Offsets for `base_level`, or `None` when its level is not adjusted
pub fn level_offsets(base_level: u32) -> Option<&'static [u32]> {
    LEVEL_OFFSETS
        .iter()
        .find(|(level, _)| *level == base_level)
        .map(|(_, offsets)| *offsets)
}

/// Computes the effective level of a recipe
///
/// Base levels outside the table keep their level and ignore the star count.
/// A star count beyond the table row is an error: the table does not know the
/// recipe, and guessing would silently corrupt the catalog.
pub fn adjust_level(
    base_level: u32,
    star_count: u32,
    difficulty: u32,
) -> Result<LevelAdjustment, ScrapeError> {
    let (mut level, stars) = match level_offsets(base_level) {
        None => (base_level, None),
        Some(offsets) => {
            let offset = offsets.get(star_count as usize).ok_or_else(|| {
                tracing::error!(
                    "Unsupported number of stars ({}) for level {}",
                    star_count,
                    base_level
                );
                ScrapeError::UnsupportedStars {
                    base_level,
                    stars: star_count,
                }
            })?;
            (base_level + offset, Some(star_count))
        }
    };

    for correction in LEVEL_CORRECTIONS {
        let stars_match = correction.stars.is_none() || correction.stars == stars;
        if correction.base_level == base_level
            && stars_match
            && correction.difficulties.contains(&difficulty)
        {
            level = level.saturating_add_signed(correction.delta);
        }
    }

    Ok(LevelAdjustment { level, stars })
}
