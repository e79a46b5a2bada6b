//! Ordered list of levels played in one session.

use labyrinth_core::LevelLayout;
use labyrinth_world::level::{parse_level, LevelError};
use thiserror::Error;

/// Source of the first built-in level.
pub const LEVEL_ONE: &str = include_str!("../levels/level_1.txt");
/// Source of the second built-in level.
pub const LEVEL_TWO: &str = include_str!("../levels/level_2.txt");

/// Errors raised while assembling a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CampaignError {
    /// A campaign needs at least one level.
    #[error("campaign contains no levels")]
    Empty,
    /// One of the level sources could not be parsed.
    #[error("level {index} is invalid: {source}")]
    InvalidLevel {
        /// Zero-based position of the level within the campaign.
        index: usize,
        /// Parse failure reported by the level loader.
        #[source]
        source: LevelError,
    },
}

/// Non-empty, ordered collection of parsed levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Campaign {
    levels: Vec<LevelLayout>,
}

impl Campaign {
    /// The two levels shipped with the game.
    pub fn builtin() -> Result<Self, CampaignError> {
        Self::from_sources([LEVEL_ONE, LEVEL_TWO])
    }

    /// Parses every source in order.
    pub fn from_sources<I, S>(sources: I) -> Result<Self, CampaignError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let levels = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| {
                parse_level(source.as_ref())
                    .map_err(|source| CampaignError::InvalidLevel { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_layouts(levels)
    }

    /// Wraps already parsed levels.
    pub fn from_layouts(levels: Vec<LevelLayout>) -> Result<Self, CampaignError> {
        if levels.is_empty() {
            return Err(CampaignError::Empty);
        }
        Ok(Self { levels })
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the campaign has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at the provided position.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&LevelLayout> {
        self.levels.get(index)
    }
}

#[cfg(test)]
mod tests {
    use labyrinth_core::CellCoord;

    use super::*;

    #[test]
    fn builtin_levels_parse() {
        let campaign = Campaign::builtin().expect("built-in levels are valid");

        assert_eq!(campaign.len(), 2);
        let first = campaign.level(0).expect("first level");
        assert_eq!((first.columns(), first.rows()), (30, 16));
        assert_eq!(first.player(), CellCoord::new(1, 1));
        assert_eq!(first.treasures().len(), 5);
        assert_eq!(first.enemies(), &[CellCoord::new(18, 10)]);
        assert_eq!(first.exit(), CellCoord::new(27, 15));

        let second = campaign.level(1).expect("second level");
        assert_eq!(second.player(), CellCoord::new(1, 0));
        assert_eq!(second.treasures().len(), 1);
        assert_eq!(second.enemies().len(), 3);
    }

    #[test]
    fn invalid_source_reports_its_position() {
        let error = Campaign::from_sources(["XXX\nXPX\nXOX", "XXX\nXOX"]).expect_err("no player");

        assert_eq!(
            error,
            CampaignError::InvalidLevel {
                index: 1,
                source: LevelError::MissingPlayerSpawn,
            }
        );
    }

    #[test]
    fn empty_campaign_is_rejected() {
        let sources: [&str; 0] = [];

        assert_eq!(Campaign::from_sources(sources), Err(CampaignError::Empty));
    }
}
