use serde::Deserialize;
use thiserror::Error;

use super::episode::{EpisodeRange, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeIntent {
    SameSeason,
    NextSeason,
    NewSeries,
    Custom,
}

/// Where a "same season" range starts relative to the last recorded episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EpisodeBoundary {
    /// First unwatched episode: `last + 1`.
    #[default]
    Next,
    /// Re-counts the last recorded episode: `last`.
    Overlap,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid intent: {0}")]
    InvalidIntent(&'static str),
}

pub struct SeriesRangeTracker {
    boundary: EpisodeBoundary,
}

impl SeriesRangeTracker {
    pub fn new(boundary: EpisodeBoundary) -> Self {
        Self { boundary }
    }

    /// Intents that make sense given whether a previous range exists, in the
    /// order they should be offered.
    pub fn available_intents(previous: Option<&EpisodeRange>) -> &'static [RangeIntent] {
        match previous {
            Some(_) => &[
                RangeIntent::SameSeason,
                RangeIntent::NextSeason,
                RangeIntent::Custom,
            ],
            None => &[RangeIntent::NewSeries, RangeIntent::Custom],
        }
    }

    pub fn next_range(
        &self,
        previous: Option<&EpisodeRange>,
        intent: RangeIntent,
        episode_count: u32,
        custom_text: Option<&str>,
    ) -> Result<EpisodeRange, TrackError> {
        let (season, first_episode) = match (intent, previous) {
            (RangeIntent::Custom, _) => {
                let text = custom_text.ok_or(TrackError::InvalidIntent(
                    "custom range requires range text",
                ))?;
                return Ok(text.parse()?);
            }
            (RangeIntent::SameSeason, Some(prev)) => {
                let first = match self.boundary {
                    EpisodeBoundary::Next => prev.end_episode().checked_add(1),
                    EpisodeBoundary::Overlap => Some(prev.end_episode()),
                };
                (Some(prev.end_season()), first)
            }
            (RangeIntent::NextSeason, Some(prev)) => (prev.end_season().checked_add(1), Some(1)),
            (RangeIntent::NewSeries, None) => (Some(1), Some(1)),
            (RangeIntent::SameSeason | RangeIntent::NextSeason, None) => {
                return Err(TrackError::InvalidIntent(
                    "continuing a series requires a previous range",
                ));
            }
            (RangeIntent::NewSeries, Some(_)) => {
                return Err(TrackError::InvalidIntent(
                    "series already has a recorded range",
                ));
            }
        };
        if episode_count == 0 {
            return Err(TrackError::InvalidIntent("episode count must be positive"));
        }

        let overflow = TrackError::InvalidIntent("episode numbers overflow");
        let season = season.ok_or(overflow.clone())?;
        let first_episode = first_episode.ok_or(overflow.clone())?;
        let last_episode = first_episode
            .checked_add(episode_count - 1)
            .ok_or(overflow)?;

        // Built through the grammar so every produced range is one the parser accepts.
        let text = format!("S{season}E{first_episode}-S{season}E{last_episode}");
        Ok(text.parse::<EpisodeRange>()?)
    }
}
