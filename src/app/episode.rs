use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid episode range '{0}', expected S<season>E<episode>-S<season>E<episode>")]
    InvalidFormat(String),
}

/// A contiguous span of watched episodes, `S1E10-S1E13` in text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpisodeRange {
    start_season: u32,
    start_episode: u32,
    end_season: u32,
    end_episode: u32,
}

impl EpisodeRange {
    /// Returns `None` when any number is zero or the end precedes the start.
    pub fn new(
        start_season: u32,
        start_episode: u32,
        end_season: u32,
        end_episode: u32,
    ) -> Option<Self> {
        if start_season == 0 || start_episode == 0 || end_season == 0 || end_episode == 0 {
            return None;
        }
        if (end_season, end_episode) < (start_season, start_episode) {
            return None;
        }
        Some(Self {
            start_season,
            start_episode,
            end_season,
            end_episode,
        })
    }

    pub fn end_season(&self) -> u32 {
        self.end_season
    }

    pub fn end_episode(&self) -> u32 {
        self.end_episode
    }
}

impl fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{}E{}-S{}E{}",
            self.start_season, self.start_episode, self.end_season, self.end_episode
        )
    }
}

impl FromStr for EpisodeRange {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFormat(raw.to_string());
        let (start, end) = raw.split_once('-').ok_or_else(invalid)?;
        let (start_season, start_episode) = parse_marker(start).ok_or_else(invalid)?;
        let (end_season, end_episode) = parse_marker(end).ok_or_else(invalid)?;
        Self::new(start_season, start_episode, end_season, end_episode).ok_or_else(invalid)
    }
}

// `S<n>E<n>` with both numbers matching `[1-9][0-9]*`.
fn parse_marker(marker: &str) -> Option<(u32, u32)> {
    let rest = marker.strip_prefix('S')?;
    let (season, episode) = rest.split_once('E')?;
    Some((parse_positive(season)?, parse_positive(episode)?))
}

fn parse_positive(digits: &str) -> Option<u32> {
    let mut chars = digits.chars();
    let first = chars.next()?;
    if !('1'..='9').contains(&first) || !chars.all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok()
}
