use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntertainmentKind {
    Book = 1,
    Game = 2,
    Movie = 3,
    Series = 4,
    Audiobook = 5,
    Lego = 6,
}

impl EntertainmentKind {
    pub const ALL: [Self; 6] = [
        Self::Book,
        Self::Game,
        Self::Movie,
        Self::Series,
        Self::Audiobook,
        Self::Lego,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Book => "BOOK",
            Self::Game => "GAME",
            Self::Movie => "MOVIE",
            Self::Series => "SERIES",
            Self::Audiobook => "AUDIOBOOK",
            Self::Lego => "LEGO",
        }
    }
}

/// Mood rating, 0 meaning "no comment".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Happiness(u8);

impl Happiness {
    pub const MAX: u8 = 10;

    const LABELS: [&'static str; 11] = [
        "NO_COMMENT",
        "BEYOND_AWFUL",
        "AWFUL",
        "BAD",
        "A_BIT_BAD",
        "NORMAL",
        "NOT_BAD",
        "PRETTY_GOOD",
        "VERY_GOOD",
        "GREAT",
        "AMAZING",
    ];

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[usize::from(self.0)]
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }
}

#[derive(Debug, Clone)]
pub struct Entertainment {
    pub id: i64,
    pub kind: Option<EntertainmentKind>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub entertainment_id: i64,
    pub duration: String,
}

#[derive(Debug, Clone)]
pub struct NewJournal {
    pub date: NaiveDateTime,
    pub work_happiness: Happiness,
    pub daily_happiness: Happiness,
    pub total_happiness: Happiness,
    pub content: String,
    pub activities: Vec<NewActivity>,
}

/// One row of the recent-entries view: a journal with at most one linked
/// activity, journals with several activities appear once per activity.
#[derive(Debug, Clone)]
pub struct RecentEntry {
    pub date: String,
    pub work_happiness: i64,
    pub daily_happiness: i64,
    pub total_happiness: i64,
    pub content: String,
    pub entertainment: Option<String>,
    pub duration: Option<String>,
    pub kind: Option<EntertainmentKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(EntertainmentKind::Series.code(), 4);
        assert_eq!(EntertainmentKind::from_code(6), Some(EntertainmentKind::Lego));
        assert_eq!(EntertainmentKind::from_code(0), None);
        assert_eq!(EntertainmentKind::from_code(7), None);
    }

    #[test]
    fn happiness_is_bounded() {
        assert_eq!(Happiness::new(10).map(Happiness::label), Some("AMAZING"));
        assert_eq!(Happiness::new(0).map(Happiness::label), Some("NO_COMMENT"));
        assert!(Happiness::new(11).is_none());
        assert_eq!(Happiness::all().count(), 11);
    }
}
