use crate::services::validation::{MAX_RATING, MIN_RATING};

/// A whole-star rating, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stars(u8);

impl Stars {
    pub fn new(value: u8) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&i64::from(value))
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All selectable values in ascending order
    pub fn all() -> impl Iterator<Item = Stars> {
        (1..=5).map(Stars)
    }
}

/// Star picker: hovering previews, only `select` commits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarRating {
    committed: Option<Stars>,
    hovered: Option<Stars>,
}

impl StarRating {
    pub fn hover(&mut self, stars: Stars) {
        self.hovered = Some(stars);
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn select(&mut self, stars: Stars) {
        self.committed = Some(stars);
    }

    pub fn committed(&self) -> Option<Stars> {
        self.committed
    }

    /// What the picker shows right now
    pub fn display_value(&self) -> Option<Stars> {
        self.hovered.or(self.committed)
    }

    pub fn is_lit(&self, position: Stars) -> bool {
        self.display_value().is_some_and(|shown| position <= shown)
    }
}
