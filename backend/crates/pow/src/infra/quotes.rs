//! Static quote content

use crate::domain::repository::ContentProvider;
use rand::seq::IndexedRandom;

const QUOTES: &[&str] = &[
    "A journey of a thousand miles begins with a single step.",
    "Still waters run deep.",
    "Measure twice, cut once.",
    "The best time to plant a tree was twenty years ago. The second best time is now.",
    "Fall seven times, stand up eight.",
    "He who asks is a fool for five minutes, but he who does not ask remains a fool forever.",
    "Do not dig the well when you are already thirsty.",
    "Patience is bitter, but its fruit is sweet.",
    "A smooth sea never made a skilled sailor.",
    "When the wind of change blows, some build walls and others build windmills.",
];

/// Serves a random entry from a fixed quote list
#[derive(Debug, Clone, Copy)]
pub struct StaticQuotes {
    quotes: &'static [&'static str],
}

impl StaticQuotes {
    pub fn new(quotes: &'static [&'static str]) -> Self {
        Self { quotes }
    }
}

impl Default for StaticQuotes {
    fn default() -> Self {
        Self::new(QUOTES)
    }
}

impl ContentProvider for StaticQuotes {
    fn get_content(&self) -> String {
        self.quotes
            .choose(&mut rand::rng())
            .map(|quote| (*quote).to_owned())
            .unwrap_or_default()
    }
}
