use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::points::Scoreline;
use crate::strength;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub name: String,
    pub attack: f64,
    pub defense: f64,
}

impl TeamRating {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attack: 0.0,
            defense: 0.0,
        }
    }

    /// Overall strength used to rank teams.
    pub fn score(&self) -> f64 {
        self.attack + self.defense
    }
}

/// Ratings of every team seen so far. Teams are added on first reference
/// and never removed.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    teams: HashMap<String, TeamRating>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from saved ratings; later entries win on duplicate names.
    pub fn from_ratings(ratings: impl IntoIterator<Item = TeamRating>) -> Self {
        let teams = ratings
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        Self { teams }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TeamRating> {
        self.teams.get(name)
    }

    pub fn get_or_insert(&mut self, name: &str) -> &mut TeamRating {
        self.teams
            .entry(name.to_string())
            .or_insert_with(|| TeamRating::new(name))
    }

    /// Current rating of `name`, or the default for a team not seen yet.
    /// Does not insert.
    pub fn rating_or_default(&self, name: &str) -> TeamRating {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| TeamRating::new(name))
    }

    /// Feeds one result through the updater and stores both new ratings.
    /// `home` and `away` must name different teams.
    pub fn apply_result(&mut self, home: &str, away: &str, result: Scoreline, cfg: &ModelConfig) {
        debug_assert_ne!(home, away, "a team cannot play itself");
        let h = self.get_or_insert(home).clone();
        let a = self.get_or_insert(away).clone();

        let (h, a) = strength::update_pair(&h, &a, result, cfg);

        *self.get_or_insert(home) = h;
        *self.get_or_insert(away) = a;
    }

    /// All ratings, strongest first. Equal scores fall back to name order.
    pub fn ranked(&self) -> Vec<TeamRating> {
        let mut out: Vec<TeamRating> = self.teams.values().cloned().collect();
        out.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then_with(|| a.name.cmp(&b.name))
        });
        out
    }
}
