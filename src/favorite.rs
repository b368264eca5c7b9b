//! Favorite toggle with optimistic update and rollback.
//!
//! The displayed state flips as soon as the user toggles. Every toggle gets a
//! generation number and is confirmed or rejected later on the owning task.
//! Once nothing is in flight the displayed state is reconciled with the last
//! state the server confirmed, so overlapping toggles cannot roll each other
//! back into a state the server never had.

use std::collections::BTreeMap;

use crate::error::{Result, TopicListError};
use crate::types::IconState;

/// A mutation to submit in the background, captured at toggle time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRequest {
    pub generation: u64,
    pub desired: bool,
    pub once_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Displayed state is unchanged.
    Kept,
    /// Displayed state was rolled back to the confirmed state.
    Reverted,
    /// The generation is unknown (superseded by a reload); nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct FavoriteController {
    supports_favorite: bool,
    favorited: bool,
    once_token: Option<String>,
    /// Last state the server is known to hold.
    confirmed: bool,
    confirmed_generation: u64,
    next_generation: u64,
    in_flight: BTreeMap<u64, bool>,
}

impl FavoriteController {
    pub fn new(supports_favorite: bool) -> Self {
        Self {
            supports_favorite,
            favorited: false,
            once_token: None,
            confirmed: false,
            confirmed_generation: 0,
            next_generation: 1,
            in_flight: BTreeMap::new(),
        }
    }

    /// Replace state from a fresh load. In-flight toggles are forgotten.
    pub fn initialize(&mut self, favorited: bool, once_token: Option<String>) {
        self.favorited = favorited;
        self.confirmed = favorited;
        self.once_token = once_token;
        self.in_flight.clear();
        // Generations keep counting so forgotten completions stay unknown.
        self.confirmed_generation = self.next_generation - 1;
    }

    pub fn can_toggle(&self) -> bool {
        self.supports_favorite && self.once_token.is_some()
    }

    pub fn icon_state(&self) -> IconState {
        IconState {
            visible: self.can_toggle(),
            favored: self.favorited,
        }
    }

    #[cfg(test)]
    pub fn favorited(&self) -> bool {
        self.favorited
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Flip the displayed state and hand back the request to submit.
    pub fn toggle(&mut self) -> Result<FavoriteRequest> {
        let once_token = match (&self.once_token, self.supports_favorite) {
            (Some(token), true) => token.clone(),
            _ => return Err(TopicListError::FavoriteUnavailable),
        };

        self.favorited = !self.favorited;
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight.insert(generation, self.favorited);

        Ok(FavoriteRequest {
            generation,
            desired: self.favorited,
            once_token,
        })
    }

    /// Apply the outcome of a background mutation.
    ///
    /// Non-recoverable failures are returned untouched.
    pub fn settle(&mut self, generation: u64, outcome: Result<()>) -> Result<Settled> {
        let Some(desired) = self.in_flight.remove(&generation) else {
            return match outcome {
                Err(err) if !err.is_recoverable() => Err(err),
                _ => Ok(Settled::Stale),
            };
        };

        match outcome {
            Ok(()) => {
                if generation > self.confirmed_generation {
                    self.confirmed = desired;
                    self.confirmed_generation = generation;
                }
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(generation, desired, error = %err, "favorite node failed");
            }
            Err(err) => return Err(err),
        }

        if self.in_flight.is_empty() && self.favorited != self.confirmed {
            self.favorited = self.confirmed;
            return Ok(Settled::Reverted);
        }
        Ok(Settled::Kept)
    }
}
