// This file is part of Dressing Rooms.
//
//  Dressing Rooms is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  Dressing Rooms is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with Dressing Rooms.  If not, see <https://www.gnu.org/licenses/>.
//! # Sources of randomness
//!
//! Customers draw how many items they carry and how long each item takes to try on. Those draws go
//! through the [`Chance`] trait so a run can be made reproducible with a seed, or completely
//! predictable in tests.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Draws uniformly distributed whole numbers from an inclusive range.
pub trait Chance: Debug + Send + Sync {
    /// The number of items a customer brings, somewhere in `[1, max_items]`
    fn pick_items(&self, max_items: u32) -> u32;

    /// The minutes a single item takes, somewhere in `[shortest, longest]`
    fn pick_minutes(&self, shortest: u32, longest: u32) -> u32;
}

/// Uses the thread local generator. Every run is different.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadChance;

impl Chance for ThreadChance {
    fn pick_items(&self, max_items: u32) -> u32 {
        rand::thread_rng().gen_range(1..=max_items)
    }

    fn pick_minutes(&self, shortest: u32, longest: u32) -> u32 {
        rand::thread_rng().gen_range(shortest..=longest)
    }
}

/// A generator seeded up front so the same seed always produces the same draws, in the order they
/// are requested. With many customers running at once that order is up to the scheduler, so only
/// the item counts, which are drawn before anything runs, are fully reproducible.
#[derive(Debug)]
pub struct SeededChance {
    rng: Mutex<StdRng>,
}

impl SeededChance {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&self, low: u32, high: u32) -> u32 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(low..=high)
    }
}

impl Chance for SeededChance {
    fn pick_items(&self, max_items: u32) -> u32 {
        self.draw(1, max_items)
    }

    fn pick_minutes(&self, shortest: u32, longest: u32) -> u32 {
        self.draw(shortest, longest)
    }
}

/// Always answers the same thing, ignoring the ranges it is given
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedChance {
    pub items: u32,
    pub minutes: u32,
}

#[cfg(test)]
impl Chance for FixedChance {
    fn pick_items(&self, _max_items: u32) -> u32 {
        self.items
    }

    fn pick_minutes(&self, _shortest: u32, _longest: u32) -> u32 {
        self.minutes
    }
}
