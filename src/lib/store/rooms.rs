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
//! # Dressing Rooms
//!
//! A counting gate that bounds how many customers may occupy a room at the same time. The gate is
//! a [`tokio::sync::Semaphore`] whose permits are handed out by [`DressingRooms::request_room`]
//! and returned when the [`Occupancy`] it gives out is dropped. Alongside the semaphore the pool
//! keeps a few counters so the occupancy history can be inspected once a scenario is over.
use snafu::{ResultExt, Snafu};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{AcquireError, Semaphore};
use tracing::{debug, instrument};

/// The number of rooms a store has unless told otherwise
pub const DEFAULT_ROOMS: usize = 3;

#[derive(Debug, Snafu)]
pub enum Error {
    /// Produced if the underlying semaphore was closed while a customer waited on it. Nothing in
    /// this program closes it, so seeing this is a bug.
    #[snafu(display("The dressing rooms were closed while waiting: {}", source))]
    Closed { source: AcquireError },
}

#[derive(Debug)]
pub struct DressingRooms {
    capacity: usize,
    gate: Semaphore,
    occupied: AtomicUsize,
    peak_occupied: AtomicUsize,
    requests: AtomicUsize,
    releases: AtomicUsize,
}

impl DressingRooms {
    /// Creates a pool of `capacity` rooms, all of them free.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. A store with no rooms would block every customer forever.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "a store needs at least one dressing room");
        Self {
            capacity,
            gate: Semaphore::new(capacity),
            occupied: AtomicUsize::new(0),
            peak_occupied: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// Waits, with no timeout, until a room is free and then takes it. The room stays taken until
    /// the returned [`Occupancy`] is dropped or [`Occupancy::leave`] is called, so a visit that
    /// panics still gives its room back while unwinding.
    #[instrument(skip(self))]
    pub async fn request_room(&self) -> Result<Occupancy<'_>, Error> {
        self.gate.acquire().await.context(Closed {})?.forget();

        let occupied = self.occupied.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_occupied.fetch_max(occupied, Ordering::SeqCst);
        self.requests.fetch_add(1, Ordering::SeqCst);
        debug!(occupied, available = self.available(), "room taken");
        Ok(Occupancy { rooms: self })
    }

    /// Gives a room back and wakes one waiting customer, if any.
    ///
    /// # Panics
    ///
    /// Panics if no room is currently taken. Every release must pair with an earlier request.
    fn release_room(&self) {
        let previous = self
            .occupied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |occupied| {
                occupied.checked_sub(1)
            });
        assert!(
            previous.is_ok(),
            "released a dressing room that was never requested"
        );

        self.releases.fetch_add(1, Ordering::SeqCst);
        self.gate.add_permits(1);
        debug!(occupied = self.occupied(), capacity = self.capacity, "room released");
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rooms that are free right now
    pub fn available(&self) -> usize {
        self.gate.available_permits()
    }

    /// Rooms that are taken right now
    pub fn occupied(&self) -> usize {
        self.occupied.load(Ordering::SeqCst)
    }

    /// The most rooms that were ever taken at once
    pub fn peak_occupied(&self) -> usize {
        self.peak_occupied.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// One taken room. Dropping it releases the room exactly once.
#[derive(Debug)]
pub struct Occupancy<'a> {
    rooms: &'a DressingRooms,
}

impl Occupancy<'_> {
    /// Leaves the room
    pub fn leave(self) {}
}

impl Drop for Occupancy<'_> {
    fn drop(&mut self) {
        self.rooms.release_room();
    }
}

impl Default for DressingRooms {
    fn default() -> Self {
        Self::new(DEFAULT_ROOMS)
    }
}
