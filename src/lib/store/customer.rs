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
//! # Customers
//!
//! A customer picks some items, waits for a free dressing room, tries each item on in turn and
//! then gives the room back. Trying on an item costs real time: every simulated minute is a
//! [`TryOnRules::minute`] long pause.
use crate::command;
use crate::lib::store::chance::Chance;
use crate::lib::store::rooms::{self, DressingRooms};
use snafu::{OptionExt, ResultExt, Snafu};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// No customer may carry more than this many items, whatever they ask for
pub const ITEM_LIMIT: u32 = 20;
pub const DEFAULT_MAX_ITEMS: u32 = 6;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Customer {} could not get a dressing room: {}", id, source))]
    RequestRoom { id: usize, source: rooms::Error },
    #[snafu(display("Customer {} could not narrate their visit: {}", id, source))]
    Narrate { id: usize, source: command::Error },
    #[snafu(display(
        "Customer {} can not pause for {} minutes of {:?} each",
        id,
        minutes,
        minute
    ))]
    PauseTooLong {
        id: usize,
        minutes: u32,
        minute: Duration,
    },
}

/// How a customer decides on the number of items they bring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPolicy {
    /// Exactly this many, clamped to `[1, ITEM_LIMIT]`
    Fixed(u32),
    /// A uniform draw from `[1, max_items]`
    Random { max_items: u32 },
}

impl ItemPolicy {
    /// Asking for zero items means "let chance decide".
    pub fn requested(number_of_items: u32, max_items: u32) -> Self {
        if number_of_items == 0 {
            ItemPolicy::Random { max_items }
        } else {
            ItemPolicy::Fixed(number_of_items)
        }
    }

    fn resolve(self, chance: &dyn Chance) -> u32 {
        match self {
            ItemPolicy::Fixed(items) => items.clamp(1, ITEM_LIMIT),
            ItemPolicy::Random { max_items } => {
                let max_items = max_items.clamp(1, ITEM_LIMIT);
                chance.pick_items(max_items).clamp(1, max_items)
            }
        }
    }
}

impl Default for ItemPolicy {
    fn default() -> Self {
        ItemPolicy::Random {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// The timing of a visit
#[derive(Debug, Clone, Copy)]
pub struct TryOnRules {
    pub shortest_minutes: u32,
    pub longest_minutes: u32,
    /// Wall clock length of one simulated minute
    pub minute: Duration,
    /// Write the visit to stdout as it happens
    pub narrate: bool,
}

impl Default for TryOnRules {
    fn default() -> Self {
        Self {
            shortest_minutes: 1,
            longest_minutes: 3,
            minute: Duration::from_millis(1000),
            narrate: true,
        }
    }
}

#[derive(Debug)]
pub struct Customer {
    id: usize,
    item_count: u32,
    try_on_minutes: u64,
    rooms: Arc<DressingRooms>,
    chance: Arc<dyn Chance>,
    rules: TryOnRules,
}

impl Customer {
    /// Creates a customer that shares `rooms` with everyone else in the store. The item count is
    /// settled here, before the visit starts.
    pub fn new(
        id: usize,
        rooms: Arc<DressingRooms>,
        policy: ItemPolicy,
        chance: Arc<dyn Chance>,
        rules: TryOnRules,
    ) -> Self {
        let item_count = policy.resolve(chance.as_ref());
        Self {
            id,
            item_count,
            try_on_minutes: 0,
            rooms,
            chance,
            rules,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// The minutes spent trying items on. The visit consumes and then hands back the customer, so
    /// this can only be read once [`Customer::try_on`] is finished.
    pub fn total_try_on_time(&self) -> u64 {
        self.try_on_minutes
    }

    async fn narrate(&self, line: String) -> Result<(), Error> {
        if self.rules.narrate {
            command::writeln(&line)
                .await
                .context(Narrate { id: self.id })?;
        }
        Ok(())
    }

    /// Tries on every item, one after the other, inside a single dressing room.
    async fn use_room(&mut self) -> Result<(), Error> {
        self.narrate(format!("Customer {} enters the dressing room.", self.id))
            .await?;
        for item in 1..=self.item_count {
            let minutes = self
                .chance
                .pick_minutes(self.rules.shortest_minutes, self.rules.longest_minutes);
            let pause = self
                .rules
                .minute
                .checked_mul(minutes)
                .context(PauseTooLong {
                    id: self.id,
                    minutes,
                    minute: self.rules.minute,
                })?;
            self.try_on_minutes += u64::from(minutes);
            tokio::time::sleep(pause).await;
            debug!(item, minutes, "item tried on");
            self.narrate(format!(
                "Customer {} tries on item {} for {} minutes.",
                self.id, item, minutes
            ))
            .await?;
        }
        Ok(())
    }

    /// Runs the whole visit: queue for a room, try everything on, leave. The room is given back
    /// whether the visit succeeds, fails or panics.
    pub async fn try_on(mut self) -> Result<Self, Error> {
        self.narrate(format!(
            "Customer {} has selected {} items and is approaching the dressing room.",
            self.id, self.item_count
        ))
        .await?;

        let rooms = Arc::clone(&self.rooms);
        let room = rooms
            .request_room()
            .await
            .context(RequestRoom { id: self.id })?;
        let visit = self.use_room().await;
        room.leave();
        visit?;

        self.narrate(format!("Customer {} leaves the dressing room.", self.id))
            .await?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib::store::chance::{FixedChance, ThreadChance};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out minutes from a script, remembering nothing else
    #[derive(Debug)]
    struct ScriptedMinutes {
        items: u32,
        minutes: Mutex<VecDeque<u32>>,
    }

    impl Chance for ScriptedMinutes {
        fn pick_items(&self, _max_items: u32) -> u32 {
            self.items
        }

        fn pick_minutes(&self, _shortest: u32, _longest: u32) -> u32 {
            self.minutes.lock().unwrap().pop_front().unwrap()
        }
    }

    fn quiet() -> TryOnRules {
        TryOnRules {
            narrate: false,
            ..TryOnRules::default()
        }
    }

    #[test]
    fn zero_requested_items_means_random() {
        assert_eq!(
            ItemPolicy::requested(0, 6),
            ItemPolicy::Random { max_items: 6 }
        );
        assert_eq!(ItemPolicy::requested(4, 6), ItemPolicy::Fixed(4));
    }

    #[test]
    fn fixed_item_counts_are_clamped() {
        let rooms = Arc::new(DressingRooms::default());
        let chance: Arc<dyn Chance> = Arc::new(ThreadChance);

        let greedy = Customer::new(
            1,
            Arc::clone(&rooms),
            ItemPolicy::Fixed(45),
            Arc::clone(&chance),
            quiet(),
        );
        assert_eq!(greedy.item_count(), ITEM_LIMIT);

        let modest = Customer::new(2, rooms, ItemPolicy::Fixed(7), chance, quiet());
        assert_eq!(modest.item_count(), 7);
    }

    #[test]
    fn random_item_counts_stay_within_the_maximum() {
        let rooms = Arc::new(DressingRooms::default());
        let chance: Arc<dyn Chance> = Arc::new(ThreadChance);

        for id in 0..200 {
            let customer = Customer::new(
                id,
                Arc::clone(&rooms),
                ItemPolicy::default(),
                Arc::clone(&chance),
                quiet(),
            );
            assert!((1..=DEFAULT_MAX_ITEMS).contains(&customer.item_count()));
        }
    }

    #[test]
    fn random_policy_never_yields_zero_items() {
        let rooms = Arc::new(DressingRooms::default());
        let chance: Arc<dyn Chance> = Arc::new(FixedChance {
            items: 0,
            minutes: 1,
        });

        let customer = Customer::new(1, rooms, ItemPolicy::default(), chance, quiet());
        assert_eq!(customer.item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn try_on_time_is_the_sum_of_drawn_minutes() {
        let rooms = Arc::new(DressingRooms::default());
        let chance: Arc<dyn Chance> = Arc::new(ScriptedMinutes {
            items: 4,
            minutes: Mutex::new(vec![3, 1, 2, 3].into()),
        });

        let customer = Customer::new(1, Arc::clone(&rooms), ItemPolicy::default(), chance, quiet());
        let started = tokio::time::Instant::now();
        let customer = customer.try_on().await.unwrap();

        assert_eq!(customer.item_count(), 4);
        assert_eq!(customer.total_try_on_time(), 9);
        assert!(started.elapsed() >= Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn every_request_is_paired_with_one_release() {
        let rooms = Arc::new(DressingRooms::new(1));
        let chance: Arc<dyn Chance> = Arc::new(FixedChance {
            items: 2,
            minutes: 1,
        });

        let customer = Customer::new(7, Arc::clone(&rooms), ItemPolicy::default(), chance, quiet());
        let customer = customer.try_on().await.unwrap();

        assert_eq!(customer.total_try_on_time(), 2);
        assert_eq!(rooms.requests(), 1);
        assert_eq!(rooms.releases(), 1);
        assert_eq!(rooms.occupied(), 0);
    }

    #[tokio::test]
    async fn oversized_minute_fails_and_frees_the_room() {
        let rooms = Arc::new(DressingRooms::new(1));
        let chance: Arc<dyn Chance> = Arc::new(FixedChance {
            items: 1,
            minutes: 3,
        });
        let rules = TryOnRules {
            minute: Duration::from_millis(u64::MAX),
            ..quiet()
        };

        let customer = Customer::new(3, Arc::clone(&rooms), ItemPolicy::default(), chance, rules);
        let err = customer.try_on().await.unwrap_err();

        assert!(matches!(err, Error::PauseTooLong { id: 3, minutes: 3, .. }));
        assert_eq!(rooms.requests(), 1);
        assert_eq!(rooms.releases(), 1);
        assert_eq!(rooms.available(), 1);
    }
}
