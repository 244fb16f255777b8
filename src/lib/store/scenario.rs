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
//! # Scenarios
//!
//! A scenario is one independent run of the store: a fresh set of dressing rooms, a fresh crowd of
//! customers, all of them let loose at once. The scenario waits for the last customer to leave and
//! then reports on the visit.
use crate::command;
use crate::lib::store::chance::Chance;
use crate::lib::store::customer::{
    self, Customer, ItemPolicy, TryOnRules, DEFAULT_MAX_ITEMS, ITEM_LIMIT,
};
use crate::lib::store::report::Report;
use crate::lib::store::rooms::{DressingRooms, DEFAULT_ROOMS};
use chrono::{DateTime, Local};
use colored::Colorize;
use futures::future::join_all;
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, info_span, instrument};
use tracing_futures::Instrument;

#[derive(Debug, Snafu)]
pub enum Error {
    /// The task running a customer panicked or was cancelled
    #[snafu(display("A customer's visit was aborted: {}", source))]
    CustomerAborted { source: tokio::task::JoinError },
    #[snafu(display("A customer's visit failed: {}", source))]
    CustomerFailed { source: customer::Error },
    #[snafu(display("Could not narrate the scenario: {}", source))]
    Narrate { source: command::Error },
}

/// What every scenario in a run has in common
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub rooms: usize,
    /// Upper bound for a customer's item count in a normal scenario
    pub max_items: u32,
    /// Upper bound for a customer's item count when load testing
    pub load_test_max_items: u32,
    pub rules: TryOnRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rooms: DEFAULT_ROOMS,
            max_items: DEFAULT_MAX_ITEMS,
            load_test_max_items: ITEM_LIMIT,
            rules: TryOnRules::default(),
        }
    }
}

#[derive(Debug)]
pub struct Scenario {
    customers: Vec<Customer>,
    rooms: Arc<DressingRooms>,
    load_testing: bool,
    narrate: bool,
    started_at: Option<DateTime<Local>>,
    ended_at: Option<DateTime<Local>>,
    total_try_on_time: u64,
}

impl Scenario {
    /// Sets up `num_customers` customers around one new set of rooms. Load testing only widens the
    /// range each customer's item count is drawn from; the crowd and the rooms stay the same size.
    pub fn new(
        num_customers: usize,
        load_testing: bool,
        settings: &Settings,
        chance: Arc<dyn Chance>,
    ) -> Self {
        let rooms = Arc::new(DressingRooms::new(settings.rooms));
        let customers = (1..=num_customers)
            .map(|id| {
                let policy = if load_testing {
                    ItemPolicy::requested(
                        chance.pick_items(settings.load_test_max_items),
                        settings.max_items,
                    )
                } else {
                    ItemPolicy::requested(0, settings.max_items)
                };
                Customer::new(
                    id,
                    Arc::clone(&rooms),
                    policy,
                    Arc::clone(&chance),
                    settings.rules,
                )
            })
            .collect();

        Self {
            customers,
            rooms,
            load_testing,
            narrate: settings.rules.narrate,
            started_at: None,
            ended_at: None,
            total_try_on_time: 0,
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn rooms(&self) -> &DressingRooms {
        &self.rooms
    }

    pub fn load_testing(&self) -> bool {
        self.load_testing
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    pub fn total_try_on_time(&self) -> u64 {
        self.total_try_on_time
    }

    async fn narrate(&self, line: &str) -> Result<(), Error> {
        if self.narrate {
            command::writeln(line).await.context(Narrate {})?;
        }
        Ok(())
    }

    /// Starts every customer at once, waits for all of them to leave and then reports.
    ///
    /// # Panics
    ///
    /// Panics if the scenario has already been run.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<Report, Error> {
        assert!(self.started_at.is_none(), "a scenario can only run once");

        let started_at = Local::now();
        self.started_at = Some(started_at);
        let clock = Instant::now();
        info!(
            %started_at,
            customers = self.customers.len(),
            rooms = self.rooms.capacity(),
            load_testing = self.load_testing,
            "scenario started"
        );

        self.narrate(
            &format!(
                "\n*******************************Starting Scenario with {} customers********************************",
                self.customers.len()
            )
            .bold()
            .to_string(),
        )
        .await?;
        if self.load_testing {
            self.narrate(
                &"**Load testing enabled. Default store item limit is ignored.**"
                    .yellow()
                    .to_string(),
            )
            .await?;
        }

        let handles: Vec<_> = self
            .customers
            .drain(..)
            .map(|customer| {
                let span = info_span!("customer", id = customer.id(), items = customer.item_count());
                tokio::spawn(customer.try_on().instrument(span))
            })
            .collect();

        for joined in join_all(handles).await {
            let customer = joined.context(CustomerAborted {})?.context(CustomerFailed {})?;
            self.customers.push(customer);
        }

        let elapsed = clock.elapsed();
        let ended_at = Local::now();
        self.ended_at = Some(ended_at);
        self.total_try_on_time = self
            .customers
            .iter()
            .map(Customer::total_try_on_time)
            .sum();
        info!(
            %ended_at,
            total_try_on_time = self.total_try_on_time,
            peak_occupied = self.rooms.peak_occupied(),
            requests = self.rooms.requests(),
            releases = self.rooms.releases(),
            "scenario ended"
        );

        self.narrate(
            &"\n**************************************End Scenario**************************************"
                .bold()
                .to_string(),
        )
        .await?;

        let report = Report::compile(&self.customers, self.total_try_on_time, elapsed);
        if self.narrate {
            report.emit().await.context(Narrate {})?;
        }
        Ok(report)
    }
}
