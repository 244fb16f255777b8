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
//! # Scenario reports
//!
//! Summarises a finished scenario. Try-on time is collected as whole units that are treated as
//! seconds of real time, so the totals are shown both in minutes and re-expressed in seconds.
use crate::command;
use crate::lib::store::customer::Customer;
use derive_more::Display;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Display, Debug, Clone, PartialEq)]
#[display(
    fmt = "Report {{customers: {}, total_items: {}, total_try_on_time: {}, average_items: {:.2}, average_usage_seconds: {:.2}}}",
    customers,
    total_items,
    total_try_on_time,
    average_items,
    average_usage_seconds
)]
pub struct Report {
    pub customers: usize,
    pub total_items: u64,
    /// Raw sum of every customer's try-on time
    pub total_try_on_time: u64,
    pub total_minutes: f64,
    pub average_items: f64,
    pub average_usage_seconds: f64,
    /// The total again, converted back from minutes
    pub total_seconds: f64,
    /// Wall clock time between the first customer starting and the last one leaving
    pub elapsed: Duration,
}

impl Report {
    /// # Panics
    ///
    /// Panics when `customers` is empty. A scenario always has at least one customer.
    pub fn compile(customers: &[Customer], total_try_on_time: u64, elapsed: Duration) -> Self {
        assert!(
            !customers.is_empty(),
            "a report needs at least one customer"
        );
        let count = customers.len() as f64;
        let total_items: u64 = customers
            .iter()
            .map(|customer| u64::from(customer.item_count()))
            .sum();
        let total_minutes = total_try_on_time as f64 / 60.0;

        Self {
            customers: customers.len(),
            total_items,
            total_try_on_time,
            total_minutes,
            average_items: total_items as f64 / count,
            average_usage_seconds: (total_minutes / count) * 60.0,
            total_seconds: total_minutes * 60.0,
            elapsed,
        }
    }

    #[instrument]
    pub async fn emit(&self) -> Result<(), command::Error> {
        info!(report = %self, "scenario finished");
        command::writeln(&format!(
            "\nScenario/Simulation took {:.2} real-world minutes.",
            self.total_minutes
        ))
        .await?;
        command::writeln(&format!("Total customers: {}", self.customers)).await?;
        command::writeln(&format!("Total items: {}", self.total_items)).await?;
        command::writeln(&format!(
            "Average number of items per customer: {}",
            self.average_items
        ))
        .await?;
        command::writeln(&format!(
            "Average simulated usage time of the room per customer: {:.2} minutes",
            self.average_usage_seconds
        ))
        .await?;
        command::writeln(&format!(
            "Total simulated try-on time for all customers: {:.2} minutes",
            self.total_seconds
        ))
        .await?;
        command::writeln(&format!(
            "Wall clock time for the scenario: {:.2} seconds\n",
            self.elapsed.as_secs_f64()
        ))
        .await
    }
}
