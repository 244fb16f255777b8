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
//! # Dressing Room Simulation
//!
//! Simulates customers sharing the few dressing rooms of a clothing store. Every customer is an
//! independent task that queues for a room, tries on their items and leaves. Each scenario lets a
//! crowd of customers loose at once and reports how the rooms were used once the last one leaves.
#![deny(clippy::all)]
#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

use snafu::{ResultExt, Snafu};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::Level;

mod commands {
    pub mod simulate;
}

mod command;
mod config;
mod lib {
    pub mod store {
        pub mod chance;
        pub mod customer;
        pub mod report;
        pub mod rooms;
        pub mod scenario;
    }
}

/// Provides the errors that this system may produce using [`snafu`].
#[derive(Debug, Snafu)]
pub enum Error {
    /// Produced when the simulation fails
    #[snafu(display("Failed to run the simulation: {}", source))]
    FailedSimulation {
        /// The underlying source of the problem in running the simulation
        source: commands::simulate::Error,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "dressing-rooms")]
/// Runs a crowd of simulated customers against a store's dressing rooms, one scenario after
/// another, and reports on each. By default the three classic scenarios run: 10 customers, 20
/// customers, then 20 customers with load testing, which lets each customer carry up to 20 items.
struct Opt {
    /// Verbose mode -v 0 = no output, 1 normal output, 2 lots of output
    #[structopt(short, long)]
    verbose: Option<u64>,

    /// Optional yaml config. Defaults to `~/.config/dressing-rooms/config.yml` when that exists.
    #[structopt(short, long, parse(from_os_str))]
    config_path: Option<PathBuf>,

    /// Exit as soon as the last scenario finishes instead of waiting for enter
    #[structopt(long)]
    no_wait: bool,
}

fn opt_int_to_level(verbosity: &Option<u64>) -> Level {
    match verbosity {
        Some(1) => Level::WARN,
        Some(2) => Level::INFO,
        Some(3) => Level::DEBUG,
        Some(4) => Level::TRACE,
        _ => Level::ERROR,
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let opt = Opt::from_args();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .pretty()
        .with_max_level(opt_int_to_level(&opt.verbose))
        .init();

    commands::simulate::do_command(&opt.config_path, opt.no_wait)
        .await
        .context(FailedSimulation {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(opt_int_to_level(&None), Level::ERROR);
        assert_eq!(opt_int_to_level(&Some(0)), Level::ERROR);
        assert_eq!(opt_int_to_level(&Some(2)), Level::INFO);
        assert_eq!(opt_int_to_level(&Some(4)), Level::TRACE);
        assert_eq!(opt_int_to_level(&Some(9)), Level::ERROR);
    }

    #[test]
    fn options_parse() {
        let opt = Opt::from_iter(&["dressing-rooms", "-v", "3", "--no-wait"]);
        assert_eq!(opt.verbose, Some(3));
        assert!(opt.no_wait);
        assert!(opt.config_path.is_none());
    }
}
