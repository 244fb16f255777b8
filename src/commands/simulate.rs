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
use crate::command;
use crate::config;
use crate::lib::store::chance::{Chance, SeededChance, ThreadChance};
use crate::lib::store::report::Report;
use crate::lib::store::scenario::{self, Scenario};
use snafu::{ResultExt, Snafu};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not load configuration: {}", source))]
    LoadConfig { source: config::Error },
    #[snafu(display("Scenario {} failed: {}", scenario, source))]
    RunScenario {
        scenario: usize,
        source: scenario::Error,
    },
    #[snafu(display("Could not talk to the console: {}", source))]
    Console { source: command::Error },
}

fn chance_for(config: &config::Config) -> Arc<dyn Chance> {
    match config.seed {
        Some(seed) => {
            info!(seed, "using a seeded source of randomness");
            Arc::new(SeededChance::new(seed))
        }
        None => Arc::new(ThreadChance),
    }
}

/// Runs every configured scenario in order, each with its own rooms and customers.
#[instrument]
pub async fn run_scenarios(config: &config::Config) -> Result<Vec<Report>, Error> {
    let settings = config.settings();
    let chance = chance_for(config);

    let mut reports = Vec::with_capacity(config.scenarios.len());
    for (index, scenario_config) in config.scenarios.iter().enumerate() {
        let mut scenario = Scenario::new(
            scenario_config.customers,
            scenario_config.load_testing,
            &settings,
            Arc::clone(&chance),
        );
        let report = scenario.run().await.context(RunScenario {
            scenario: index + 1,
        })?;
        info!(
            scenario = index + 1,
            started_at = ?scenario.started_at(),
            ended_at = ?scenario.ended_at(),
            load_testing = scenario.load_testing(),
            total_try_on_time = scenario.total_try_on_time(),
            served = scenario.customers().len(),
            rooms = scenario.rooms().capacity(),
            peak_occupied = scenario.rooms().peak_occupied(),
            "scenario complete"
        );
        reports.push(report);
    }
    Ok(reports)
}

#[instrument]
pub async fn do_command(config_path: &Option<PathBuf>, no_wait: bool) -> Result<(), Error> {
    let config = config::read(config_path).await.context(LoadConfig {})?;
    run_scenarios(&config).await?;

    if config.wait_for_enter && !no_wait {
        command::wait_for_enter("Press enter to leave the store")
            .await
            .context(Console {})?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ScenarioConfig};

    #[tokio::test(start_paused = true)]
    async fn every_configured_scenario_runs_in_order() {
        let config = Config {
            minute_millis: 1,
            seed: Some(7),
            scenarios: vec![
                ScenarioConfig {
                    customers: 2,
                    load_testing: false,
                },
                ScenarioConfig {
                    customers: 3,
                    load_testing: true,
                },
            ],
            ..Config::default()
        };

        let reports = run_scenarios(&config).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].customers, 2);
        assert_eq!(reports[1].customers, 3);
        assert!(reports[1].total_items <= 60);
    }
}
