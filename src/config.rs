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
//! Provides configuration for the store simulation
//!
//! Configuration comes from an optional yaml file, falling back to defaults that reproduce the
//! classic three scenario demo. A couple of values can be overridden from the environment.
use crate::lib::store::customer::{TryOnRules, ITEM_LIMIT};
use crate::lib::store::scenario::Settings;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Error expanding path to $HOME dir: {}", source))]
    FailedToGetPath {
        source: shellexpand::LookupError<std::env::VarError>,
    },
    #[snafu(display("Could not open config from {}: {}", filename.display(), source))]
    OpenConfig {
        filename: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Could not parse config from {}: {}", filename.display(), source))]
    ParseYaml {
        filename: PathBuf,
        source: serde_yaml::Error,
    },
    #[snafu(display("Couldn't read from environment: {}", source))]
    InvalidEnvironment { source: envy::Error },
    #[snafu(display("The store needs at least one dressing room"))]
    NoRooms,
    #[snafu(display("Scenario {} has no customers", scenario))]
    NoCustomers { scenario: usize },
    #[snafu(display("{} must be between 1 and {}, got {}", name, ITEM_LIMIT, value))]
    InvalidMaxItems { name: String, value: u32 },
    #[snafu(display(
        "Try-on time must be a range of at least one minute, got {} to {}",
        shortest,
        longest
    ))]
    InvalidTryOnRange { shortest: u32, longest: u32 },
    #[snafu(display(
        "minute-millis must be at most {}, got {}",
        MAX_MINUTE_MILLIS,
        value
    ))]
    MinuteTooLong { value: u64 },
}

/// One simulated minute may last at most an hour of wall clock time
pub const MAX_MINUTE_MILLIS: u64 = 3_600_000;

/// Overrides pulled from `DRESSING_ROOMS_*` variables
#[derive(Deserialize, Debug, Default)]
struct Environment {
    /// Wall clock milliseconds per simulated minute
    minute_millis: Option<u64>,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioConfig {
    pub customers: usize,
    #[serde(default)]
    pub load_testing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub rooms: usize,
    pub max_items: u32,
    pub load_test_max_items: u32,
    pub shortest_try_on: u32,
    pub longest_try_on: u32,
    pub minute_millis: u64,
    /// Makes item counts reproducible when set
    pub seed: Option<u64>,
    pub wait_for_enter: bool,
    pub scenarios: Vec<ScenarioConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rooms: 3,
            max_items: 6,
            load_test_max_items: ITEM_LIMIT,
            shortest_try_on: 1,
            longest_try_on: 3,
            minute_millis: 1000,
            seed: None,
            wait_for_enter: true,
            scenarios: vec![
                ScenarioConfig {
                    customers: 10,
                    load_testing: false,
                },
                ScenarioConfig {
                    customers: 20,
                    load_testing: false,
                },
                ScenarioConfig {
                    customers: 20,
                    load_testing: true,
                },
            ],
        }
    }
}

impl Config {
    /// Rejects anything that would leave a customer with no items, no time or no room to use.
    pub fn validate(&self) -> Result<(), Error> {
        ensure!(self.rooms > 0, NoRooms {});
        for (name, value) in &[
            ("max-items", self.max_items),
            ("load-test-max-items", self.load_test_max_items),
        ] {
            ensure!(
                (1..=ITEM_LIMIT).contains(value),
                InvalidMaxItems {
                    name: *name,
                    value: *value,
                }
            );
        }
        ensure!(
            self.shortest_try_on >= 1 && self.shortest_try_on <= self.longest_try_on,
            InvalidTryOnRange {
                shortest: self.shortest_try_on,
                longest: self.longest_try_on,
            }
        );
        ensure!(
            self.minute_millis <= MAX_MINUTE_MILLIS,
            MinuteTooLong {
                value: self.minute_millis
            }
        );
        for (index, scenario) in self.scenarios.iter().enumerate() {
            ensure!(
                scenario.customers > 0,
                NoCustomers {
                    scenario: index + 1
                }
            );
        }
        Ok(())
    }

    fn apply(&mut self, env: Environment) {
        if let Some(minute_millis) = env.minute_millis {
            self.minute_millis = minute_millis;
        }
        if env.seed.is_some() {
            self.seed = env.seed;
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            rooms: self.rooms,
            max_items: self.max_items,
            load_test_max_items: self.load_test_max_items,
            rules: TryOnRules {
                shortest_minutes: self.shortest_try_on,
                longest_minutes: self.longest_try_on,
                minute: Duration::from_millis(self.minute_millis),
                narrate: true,
            },
        }
    }
}

pub fn default_path() -> Result<PathBuf, Error> {
    Ok(PathBuf::from(
        shellexpand::full("~/.config/dressing-rooms/config.yml")
            .context(FailedToGetPath {})?
            .as_ref(),
    ))
}

/// Parses and validates yaml config text
pub fn parse(contents: &str, filename: PathBuf) -> Result<Config, Error> {
    let config: Config = serde_yaml::from_str(contents).context(ParseYaml { filename })?;
    config.validate()?;
    Ok(config)
}

/// Reads the config from `opt_config_path`, or from the default location if that exists. The
/// environment is layered over whatever the file says.
#[instrument]
pub async fn read(opt_config_path: &Option<PathBuf>) -> Result<Config, Error> {
    let path = match opt_config_path {
        Some(path) => Some(path.clone()),
        None => {
            let path = default_path()?;
            if fs::metadata(&path).await.is_ok() {
                Some(path)
            } else {
                None
            }
        }
    };

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "reading config");
            let contents = fs::read_to_string(&path).await.context(OpenConfig {
                filename: path.clone(),
            })?;
            parse(&contents, path)?
        }
        None => Config::default(),
    };

    let env = envy::prefixed("DRESSING_ROOMS_")
        .from_env::<Environment>()
        .context(InvalidEnvironment {})?;
    config.apply(env);
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_classic_demo() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.rooms, 3);
        assert_eq!(
            config
                .scenarios
                .iter()
                .map(|scenario| (scenario.customers, scenario.load_testing))
                .collect::<Vec<_>>(),
            vec![(10, false), (20, false), (20, true)]
        );
        let settings = config.settings();
        assert_eq!(settings.rules.minute, Duration::from_secs(1));
        assert_eq!(settings.max_items, 6);
        assert_eq!(settings.load_test_max_items, 20);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = parse(
            "rooms: 5\nminute-millis: 10\nscenarios:\n  - customers: 4\n    load-testing: true\n",
            PathBuf::from("test.yml"),
        )
        .unwrap();

        assert_eq!(config.rooms, 5);
        assert_eq!(config.minute_millis, 10);
        assert_eq!(config.max_items, 6);
        assert_eq!(
            config.scenarios,
            vec![ScenarioConfig {
                customers: 4,
                load_testing: true,
            }]
        );
    }

    #[test]
    fn zero_rooms_is_rejected() {
        let err = parse("rooms: 0\n", PathBuf::from("test.yml")).unwrap_err();
        assert!(matches!(err, Error::NoRooms));
    }

    #[test]
    fn empty_scenario_is_rejected() {
        let err = parse(
            "scenarios:\n  - customers: 3\n  - customers: 0\n",
            PathBuf::from("test.yml"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoCustomers { scenario: 2 }));
    }

    #[test]
    fn out_of_range_item_limits_are_rejected() {
        let err = parse("load-test-max-items: 21\n", PathBuf::from("test.yml")).unwrap_err();
        assert!(matches!(err, Error::InvalidMaxItems { value: 21, .. }));
    }

    #[test]
    fn inverted_try_on_range_is_rejected() {
        let err = parse(
            "shortest-try-on: 4\nlongest-try-on: 2\n",
            PathBuf::from("test.yml"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTryOnRange {
                shortest: 4,
                longest: 2
            }
        ));
    }

    #[test]
    fn huge_minute_is_rejected() {
        let err = parse(
            "minute-millis: 3600001\n",
            PathBuf::from("test.yml"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MinuteTooLong { value: 3_600_001 }
        ));
        assert!(parse("minute-millis: 3600000\n", PathBuf::from("test.yml")).is_ok());
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::default();
        config.apply(Environment {
            minute_millis: Some(5),
            seed: Some(9),
        });

        assert_eq!(config.minute_millis, 5);
        assert_eq!(config.seed, Some(9));
    }
}
