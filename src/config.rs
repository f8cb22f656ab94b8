//! Service configuration loaded from `LOAD_IT_NOW_*` environment variables.

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::combination::{CombinationConfig, FillMode, SeedFloor};
use crate::optimizer::PackingConfig;
use crate::scoring::ScoreWeights;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(env_string)
    }

    /// Creates a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: ApiConfig::from_lookup(&lookup),
            optimizer: OptimizerConfig::from_lookup(&lookup),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "LOAD_IT_NOW_API_HOST";
    const PORT_VAR: &'static str = "LOAD_IT_NOW_API_PORT";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let host_value = lookup(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                tracing::warn!(
                    var = Self::HOST_VAR,
                    value = %host_value,
                    error = %err,
                    "could not parse host, using {}",
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match lookup(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    tracing::warn!(
                        var = Self::PORT_VAR,
                        "port must not be 0, using {}",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    tracing::warn!(
                        var = Self::PORT_VAR,
                        value = %raw,
                        error = %err,
                        "could not parse port, using {}",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Configuration for packing runs and the combination optimizer.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    packing: PackingConfig,
    combination: CombinationConfig,
}

impl OptimizerConfig {
    const STRATEGY_VAR: &'static str = "LOAD_IT_NOW_PACKING_STRATEGY";
    const ALLOW_ROTATION_VAR: &'static str = "LOAD_IT_NOW_PACKING_ALLOW_ROTATIONS";
    const FIT_EPSILON_VAR: &'static str = "LOAD_IT_NOW_PACKING_FIT_EPSILON";
    const ITERATION_FACTOR_VAR: &'static str = "LOAD_IT_NOW_PACKING_ITERATION_FACTOR";
    const PRUNE_INTERVAL_VAR: &'static str = "LOAD_IT_NOW_PACKING_PRUNE_INTERVAL";
    const MAX_PLACEMENTS_VAR: &'static str = "LOAD_IT_NOW_PACKING_MAX_PLACEMENTS";
    const MAX_GRID_CELLS_VAR: &'static str = "LOAD_IT_NOW_PACKING_MAX_GRID_CELLS";
    const GUILLOTINE_WEIGHTS_VAR: &'static str = "LOAD_IT_NOW_SCORE_WEIGHTS_GUILLOTINE";
    const EXTREME_POINT_WEIGHTS_VAR: &'static str = "LOAD_IT_NOW_SCORE_WEIGHTS_EXTREME_POINT";
    const SEED_VAR: &'static str = "LOAD_IT_NOW_COMBINATION_SEED";
    const FILL_MODE_VAR: &'static str = "LOAD_IT_NOW_COMBINATION_FILL_MODE";
    const MAX_PASSES_VAR: &'static str = "LOAD_IT_NOW_COMBINATION_MAX_PASSES";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let strategy = load_parsed(
            lookup,
            Self::STRATEGY_VAR,
            PackingConfig::DEFAULT_STRATEGY,
            |_| true,
            "",
        );

        let allow_item_rotation = lookup(Self::ALLOW_ROTATION_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_ROTATION_VAR))
            .unwrap_or(PackingConfig::DEFAULT_ALLOW_ITEM_ROTATION);

        let fit_epsilon = load_f64_with_warning(
            lookup,
            Self::FIT_EPSILON_VAR,
            PackingConfig::DEFAULT_FIT_EPSILON,
            |value| (0.0..1.0).contains(&value),
            "must be between 0 and 1",
            "adjusted fit tolerance may admit overlapping placements",
        );

        let iteration_budget_factor = load_parsed(
            lookup,
            Self::ITERATION_FACTOR_VAR,
            PackingConfig::DEFAULT_ITERATION_BUDGET_FACTOR,
            |value: &usize| *value >= 1,
            "must be at least 1",
        );

        let prune_interval = load_parsed(
            lookup,
            Self::PRUNE_INTERVAL_VAR,
            PackingConfig::DEFAULT_PRUNE_INTERVAL,
            |_| true,
            "",
        );

        let max_placements = load_parsed(
            lookup,
            Self::MAX_PLACEMENTS_VAR,
            PackingConfig::DEFAULT_MAX_PLACEMENTS,
            |value: &usize| *value >= 1,
            "must be at least 1",
        );

        let max_grid_cells = load_parsed(
            lookup,
            Self::MAX_GRID_CELLS_VAR,
            PackingConfig::DEFAULT_MAX_GRID_CELLS,
            |value: &u64| *value >= 1,
            "must be at least 1",
        );

        let guillotine_weights =
            load_weights(lookup, Self::GUILLOTINE_WEIGHTS_VAR, ScoreWeights::GUILLOTINE);
        let extreme_point_weights = load_weights(
            lookup,
            Self::EXTREME_POINT_WEIGHTS_VAR,
            ScoreWeights::EXTREME_POINT,
        );

        let packing = PackingConfig::builder()
            .strategy(strategy)
            .allow_item_rotation(allow_item_rotation)
            .fit_epsilon(fit_epsilon)
            .iteration_budget_factor(iteration_budget_factor)
            .prune_interval(prune_interval)
            .max_placements(max_placements)
            .max_grid_cells(max_grid_cells)
            .guillotine_weights(guillotine_weights)
            .extreme_point_weights(extreme_point_weights)
            .build();

        let combination = CombinationConfig::builder()
            .seed(load_parsed(lookup, Self::SEED_VAR, SeedFloor::default(), |_| true, ""))
            .fill_mode(load_parsed(
                lookup,
                Self::FILL_MODE_VAR,
                FillMode::default(),
                |_| true,
                "",
            ))
            .max_passes(load_parsed(
                lookup,
                Self::MAX_PASSES_VAR,
                CombinationConfig::DEFAULT_MAX_PASSES,
                |value: &usize| *value >= 1,
                "must be at least 1",
            ))
            .build();

        Self {
            packing,
            combination,
        }
    }

    /// Returns the configured PackingConfig.
    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }

    pub fn combination_config(&self) -> CombinationConfig {
        self.combination
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            tracing::warn!(var = name, error = %err, "environment access failed, using default value");
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            tracing::warn!(
                var = var_name,
                value = other,
                "could not interpret value as boolean, using default value"
            );
            None
        }
    }
}

fn load_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: T,
    validator: impl Fn(&T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(var_name) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if validator(&value) => value,
        Ok(_) => {
            tracing::warn!(
                var = var_name,
                value = %raw,
                "invalid value ({}), using {}",
                invalid_hint,
                default
            );
            default
        }
        Err(err) => {
            tracing::warn!(
                var = var_name,
                value = %raw,
                error = %err,
                "could not parse value, using {}",
                default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    let value = load_parsed(lookup, var_name, default, |v: &f64| validator(*v), invalid_hint);
    let tolerance = (default.abs().max(1.0)) * 1e-9;
    if (value - default).abs() > tolerance {
        tracing::warn!(var = var_name, value, "{}", warning);
    }
    value
}

fn load_weights(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: ScoreWeights,
) -> ScoreWeights {
    let Some(raw) = lookup(var_name) else {
        return default;
    };
    match ScoreWeights::parse_triple(&raw) {
        Ok(weights) => weights,
        Err(err) => {
            tracing::warn!(var = var_name, error = %err, "using default score weights");
            default
        }
    }
}
