//! `awareness` – query the device context from the command line
//!
//! Runs one snapshot query against the in-process simulated host and prints
//! the outcome:
//!
//! 1. Initialises tracing (see [`telemetry`]).
//! 2. Loads `~/.awareness/config.toml` and builds the guard layer from it.
//! 3. Runs the query named on the command line; Ctrl-C cancels it.
//!
//! `awareness init <api-key>` writes a fresh config file instead.

mod config;
mod telemetry;

use std::fmt::Debug;
use std::process::ExitCode;
use std::sync::Arc;

use awareness_core::Single;
use awareness_snapshot::{SimulatedHost, Snapshot};
use awareness_types::AwarenessError;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const USAGE: &str = "\
usage: awareness <query> [args]
       awareness init <api-key>

queries:
  location | lat-lng | speed
  activity | most-probable [min] | activities [min]
  headphones";

fn main() -> ExitCode {
    let _guard = telemetry::init_tracing("awareness");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((name, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    if name == "init" {
        return init(rest);
    }

    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            info!(path = %config::config_path().display(), "config loaded");
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let host = Arc::new(SimulatedHost::new().with_sample_data());
    let snapshot = Snapshot::new(host, cfg.policy_gate());

    let single = match build_query(&snapshot, name, rest) {
        Ok(single) => single,
        Err(QueryError::Usage(msg)) => {
            eprintln!("{}\n\n{USAGE}", msg.red());
            return ExitCode::from(2);
        }
        Err(QueryError::Rejected(e)) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start runtime".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(async {
        let token = CancellationToken::new();
        let on_interrupt = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        single.until_cancelled(&token).await
    });

    match outcome {
        Some(Ok(value)) => {
            println!("{} {}", format!("{name}:").bold(), value.green());
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            report(&e);
            ExitCode::FAILURE
        }
        None => {
            warn!(query = %name, "cancelled");
            println!("{}", "cancelled".yellow());
            ExitCode::FAILURE
        }
    }
}

fn init(args: &[String]) -> ExitCode {
    let Some(key) = args.first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let cfg = config::Config {
        awareness_api_key: key.clone(),
        ..config::Config::default()
    };
    match config::save(&cfg) {
        Ok(()) => {
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                config::config_path().display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum QueryError {
    Usage(String),
    Rejected(AwarenessError),
}

impl From<AwarenessError> for QueryError {
    fn from(e: AwarenessError) -> Self {
        QueryError::Rejected(e)
    }
}

fn shown<T: Debug + Send + 'static>(single: Single<T>) -> Single<String> {
    single.map(|v| format!("{v:?}"))
}

fn min_probability(arg: &str) -> Result<u8, QueryError> {
    arg.parse::<u8>()
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| QueryError::Usage(format!("`{arg}` is not a probability between 0 and 100")))
}

fn build_query(
    snapshot: &Snapshot,
    name: &str,
    args: &[String],
) -> Result<Single<String>, QueryError> {
    let single = match name {
        "location" => shown(snapshot.location()?),
        "lat-lng" => shown(snapshot.lat_lng()?),
        "speed" => shown(snapshot.speed()?),
        "activity" => shown(snapshot.activity()?),
        "most-probable" => match args.first() {
            Some(min) => shown(snapshot.most_probable_activity_above(min_probability(min)?)?),
            None => shown(snapshot.most_probable_activity()?),
        },
        "activities" => match args.first() {
            Some(min) => shown(snapshot.probable_activities_above(min_probability(min)?)?),
            None => shown(snapshot.probable_activities()?),
        },
        "headphones" => shown(snapshot.headphones_plugged_in()?),
        other => return Err(QueryError::Usage(format!("unknown query `{other}`"))),
    };
    Ok(single)
}

fn report(e: &AwarenessError) {
    let class = match e {
        AwarenessError::Configuration(_) => "configuration",
        AwarenessError::Connection(_) => "connection",
        AwarenessError::Request(_) => "request",
        AwarenessError::Projection(_) => "projection",
    };
    eprintln!("{} {}", format!("{class} error:").red().bold(), e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use awareness_guard::{ApiKeyGuard, PermissionSet, PolicyGate};
    use awareness_types::{ApiKey, Permission};

    fn snapshot(permissions: &[Permission]) -> Snapshot {
        let mut keys = ApiKeyGuard::new();
        keys.register(ApiKey::Awareness, "a-key");
        let permissions: PermissionSet = permissions.iter().copied().collect();
        let gate = PolicyGate::new(keys, permissions);
        Snapshot::new(Arc::new(SimulatedHost::new().with_sample_data()), gate)
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn headphones_query_prints_value() {
        let single = build_query(&snapshot(&[]), "headphones", &[]).unwrap();
        assert_eq!(single.await, Ok("false".to_string()));
    }

    #[tokio::test]
    async fn most_probable_with_threshold() {
        let snap = snapshot(&[Permission::ActivityRecognition]);
        let single = build_query(&snap, "most-probable", &args(&["75"])).unwrap();
        assert_eq!(single.await, Ok("None".to_string()));
    }

    #[test]
    fn unknown_query_is_usage_error() {
        assert!(matches!(
            build_query(&snapshot(&[]), "fences", &[]),
            Err(QueryError::Usage(_))
        ));
    }

    #[test]
    fn bad_threshold_is_usage_error() {
        let snap = snapshot(&[Permission::ActivityRecognition]);
        assert!(matches!(
            build_query(&snap, "activities", &args(&["101"])),
            Err(QueryError::Usage(_))
        ));
    }

    #[test]
    fn missing_permission_is_rejected() {
        assert!(matches!(
            build_query(&snapshot(&[]), "location", &[]),
            Err(QueryError::Rejected(AwarenessError::Configuration(_)))
        ));
    }
}
