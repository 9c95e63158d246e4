use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::ArgMatches;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use hpwatch_core::config::validate_options;
use hpwatch_core::events;
use hpwatch_core::{
    ApiRosterResolver, BrowserFetcher, ConfigError, CycleCoordinator, HpWatchError, Scheduler,
    WatchConfig, WatchOptions,
};

use crate::presenter::{Presenter, PresenterExit};

const SEED_PROMPT: &str = "What is your character ID: ";
const OUTCOME_BUFFER: usize = 16;

pub(crate) fn handle_watch_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let seed_id = match matches.get_one::<String>("character-id") {
        Some(id) => id.clone(),
        None => prompt_character_id()?,
    };

    let options = WatchOptions {
        seed_id,
        interval: matches.get_one::<String>("interval").cloned(),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
        max_concurrent: matches.get_one::<usize>("max-concurrent").copied(),
        strict: matches.get_flag("strict"),
        exit_on_error: matches.get_flag("exit-on-error"),
        api_base: matches.get_one::<String>("api-url").cloned(),
        page_base: matches.get_one::<String>("page-url").cloned(),
    };

    let config = match validate_options(options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            error!(
                event = "cli.watch_failed",
                error = %e,
                error_code = e.error_code()
            );
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    info!(
        event = "cli.watch_started",
        seed_id = config.seed_id.as_str(),
        interval = %config.interval,
        timeout_secs = config.cycle.fetch_timeout.as_secs(),
        failure_policy = %config.cycle.failure_policy,
        exit_on_error = config.exit_on_error
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(watch(config))? {
        PresenterExit::Failed(failure) => {
            eprintln!("Error: {}", failure);
            error!(
                event = "cli.watch_failed",
                cycle = failure.cycle,
                error = %failure.error,
                error_code = failure.error.error_code()
            );
            events::log_app_error(&failure);
            Err(failure.into())
        }
        exit => {
            info!(event = "cli.watch_completed", exit = ?exit);
            Ok(())
        }
    }
}

async fn watch(config: WatchConfig) -> Result<PresenterExit, Box<dyn std::error::Error>> {
    let roster = ApiRosterResolver::new(config.endpoints.clone(), config.cycle.fetch_timeout)?;
    let fetcher = BrowserFetcher::new(config.endpoints.clone());
    let coordinator = Arc::new(CycleCoordinator::new(
        Arc::new(roster),
        Arc::new(fetcher),
        config.cycle.clone(),
    ));
    let scheduler = Scheduler::new(coordinator, &config.seed_id, config.interval.clone());

    let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
    let shutdown = CancellationToken::new();

    let ctrl_c = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(event = "cli.watch.interrupt_received");
                    shutdown.cancel();
                }
                Err(e) => warn!(event = "cli.watch.signal_handler_failed", error = %e),
            }
        })
    };
    let scheduler_task = tokio::spawn(scheduler.run(tx, shutdown.clone()));

    let mut presenter = Presenter::new(io::stdout(), config.exit_on_error);
    let exit = tokio::select! {
        exit = presenter.run(rx) => exit?,
        _ = shutdown.cancelled() => PresenterExit::Interrupted,
    };

    shutdown.cancel();
    ctrl_c.abort();
    if let Err(e) = scheduler_task.await {
        warn!(event = "cli.watch.scheduler_join_failed", error = %e);
    }

    Ok(exit)
}

fn prompt_character_id() -> Result<String, ConfigError> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", SEED_PROMPT)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
