use clap::ArgMatches;
use tracing::error;

use hpwatch_core::events;

mod completions;
mod watch;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("completions", sub_matches)) => completions::handle_completions_command(sub_matches),
        Some((name, _)) => {
            error!(event = "cli.command_unknown", command = name);
            Err("Unknown command".into())
        }
        None => watch::handle_watch_command(matches),
    };

    events::log_app_shutdown();
    result
}
