use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;

use hpwatch_core::config::defaults::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_INTERVAL};

pub fn build_cli() -> Command {
    Command::new("hpwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch your campaign's hit points from D&D Beyond, refreshed live")
        .long_about("hpwatch looks up the campaign a character belongs to, reads every member's current and maximum hit points from their public character sheet, and redraws a table in place on a fixed interval. All characters in the campaign must be set to public.")
        .args_conflicts_with_subcommands(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output (JSON on stderr)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("character-id")
                .help("Your D&D Beyond character ID (prompted for when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .short('i')
                .help("Refresh interval: '@every 1m', '90s', a cron expression like '*/5 * * * *', or '@hourly'. Polling faster than 30s may be rate limited")
                .default_value(DEFAULT_INTERVAL),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .help(format!(
                    "Seconds to wait for each character sheet to load [default: {}]",
                    DEFAULT_FETCH_TIMEOUT_SECS
                ))
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("max-concurrent")
                .long("max-concurrent")
                .short('c')
                .help("Maximum number of browser sessions at once (default: one per character)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail the whole refresh if any character cannot be read, instead of marking it unavailable")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exit-on-error")
                .long("exit-on-error")
                .help("Exit on the first failed refresh instead of retrying on the next tick")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Override the character API base URL")
                .hide(true),
        )
        .arg(
            Arg::new("page-url")
                .long("page-url")
                .help("Override the character sheet base URL")
                .hide(true),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .index(1)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "hpwatch");
        app.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let matches = build_cli()
            .try_get_matches_from(vec!["hpwatch", "12345"])
            .unwrap();

        assert_eq!(matches.get_one::<String>("character-id").unwrap(), "12345");
        assert_eq!(matches.get_one::<String>("interval").unwrap(), "@every 1m");
        assert!(matches.get_one::<u64>("timeout").is_none());
        assert!(matches.get_one::<usize>("max-concurrent").is_none());
        assert!(!matches.get_flag("strict"));
        assert!(!matches.get_flag("exit-on-error"));
        assert!(!matches.get_flag("verbose"));
    }

    #[test]
    fn test_cli_all_flags() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "hpwatch",
                "-v",
                "12345",
                "-i",
                "@every 2m",
                "-t",
                "30",
                "-c",
                "2",
                "--strict",
                "--exit-on-error",
            ])
            .unwrap();

        assert_eq!(matches.get_one::<String>("interval").unwrap(), "@every 2m");
        assert_eq!(*matches.get_one::<u64>("timeout").unwrap(), 30);
        assert_eq!(*matches.get_one::<usize>("max-concurrent").unwrap(), 2);
        assert!(matches.get_flag("strict"));
        assert!(matches.get_flag("exit-on-error"));
        assert!(matches.get_flag("verbose"));
    }

    #[test]
    fn test_cli_character_id_optional() {
        let matches = build_cli().try_get_matches_from(vec!["hpwatch"]).unwrap();
        assert!(matches.get_one::<String>("character-id").is_none());
        assert!(matches.subcommand().is_none());
    }

    #[test]
    fn test_cli_non_numeric_timeout_rejected() {
        let result = build_cli().try_get_matches_from(vec!["hpwatch", "1", "--timeout", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_completions_command() {
        let matches = build_cli()
            .try_get_matches_from(vec!["hpwatch", "completions", "bash"])
            .unwrap();
        let sub = matches.subcommand_matches("completions").unwrap();
        assert_eq!(*sub.get_one::<Shell>("shell").unwrap(), Shell::Bash);
    }
}
