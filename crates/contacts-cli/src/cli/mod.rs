//! CLI command definitions for the `contacts` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a noun-verb
//! pattern (e.g., `contacts user register`, `contacts contact list`).

pub mod contact;
pub mod user;

use clap::{Parser, Subcommand};

/// Keep track of your contacts and their birthdays.
#[derive(Parser)]
#[command(name = "contacts", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors. Command output is still printed.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default tracing filter for the `-v`/`-q` flags.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,contacts_core=debug,contacts_infra=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage accounts (register, show, confirm, password, token, avatar).
    User {
        #[command(subcommand)]
        action: user::UserCommand,
    },

    /// Manage an account's contacts (add, list, show, update, delete, search, birthdays).
    Contact {
        #[command(subcommand)]
        action: contact::ContactCommand,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["contacts", "user", "show", "a@b.com", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::User {
                action: user::UserCommand::Show { .. }
            }
        ));
    }

    #[test]
    fn parses_contact_list_with_pagination() {
        let cli = Cli::try_parse_from([
            "contacts", "-q", "contact", "list", "--as", "a@b.com", "--limit", "5", "--offset", "10",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Contact {
                action: contact::ContactCommand::List { acting_as, limit, offset },
            } => {
                assert_eq!(acting_as, "a@b.com");
                assert_eq!(limit, Some(5));
                assert_eq!(offset, 10);
            }
            _ => panic!("expected contact list"),
        }
    }

    #[test]
    fn quiet_only_lowers_the_log_level() {
        let quiet = Cli::try_parse_from(["contacts", "-q", "user", "show", "a@b.com"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");

        let verbose = Cli::try_parse_from(["contacts", "-q", "-v", "user", "show", "a@b.com"]).unwrap();
        assert_eq!(verbose.log_filter(), "info,contacts_core=debug,contacts_infra=debug");

        let cmd = Cli::command();
        let help = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "quiet")
            .and_then(|arg| arg.get_help())
            .unwrap()
            .to_string();
        assert!(help.starts_with("Only log errors"));
    }

    #[test]
    fn contact_add_parses_birthday() {
        let cli = Cli::try_parse_from([
            "contacts",
            "contact",
            "add",
            "--as",
            "a@b.com",
            "--first-name",
            "John",
            "--last-name",
            "Doe",
            "--email",
            "john@example.com",
            "--phone",
            "+380123456789",
            "--birthday",
            "1990-05-17",
        ])
        .unwrap();
        match cli.command {
            Commands::Contact {
                action: contact::ContactCommand::Add { fields, .. },
            } => {
                let schema = fields.into_schema();
                assert_eq!(schema.first_name, "John");
                assert_eq!(schema.birthday, chrono::NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
                assert!(schema.extra_data.is_none());
            }
            _ => panic!("expected contact add"),
        }
    }

    #[test]
    fn contact_add_rejects_bad_birthday() {
        let result = Cli::try_parse_from([
            "contacts",
            "contact",
            "add",
            "--as",
            "a@b.com",
            "--first-name",
            "John",
            "--last-name",
            "Doe",
            "--email",
            "john@example.com",
            "--phone",
            "123",
            "--birthday",
            "17/05/1990",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn contact_show_rejects_bad_id() {
        let result = Cli::try_parse_from(["contacts", "contact", "show", "--as", "a@b.com", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn user_token_requires_token_or_clear() {
        assert!(Cli::try_parse_from(["contacts", "user", "token", "a@b.com"]).is_err());
        assert!(Cli::try_parse_from(["contacts", "user", "token", "a@b.com", "--clear"]).is_ok());
        assert!(
            Cli::try_parse_from(["contacts", "user", "token", "a@b.com", "--token", "t", "--clear"])
                .is_err()
        );
    }
}
