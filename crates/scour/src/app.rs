use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("scour")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tear down every resource a tenant left behind")
        .long_about(
            "scour enumerates every live resource of every known kind in a cloud scope \
             and deletes them in dependency order, confirming each deletion before moving \
             on. Kinds that cannot run under the supplied identities are skipped and reported.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("kinds")
                .about("List every registered kind in deletion order")
                .arg(
                    Arg::new("service")
                        .long("service")
                        .short('s')
                        .help("Only show kinds of this service (repeatable)")
                        .action(ArgAction::Append)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("run")
                .about("Clean up a scope of an in-memory cloud described by a fixture")
                .arg(
                    Arg::new("fixture")
                        .long("fixture")
                        .short('f')
                        .help("JSON fixture describing the cloud")
                        .required(true)
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                )
                .arg(
                    Arg::new("tenant")
                        .long("tenant")
                        .short('t')
                        .help("Tenant (project) id to clean up")
                )
                .arg(
                    Arg::new("admin")
                        .long("admin")
                        .help("Act with the admin identity (default: admin and user)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("user")
                        .long("user")
                        .help("Act with the user identity (default: admin and user)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("service")
                        .long("service")
                        .short('s')
                        .help(
                            "Only clean this service or kind, e.g. nova or nova.servers \
                             (repeatable)",
                        )
                        .action(ArgAction::Append)
                )
                .arg(
                    Arg::new("admin-only")
                        .long("admin-only")
                        .help("Only run kinds that require the admin identity")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("user-only")
                )
                .arg(
                    Arg::new("user-only")
                        .long("user-only")
                        .help("Only run kinds that run as the user")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output the report in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "scour");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["scour"]).is_err());
    }

    #[test]
    fn test_cli_kinds_json() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["scour", "kinds", "--json"])
            .unwrap();
        let sub = matches.subcommand_matches("kinds").unwrap();
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_cli_run_requires_fixture() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["scour", "run"]).is_err());
    }

    #[test]
    fn test_cli_run_repeated_service() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "scour",
                "run",
                "--fixture",
                "cloud.json",
                "--tenant",
                "t1",
                "--service",
                "nova",
                "-s",
                "neutron.port",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("run").unwrap();
        let services: Vec<&String> = sub.get_many::<String>("service").unwrap().collect();
        assert_eq!(services, vec!["nova", "neutron.port"]);
        assert_eq!(sub.get_one::<String>("tenant").unwrap(), "t1");
    }

    #[test]
    fn test_cli_admin_only_conflicts_with_user_only() {
        let app = build_cli();
        let result = app.try_get_matches_from(vec![
            "scour",
            "run",
            "--fixture",
            "cloud.json",
            "--admin-only",
            "--user-only",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_is_global() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["scour", "kinds", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
