use clap::ArgMatches;
use tracing::info;

use scour_core::{ResourceKind, builtin_registry};

use crate::table::KindTable;

pub(crate) fn handle_kinds_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let services: Vec<&String> = matches
        .get_many::<String>("service")
        .map(|values| values.collect())
        .unwrap_or_default();

    let registry = builtin_registry()?;
    let kinds: Vec<&ResourceKind> = registry
        .all_kinds()
        .iter()
        .map(|registered| registered.kind())
        .filter(|kind| services.is_empty() || services.iter().any(|s| *s == kind.service))
        .collect();

    info!(
        event = "cli.kinds_completed",
        count = kinds.len(),
        json_output = json_output
    );

    if json_output {
        println!("{}", serde_json::to_string_pretty(&kinds)?);
    } else if kinds.is_empty() {
        println!("No kinds match.");
    } else {
        KindTable::new(&kinds).print_table(&kinds);
    }

    Ok(())
}
