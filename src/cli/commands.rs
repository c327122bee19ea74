//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    // completions must work even with a broken config
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Build {
            document,
            schema,
            format,
            lenient,
        }) => cmd_build(&container, document, schema.as_deref(), *format, *lenient),
        Some(Commands::Schema { schema }) => cmd_schema(&container, schema.as_deref()),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { .. }) => Ok(()),
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_build(
    container: &ServiceContainer,
    document: &Path,
    schema: Option<&Path>,
    format: Option<OutputFormat>,
    lenient: bool,
) -> CliResult<()> {
    let schema_path = container.schema_path(schema)?;
    let schema = container.tree.load_schema(&schema_path)?;

    let mut options = container.settings.build_options();
    if lenient {
        options.strict_augmentation = false;
    }
    let format = format.unwrap_or(container.settings.output.format);
    debug!("cmd_build: options={:?}, format={:?}", options, format);

    let tree = container.tree.build(&schema, document, options)?;
    output::info(&container.tree.render(&schema, &tree, format)?);
    Ok(())
}

fn cmd_schema(container: &ServiceContainer, schema: Option<&Path>) -> CliResult<()> {
    let schema_path = container.schema_path(schema)?;
    let schema = container.tree.load_schema(&schema_path)?;

    for module in schema.modules() {
        let revision = module.revision.as_deref().unwrap_or("-");
        output::header(&format!("{} {} @{}", module.name, module.namespace, revision));
    }
    output::info(&schema.to_tree_string());
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let path = global_config_path().unwrap_or_else(|| PathBuf::from("<no config directory>"));
            output::info(&path.display());
        }
    }
    Ok(())
}
