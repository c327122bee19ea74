//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Build schema-governed data trees from JSON documents
#[derive(Parser, Debug)]
#[command(name = "yangtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d, -dd, -ddd)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Local config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the data tree of a JSON document and print it
    Build {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,

        /// Schema file (default: `schema` from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        schema: Option<PathBuf>,

        /// Output format (default: `output.format` from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Place augmenting nodes without a matching augmentation as direct children
        #[arg(long)]
        lenient: bool,
    },

    /// Print the schema tree
    Schema {
        /// Schema file (default: `schema` from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        schema: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show the global config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn given_cli_definition_when_verified_then_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_build_args_when_parsing_then_flags_are_read() {
        let cli = Cli::try_parse_from([
            "yangtree", "-dd", "build", "doc.json", "--schema", "s.toml", "--format", "events",
            "--lenient",
        ])
        .unwrap();

        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Build {
                document,
                schema,
                format,
                lenient,
            }) => {
                assert_eq!(document, PathBuf::from("doc.json"));
                assert_eq!(schema, Some(PathBuf::from("s.toml")));
                assert_eq!(format, Some(OutputFormat::Events));
                assert!(lenient);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
