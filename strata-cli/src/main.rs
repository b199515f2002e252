use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use strata_core::config::ConfigContext;

mod actions;
use crate::actions::*;

/// A CLI for layered configuration scopes, profiles, and parameter
/// resolution.
#[derive(Parser, Debug)]
#[command(
    name = "strata",
    version,
    about,
    // Show help when you forget a subcommand
    arg_required_else_help = true,
    // Make version available to subcommands automatically
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug, Default)]
pub(crate) struct GlobalOpts {
    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Read and write the user-global scope instead of the local one
    #[arg(short = 'g', long, global = true)]
    global: bool,

    /// Explicit config file layered over (and written instead of) the
    /// standing scopes
    #[arg(short = 'C', long = "config-file", global = true)]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and edit settings and per-command parameter overrides
    Config(ConfigCmd),

    /// Manage named, typed profiles and per-type defaults
    Profile(ProfileCmd),

    /// Show the final parameter map a command invocation would receive
    ///
    /// Examples:
    ///   strata resolve chat.ask --param temperature:float --param model
    ///   strata resolve chat.ask --profile-type llm --profile-param model=model
    Resolve(ResolveCmd),
}

#[derive(ClapArgs, Debug)]
pub(crate) struct ConfigCmd {
    #[command(subcommand)]
    pub(crate) action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Print the effective value of one key after scope merging
    Get {
        key: String,

        /// Read from this command's override map instead of settings
        #[arg(long, value_name = "COMMAND_PATH")]
        command: Option<String>,
    },

    /// Write a value into the write-target scope (JSON accepted, bare
    /// words stored as strings)
    Set {
        key: String,
        value: String,

        /// Write into this command's override map instead of settings
        #[arg(long, value_name = "COMMAND_PATH")]
        command: Option<String>,
    },

    /// Remove a key from the write-target scope
    Unset {
        key: String,

        #[arg(long, value_name = "COMMAND_PATH")]
        command: Option<String>,
    },

    /// Print the effective merged settings as JSON
    List {
        /// Print this command's effective override map instead
        #[arg(long, value_name = "COMMAND_PATH")]
        command: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub(crate) struct ProfileCmd {
    #[command(subcommand)]
    pub(crate) action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ProfileAction {
    /// Create (or replace) a profile in the write-target scope
    Create {
        profile_type: String,
        name: String,

        /// Profile field, FIELD=VALUE; repeatable
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Merge field updates into an existing profile in the write-target
    /// scope
    Edit {
        profile_type: String,
        name: String,

        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Delete a profile from the write-target scope
    Delete { profile_type: String, name: String },

    /// Print one profile, searched across the active scopes
    Show { profile_type: String, name: String },

    /// List profiles of a type across scopes (or one scope)
    List {
        profile_type: String,

        /// Restrict to one scope: global, local, or file
        #[arg(long)]
        scope: Option<String>,
    },

    /// Record the default profile name for a type in the write-target
    /// scope
    SetDefault { profile_type: String, name: String },
}

#[derive(ClapArgs, Debug)]
pub(crate) struct ResolveCmd {
    /// Dotted command path to resolve against
    pub(crate) command_path: String,

    /// Explicitly supplied value, NAME=VALUE (JSON accepted); repeatable
    #[arg(long = "arg", value_name = "NAME=VALUE")]
    pub(crate) args: Vec<String>,

    /// Declared parameter, NAME[:TYPE][=DEFAULT]; repeatable
    #[arg(long = "param", value_name = "NAME[:TYPE][=DEFAULT]")]
    pub(crate) params: Vec<String>,

    /// Profile type consulted by profile-linked parameters
    #[arg(long = "profile-type", value_name = "TYPE")]
    pub(crate) profile_type: Option<String>,

    /// Link a parameter to a profile field (declaring the parameter if
    /// needed), NAME=FIELD; repeatable
    #[arg(long = "profile-param", value_name = "NAME=FIELD")]
    pub(crate) profile_params: Vec<String>,
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = format!("strata_core={level},strata={level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let context = ConfigContext::load(cli.global.global, cli.global.config_file.clone(), &cwd)?;

    match cli.command {
        Commands::Config(cmd) => run_config(&context, &cmd.action),
        Commands::Profile(cmd) => run_profile(&context, &cmd.action),
        Commands::Resolve(cmd) => run_resolve(&context, &cmd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(err) = dispatch(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }
}
