//! # gwconfig
//!
//! Command-line editor for a messaging gateway's configuration file.
//!
//! The file is served through [`transport::FileTransport`], so every command
//! runs the same load, patch, save and reload cycle a gateway client runs.
//!
//! ```text
//! gwconfig --config gateway.json show
//! gwconfig set slack.botToken '"xoxb-..."'
//! gwconfig unset discord.guilds.123
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use schemaform::{
    ConfigController, ConfigState, FormMode, Value,
    path::{ROOT_KEY, get},
};

#[macro_use]
extern crate log;

mod model;
mod transport;
mod view;

use transport::FileTransport;

const DEFAULT_CONFIG_PATH: &str = ".gateway.json";

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file, `.json` or `.toml`.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Schema file. Defaults to `<config stem>-schema.json`, falling back to
    /// the built-in schema when that does not exist.
    #[arg(short, long)]
    schema: Option<PathBuf>,
    /// Save the raw text instead of the form value.
    #[arg(long)]
    raw: bool,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the schema paths that can only be edited as raw text.
    Schema,
    /// Print the config as a form.
    Show,
    /// Print the value at a dotted path.
    Get { path: String },
    /// Write a JSON value at a dotted path and save.
    Set { path: String, value: String },
    /// Remove the value at a dotted path and save.
    Unset { path: String },
    /// Print validation state and the integration summaries.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let transport = FileTransport::new(&cli.config, cli.schema.clone());
    debug!("editing {}", transport.config_path().display());
    let controller = ConfigController::with_transport(Arc::new(transport));

    controller.load_schema().await;
    controller.load().await;
    if let Some(e) = controller.with_state(|s| s.last_error.clone()) {
        bail!("{e}");
    }

    match cli.command {
        Command::Schema => print_schema(&controller.state()),
        Command::Show => {
            let state = controller.state();
            print_issues(&state);
            match controller.render() {
                Some(form) if state.form_supported() => print!("{}", view::draw(&form)),
                _ => print!("{}", state.raw),
            }
        }
        Command::Get { path } => {
            let value =
                controller.with_state(|s| get(&s.form_value(), &s.resolve_path(&path)).cloned());
            match value {
                Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                None => bail!("no value at `{path}`"),
            }
        }
        Command::Set { path, value } => {
            // Bare words are taken as strings.
            let value: Value = serde_json::from_str(&value)
                .or_else(|_| serde_json::to_value(&value))
                .with_context(|| format!("invalid value for `{path}`"))?;
            set_value(&controller, &path, value, cli.raw).await?;
        }
        Command::Unset { path } => unset_value(&controller, &path, cli.raw).await?,
        Command::Status => {
            let state = controller.state();
            print_issues(&state);
            println!("{}", serde_json::to_string_pretty(&state.projections)?);
        }
    }
    Ok(())
}

/// Write `value` at the dotted `path` and save.
async fn set_value(
    controller: &ConfigController,
    path: &str,
    value: Value,
    raw: bool,
) -> anyhow::Result<()> {
    ensure_parsed(controller)?;
    let p = controller.with_state(|s| s.resolve_path(path));
    controller.update_form_value(&p, value.clone());
    if controller.with_state(|s| get(&s.form_value(), &p) != Some(&value)) {
        bail!("`{path}` does not address a writable location");
    }
    save(controller, raw).await
}

/// Remove the value at the dotted `path` and save.
async fn unset_value(controller: &ConfigController, path: &str, raw: bool) -> anyhow::Result<()> {
    ensure_parsed(controller)?;
    let p = controller.with_state(|s| s.resolve_path(path));
    if p.is_empty() || controller.with_state(|s| get(&s.form_value(), &p).is_none()) {
        bail!("no value at `{path}`");
    }
    controller.remove_form_value(&p);
    save(controller, raw).await
}

/// Refuse to patch a file that did not parse; saving the form would replace
/// it with an empty config.
fn ensure_parsed(controller: &ConfigController) -> anyhow::Result<()> {
    let state = controller.state();
    if state.snapshot.as_ref().is_some_and(|s| s.config.is_some()) {
        return Ok(());
    }
    print_issues(&state);
    bail!("config file does not parse; fix it by hand before editing fields")
}

async fn save(controller: &ConfigController, raw: bool) -> anyhow::Result<()> {
    if raw {
        controller.set_form_mode(FormMode::Raw)?;
    }
    controller.save().await;

    let state = controller.state();
    if let Some(e) = &state.last_error {
        bail!("{e}");
    }
    println!("{}", "saved".green());
    print_issues(&state);
    Ok(())
}

fn print_schema(state: &ConfigState) {
    if let Some(version) = &state.schema_version {
        println!("schema version {version}");
    }
    match &state.schema {
        Some(analysis) if analysis.unsupported.is_empty() => {
            println!("{}", "every field is form-editable".green());
        }
        Some(analysis) => {
            println!("{}", "edit as raw text:".yellow());
            for key in &analysis.unsupported {
                println!("  {key}");
            }
        }
        None => println!("{}", "no schema".yellow()),
    }
}

fn print_issues(state: &ConfigState) {
    if state.valid != Some(false) {
        return;
    }
    eprintln!("{}", "config is invalid:".red().bold());
    for issue in &state.issues {
        let at = if issue.path.is_empty() {
            ROOT_KEY
        } else {
            issue.path.as_str()
        };
        eprintln!("  {}: {}", at.bold(), issue.message);
    }
}
