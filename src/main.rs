//=====================================================
// File: main.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Theta CLI entry point
// Objective: Command-line interface for listing, resolving and querying
//            .theta modules found on a load path
//=====================================================

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::json;
use theta::config::{Config, LOAD_PATH_ENV};
use theta::{ModuleLoader, ModuleName, pretty};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "theta", about = "Theta schema module resolver")]
pub struct Args {
    /// Module search root. Repeat to add more; earlier roots win.
    #[arg(short = 'p', long = "path", global = true)]
    pub path: Vec<PathBuf>,

    /// Configuration file (defaults to the user config directory).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of .theta syntax.
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every module on the load path.
    List,
    /// Resolve a module and print it.
    Show {
        module: String,
        /// Print the merged environment instead of local definitions.
        #[arg(long = "environment")]
        environment: bool,
    },
    /// Print the definition of a fully qualified name.
    Definition { name: String },
    /// Resolve modules and report problems.
    Check {
        #[arg(required = true)]
        modules: Vec<String>,
    },
}

fn main() -> Result<()> {
    install_tracing();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let load_path = config.load_path(&args.path, env::var_os(LOAD_PATH_ENV));
    let loader = ModuleLoader::with_versions(load_path, config.versions.clone());

    match &args.command {
        Command::List => list(&loader, args.json),
        Command::Show {
            module,
            environment,
        } => show(&loader, module, *environment, args.json),
        Command::Definition { name } => definition(&loader, name, args.json),
        Command::Check { modules } => check(&loader, modules),
    }
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("theta=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// A file named with `--config` must exist; the default location may be absent.
fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let (path, config) = match explicit {
        Some(path) => (path.clone(), Config::load(path)?),
        None => match Config::default_path() {
            Some(path) => {
                let config = Config::load_or_default(&path)?;
                (path, config)
            }
            None => return Ok(Config::default()),
        },
    };
    let base = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(config.resolve_relative_to(&base))
}

fn list(loader: &ModuleLoader, as_json: bool) -> Result<()> {
    let modules = loader.load_path().list_modules()?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
    } else {
        for module in modules {
            println!("{}", module);
        }
    }
    Ok(())
}

fn show(loader: &ModuleLoader, module: &str, environment: bool, as_json: bool) -> Result<()> {
    let name = ModuleName::parse(module).with_context(|| format!("invalid module name '{module}'"))?;
    let resolved = loader.get_module(&name)?;

    if environment {
        let mut definitions: Vec<_> = resolved.environment().values().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        if as_json {
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        } else {
            for definition in definitions {
                println!("{}\n", definition);
            }
        }
        return Ok(());
    }

    if as_json {
        let imports: Vec<&ModuleName> = resolved.import_names().collect();
        let value = json!({
            "name": resolved.name,
            "metadata": resolved.metadata,
            "imports": imports,
            "definitions": resolved.definitions(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", pretty::module(&resolved));
    }
    Ok(())
}

fn definition(loader: &ModuleLoader, name: &str, as_json: bool) -> Result<()> {
    let definition = loader.get_definition(name)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&definition)?);
    } else {
        println!("{}", definition);
    }
    Ok(())
}

fn check(loader: &ModuleLoader, modules: &[String]) -> Result<()> {
    let mut failures = 0;
    for module in modules {
        let outcome = ModuleName::parse(module)
            .map_err(theta::ThetaError::from)
            .and_then(|name| loader.get_module(&name));
        match outcome {
            Ok(resolved) => {
                let unresolved = resolved.unresolved_references();
                if unresolved.is_empty() {
                    println!("{}: ok", module);
                } else {
                    for name in unresolved {
                        println!("{}: warning: reference to undefined '{}'", module, name);
                    }
                }
            }
            Err(error) => {
                failures += 1;
                eprintln!("{}: error: {}", module, error);
            }
        }
    }
    if failures > 0 {
        return Err(anyhow!("{} of {} module(s) failed to resolve", failures, modules.len()));
    }
    Ok(())
}

//=====================================================
// End of file
//=====================================================
