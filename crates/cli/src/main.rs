use clap::Parser;
use itertools::Itertools;
use log::debug;
use std::process::ExitCode;

use switchyard_core::config;
use switchyard_core::error::{Error, Result};
use switchyard_core::file_handling::{self, YamlSettingsStore};
use switchyard_core::prompt::{run_prompt_phase, PromptContext};
use switchyard_core::registry::Registry;

use crate::cli_args::{Args, Verb};
use crate::prompting::StdinPrompter;

mod cli_args;
mod prompting;
mod tokens;

/// Load the schema, build the registry with its collaborators and pull in
/// persisted values.
fn build_registry(args: &Args) -> Result<Registry> {
    let schema_path = config::get_schema_path(&args.schema_path);
    debug!("Schema path: `{}`", schema_path);

    let definitions = file_handling::load_definitions(&schema_path)?;

    let settings_path = config::get_settings_path(&args.settings_path);
    debug!("Settings path: `{}`", settings_path);

    let mut registry =
        Registry::new().with_store(Box::new(YamlSettingsStore::new(settings_path)));
    for definition in definitions {
        registry.register(definition)?;
    }
    registry.load_persisted()?;

    Ok(registry)
}

/// Apply `-p` assignments inside a batch pass, so switch groups reject
/// conflicting tokens no matter their configured policy.
fn apply_command_line(registry: &mut Registry, args: &Args) -> Result<()> {
    if args.parameters.is_empty() {
        return Ok(());
    }

    let grouped = tokens::group_assignments(&args.parameters)?;
    let mut guard = registry.batch_guard();
    tokens::apply_assignments(&mut guard, &grouped)
}

fn list_parameters(registry: &Registry) -> Result<()> {
    for definition in registry.definitions() {
        let state = if registry.is_set(&definition.name)? {
            "set"
        } else {
            "default"
        };

        match registry.get(&definition.name)? {
            Some(value) => println!("{} = {} ({state})", definition.name, value),
            None => println!("{} is unset", definition.name),
        }
    }
    Ok(())
}

fn run_verb(registry: &mut Registry, verb: Option<&Verb>) -> Result<()> {
    match verb {
        None | Some(Verb::List) => list_parameters(registry),
        Some(Verb::Get { name }) => {
            if let Some(value) = registry.get(name)? {
                println!("{value}");
            }
            Ok(())
        }
        Some(Verb::Set { name, values }) => {
            registry.set_input(name, values)?;
            println!("{} = {}", name, registry.get_or(name, "".into())?);
            Ok(())
        }
        Some(Verb::Join { name, values }) => {
            registry.join_input(name, values)?;
            println!("{} = {}", name, registry.get_or(name, "".into())?);
            Ok(())
        }
        Some(Verb::Unset { name }) => registry.unset(name),
        Some(Verb::Reset { name }) => registry.reset(name),
    }
}

fn run(args: &Args) -> Result<()> {
    let mut registry = build_registry(args)?;

    apply_command_line(&mut registry, args)?;

    if !args.no_prompt {
        let mut prompter = StdinPrompter::new();
        run_prompt_phase(&mut registry, &PromptContext::AtStart, &mut prompter)?;
    }

    let missing = registry.missing_required();
    if !missing.is_empty() {
        return Err(Error::MissingRequiredParameters(
            missing.iter().join(", "),
        ));
    }

    run_verb(&mut registry, args.verb.as_ref())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
