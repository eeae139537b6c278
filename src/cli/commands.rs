//! CLI command implementations
//!
//! Every command loads the configuration, opens the schema store, and
//! drives the same `ToolHandler` the serving loop uses, so one-shot
//! invocations and the envelope surface cannot diverge.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::runtime::Runtime;

use crate::api::ToolHandler;
use crate::config::Config;
use crate::host::{HostApi, HttpHostClient};
use crate::schema::SchemaStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_requests, read_tree, write_json};

/// Dispatch a parsed CLI invocation.
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Catalog { config } => one_shot(&config, json!({"op": "catalog"})),
        Command::Schema {
            type_name,
            levels,
            raw_refs,
            config,
        } => one_shot(
            &config,
            json!({
                "op": "schema",
                "type": type_name,
                "levels": levels,
                "resolveRefs": !raw_refs,
            }),
        ),
        Command::Validate { file, config } => {
            let blocks = read_tree(file.as_deref())?;
            one_shot(&config, json!({"op": "validate", "blocks": blocks}))
        }
        Command::Fix { file, config } => {
            let blocks = read_tree(file.as_deref())?;
            one_shot(&config, json!({"op": "fix", "blocks": blocks}))
        }
        Command::Format { file, config: _ } => {
            // Formatting is pure and needs no schema store
            let blocks = read_tree(file.as_deref())?;
            let formatted = crate::formatter::format(&blocks);
            write_json(&serde_json::to_string(&formatted)?)
        }
        Command::Create {
            file,
            title,
            slug,
            config,
        } => {
            let blocks = read_tree(file.as_deref())?;
            one_shot(
                &config,
                json!({
                    "op": "create",
                    "blocks": blocks,
                    "title": title,
                    "slug": slug,
                }),
            )
        }
        Command::Serve { config } => serve(&config),
    }
}

/// Build the handler stack from configuration.
fn boot(config_path: &Path) -> CliResult<(Runtime, ToolHandler)> {
    let config = Config::load(config_path)?;

    let store = SchemaStore::open(&config.schema_dir, &config.definitions_dir)
        .map_err(|e| CliError::config_error(e.to_string()))?;

    let host: Option<Arc<dyn HostApi>> = match &config.host {
        Some(host_config) => {
            let client = HttpHostClient::new(host_config)
                .map_err(|e| CliError::config_error(e.to_string()))?;
            Some(Arc::new(client))
        }
        None => None,
    };

    let runtime = Runtime::new().map_err(|e| CliError::runtime_error(e.to_string()))?;
    Ok((runtime, ToolHandler::new(Arc::new(store), host)))
}

/// Run one request envelope and print the response.
fn one_shot(config_path: &Path, request: serde_json::Value) -> CliResult<()> {
    let (runtime, handler) = boot(config_path)?;
    let response = runtime.block_on(handler.handle(&request.to_string()));
    write_json(&response.to_json())
}

/// Serving loop: one request envelope per stdin line, one response per
/// stdout line. A malformed line answers with an error and continues.
fn serve(config_path: &Path) -> CliResult<()> {
    let (runtime, handler) = boot(config_path)?;

    for line in read_requests() {
        let line = line?;
        let response = runtime.block_on(handler.handle(&line));
        write_json(&response.to_json())?;
    }

    Ok(())
}
