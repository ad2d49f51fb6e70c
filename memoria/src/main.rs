mod cli;

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use memoria::{definition, dispatch, stdio_rpc, MemoryStore, MemoryTool};
use memoria_core::config::PathsConfig;
use memoria_core::observability;

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let paths = PathsConfig::from_env().with_override(cli.base);
    let open = || {
        MemoryStore::from_config(&paths)
            .with_context(|| format!("Failed to open memory store at {}", paths.base_path.display()))
    };

    match cli.command {
        Commands::Init => {
            let store = open()?;
            let roots = store.roots();
            println!("memories:    {}", roots.memories().display());
            println!("transcripts: {}", roots.transcripts().display());
        }
        Commands::Exec { command_json } => {
            let command_json = if command_json == "-" {
                let mut s = String::new();
                std::io::stdin().read_to_string(&mut s)?;
                s
            } else {
                command_json
            };
            let store = open()?;
            let reply = dispatch::respond_str(&store, &command_json);
            println!("{}", reply.content);
            if reply.is_error {
                std::process::exit(1);
            }
        }
        Commands::View { path, range } => {
            let mut input = serde_json::json!({"command": "view", "path": path});
            if let Some(range) = range {
                input["view_range"] = serde_json::json!(range);
            }
            let store = open()?;
            let reply = dispatch::respond_json(&store, &input);
            println!("{}", reply.content);
            if reply.is_error {
                std::process::exit(1);
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear /memories without --yes");
            }
            let store = open()?;
            let msg = store.clear_all_memory()?;
            println!("{}", msg);
        }
        Commands::Definition { function } => {
            let def = if function {
                definition::function_definition()
            } else {
                definition::tool_definition()
            };
            println!("{}", serde_json::to_string_pretty(&def)?);
            println!();
            println!("{}", definition::system_prompt());
        }
        Commands::Serve { stdio } => {
            if !stdio {
                bail!("Only --stdio transport is supported");
            }
            let store = open()?;
            stdio_rpc::serve_stdio(&store)?;
        }
    }

    Ok(())
}
