use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Memoria - sandboxed file-based memory for LLM agents
#[derive(Parser, Debug)]
#[command(name = "memoria")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base directory holding memories/ and transcripts/ (default: from env or ./memory)
    #[arg(long, global = true, value_name = "DIR")]
    pub base: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the memories/ and transcripts/ directories
    Init,

    /// Execute one memory command given as JSON
    Exec {
        /// Command JSON, e.g. '{"command":"view","path":"/memories"}'. Use "-" to read from stdin
        #[arg(value_name = "COMMAND_JSON")]
        command_json: String,
    },

    /// View a directory or file
    View {
        /// Virtual path (/memories/... or /transcripts/...)
        #[arg(value_name = "PATH")]
        path: String,

        /// Line range: START END (1-based, END -1 = end of file)
        #[arg(long, num_args = 2, value_names = ["START", "END"], allow_hyphen_values = true)]
        range: Option<Vec<i64>>,
    },

    /// Remove everything under /memories
    Clear {
        /// Confirm the wipe
        #[arg(long, default_value = "false")]
        yes: bool,
    },

    /// Print the tool definition and the system prompt rules
    Definition {
        /// Print the generic function-calling schema instead of the native descriptor
        #[arg(long, default_value = "false")]
        function: bool,
    },

    /// Run as IPC daemon (JSON-RPC over stdio)
    Serve {
        /// Use stdio for communication
        #[arg(long, default_value = "false")]
        stdio: bool,
    },
}
