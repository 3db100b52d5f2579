mod commands;

use clap::Parser;
use console::style;
use cortex_agent::inputs::{ActionInputs, ProcessEnv};
use cortex_agent::outputs::WorkflowOutputs;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database that holds the agent (falls back to CORTEX_AGENT_DATABASE, then SNOWFLAKE_DATABASE)
    #[arg(long)]
    database: Option<String>,

    /// Schema that holds the agent (falls back to CORTEX_AGENT_SCHEMA, then SNOWFLAKE_SCHEMA)
    #[arg(long)]
    schema: Option<String>,

    /// Agent name (falls back to CORTEX_AGENT_NAME)
    #[arg(long)]
    agent_name: Option<String>,

    /// Message history as a JSON array; takes precedence over --message
    #[arg(long)]
    messages: Option<String>,

    /// Single user prompt
    #[arg(short, long)]
    message: Option<String>,

    /// Thread to continue
    #[arg(long)]
    thread_id: Option<String>,

    /// Message in the thread to reply to
    #[arg(long)]
    parent_message_id: Option<String>,

    /// Tool choice shorthand (e.g. auto) or JSON object
    #[arg(long)]
    tool_choice: Option<String>,

    /// Write the response to a timestamped JSON file (true/1/yes)
    #[arg(long, value_name = "BOOL")]
    persist_results: Option<String>,

    /// Directory for persisted results
    #[arg(long)]
    persist_dir: Option<String>,

    /// Snowflake account URL (can also be set via SNOWFLAKE_ACCOUNT_URL environment variable)
    #[arg(long)]
    account_url: Option<String>,

    /// Snowflake access token (can also be set via SNOWFLAKE_TOKEN environment variable)
    #[arg(long)]
    token: Option<String>,
}

impl Cli {
    fn inputs(&self) -> ActionInputs {
        ActionInputs {
            database: self.database.clone(),
            schema: self.schema.clone(),
            agent_name: self.agent_name.clone(),
            messages: self.messages.clone(),
            message: self.message.clone(),
            thread_id: self.thread_id.clone(),
            parent_message_id: self.parent_message_id.clone(),
            tool_choice: self.tool_choice.clone(),
            persist_results: self.persist_results.clone(),
            persist_dir: self.persist_dir.clone(),
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    // Decided once; everything downstream receives this value
    let outputs = WorkflowOutputs::detect(&ProcessEnv);

    if let Err(err) = commands::run::execute(&cli, outputs.clone()).await {
        tracing::error!("{:?}", err);
        outputs.report_failure(&err.to_string());
        eprintln!("{} {}", style("error:").red().bold(), err);
        std::process::exit(1);
    }
}
