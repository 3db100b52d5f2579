use anyhow::{anyhow, Result};
use bat::PrettyPrinter;
use console::{style, Term};
use tracing::info;

use cortex_agent::inputs::ProcessEnv;
use cortex_agent::outputs::WorkflowOutputs;
use cortex_agent::providers::configs::SnowflakeConfig;
use cortex_agent::providers::snowflake::SnowflakeAgentClient;
use cortex_agent::runner::Runner;

use crate::Cli;

pub async fn execute(cli: &Cli, outputs: WorkflowOutputs) -> Result<()> {
    let config = cli.inputs().resolve(&ProcessEnv)?;
    let settings = SnowflakeConfig::load(cli.account_url.clone(), cli.token.clone())?;
    let client = SnowflakeAgentClient::new(settings)?;

    let in_runner = outputs.is_enabled();
    let report = Runner::new(Box::new(client), outputs).run(&config).await?;

    if let Some(path) = &report.result_file {
        println!("{} {}", style("Result file:").dim(), path.display());
    }
    match &report.answer {
        Some(answer) => render(answer, !in_runner)?,
        None => info!("No answer text found in the response"),
    }
    Ok(())
}

fn render(content: &str, pretty: bool) -> Result<()> {
    if pretty && Term::stdout().is_term() {
        PrettyPrinter::new()
            .input_from_bytes(content.as_bytes())
            .language("markdown")
            .print()
            .map_err(|e| anyhow!("failed to render answer: {}", e))?;
        println!();
    } else {
        println!("{}", content);
    }
    Ok(())
}
