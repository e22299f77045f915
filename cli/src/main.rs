#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};
use tracing::debug;
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use ::scout::{system_prompt, Agent, AzureOpenAI, Config, SearchBackend, ToolRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Chat with the catalog assistant
    Chat,
    /// Run a single product search
    Search {
        query: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Check whether Elasticsearch is reachable
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cli=info,scout=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    let backend = Arc::new(SearchBackend::connect(&config.elastic));
    let tools = ToolRegistry::catalog(backend);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Status => println!("{}", tools.invoke("es_status", "{}").await),
        Commands::Search { query, date } => {
            let arguments = serde_json::json!({ "query": query, "date": date }).to_string();

            println!("{}", tools.invoke("search_products", &arguments).await);
        }
        Commands::Chat => {
            let llm = AzureOpenAI::new(&config.azure).context("Failed to set up Azure OpenAI")?;
            let agent = Agent::new(llm, tools, system_prompt(chrono::Local::now().date_naive()));

            chat(agent).await?;
        }
    }

    Ok(())
}

async fn chat(mut agent: Agent<AzureOpenAI>) -> Result<()> {
    println!("Welcome to the catalog assistant. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let input = line?;
        let input = input.trim();

        if is_exit(input) {
            break;
        }

        if input.is_empty() {
            continue;
        }

        match agent.respond(input).await {
            Ok(answer) => println!("Assistant: {answer}"),
            Err(err) => eprintln!("Error: {err:#}"),
        }
    }

    debug!("Conversation ended after {} messages", agent.history().len());
    println!("Goodbye!");

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
