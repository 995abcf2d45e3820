//! Interactive chat against an Ollama server.
//!
//! Make sure Ollama is running locally and run:
//!   cargo run --example chat -- --model llama3.2
//!
//! List the available models with:
//!   cargo run --example chat -- --list
//!
//! Set `RUST_LOG=ollama_stream=debug` to see request and stream events.

use std::io::{BufRead, Write};

use clap::Parser;
use futures::StreamExt;
use ollama_stream::{
    ChatMessage, ChatRequest, ClientConfig, Conversation, ModelOptions, Ollama, ResponseAccumulator,
    StreamState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat")]
#[command(about = "Stream a multi-turn conversation from an Ollama server")]
struct Args {
    /// Server base URL
    #[arg(long, env = "OLLAMA_HOST", default_value = ollama_stream::config::DEFAULT_HOST)]
    host: String,

    /// Bearer token for hosted deployments
    #[arg(long, env = "OLLAMA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model to chat with (defaults to the first listed model)
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt placed at the start of the conversation
    #[arg(short, long)]
    system: Option<String>,

    /// Assistant message placed after the system prompt, to prime the reply style
    #[arg(short, long)]
    assistant: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Print the available models and exit
    #[arg(long)]
    list: bool,

    /// Send this message and exit instead of reading from stdin
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::new(args.host);
    if let Some(key) = args.api_key {
        config = config.api_key(key);
    }
    let client = Ollama::new(config)?;

    let models = client.list().await?;
    if args.list {
        for model in &models {
            println!("{}\t{}", model.model, model.name);
        }
        return Ok(());
    }

    let model = match args.model {
        Some(model) => model,
        None => match models.first() {
            Some(first) => first.model.clone(),
            None => return Err("server has no models; pull one first".into()),
        },
    };

    let options = ModelOptions {
        temperature: args.temperature,
        ..Default::default()
    };

    let mut conversation = Conversation::new();
    if let Some(system) = args.system {
        conversation.push_system(system);
    }
    if let Some(assistant) = args.assistant {
        conversation.push(ChatMessage::assistant(assistant));
    }

    if let Some(message) = args.message {
        conversation.push_user(message);
        reply(&client, &model, &options, &mut conversation).await?;
        return Ok(());
    }

    eprintln!("chatting with {model}; empty line or Ctrl+D to quit");
    let stdin = std::io::stdin();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        conversation.push_user(line);
        reply(&client, &model, &options, &mut conversation).await?;
    }

    Ok(())
}

/// Stream one assistant reply to stdout and record it in the conversation.
async fn reply(
    client: &Ollama,
    model: &str,
    options: &ModelOptions,
    conversation: &mut Conversation,
) -> Result<(), Box<dyn std::error::Error>> {
    let request =
        ChatRequest::new(model, conversation.messages().to_vec()).options(options.clone());
    let mut stream = client.chat(&request).await?;

    let mut reply = ResponseAccumulator::new();
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let StreamState::Streaming | StreamState::Complete = reply.apply(&chunk) {
            print!("{}", chunk.content());
            stdout.flush()?;
        }
    }
    println!();

    match reply.into_parts() {
        (message, StreamState::Complete) => {
            conversation.push(message);
            Ok(())
        }
        (_, StreamState::Failed(reason)) => Err(format!("server error: {reason}").into()),
        (_, StreamState::Pending | StreamState::Streaming) => Err("stream ended early".into()),
    }
}
