//! ragchat - terminal client for a retrieval-augmented chat backend

use ragchat::config::ClientConfig;
use ragchat::runtime::{ChatClient, ClientError};
use ragchat::view;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

const HELP: &str = "\
Commands:
  /new          create a session
  /sessions     list sessions
  /open <n>     switch to session n
  /delete <n>   delete session n
  /help         show this help
  /quit         exit
Anything else is sent as a message.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragchat=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    let client = ChatClient::connect(&config)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let Some(user_id) = identify(&client, &mut input).await? else {
        return Ok(());
    };
    tracing::info!(%user_id, "Starting chat");
    println!("{HELP}\n");
    print!("{}", view::render(&client.state()));

    while let Some(line) = prompt(&mut input, "> ").await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        let result = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Sessions => {
                for line in view::sidebar(&client.state()) {
                    println!("{line}");
                }
                continue;
            }
            Command::Invalid(reason) => {
                println!("{reason}");
                continue;
            }
            Command::New => client.create_session().await,
            Command::Open(n) => match session_id(&client, n) {
                Some(id) => client.select_session(&id).await,
                None => {
                    println!("No session {n}");
                    continue;
                }
            },
            Command::Delete(n) => match session_id(&client, n) {
                Some(id) => client.delete_session(&id).await,
                None => {
                    println!("No session {n}");
                    continue;
                }
            },
            // The exchange finishes in the background so the session list
            // stays usable while a reply is pending
            Command::Send(text) => {
                client.set_input(text);
                client.begin_send_draft().map(|exchange| {
                    let client = client.clone();
                    tokio::spawn(async move {
                        exchange.await;
                        println!();
                        print!("{}", view::render(&client.state()));
                        redraw_prompt();
                    });
                })
            }
        };

        if let Err(e) = result {
            println!("{e}");
        }
        print!("{}", view::render(&client.state()));
    }

    Ok(())
}

/// Ask for email and username until registration succeeds.
/// Returns `None` if input ends first.
async fn identify<B: ragchat::backend::Backend>(
    client: &ChatClient<B>,
    input: &mut Input,
) -> std::io::Result<Option<String>> {
    loop {
        let Some(email) = prompt(input, "Email: ").await? else {
            return Ok(None);
        };
        let Some(username) = prompt(input, "Username: ").await? else {
            return Ok(None);
        };

        match client.submit_identity(&email, &username).await {
            Ok(user_id) => return Ok(Some(user_id)),
            Err(ClientError::Rejected(e)) => println!("{e}"),
            Err(_) => print!("{}", view::render(&client.state())),
        }
    }
}

fn redraw_prompt() {
    print!("> ");
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!(error = %e, "Failed to flush stdout");
    }
}

async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    input.next_line().await
}

fn session_id<B: ragchat::backend::Backend>(client: &ChatClient<B>, n: usize) -> Option<String> {
    client.read(|state| view::session_at(state, n).map(ToString::to_string))
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    New,
    Sessions,
    Open(usize),
    Delete(usize),
    Help,
    Quit,
    Send(&'a str),
    Invalid(String),
}

impl<'a> Command<'a> {
    /// `None` for a blank line
    fn parse(line: &'a str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.starts_with('/') {
            return Some(Command::Send(line));
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        let command = match (name, arg) {
            ("/new", None) => Command::New,
            ("/sessions", None) => Command::Sessions,
            ("/help", None) => Command::Help,
            ("/quit", None) => Command::Quit,
            ("/open" | "/delete", Some(arg)) => match arg.parse::<usize>() {
                Ok(n) if name == "/open" => Command::Open(n),
                Ok(n) => Command::Delete(n),
                Err(_) => Command::Invalid(format!("Not a session number: {arg}")),
            },
            ("/open" | "/delete", None) => Command::Invalid(format!("Usage: {name} <n>")),
            _ => Command::Invalid(format!("Unknown command: {trimmed} (try /help)")),
        };
        Some(command)
    }
}
