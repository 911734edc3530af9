//! tracker-cli: operator console for watching account events.
//!
//! Select accounts with `accounts`, then `events` to stream their events
//! until Ctrl+C brings the prompt back.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing_subscriber::EnvFilter;

use account_tracker::adapters::RedisEventBus;
use account_tracker::application::client::{ClientCommand, ClientSession, HELP};
use account_tracker::domain::event::{TopicPolicy, DEFAULT_ACCOUNT_PREFIX, DEFAULT_CHANNEL};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Shared,
    PerAccount,
}

/// Watch live account events
#[derive(Parser, Debug)]
#[command(name = "tracker-cli")]
#[command(about = "Select accounts and watch their live events")]
struct Args {
    /// Redis broker URL
    #[arg(long, env = "ACCOUNT_TRACKER__REDIS__URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Topic routing; must match the server
    #[arg(long, value_enum, default_value = "shared")]
    topic_policy: PolicyArg,

    /// Channel for the shared policy
    #[arg(long, env = "ACCOUNT_TRACKER__BUS__CHANNEL", default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Channel prefix for the per-account policy
    #[arg(long, env = "ACCOUNT_TRACKER__BUS__ACCOUNT_PREFIX", default_value = DEFAULT_ACCOUNT_PREFIX)]
    account_prefix: String,

    /// Log filter; logs go to stderr
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,
}

impl Args {
    fn topic_policy(&self) -> TopicPolicy {
        match self.topic_policy {
            PolicyArg::Shared => TopicPolicy::Shared {
                channel: self.channel.clone(),
            },
            PolicyArg::PerAccount => TopicPolicy::PerAccount {
                prefix: self.account_prefix.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let bus = match RedisEventBus::open(&args.redis_url, args.topic_policy()) {
        Ok(bus) => bus,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = bus.connect().await {
        eprintln!("Error: cannot reach {}: {}", args.redis_url, e);
        std::process::exit(1);
    }

    let mut session = ClientSession::new(Arc::new(bus));
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;

    loop {
        let Some(line) = prompt(&mut stdout, &mut input, "> ").await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ClientCommand>() {
            Ok(command) => command,
            Err(e) => {
                stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                continue;
            }
        };

        match command {
            ClientCommand::Accounts => {
                let Some(ids) = prompt(&mut stdout, &mut input, "Account IDs: ").await? else {
                    break;
                };
                let report = session.select(ids.split(' '));
                let mut out = String::new();
                for rejected in &report.rejected {
                    out.push_str(&format!("{}\n", rejected));
                }
                let selected: Vec<String> = report.selected.iter().map(|id| id.to_string()).collect();
                out.push_str(&format!("Selected accounts: [{}]\n", selected.join(", ")));
                stdout.write_all(out.as_bytes()).await?;
            }
            ClientCommand::Events => {
                if let Err(e) = session.ready_to_listen() {
                    stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                    continue;
                }
                stdout
                    .write_all(b"Listening for events, press Ctrl+C to stop\n")
                    .await?;
                stdout.flush().await?;
                if let Err(e) = session.listen(&mut stdout, interrupted()).await {
                    stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                }
            }
            ClientCommand::Clear => {
                session.clear();
                stdout.write_all(b"Selection cleared\n").await?;
            }
            ClientCommand::Help => {
                stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;
            }
            ClientCommand::Quit => break,
        }
    }

    Ok(())
}

/// Print `label` and read one line. `None` on end of input.
async fn prompt(
    stdout: &mut Stdout,
    input: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> std::io::Result<Option<String>> {
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    input.next_line().await
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
