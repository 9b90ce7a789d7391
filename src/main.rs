use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use cafebot_gateway::{Config, Session};

/// Cafebot - function-calling gateway for the cafe kiosk / robot demo
#[derive(Parser)]
#[command(name = "cafebot", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CAFEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a TOML menu file (overrides the built-in menu)
    #[arg(short, long, env = "CAFEBOT_MENU")]
    menu: Option<PathBuf>,

    /// Run without simulated delays (payment, robot motion)
    #[arg(long)]
    instant: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the registered function schemas as JSON
    Schemas,
    /// Run a scripted walkthrough of an order and some robot commands
    Demo,
    /// Interactive tool-call console (the default)
    Console,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,cafebot_gateway=info",
        1 => "info,cafebot_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if cli.menu.is_some() {
        config.menu_path = cli.menu.clone();
    }
    if cli.instant {
        config.delay_scale = 0.0;
        config.payment_delay_ms = 0;
    }

    let session = Session::new(&config)?;

    match cli.command {
        Some(Command::Schemas) => cmd_schemas(&session),
        Some(Command::Demo) => cmd_demo(session).await,
        Some(Command::Console) | None => cmd_console(session).await,
    }
}

/// Print the registered function schemas as JSON
fn cmd_schemas(session: &Session) -> anyhow::Result<()> {
    let doc = session.schema_document()?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Scripted walkthrough: kiosk browsing, an order to payment, robot commands
async fn cmd_demo(mut session: Session) -> anyhow::Result<()> {
    let script: &[(&str, &str)] = &[
        ("display_welcome_screen", "{}"),
        ("get_menu_by_category", r#"{"category": "coffee"}"#),
        ("start_new_order", r#"{"customer_name": "Sarah"}"#),
        (
            "add_item_to_order",
            r#"{"item_name": "latte", "quantity": 1, "customizations": ["oat_milk"]}"#,
        ),
        ("add_item_to_order", r#"{"item_name": "blueberry muffin"}"#),
        ("view_current_order", "{}"),
        ("confirm_order", "{}"),
        ("process_payment", r#"{"payment_method": "card"}"#),
        ("move_forward", r#"{"distance": 1.5}"#),
        ("turn_left", r#"{"angle": 90}"#),
        ("set_led_color", r#"{"color": "green"}"#),
        ("get_system_status", "{}"),
    ];

    for (name, args) in script {
        let call_id = uuid::Uuid::new_v4().to_string();
        let result = session.dispatch(name, args, &call_id).await;
        let marker = if result.ok { "ok" } else { "err" };
        println!("--- {name} [{marker}]\n{}\n", result.output);
    }

    Ok(())
}

/// Interactive console: one tool call per line, `name {json-args}`
async fn cmd_console(mut session: Session) -> anyhow::Result<()> {
    println!("cafebot console - `<function> {{json args}}`, `schemas`, or `quit`");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "exit" => break,
            "schemas" => {
                let doc = session.schema_document()?;
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            _ => {
                let (name, args) = match line.split_once(' ') {
                    Some((name, rest)) => (name, rest.trim()),
                    None => (line, ""),
                };
                let call_id = uuid::Uuid::new_v4().to_string();
                let result = session.dispatch(name, args, &call_id).await;
                let marker = if result.ok { "ok" } else { "err" };
                println!("[{marker}] {}", result.output);
            }
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
