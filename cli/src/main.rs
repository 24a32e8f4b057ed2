use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tokio::sync::mpsc;
use tracing::info;

use donation_core::commands::help_text;
use donation_core::config::Network;
use donation_core::form::Field;
use donation_core::offline::{DryRunExecutor, OfflineChain};
use donation_core::resolver::LookupResponse;
use donation_core::{
    Command, Config, DonationForm, DonationService, FormEffect, FormMessage, TokenDescriptor,
};

#[derive(Parser)]
#[command(name = "donate", version, about = "Donate to a Terra address or name")]
struct Cli {
    /// Config file (defaults to <config dir>/donate/config.json)
    #[arg(long, env = "DONATE_CONFIG")]
    config: Option<PathBuf>,

    /// Offline ledger with balances and name records
    #[arg(long, env = "DONATE_LEDGER")]
    ledger: Option<PathBuf>,

    /// Connected wallet address
    #[arg(long, env = "DONATE_SENDER")]
    sender: Option<String>,

    /// Token to donate: a native denom or a token contract address
    #[arg(long)]
    token: Option<String>,

    /// Decimal precision of --token
    #[arg(long, requires = "token")]
    decimals: Option<u32>,

    /// mainnet, testnet or custom
    #[arg(long)]
    network: Option<Network>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Recipient address or name; runs once instead of starting the prompt
    #[arg(long)]
    to: Option<String>,

    /// Amount in whole tokens (one-shot mode)
    #[arg(long, requires = "to")]
    amount: Option<String>,

    /// Memo (one-shot mode)
    #[arg(long, requires = "to")]
    memo: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(ledger) = &cli.ledger {
        config.ledger = Some(ledger.clone());
    }
    if let Some(sender) = &cli.sender {
        config.sender = Some(sender.clone());
    }
    if let Some(token) = &cli.token {
        config.token = TokenDescriptor::new(token, cli.decimals.unwrap_or(config.token.decimals));
    }
    if let Some(network) = cli.network {
        config.network = network;
    }
    config.validate()?;
    Ok(config)
}

fn build_service(config: &Config) -> Result<DonationService> {
    let chain = match &config.ledger {
        Some(path) => OfflineChain::load(path).context("Failed to open ledger")?,
        None => OfflineChain::default(),
    };
    let chain = Arc::new(chain);
    Ok(DonationService::new(
        chain.clone(),
        chain,
        Arc::new(DryRunExecutor::default()),
        config.address_format(),
        config.name_suffix.clone(),
        config.token.clone(),
        config.sender.clone(),
    ))
}

/// Run lookups in the background; answers come back through `answers`.
fn dispatch(
    service: &Arc<DonationService>,
    effects: Vec<FormEffect>,
    answers: &mpsc::UnboundedSender<LookupResponse>,
    json_output: bool,
) {
    for effect in effects {
        match effect {
            FormEffect::Lookup(request) => {
                let service = Arc::clone(service);
                let answers = answers.clone();
                tokio::spawn(async move {
                    let response = service.lookup(request).await;
                    // receiver gone means the prompt has exited
                    let _ = answers.send(response);
                });
            }
            FormEffect::Focus(Field::Input) if !json_output => {
                println!("Recipient set. Next: amount <value>");
            }
            FormEffect::Focus(_) => {}
        }
    }
}

async fn run_once(
    service: &DonationService,
    mut form: DonationForm,
    effects: Vec<FormEffect>,
    cli: &Cli,
) -> Result<()> {
    service.drive(&mut form, effects).await;
    if let Some(amount) = &cli.amount {
        form.update(FormMessage::InputChanged(amount.clone()));
    }
    if let Some(memo) = &cli.memo {
        form.update(FormMessage::MemoChanged(memo.clone()));
    }

    let output = Command::Submit.execute(&mut form, service, cli.json).await?;
    println!("{}", output.text);
    Ok(())
}

async fn run_prompt(
    service: Arc<DonationService>,
    mut form: DonationForm,
    effects: Vec<FormEffect>,
    json_output: bool,
) -> Result<()> {
    let (answers, mut inbox) = mpsc::unbounded_channel();
    dispatch(&service, effects, &answers, json_output);

    let mut editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("donate".to_string()),
        DefaultPromptSegment::Empty,
    );

    if !json_output {
        println!("{}", help_text(None));
    }

    loop {
        let line = match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => line,
            Ok(_) => break,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        // Lookups that finished while we were waiting on input
        while let Ok(response) = inbox.try_recv() {
            let effects = form.update(FormMessage::LookupCompleted(response));
            dispatch(&service, effects, &answers, json_output);
        }

        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if command == Command::Exit {
            break;
        }

        match command.execute(&mut form, &service, json_output).await {
            Ok(output) => {
                dispatch(&service, output.effects, &answers, json_output);
                if !output.text.is_empty() {
                    println!("{}", output.text);
                }
            }
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "donate=info,donation_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        network = %config.network,
        chain_id = config.network.chain_id().unwrap_or("-"),
        token = %config.token.identifier,
        "starting"
    );

    let service = Arc::new(build_service(&config)?);

    // Nothing to show until a wallet is connected and its balance is known
    let Some((form, effects)) = service.open_form(cli.to.clone()).await? else {
        if config.sender.is_none() {
            eprintln!("No wallet connected. Pass --sender or set it in the config.");
        }
        return Ok(());
    };

    if cli.to.is_some() {
        run_once(&service, form, effects, &cli).await
    } else {
        run_prompt(service, form, effects, cli.json).await
    }
}
