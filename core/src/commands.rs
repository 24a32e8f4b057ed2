//! Command definitions and parsing for the donation REPL.

use anyhow::{bail, Result};

use crate::display;
use crate::form::{DonationForm, FormEffect, FormMessage};
use crate::service::DonationService;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the recipient: to <address|name>
    To { recipient: String },
    /// Set the amount: amount <value>
    Amount { input: String },
    /// Fill the amount with the whole balance
    Max,
    /// Set the memo: memo <text>
    Memo { text: String },
    /// Show form state
    Status,
    /// Build and hand the transaction to the executor
    Submit,
    /// Print help
    Help { command: Option<String> },
    /// Exit
    Exit,
}

/// What a command produced: text to print and effects for the host.
#[derive(Debug, Default)]
pub struct Output {
    pub text: String,
    pub effects: Vec<FormEffect>,
}

impl Output {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effects: Vec::new(),
        }
    }
}

impl Command {
    /// Parse a command from a raw input string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (input.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "to" | "recipient" => Ok(Command::To {
                recipient: rest.to_string(),
            }),

            "amount" | "amt" => {
                if rest.is_empty() {
                    bail!("Missing amount. Usage: amount <value>");
                }
                Ok(Command::Amount {
                    input: rest.to_string(),
                })
            }

            "max" => Ok(Command::Max),

            "memo" => Ok(Command::Memo {
                text: rest.to_string(),
            }),

            "status" | "st" => Ok(Command::Status),

            "submit" | "donate" => Ok(Command::Submit),

            "help" | "?" => Ok(Command::Help {
                command: (!rest.is_empty()).then(|| rest.to_string()),
            }),

            "exit" | "quit" | "q" => Ok(Command::Exit),

            other => bail!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        }
    }

    fn message(&self) -> Option<FormMessage> {
        match self {
            Command::To { recipient } => Some(FormMessage::RecipientChanged(recipient.clone())),
            Command::Amount { input } => Some(FormMessage::InputChanged(input.clone())),
            Command::Max => Some(FormMessage::MaxClicked),
            Command::Memo { text } => Some(FormMessage::MemoChanged(text.clone())),
            _ => None,
        }
    }

    /// Execute a command against the form.
    pub async fn execute(
        &self,
        form: &mut DonationForm,
        service: &DonationService,
        json_output: bool,
    ) -> Result<Output> {
        let symbol = service.token().symbol(service.format());

        if let Some(message) = self.message() {
            let effects = form.update(message);
            let text = if json_output {
                String::new()
            } else {
                display::format_form(form, &symbol)
            };
            return Ok(Output { text, effects });
        }

        match self {
            Command::Status => {
                if json_output {
                    Ok(Output::text(
                        serde_json::json!({
                            "recipient": form.recipient_text(),
                            "resolved_address": form.resolved_address(),
                            "input": form.input(),
                            "amount": form.amount().map(|a| a.to_string()),
                            "memo": form.memo(),
                            "disabled": form.disabled(),
                            "ready": form.can_submit(),
                        })
                        .to_string(),
                    ))
                } else {
                    Ok(Output::text(display::format_form(form, &symbol)))
                }
            }

            Command::Submit => {
                let (outcome, request) = service.submit(form).await?;
                if json_output {
                    Ok(Output::text(display::format_outcome_json(&outcome, &request)))
                } else {
                    Ok(Output::text(display::format_outcome(&outcome, &request)))
                }
            }

            Command::Help { command } => Ok(Output::text(help_text(command.as_deref()))),

            Command::Exit => Ok(Output::default()),

            Command::To { .. } | Command::Amount { .. } | Command::Max | Command::Memo { .. } => {
                Ok(Output::default())
            }
        }
    }
}

#[must_use]
pub fn help_text(command: Option<&str>) -> String {
    match command {
        Some("to") | Some("recipient") => {
            "to <address|name>\n  Set the recipient. Names ending in the name-service suffix\n  (e.g. 'alice.ust') are looked up. 'to' alone clears it.\n  Alias: recipient".to_string()
        }
        Some("amount") | Some("amt") => {
            "amount <value>\n  Set the amount in whole tokens (e.g. '1.5').\n  Alias: amt".to_string()
        }
        Some("max") => "max\n  Donate the full available balance.".to_string(),
        Some("memo") => "memo <text>\n  Attach a memo to the transaction.".to_string(),
        Some("status") | Some("st") => {
            "status\n  Show the recipient, amount and whether submit is possible.\n  Alias: st".to_string()
        }
        Some("submit") | Some("donate") => {
            "submit\n  Build the transaction and hand it to the executor.\n  Alias: donate".to_string()
        }
        Some("exit") | Some("quit") | Some("q") => {
            "exit\n  Leave the donation prompt.\n  Aliases: quit, q".to_string()
        }
        Some(other) => format!("Unknown command: '{other}'. Type 'help' for a list."),
        None => {
            "Available commands:\n\
             \n\
             \x20 to <recipient>   Set recipient address or name\n\
             \x20 amount <value>   Set donation amount\n\
             \x20 max              Use the full balance\n\
             \x20 memo <text>      Set memo\n\
             \x20 status           Show form state\n\
             \x20 submit           Send the donation\n\
             \x20 help [cmd]       Show help for a command\n\
             \x20 exit             Exit\n\
             \n\
             Type 'help <command>' for detailed help on a specific command."
                .to_string()
        }
    }
}
