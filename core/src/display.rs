//! Output formatting for the form state, payloads and results.

use crate::amount::to_input;
use crate::form::{DonationForm, Field};
use crate::resolver::Resolution;
use crate::service::{TxOutcome, TxRequest};
use crate::tx::{Msg, TxPayload};

/// Format a base-unit amount with its symbol: `1500000, 6, "LUNA"` -> "1.5 LUNA".
#[must_use]
pub fn format_amount(base_units: u128, decimals: u32, symbol: &str) -> String {
    format!("{} {symbol}", to_input(base_units, decimals))
}

#[must_use]
pub fn format_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Unset => "(none)".to_string(),
        Resolution::LiteralAddress(addr) => addr.clone(),
        Resolution::Resolving { key } => format!("{key} (searching...)"),
        Resolution::ResolvedFromName { name, address } => format!("{name} -> {address}"),
        Resolution::NotFound { name } => format!("{name} (not found)"),
        Resolution::Unresolved(text) => format!("{text} (unverified)"),
    }
}

/// Multi-line summary of the form, as shown by `status`.
#[must_use]
pub fn format_form(form: &DonationForm, symbol: &str) -> String {
    let decimals = form.builder().token().decimals;
    let mut out = String::new();
    out.push_str(&format!(
        "Available: {}\n",
        format_amount(form.max(), decimals, symbol)
    ));
    out.push_str(&format!(
        "Recipient: {}\n",
        format_resolution(form.resolver().resolution())
    ));
    if let Some(err) = form.field_error(Field::Recipient) {
        out.push_str(&format!("  ! {err}\n"));
    }
    let amount = if form.input().is_empty() {
        "(none)".to_string()
    } else {
        format!("{} {symbol}", form.input())
    };
    out.push_str(&format!("Amount:    {amount}\n"));
    if let Some(err) = form.field_error(Field::Input) {
        out.push_str(&format!("  ! {err}\n"));
    }
    if let Some(memo) = form.memo() {
        out.push_str(&format!("Memo:      {memo}\n"));
    }
    match form.disabled() {
        Some(reason) => out.push_str(&format!("Submit:    disabled ({reason})")),
        None if form.can_submit() => out.push_str("Submit:    ready"),
        None => out.push_str("Submit:    disabled"),
    }
    out
}

#[must_use]
pub fn format_payload(payload: &TxPayload) -> String {
    let mut out = String::new();
    for msg in &payload.messages {
        match msg {
            Msg::NativeSend(send) => {
                for coin in &send.amount {
                    out.push_str(&format!(
                        "send {}{} {} -> {}\n",
                        coin.amount, coin.denom, send.from_address, send.to_address
                    ));
                }
            }
            Msg::ContractExecute(exec) => {
                out.push_str(&format!(
                    "execute {} as {}: {}\n",
                    exec.contract, exec.sender, exec.execute_msg
                ));
            }
        }
    }
    if let Some(memo) = &payload.memo {
        out.push_str(&format!("memo: {memo}\n"));
    }
    out
}

#[must_use]
pub fn format_outcome(outcome: &TxOutcome, request: &TxRequest) -> String {
    format!(
        "Transaction prepared!\n  Hash:   {}\n  Status: {}\n  Fee in: {}\n{}",
        outcome.txhash,
        outcome.status,
        request.gas_denom,
        format_payload(&request.payload)
    )
}

#[must_use]
pub fn format_outcome_json(outcome: &TxOutcome, request: &TxRequest) -> String {
    serde_json::json!({
        "txhash": outcome.txhash,
        "status": outcome.status,
        "request": request,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::fixtures::{RECIPIENT, SENDER};
    use crate::address::AddressFormat;
    use crate::form::FormMessage;
    use crate::resolver::{LookupResponse, RecipientResolver, DEFAULT_NAME_SUFFIX};
    use crate::token::TokenDescriptor;
    use crate::tx::TxBuilder;

    fn form() -> DonationForm {
        let format = AddressFormat::default();
        DonationForm::open(
            TxBuilder::new(
                format.clone(),
                TokenDescriptor::default(),
                Some(SENDER.to_string()),
            ),
            RecipientResolver::new(format, DEFAULT_NAME_SUFFIX),
            3_000_000,
            None,
        )
        .0
    }

    #[test]
    fn amount_with_symbol() {
        assert_eq!(format_amount(1_500_000, 6, "LUNA"), "1.5 LUNA");
        assert_eq!(format_amount(0, 6, "LUNA"), "0 LUNA");
    }

    #[test]
    fn resolution_labels() {
        assert_eq!(format_resolution(&Resolution::Unset), "(none)");
        assert_eq!(
            format_resolution(&Resolution::NotFound {
                name: "x.ust".to_string()
            }),
            "x.ust (not found)"
        );
    }

    #[test]
    fn status_for_empty_form() {
        let text = format_form(&form(), "LUNA");
        assert!(text.contains("Available: 3 LUNA"));
        assert!(text.contains("Recipient: (none)"));
        assert!(text.contains("Submit:    disabled"));
    }

    #[test]
    fn status_shows_not_found() {
        let mut f = form();
        f.update(FormMessage::RecipientChanged("x.ust".to_string()));
        f.update(FormMessage::LookupCompleted(LookupResponse::new("x.ust", None)));
        let text = format_form(&f, "LUNA");
        assert!(text.contains("! Address not found"));
        assert!(text.contains("disabled (Address not found)"));
    }

    #[test]
    fn status_ready() {
        let mut f = form();
        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        f.update(FormMessage::InputChanged("1".to_string()));
        assert!(format_form(&f, "LUNA").ends_with("Submit:    ready"));
        let payload = format_payload(&f.payload().unwrap());
        assert!(payload.starts_with("send 1000000uluna"));
    }
}
