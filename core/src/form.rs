//! The donation form as a reducer.
//!
//! Hosts feed [`FormMessage`]s in and carry out the returned
//! [`FormEffect`]s. All derived state (resolved address, field errors,
//! submit gating, payload) is recomputed from the stored fields, so a
//! late lookup answer can only affect the text it was issued for.

use crate::amount::{to_input, validate_input, AmountError};
use crate::resolver::{
    LookupRequest, LookupResponse, RecipientResolver, ResolverEvent, SEARCHING_MESSAGE,
};
use crate::tx::{TxBuilder, TxPayload, TxValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Recipient,
    Input,
    Memo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    RecipientChanged(String),
    InputChanged(String),
    MemoChanged(String),
    /// Fill the amount with the full spendable balance.
    MaxClicked,
    LookupCompleted(LookupResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Lookup(LookupRequest),
    Focus(Field),
}

#[derive(Debug, Clone)]
pub struct DonationForm {
    builder: TxBuilder,
    max: u128,
    resolver: RecipientResolver,
    input: String,
    memo: Option<String>,
    recipient_error: Option<String>,
    input_error: Option<AmountError>,
}

impl DonationForm {
    /// Open the form once a balance is known. `prefill` is treated like the
    /// user typing it into the recipient field.
    pub fn open(
        builder: TxBuilder,
        resolver: RecipientResolver,
        balance: u128,
        prefill: Option<String>,
    ) -> (Self, Vec<FormEffect>) {
        let mut form = Self {
            builder,
            max: balance,
            resolver,
            input: String::new(),
            memo: None,
            recipient_error: None,
            input_error: None,
        };
        let effects = match prefill {
            Some(text) => form.update(FormMessage::RecipientChanged(text)),
            None => Vec::new(),
        };
        (form, effects)
    }

    pub fn update(&mut self, message: FormMessage) -> Vec<FormEffect> {
        match message {
            FormMessage::RecipientChanged(text) => {
                let events = self.resolver.set_text(text);
                self.apply_resolver_events(events)
            }
            FormMessage::LookupCompleted(response) => {
                let events = self.resolver.apply_lookup(response);
                self.apply_resolver_events(events)
            }
            FormMessage::InputChanged(input) => {
                self.input = input;
                self.revalidate_input();
                Vec::new()
            }
            FormMessage::MaxClicked => {
                self.input = to_input(self.max, self.builder.token().decimals);
                self.revalidate_input();
                Vec::new()
            }
            FormMessage::MemoChanged(memo) => {
                self.memo = Some(memo);
                Vec::new()
            }
        }
    }

    fn apply_resolver_events(&mut self, events: Vec<ResolverEvent>) -> Vec<FormEffect> {
        if self.resolver.error_message().is_none() {
            self.recipient_error = None;
        }
        events
            .into_iter()
            .filter_map(|event| match event {
                ResolverEvent::FocusAmount => Some(FormEffect::Focus(Field::Input)),
                ResolverEvent::Lookup(request) => Some(FormEffect::Lookup(request)),
                ResolverEvent::NotFound => {
                    self.recipient_error = self.resolver.error_message().map(str::to_string);
                    None
                }
            })
            .collect()
    }

    fn revalidate_input(&mut self) {
        self.input_error = if self.input.trim().is_empty() {
            None
        } else {
            self.validated_amount().err()
        };
    }

    fn validated_amount(&self) -> Result<u128, AmountError> {
        validate_input(&self.input, self.builder.token().decimals, self.max)
    }

    pub fn builder(&self) -> &TxBuilder {
        &self.builder
    }

    pub fn resolver(&self) -> &RecipientResolver {
        &self.resolver
    }

    pub fn recipient_text(&self) -> &str {
        self.resolver.text()
    }

    pub fn resolved_address(&self) -> Option<&str> {
        self.resolver.resolved_address()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn max(&self) -> u128 {
        self.max
    }

    /// Base-unit amount of the current input, if it validates.
    pub fn amount(&self) -> Option<u128> {
        self.validated_amount().ok()
    }

    pub fn field_error(&self, field: Field) -> Option<String> {
        match field {
            Field::Recipient => self.recipient_error.clone(),
            Field::Input => self.input_error.as_ref().map(|e| e.to_string()),
            Field::Memo => None,
        }
    }

    /// Why submit is blocked by the recipient, if it is: the not-found
    /// error, or the searching label while a lookup is pending.
    pub fn disabled(&self) -> Option<&'static str> {
        if let Some(err) = self.resolver.error_message() {
            return Some(err);
        }
        if self.resolver.is_pending() {
            return Some(SEARCHING_MESSAGE);
        }
        None
    }

    pub fn values(&self) -> TxValues {
        TxValues {
            address: self.resolved_address().map(str::to_string),
            input: (!self.input.trim().is_empty()).then(|| self.input.clone()),
            memo: self.memo.clone(),
        }
    }

    /// The payload a submit right now would send. The amount is validated
    /// here so the builder only ever sees convertible input.
    pub fn payload(&self) -> Option<TxPayload> {
        if self.disabled().is_some() {
            return None;
        }
        self.validated_amount().ok()?;
        self.builder.build(&self.values())
    }

    pub fn can_submit(&self) -> bool {
        self.payload().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::fixtures::{RECIPIENT, SENDER};
    use crate::address::AddressFormat;
    use crate::resolver::{DEFAULT_NAME_SUFFIX, NOT_FOUND_MESSAGE};
    use crate::token::TokenDescriptor;
    use crate::tx::Msg;

    fn form(balance: u128) -> DonationForm {
        let format = AddressFormat::default();
        let builder = TxBuilder::new(
            format.clone(),
            TokenDescriptor::default(),
            Some(SENDER.to_string()),
        );
        let resolver = RecipientResolver::new(format, DEFAULT_NAME_SUFFIX);
        DonationForm::open(builder, resolver, balance, None).0
    }

    #[test]
    fn literal_recipient_focuses_amount() {
        let mut f = form(10_000_000);
        let effects = f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        assert_eq!(effects, vec![FormEffect::Focus(Field::Input)]);
        assert_eq!(f.resolved_address(), Some(RECIPIENT));
    }

    #[test]
    fn full_flow_builds_payload() {
        let mut f = form(10_000_000);
        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        f.update(FormMessage::InputChanged("1.5".to_string()));
        assert_eq!(f.amount(), Some(1_500_000));
        assert!(f.can_submit());
        let payload = f.payload().unwrap();
        assert!(matches!(payload.messages.as_slice(), [Msg::NativeSend(_)]));
    }

    #[test]
    fn pending_lookup_disables_submit() {
        let mut f = form(10_000_000);
        let effects = f.update(FormMessage::RecipientChanged("alice.ust".to_string()));
        assert!(matches!(effects.as_slice(), [FormEffect::Lookup(_)]));
        f.update(FormMessage::InputChanged("1".to_string()));
        assert_eq!(f.disabled(), Some(SEARCHING_MESSAGE));
        assert!(!f.can_submit());
        assert_eq!(f.field_error(Field::Recipient), None);

        f.update(FormMessage::LookupCompleted(LookupResponse::new(
            "alice.ust",
            Some(RECIPIENT.to_string()),
        )));
        assert_eq!(f.disabled(), None);
        assert!(f.can_submit());
    }

    #[test]
    fn not_found_sets_and_clears_field_error() {
        let mut f = form(10_000_000);
        f.update(FormMessage::RecipientChanged("ghost.ust".to_string()));
        f.update(FormMessage::LookupCompleted(LookupResponse::new("ghost.ust", None)));
        assert_eq!(f.field_error(Field::Recipient).as_deref(), Some(NOT_FOUND_MESSAGE));
        assert_eq!(f.disabled(), Some(NOT_FOUND_MESSAGE));

        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        assert_eq!(f.field_error(Field::Recipient), None);
        assert_eq!(f.disabled(), None);
    }

    #[test]
    fn over_balance_input_blocks_submit() {
        let mut f = form(1_000_000);
        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        f.update(FormMessage::InputChanged("2".to_string()));
        assert!(f.field_error(Field::Input).is_some());
        assert_eq!(f.payload(), None);
    }

    #[test]
    fn empty_input_has_no_error_but_cannot_submit() {
        let mut f = form(1_000_000);
        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        f.update(FormMessage::InputChanged(String::new()));
        assert_eq!(f.field_error(Field::Input), None);
        assert!(!f.can_submit());
    }

    #[test]
    fn max_fills_balance() {
        let mut f = form(2_500_000);
        f.update(FormMessage::MaxClicked);
        assert_eq!(f.input(), "2.5");
        assert_eq!(f.amount(), Some(2_500_000));
        assert_eq!(f.field_error(Field::Input), None);
    }

    #[test]
    fn pass_through_text_never_builds() {
        let mut f = form(10_000_000);
        f.update(FormMessage::RecipientChanged("bob".to_string()));
        f.update(FormMessage::LookupCompleted(LookupResponse::new("bob", None)));
        f.update(FormMessage::InputChanged("1".to_string()));
        assert_eq!(f.resolved_address(), Some("bob"));
        assert_eq!(f.disabled(), None);
        assert_eq!(f.payload(), None);
    }

    #[test]
    fn memo_travels_with_payload() {
        let mut f = form(10_000_000);
        f.update(FormMessage::RecipientChanged(RECIPIENT.to_string()));
        f.update(FormMessage::InputChanged("1".to_string()));
        f.update(FormMessage::MemoChanged("gm".to_string()));
        assert_eq!(f.payload().unwrap().memo.as_deref(), Some("gm"));
    }

    #[test]
    fn prefill_runs_through_resolver() {
        let format = AddressFormat::default();
        let builder = TxBuilder::new(format.clone(), TokenDescriptor::default(), None);
        let resolver = RecipientResolver::new(format, DEFAULT_NAME_SUFFIX);
        let (f, effects) =
            DonationForm::open(builder, resolver, 0, Some("alice.ust".to_string()));
        assert_eq!(f.recipient_text(), "alice.ust");
        assert!(matches!(effects.as_slice(), [FormEffect::Lookup(_)]));
    }
}
