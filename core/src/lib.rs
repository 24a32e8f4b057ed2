pub mod address;
pub mod amount;
pub mod balance;
pub mod commands;
pub mod config;
pub mod display;
pub mod form;
pub mod offline;
pub mod resolver;
pub mod service;
pub mod token;
pub mod tx;

pub use address::AddressFormat;
pub use commands::Command;
pub use config::Config;
pub use form::{DonationForm, FormEffect, FormMessage};
pub use service::DonationService;
pub use token::TokenDescriptor;
pub use tx::{TxBuilder, TxPayload};
