//! `eventdesk-tickets`: portable, self-contained proof of registration.
//!
//! A ticket is the registration's canonical record frozen at issuance, encoded
//! into an opaque string that fits a QR code or a URL query parameter.
//! Decoding is pure and never consults the ledger.

pub mod codec;
pub mod error;
pub mod payload;

pub use codec::{decode, encode, verification_link};
pub use error::TicketError;
pub use payload::{TicketHolder, TicketPayload, issue};
