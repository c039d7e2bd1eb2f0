//! Delivery of sanitized documents to the Kindle address.

mod email;

pub use email::{attachment_filename, build_message, DocumentSender, KindleMailer};
