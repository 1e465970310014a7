//! Structured JSON logging for processes that embed fieldseal.
//!
//! fieldseal itself only emits `tracing` events; it never installs a
//! subscriber on its own. A host either calls [`init`] once at startup or
//! layers [`subscriber`] into whatever it already runs.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, credential, or digest** may appear in any
//!   span attribute or log field. Only lengths and outcomes are recorded.
//! - The insecure development key is reported at `WARN` with
//!   `insecure_key = true`.

pub mod init;

pub use init::{init, subscriber};
