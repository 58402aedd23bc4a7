//! The install engine: manifest items become file actions under `bin/`.
//!
//! Planning resolves every manifest item against the machine before any
//! file is touched. Execution clears what the previous run recorded in the
//! receipt log, then writes each planned file, recording it first.
pub mod actions;
pub mod bundle;
pub mod context;
pub mod engine;
pub mod files;
pub mod plan;
pub mod python;
pub mod rc;
pub mod receipts;
pub mod script;
