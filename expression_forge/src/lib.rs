//! # Expression Forge
//!
//! Batch content compiler built on `power_rules`. It reads the power catalog
//! from SQLite and fully regenerates the derived tables on every run.
//!
//! ## Core Components
//!
//! - **synthesis**: matches powers against the template catalog and emits expressions
//! - **cost**: resource costs per expression
//! - **signature**: detectable signatures per expression, merged by maximum
//! - **acquisition**: origin/acquisition profiles per power
//! - **coverage**: post-run sanity counts
//! - **store**: SQLite persistence, one transaction per phase
//! - **pipeline**: runs the phases in dependency order
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: identifiers are content hashes, selection is rank-based
//! - **Full rebuild**: each phase deletes and regenerates its rows atomically
//! - **Pure phases**: derivation never touches storage; the store only swaps rows

pub mod acquisition;
pub mod config;
pub mod cost;
pub mod coverage;
pub mod error;
pub mod persona;
pub mod pipeline;
pub mod signature;
pub mod store;
pub mod synthesis;

pub use acquisition::*;
pub use config::*;
pub use cost::*;
pub use coverage::*;
pub use error::*;
pub use persona::*;
pub use pipeline::*;
pub use signature::*;
pub use store::*;
pub use synthesis::*;
