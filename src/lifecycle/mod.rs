//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Register routes → Compile → Listen
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Shutdown::trigger → stop accepting → drain in-flight requests → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
