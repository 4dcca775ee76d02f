//! The assessment engine: question normalization, set assembly, answer
//! evaluation, and the per-user session state machine. Everything here is
//! expressed against trait seams so the HTTP layer wires in Postgres, Redis,
//! and the AI judge while tests run on in-memory fakes.

pub(crate) mod assembler;
pub(crate) mod error;
pub(crate) mod evaluator;
pub(crate) mod normalizer;
pub(crate) mod question;
pub(crate) mod session;
pub(crate) mod store;
