//! End-to-end checks of the reconciliation core against real temp
//! directories and the in-memory rule store.

mod lifecycle;
mod purge;
mod utils;
