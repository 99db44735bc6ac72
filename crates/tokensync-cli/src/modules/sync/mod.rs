mod actions;
pub(crate) mod args;

#[cfg(test)]
pub(crate) use actions::Synchronizer;
pub(crate) use actions::{handle_decode, handle_show, handle_sync, SyncContext};
