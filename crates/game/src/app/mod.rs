pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod content;
pub(crate) mod gameplay;
pub(crate) mod loop_runner;
pub(crate) mod save;
pub(crate) mod session;
