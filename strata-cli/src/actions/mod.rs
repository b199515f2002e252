mod config;
mod profile;
mod resolve;
pub(crate) mod shared;

pub(crate) use config::run_config;
pub(crate) use profile::run_profile;
pub(crate) use resolve::run_resolve;
