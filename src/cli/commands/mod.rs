//! Subcommands of the `evader` binary

pub mod evaluate;
pub mod inspect;
pub mod train;
