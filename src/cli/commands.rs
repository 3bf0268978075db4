use clap::Subcommand;

use super::config::ConfigArgs;
use super::replay::ReplayArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Dispatch an action chain file and print the synthesized events
    Replay(ReplayArgs),

    /// Configuration management
    Config(ConfigArgs),
}
