use clap::ValueEnum;

pub mod commands;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-column text tables
    #[default]
    Pretty,
    /// Pretty-printed JSON
    Json,
}
