use clap::ValueEnum;

pub mod commands;
pub mod output;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}
