use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "Catan Corpus Extraction Client")]
#[clap(about = "Turns logged Catan games into training corpora", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Extract(ExtractCommand),
    Stats(StatsCommand),
}

#[derive(Args)]
#[clap(about = "Writes the train and test corpus of every configured task.", long_about = None)]
pub struct ExtractCommand {
    #[clap(short, long, default_value_t = String::from("extract.conf"))]
    pub config: String,
}

#[derive(Args)]
#[clap(about = "Counts the legal and chosen action types at normal-play decisions.", long_about = None)]
pub struct StatsCommand {
    #[clap(short, long, default_value_t = String::from("extract.conf"))]
    pub config: String,
}
