use structopt::StructOpt;

use ethlink::wire::{Address, EtherType};

/// Which side of the exchange to run.
#[derive(Clone, StructOpt)]
pub enum Mode {
    /// Send pings, await the matching pongs, report round-trip times.
    #[structopt(name = "ping")]
    Ping(PingConfig),

    /// Answer every ping with the matching pong, until interrupted.
    #[structopt(name = "pong")]
    Pong,
}

#[derive(Clone, StructOpt)]
pub struct PingConfig {
    /// Number of round trips to run.
    pub count: usize,

    /// Payload size in bytes, at least eight.
    pub size: usize,

    /// Write the raw round-trip series to this file, as comma-separated
    /// milliseconds.
    #[structopt(long = "stats")]
    pub stats: Option<String>,

    /// Give up on a round trip after this many milliseconds.
    #[structopt(long = "timeout")]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, StructOpt)]
pub struct Config {
    /// Interface to bind, e.g. `enp4s0`.
    pub interface: String,

    /// Frame type of the conversation, e.g. `0xDEAD`.
    pub ethertype: EtherType,

    /// Hardware address of the peer, e.g. `aa:bb:cc:dd:ee:ff`.
    pub peer: Address,

    #[structopt(subcommand)]
    pub mode: Mode,
}

impl Config {
    pub fn from_args() -> Self {
        StructOpt::from_args()
    }
}
