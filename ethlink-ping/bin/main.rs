//! Exchange ping/pong frames with one peer over one interface.
//!
//! The initiator and the responder are the same binary in two modes. Call
//! examples, with the peer's hardware address swapped in on each side:
//!
//! * `ethlink-ping enp4s0 0xDEAD aa:bb:cc:dd:ee:ff ping 100 64`
//! * `ethlink-ping enp4s0 0xDEAD 11:22:33:44:55:66 pong`
//!
//! Opening the packet socket requires `CAP_NET_RAW` (or root). Set
//! `RUST_LOG=trace` to watch the channel discard foreign traffic.
use std::time::Duration;

use ethlink::channel::{ChannelConfig, LinkChannel};
use ethlink_ping::config::{Config, Mode};

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_args();
    let channel_config = ChannelConfig {
        interface: config.interface.clone(),
        ethertype: config.ethertype,
        peer: config.peer,
        recv_timeout: match &config.mode {
            Mode::Ping(ping) => ping.timeout_ms.map(Duration::from_millis),
            Mode::Pong => None,
        },
    };

    let mut channel = LinkChannel::open(&channel_config)
        .expect("Couldn't open the link channel");

    match config.mode {
        Mode::Ping(ping) => {
            println!(
                "[+] Starting {} round trips of {} bytes to {}",
                ping.count, ping.size, config.peer,
            );
            let report = ethlink_ping::ping(&mut channel, ping.count, ping.size)
                .expect("Ping exchange failed");
            channel.close().expect("Couldn't close the link channel");

            if let Some(path) = &ping.stats {
                std::fs::write(path, report.to_csv())
                    .expect("Couldn't write the stats file");
            }
            println!("{}", report);
        }
        Mode::Pong => {
            println!("[+] Answering pings from {} until interrupted", config.peer);
            let error = ethlink_ping::pong(&mut channel).unwrap_err();
            let _ = channel.close();
            eprintln!("[-] Responder stopped: {}", error);
            std::process::exit(1);
        }
    }
}
