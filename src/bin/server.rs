//! Conversation variables gateway binary.
//! Run with: cargo run --bin convars-server

use std::process::ExitCode;

use convars_gateway::start_gateway;

fn main() -> ExitCode {
    start_gateway::run()
}
