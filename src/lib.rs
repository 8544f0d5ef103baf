//! Gateway that proxies conversation variables from an upstream conversational-AI API
//! and renders them as an HTML panel.

#![deny(warnings)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(dead_code)]
#![deny(non_camel_case_types)]
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![deny(overflowing_literals)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Environment-driven configuration.
pub mod config;
/// HTML panel rendering.
#[allow(clippy::needless_raw_string_hashes)]
pub mod panel;
/// HTTP server and API routes.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::unused_async
)]
pub mod server;
/// Entry helpers to start the gateway.
pub mod start_gateway;
/// Upstream conversation API client.
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
pub mod upstream;

#[cfg(test)]
mod test_support;
