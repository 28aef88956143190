#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Quote vision API server binary.
//!
//! Reads `BIND_ADDR`, `PORT`, `DATABASE_PATH`, `SEED_DATABASE` and
//! `STATIC_DIR` from the environment; see [`ServerConfig::from_env`].

use quote_vision_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    run_server(ServerConfig::from_env()).await
}
