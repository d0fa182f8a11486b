//! Gateway: HTTP webhook server.
//!
//! `GET /` answers load-balancer probes; `POST /webhook` receives LINE event batches,
//! runs the translation pipeline for each event, and always acknowledges with 200.

mod server;

pub use server::{build_router, run_gateway, GatewayState};
