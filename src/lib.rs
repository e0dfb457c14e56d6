//! Resilient, cancellable HTTP invocation client.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                      REST INVOKER                         │
//!                 │                                                           │
//!   create(opts)  │  ┌──────────┐    ┌──────────┐    ┌─────────────────┐     │
//!   ──────────────┼─▶│ registry │───▶│ options  │───▶│   RestClient    │     │
//!                 │  │ (plugins)│    │ resolve  │    │ (ArcSwap config)│     │
//!                 │  └──────────┘    └──────────┘    └────────┬────────┘     │
//!                 │                                           │              │
//!   call(ctx, ..) │                                           ▼              │
//!   ──────────────┼──────────────────────────────────▶┌─────────────────┐    │
//!                 │                                    │   dispatcher    │    │
//!                 │  ┌──────────┐                      │ spawn + select  │    │
//!                 │  │ context  │─── cancel/deadline ─▶│  (biased)       │    │
//!                 │  └──────────┘                      └────────┬────────┘    │
//!                 │                                             │             │
//!                 │                                             ▼             │
//!   Result<()>    │  ┌──────────┐    ┌──────────┐    ┌─────────────────┐     │
//!   ◀─────────────┼──│ failure  │◀───│ response │◀───│   transport     │◀────┼── Backend
//!                 │  │ classify │    │ populate │    │ reqwest + limits│     │
//!                 │  └──────────┘    └──────────┘    └─────────────────┘     │
//!                 │                                                           │
//!                 │  Cross-cutting: config (TOML) · observability · latency   │
//!                 └──────────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod client;
pub mod codec;
pub mod error;
pub mod options;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use client::{ClientRegistry, ProtocolClient, Request, RestClient, RestRequest, RestResponse};
pub use config::InvokerConfig;
pub use error::{ErrorKind, InvokeError, InvokeResult};
pub use load_balancer::LatencyCollector;
pub use resilience::CallContext;
