//! # dram
//!
//! Spirits bottle recommendations driven by a user's existing collection.
//!
//! Each bottle the user owns is embedded and compared against every bottle
//! in a catalog by cosine similarity. The best matches per bottle are
//! merged into one deduplicated list, each with a plain-language reason
//! ("same spirit type", "similar price range", ...). If the embedding
//! provider fails anywhere, a fixed fallback list is served instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ User bottles │──▶│  Recommender │──▶│ Recommendation│
//! │ (bar / JSON) │   │ merge+dedupe │   │     list      │
//! └──────────────┘   └──────┬───────┘   └───────────────┘
//!                           │ one per user bottle
//!                           ▼
//!                    ┌──────────────┐   ┌──────────────┐
//!                    │   Matcher    │──▶│   Resolver   │──▶ provider
//!                    │ cosine+reason│   │ (+ cache)    │
//!                    └──────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Pipeline error type |
//! | [`similarity`] | Cosine similarity |
//! | [`embedding`] | Embedding providers, cache, and bottle resolver |
//! | [`reason`] | Match explanations |
//! | [`matcher`] | Per-bottle ranking |
//! | [`recommend`] | Aggregation and fallback boundary |
//! | [`fallback`] | Static fallback recommendations |
//! | [`catalog`] | Catalog loading |
//! | [`bar`] | User collection client |
//! | [`commands`] | CLI command handlers |
//! | [`server`] | JSON HTTP server |

pub mod bar;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fallback;
pub mod matcher;
pub mod models;
pub mod reason;
pub mod recommend;
pub mod server;
pub mod similarity;
