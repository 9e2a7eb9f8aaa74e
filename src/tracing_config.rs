//! Tracing configuration for debugging inference.
//!
//! Supports three output formats controlled by `TCG_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`
//! - `json`: one JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Every top-level match and merged bound
//! TCG_LOG=debug TCG_LOG_FORMAT=tree cargo test -p tcg-solver
//!
//! # Rule-by-rule trace of the matcher only
//! TCG_LOG="tcg_solver::matcher=trace" TCG_LOG_FORMAT=json my-driver
//! ```
//!
//! The subscriber is only initialised when `TCG_LOG` (or `RUST_LOG`) is set,
//! so there is zero overhead in normal builds.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `TCG_LOG_FORMAT` value. Unknown values select [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TCG_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `TCG_LOG`, falling back to `RUST_LOG`.
///
/// `TCG_LOG` takes precedence when both are set. Values use the same
/// syntax as `RUST_LOG` (e.g. `debug`, `tcg_solver::matcher=trace`).
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TCG_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TCG_LOG` nor `RUST_LOG` is set. Returns whether
/// a subscriber was installed; a second call, or a call after another global
/// subscriber was set, installs nothing. Output goes to stderr.
pub fn init_tracing() -> bool {
    let has_tcg_log = std::env::var("TCG_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_tcg_log && !has_rust_log {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
