// Copyright 2024-2026 mailsift Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for the mailsift runtime.
//!
//! None of these commands load a model; they inspect configuration, label
//! files and chunk plans offline.
//!
//! ## Usage
//!
//! ```bash
//! mailsift-cli plan email.txt --json   # Show how a document would be chunked
//! mailsift-cli labels labels.json      # Validate a label file
//! mailsift-cli config show             # Print effective configuration
//! ```

pub mod config_cmd;
pub mod labels_cmd;
pub mod plan_cmd;

pub use config_cmd::{run_defaults, run_show, run_validate};
pub use labels_cmd::run_labels;
pub use plan_cmd::{render_plan, run_plan};
