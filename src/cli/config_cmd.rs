// Copyright 2024-2026 mailsift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{
    self, EffectiveConfig, DEFAULT_CLASSIFIER_MODEL, DEFAULT_LABELS_PATH, DEFAULT_LOG_LEVEL,
    DEFAULT_SUMMARIZER_MODEL,
};
use crate::engine::LabelSet;
use crate::telemetry::LogFormat;

/// Print effective config as key-value pairs to stdout.
pub fn run_show(json: bool) -> i32 {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize config: {e}");
                return 1;
            }
        }
    } else {
        print!("{}", format_config(&cfg));
    }
    0
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("MAILSIFT_DEVICE=auto");
    println!("MAILSIFT_LABELS_PATH={DEFAULT_LABELS_PATH}");
    println!("MAILSIFT_CLASSIFIER_MODEL={DEFAULT_CLASSIFIER_MODEL}");
    println!("MAILSIFT_SUMMARIZER_MODEL={DEFAULT_SUMMARIZER_MODEL}");
    println!("MAILSIFT_LOG_LEVEL={DEFAULT_LOG_LEVEL}");
    println!("MAILSIFT_LOG_FORMAT={}", LogFormat::default().as_str());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let env = config::load();
    let mut warnings = 0;

    for key in ["MAILSIFT_DEVICE", "MAILSIFT_LOG_FORMAT"] {
        if let Ok(raw) = std::env::var(key) {
            let parsed = match key {
                "MAILSIFT_DEVICE" => raw.parse::<config::DevicePreference>().is_ok(),
                _ => raw.parse::<LogFormat>().is_ok(),
            };
            if !parsed {
                eprintln!("WARNING: {key}={raw:?} is not recognised; using the default");
                warnings += 1;
            }
        }
    }

    if let Err(e) = env.log_config().filter() {
        eprintln!("WARNING: MAILSIFT_LOG_LEVEL={:?} is invalid: {e}", env.log_level);
        warnings += 1;
    }

    if let Err(e) = LabelSet::from_json_file(&env.labels_path) {
        eprintln!(
            "WARNING: MAILSIFT_LABELS_PATH ({}) cannot be loaded: {e}",
            env.labels_path.display()
        );
        warnings += 1;
    }

    if warnings == 0 {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

fn format_config(cfg: &EffectiveConfig) -> String {
    format!(
        "MAILSIFT_DEVICE={}\n\
         MAILSIFT_LABELS_PATH={}\n\
         MAILSIFT_CLASSIFIER_MODEL={}\n\
         MAILSIFT_SUMMARIZER_MODEL={}\n\
         MAILSIFT_LOG_LEVEL={}\n\
         MAILSIFT_LOG_FORMAT={}\n",
        cfg.device,
        cfg.labels_path,
        cfg.classifier_model,
        cfg.summarizer_model,
        cfg.log_level,
        cfg.log_format,
    )
}
