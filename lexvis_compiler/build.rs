// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    grammar: GrammarLimits,
    automaton: AutomatonLimits,
    runtime: RuntimeLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct GrammarLimits {
    max_grammar_size: usize,
    max_identifier_length: usize,
    max_rule_count: usize,
    max_literal_length: usize,
    max_parse_depth: usize,
}

#[derive(serde::Deserialize)]
struct AutomatonLimits {
    max_nfa_states: usize,
    max_modes: usize,
}

#[derive(serde::Deserialize)]
struct RuntimeLimits {
    max_input_size: usize,
    max_token_count: usize,
    max_artifact_size: u64,
    default_compile_timeout_ms: u64,
    max_compile_timeout_ms: u64,
    max_diagnostic_bytes: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LEXVIS_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=LEXVIS_CONFIG_DIR");

    let profile = env::var("LEXVIS_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("LEXVIS_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of lexvis_compiler directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_GRAMMAR_SIZE: usize = 16 * 1024 * 1024;
    const ABSOLUTE_MAX_INPUT_SIZE: usize = 256 * 1024 * 1024;
    const ABSOLUTE_MAX_TIMEOUT_MS: u64 = 3_600_000;

    if config.grammar.max_grammar_size > ABSOLUTE_MAX_GRAMMAR_SIZE {
        panic!("LIMITS: max_grammar_size exceeds absolute maximum");
    }

    if config.runtime.max_input_size > ABSOLUTE_MAX_INPUT_SIZE {
        panic!("LIMITS: max_input_size exceeds absolute maximum");
    }

    if config.runtime.max_compile_timeout_ms > ABSOLUTE_MAX_TIMEOUT_MS {
        panic!("LIMITS: max_compile_timeout_ms exceeds absolute maximum");
    }

    if config.runtime.default_compile_timeout_ms > config.runtime.max_compile_timeout_ms {
        panic!("LIMITS: default_compile_timeout_ms exceeds max_compile_timeout_ms");
    }

    if config.grammar.max_parse_depth == 0 || config.automaton.max_modes == 0 {
        panic!("LIMITS: max_parse_depth and max_modes must be non-zero");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.runtime.max_compile_timeout_ms > 120_000 {
        panic!("PRODUCTION: max_compile_timeout_ms too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod grammar {{
        pub const MAX_GRAMMAR_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_RULE_COUNT: usize = {};
        pub const MAX_LITERAL_LENGTH: usize = {};
        pub const MAX_PARSE_DEPTH: usize = {};
    }}

    pub mod automaton {{
        pub const MAX_NFA_STATES: usize = {};
        pub const MAX_MODES: usize = {};
    }}

    pub mod runtime {{
        pub const MAX_INPUT_SIZE: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_ARTIFACT_SIZE: u64 = {};
        pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = {};
        pub const MAX_COMPILE_TIMEOUT_MS: u64 = {};
        pub const MAX_DIAGNOSTIC_BYTES: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Grammar
        config.grammar.max_grammar_size,
        config.grammar.max_identifier_length,
        config.grammar.max_rule_count,
        config.grammar.max_literal_length,
        config.grammar.max_parse_depth,
        // Automaton
        config.automaton.max_nfa_states,
        config.automaton.max_modes,
        // Runtime
        config.runtime.max_input_size,
        config.runtime.max_token_count,
        config.runtime.max_artifact_size,
        config.runtime.default_compile_timeout_ms,
        config.runtime.max_compile_timeout_ms,
        config.runtime.max_diagnostic_bytes,
        // Logging
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
