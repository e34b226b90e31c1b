//! Structured logging schema and field name constants for vaultmind.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed with no fallback left |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (titles, scores) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "rag", "inference", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "retriever", "scope", "assembler", "gemini", "fallback"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ask", "retrieve", "generate", "resolve"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Query text after mention stripping.
pub const QUERY: &str = "query";

/// Human-readable retrieval scope.
pub const SCOPE: &str = "scope";

/// Note title being operated on.
pub const NOTE_TITLE: &str = "note_title";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a retrieval.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidate notes in scope.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Retrieval fields ──────────────────────────────────────────────────────

/// Retrieval stage that produced the result ("semantic", "keyword", "none").
pub const RETRIEVAL_STAGE: &str = "retrieval_stage";

/// Titles the model returned that were not in the candidate set.
pub const DISCARDED_COUNT: &str = "discarded_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// HTTP status returned by a provider.
pub const HTTP_STATUS: &str = "http_status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
