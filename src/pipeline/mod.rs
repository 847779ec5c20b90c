//! Pipeline stages for transcript analysis.
//!
//! Each submodule implements exactly one step. The two steps with I/O
//! ([`extract`] and [`llm`]) sit behind traits so the rest of the pipeline
//! can be driven by fakes in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (prompt) ──▶ llm ──▶ normalize ──▶ decode
//! (text|pdf) (pdfium)    (template)   (LLM)   (regex)      (JSON|opaque)
//! ```
//!
//! 1. [`input`]: pick literal text or PDF bytes and reject blank transcripts
//! 2. [`extract`]: pull plain text out of PDF bytes on the blocking pool
//! 3. [`llm`]: one model call per request, with optional retry/backoff
//! 4. [`normalize`]: deterministic rewrite rules for near-JSON replies
//! 5. [`decode`]: strict JSON decode with an opaque fallback

pub mod decode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
