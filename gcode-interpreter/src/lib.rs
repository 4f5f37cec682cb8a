//! Modal interpreter that turns canonical G-code blocks (from
//! `gcode-parser`) into a stream of primitives on a [`gcode::Target`].
//!
//! [`Interpreter`] owns all modal state (position, units, distance mode,
//! tool, spindle, canned-cycle words, `#`-parameters) and drives it forward
//! one block at a time. It never re-enters a caller: every [`Target`]
//! method is fire-and-forget, invoked serially from `run`/`resume`.
//!
//! [`Target`]: gcode::Target

// Make clippy as annoying as possible
#![deny(
    // All typically enabled warnings are converted into errors
    // includes correctness, suspicious, style, complexity, and perf
    clippy::all,
    // Error on cargo lints
    clippy::cargo,
)]
#![warn(
    // Warn on pedantic and in-development nursery lints
    clippy::pedantic,
    clippy::nursery,
    // Lints from "restriction" group - enforce a consistent if arbitrary style
    clippy::alloc_instead_of_core,
    clippy::arithmetic_side_effects,
    clippy::unnecessary_cast,
    clippy::as_underscore,
    clippy::assertions_on_result_states,
    clippy::clone_on_ref_ptr,
    clippy::create_dir,
    clippy::dbg_macro,
    clippy::decimal_literal_representation,
    clippy::default_numeric_fallback,
    clippy::deref_by_slicing,
    clippy::empty_drop,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::expect_used,
    clippy::filetype_is_file,
    clippy::fn_to_numeric_cast_any,
    clippy::format_push_string,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::indexing_slicing,
    clippy::large_include_file,
    clippy::let_underscore_must_use,
    clippy::lossy_float_literal,
    clippy::map_err_ignore,
    clippy::mem_forget,
    clippy::missing_docs_in_private_items,
    clippy::missing_enforced_import_renames,
    clippy::mixed_read_write_in_expression,
    clippy::mod_module_files,
    clippy::multiple_inherent_impl,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::partial_pub_fields,
    clippy::pattern_type_mismatch,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::rc_buffer,
    clippy::rc_mutex,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_name_method,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::str_to_string,
    clippy::string_slice,
    clippy::string_to_string,
    clippy::suspicious_xor_used_as_pow,
    clippy::todo,
    clippy::try_err,
    clippy::undocumented_unsafe_blocks,
    clippy::unimplemented,
    clippy::unnecessary_safety_comment,
    clippy::unnecessary_safety_doc,
    clippy::unnecessary_self_imports,
    clippy::unneeded_field_pattern,
    clippy::unreachable,
    clippy::unwrap_in_result,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::verbose_file_reads,
)]
#![allow(
    clippy::needless_pass_by_value,
    reason = "Internal Compiler Error bug workaround: https://github.com/rust-lang/rust-clippy/issues/10344"
)]

// Use no-std collections
extern crate alloc;

/// Sticky interpreter attributes carried across blocks (spec §3).
mod state;
pub use state::{CannedCycleWords, ModalState, Plane};

/// The interpreter's error taxonomy (spec §7).
mod error;
pub use error::InterpretError;

/// Splits one canonical block string into instructions (spec §4.3).
mod split;
pub use split::split_block;

/// Straight-line motion emission, shared by axis moves and canned cycles
/// (spec §4.6).
mod motion;

/// Arc motion (`G2`/`G3`) geometry (spec §4.7).
mod arc;

/// Canned drilling cycles (`G81`/`G82`/`G83`) (spec §4.8).
mod canned_cycle;

/// Per-block dispatch: parameters, reordering, and the instruction-head
/// dispatch table (spec §4.2, §4.4, §4.5).
mod dispatch;

/// Ties modal state, dispatch, and the run/resume loop together.
mod interpreter;
pub use interpreter::{Config, Interpreter};
