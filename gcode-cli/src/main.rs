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
    clippy::rc_buffer,
    clippy::rc_mutex,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_name_method,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
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

//! Runs a normalized G-code program against an in-memory reference
//! [`Target`], printing the primitive log it emits.
//!
//! This is the one binary in the workspace; the downstream WinPC-NC-like
//! device codec itself stays out of scope (spec §1) — `PrintingTarget`
//! below is a reference sink, not a driver.

use std::{
    env, fs,
    io::{self, Read},
    process::ExitCode,
};

use gcode::{Axis, Target};
use gcode_interpreter::{Config, Interpreter};
use tracing::error;

/// Renders each primitive the way spec.md §8's test scenarios do, e.g.
/// `"V1,X10000"` for a rapid/feed move whose long axis is X, bracketing
/// each `run`/`resume` span with `"E"` (emitted only on
/// [`Target::append_preamble`] — `append_postamble` adds nothing of its
/// own, since the next span's `"E"`, or end of program, already marks the
/// boundary).
#[derive(Default)]
struct PrintingTarget {
    /// The emitted primitive log, one entry per call.
    log: Vec<String>,
}

impl Target for PrintingTarget {
    fn axes(&self) -> Vec<Axis> {
        vec![Axis::X, Axis::Y, Axis::Z]
    }

    fn append_preamble(&mut self) {
        self.log.push("E".to_string());
    }

    fn append_postamble(&mut self) {}

    fn set_feed_rate(&mut self, micro_units_per_second: i64) {
        self.log.push(format!("F{micro_units_per_second}"));
    }

    fn set_spindle_speed(&mut self, pwm: u8) {
        self.log.push(format!("S{pwm}"));
    }

    fn set_spindle_config(&mut self, ccw: Option<bool>, enable: bool, speed: Option<i64>) {
        let dir = match ccw {
            Some(true) => "ccw",
            Some(false) => "cw",
            None => "-",
        };
        let speed = speed.map_or_else(|| "-".to_string(), |s| s.to_string());
        self.log.push(format!("M,{dir},{enable},{speed}"));
    }

    fn set_coolant_mist(&mut self) {
        self.log.push("CM".to_string());
    }

    fn set_coolant_off(&mut self) {
        self.log.push("C0".to_string());
    }

    fn straight_motion(
        &mut self,
        _rapid: bool,
        long_move_axis: Option<Axis>,
        machine_pos: [Option<i64>; 3],
    ) {
        let Some(axis) = long_move_axis else {
            return;
        };
        let mut entry = format!("V{}", axis.index().saturating_add(1));
        for (letter, pos) in [('X', machine_pos[0]), ('Y', machine_pos[1]), ('Z', machine_pos[2])]
        {
            if let Some(value) = pos {
                entry.push_str(&format!(",{letter}{value}"));
            }
        }
        self.log.push(entry);
    }

    fn circle_motion(&mut self, dx_center: i64, dy_center: i64, sweep_micro_rad: i64) {
        self.log.push(format!("C,{dx_center},{dy_center},{sweep_micro_rad}"));
    }
}

/// Parsed command line: the program source location and whether `--invert-z`
/// was given.
struct Args {
    /// Path to read source from, or `"-"` for stdin.
    path: String,
    /// Mirrors `gcode_interpreter::Config::invert_z`.
    invert_z: bool,
}

/// Parses `argv[1..]` into [`Args`].
fn parse_args() -> Option<Args> {
    let mut invert_z = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        if arg == "--invert-z" {
            invert_z = true;
        } else {
            path = Some(arg);
        }
    }
    path.map(|path| Args { path, invert_z })
}

/// Reads the program source from `path`, or stdin when `path == "-"`.
///
/// # Errors
///
/// Returns the underlying I/O error on failure.
fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(args) = parse_args() else {
        error!("usage: gcode-cli [--invert-z] <path|->");
        return ExitCode::FAILURE;
    };

    let source = match read_source(&args.path) {
        Ok(source) => source,
        Err(err) => {
            error!(%err, path = %args.path, "failed to read input");
            return ExitCode::FAILURE;
        }
    };

    let parsed = gcode_parser::normalize(&source);

    let mut target = PrintingTarget::default();
    let mut interpreter = Interpreter::new(
        &mut target,
        Config {
            invert_z: args.invert_z,
        },
    );

    if let Err(err) = interpreter.run(parsed.blocks()) {
        error!(%err, "interpretation failed");
        return ExitCode::FAILURE;
    }

    #[allow(clippy::print_stdout, reason = "this binary's entire purpose is printing the emitted primitive log")]
    for line in &target.log {
        println!("{line}");
    }

    ExitCode::SUCCESS
}
