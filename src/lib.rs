//! # qb - a quick native build orchestrator
//!
//! qb compiles every C/C++ file under the working directory in parallel and
//! links the objects into an executable, shared library or static library,
//! using whichever toolchain the host provides.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build the current directory into ./<dirname>
//! qb
//!
//! # Build a debug shared library against SDL2, then clean it again
//! qb --type dll --debug --pkg sdl2
//! qb --type dll clean
//!
//! # Build and run, forwarding arguments
//! qb run --port 8080
//! ```
//!
//! ## Module Organization
//!
//! - [`toolchain`] - Toolchain discovery (MSVC, clang, gcc)
//! - [`compiler`] - Per-platform compile/link/clean implementations
//! - [`config`] - `qb.toml` loading and CLI binding
//! - [`deps`] - Option aggregation from packages, pkg-config and Conan
//! - [`build`] - Source discovery, parallel compilation and linking

/// Build state, scheduler and linker stage.
pub mod build;

/// Compiler abstraction and platform variants.
pub mod compiler;

/// Configuration file parsing (`qb.toml`).
pub mod config;

/// Package and manifest option aggregation.
pub mod deps;

/// Toolchain detection.
pub mod toolchain;

/// Terminal status output.
pub mod ui;
