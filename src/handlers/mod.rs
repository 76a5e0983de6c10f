//! Built-in node handlers.
//!
//! Each submodule registers its `handle_*` functions with
//! [`register_handler!`](crate::register_handler); adding a node type means
//! adding a function here, never touching the registry or the transpiler.

mod code;
mod control;
mod delay;
mod http;
mod note;
mod set;
mod slack;
