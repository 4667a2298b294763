//! A chip8 cpu core: memory, registers, timers and the fetch-decode-execute cycle.
//!
//! Loading programs from storage, drawing the framebuffer, polling a real keyboard and
//! producing sound are left to the host, which talks to the core through the traits in
//! [`devices`] and [`timer`].
pub mod chip8;
pub mod config;
pub mod definitions;
pub mod devices;
pub mod memory;
pub mod opcode;
pub mod resources;
pub mod timer;

mod error;
mod runner;

// reexporting for convinience
pub use error::*;
pub use runner::*;
