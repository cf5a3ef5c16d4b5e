//! Signal pipeline — pure numeric building blocks.
//!
//! Everything here is synchronous and allocation-light so it can run inside
//! a single animation frame or pointer callback in the browser (via WASM)
//! as well as in native tests.

pub mod harmonic;
pub mod mixer;
pub mod oscillator;
pub mod stroke;
