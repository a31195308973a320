// src/lib.rs

//! # Verified Ball Arithmetic
//!
//! A Rust library for rigorous arbitrary-precision arithmetic on
//! midpoint-radius balls, with verified evaluators for the Hurwitz zeta
//! function and the Lerch transcendent built on top. Every operation
//! returns a ball enclosing the exact image of its input balls.

//This section pertains to the exact dyadic substrate and the ball layers
pub mod bigfloat;
pub mod realball;
pub mod complexball;

//This section pertains to elementary functions and cached constants
pub mod elementary;

//This section pertains to truncated power series kernels
pub mod series_div;

//This section pertains to combinatorial and Bernoulli machinery
pub mod primitives;
pub mod bernoulli;

//This section pertains to the special function evaluators
pub mod hurwitz;
pub mod lerch;
