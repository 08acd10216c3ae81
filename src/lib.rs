#![deny(rust_2018_idioms)]

//! A literary clock.
//!
//! Once a minute, look up a quotation that mentions the current time of day, lay it out for a
//! small screen, and draw it. The pieces are usable on their own:
//!
//! - [`quotes`] loads the time → quotes table from JSON,
//! - [`layout`] turns one quote into a [`RenderPlan`](layout::RenderPlan),
//! - [`display`] defines the driver trait and the built-in backends,
//! - [`clock`] ties them together in the polling loop.

pub use crate::actions::run;
pub use crate::args::get_args as args;

pub(crate) mod actions;
pub(crate) mod args;
pub mod clock;
pub mod display;
pub mod layout;
pub mod quotes;
