//! Display drivers.
//!
//! The clock only ever talks to a screen through [`Display`]: clear it, add text at positions,
//! then flush everything in one go. E-ink refreshes are slow and wear the panel, so drivers should
//! buffer until [`Display::flush`].

use clap::ValueEnum;
use tracing::debug;

use crate::layout::{FragmentId, RenderPlan};

pub use self::stdout::{Console, JsonLines};

#[cfg(feature = "eink")]
pub mod eink;
mod stdout;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DisplayError {
	#[error("writing to output")]
	#[diagnostic(help("the output may have been closed"))]
	Output(#[from] std::io::Error),

	#[error("encoding render plan")]
	Json(#[from] serde_json::Error),

	#[cfg(feature = "eink")]
	#[error(transparent)]
	#[diagnostic(transparent)]
	Eink(#[from] eink::EinkError),
}

/// A screen that can show positioned text.
pub trait Display {
	/// Forget everything drawn so far.
	fn clear(&mut self) -> Result<(), DisplayError>;

	/// Add a line of text with its top-left corner at `(x, y)`.
	///
	/// Text wider than the screen wraps.
	fn add_positioned_text(
		&mut self,
		text: &str,
		x: u32,
		y: f32,
		font_size: u32,
		id: FragmentId,
	) -> Result<(), DisplayError>;

	/// Push everything added since the last clear to the screen.
	fn flush(&mut self) -> Result<(), DisplayError>;
}

impl<D: Display + ?Sized> Display for Box<D> {
	fn clear(&mut self) -> Result<(), DisplayError> {
		(**self).clear()
	}

	fn add_positioned_text(
		&mut self,
		text: &str,
		x: u32,
		y: f32,
		font_size: u32,
		id: FragmentId,
	) -> Result<(), DisplayError> {
		(**self).add_positioned_text(text, x, y, font_size, id)
	}

	fn flush(&mut self) -> Result<(), DisplayError> {
		(**self).flush()
	}
}

/// Draw a plan: clear, add each fragment in order, flush.
pub fn render<D: Display + ?Sized>(display: &mut D, plan: &RenderPlan) -> Result<(), DisplayError> {
	display.clear()?;
	for fragment in &plan.fragments {
		display.add_positioned_text(
			&fragment.text,
			fragment.x,
			fragment.y,
			fragment.font_size,
			fragment.id,
		)?;
	}
	display.flush()
}

/// Display backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
	/// Print quotes to the terminal.
	Console,
	/// Print each update as a line of JSON.
	Json,
	/// Draw on a WeAct e-paper panel connected over SPI.
	#[cfg(feature = "eink")]
	Eink,
}

/// Which screen to draw on.
#[derive(Debug, Clone, clap::Args)]
pub struct DisplayArgs {
	/// Where to draw quotes.
	#[arg(long, env = "INKHOUR_DISPLAY", default_value = "console")]
	pub display: Backend,

	#[cfg(feature = "eink")]
	#[command(flatten)]
	pub eink: eink::EinkArgs,
}

impl DisplayArgs {
	/// Set up the selected backend.
	pub fn open(&self) -> Result<Box<dyn Display>, DisplayError> {
		debug!(backend = ?self.display, "opening display");
		Ok(match self.display {
			Backend::Console => Box::new(Console::new(std::io::stdout())),
			Backend::Json => Box::new(JsonLines::new(std::io::stdout())),
			#[cfg(feature = "eink")]
			Backend::Eink => Box::new(eink::Eink::open(&self.eink)?),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{layout::LayoutConfig, quotes::QuoteEntry};

	#[derive(Default)]
	struct Calls(Vec<String>);

	impl Display for Calls {
		fn clear(&mut self) -> Result<(), DisplayError> {
			self.0.push("clear".into());
			Ok(())
		}

		fn add_positioned_text(
			&mut self,
			text: &str,
			_x: u32,
			_y: f32,
			_font_size: u32,
			id: FragmentId,
		) -> Result<(), DisplayError> {
			self.0.push(format!("{id}:{text}"));
			Ok(())
		}

		fn flush(&mut self) -> Result<(), DisplayError> {
			self.0.push("flush".into());
			Ok(())
		}
	}

	#[test]
	fn render_order() {
		let plan = RenderPlan::compute(
			&QuoteEntry {
				quote: "It was noon.".into(),
				book: "Midday".into(),
				author: None,
				time_alt: Some("noon".into()),
			},
			"12:00",
			&LayoutConfig::default(),
		);

		let mut calls = Calls::default();
		render(&mut calls, &plan).unwrap();
		assert_eq!(
			calls.0,
			[
				"clear",
				"prefix:It was ",
				"time:noon",
				"suffix:.",
				"source:- Midday",
				"flush"
			]
		);
	}
}
