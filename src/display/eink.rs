//! WeAct Studio e-paper panels on a Raspberry Pi.
//!
//! Text is rasterised with fontdue into a one-bit framebuffer, which is only sent to the panel on
//! flush. Between updates the panel is kept in deep sleep.

use std::{path::PathBuf, slice};

use clap::ValueEnum;
use fontdue::{
	Font,
	layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle},
};
use tracing::{debug, instrument};

use super::{Display, DisplayError};
use crate::layout::FragmentId;

use self::{chip::Chip, io::EinkIo, pixels::Pixels};

pub mod chip;
mod font;
mod io;
mod pixels;

/// Glyph coverage at or above this is drawn black.
const INK_THRESHOLD: u8 = 128;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EinkError {
	#[error("opening GPIO")]
	#[diagnostic(help("is this a Raspberry Pi, and is the user in the gpio group?"))]
	Gpio(#[from] rppal::gpio::Error),

	#[error("talking to the panel over SPI")]
	#[diagnostic(help("check that SPI is enabled (raspi-config) and the bus/CE numbers"))]
	Spi(#[from] rppal::spi::Error),

	#[error("SPI bus {bus} with CE {ce} does not exist")]
	NoSuchSpi { bus: u8, ce: u8 },

	#[error("reading font file {path:?}")]
	FontFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("loading font: {0}")]
	Font(&'static str),

	#[error("no usable font found")]
	#[diagnostic(help("install a font (e.g. fonts-dejavu) or pass --font-file"))]
	NoFont,
}

/// Panel rotation, clockwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rotation {
	#[default]
	#[value(name = "0")]
	Degrees0,
	#[value(name = "90")]
	Degrees90,
	#[value(name = "180")]
	Degrees180,
	#[value(name = "270")]
	Degrees270,
}

impl Rotation {
	pub fn is_sideways(self) -> bool {
		matches!(self, Self::Degrees90 | Self::Degrees270)
	}
}

/// E-paper panel options.
///
/// Only used with `--display eink`.
#[derive(Debug, Clone, clap::Args)]
pub struct EinkArgs {
	/// SPI port to use.
	#[arg(long, default_value = "0")]
	pub spi: u8,

	/// SPI CE number for the display's chip select pin.
	#[arg(long, default_value = "0")]
	pub ce: u8,

	/// SPI frequency in Hz.
	#[arg(long, default_value = "2000000")]
	pub frequency: u32,

	/// GPIO pin number for the display's busy pin.
	#[arg(long, default_value = "23")]
	pub busy: u8,

	/// GPIO pin number for the display's reset pin.
	#[arg(long, default_value = "24")]
	pub reset: u8,

	/// GPIO pin number for the display's data/command pin.
	#[arg(long, default_value = "25")]
	pub dc: u8,

	/// Panel controller, which sets the resolution.
	///
	/// The 1.54" (50mm) 200x200 panel uses SSD1681, the 176x296 panels use SSD1680.
	#[arg(long, env = "INKHOUR_CHIP", default_value = "ssd1681", ignore_case = true)]
	pub chip: Chip,

	/// Rotate the picture clockwise by this many degrees.
	#[arg(long, env = "INKHOUR_ROTATION", default_value = "0")]
	pub rotation: Rotation,

	/// Perform partial updates after the first full one.
	///
	/// This is faster and doesn't flash, but may leave ghosting on the display.
	#[arg(long, env = "INKHOUR_PARTIAL")]
	pub partial: bool,

	/// Load a TTF or OTF font file directly.
	#[arg(long, conflicts_with_all = &["font_name", "family"])]
	pub font_file: Option<PathBuf>,

	/// Load a system font by name.
	#[arg(long, conflicts_with = "font_file")]
	pub font_name: Option<String>,

	/// Select a system font by family name.
	#[arg(long)]
	pub family: Option<String>,
}

pub struct Eink {
	io: EinkIo,
	chip: Chip,
	font: Font,
	canvas: Pixels,
	previous: Option<Pixels>,
	partial: bool,
}

impl Eink {
	/// Set up the pins and load the font.
	///
	/// The panel itself isn't touched until the first flush.
	#[instrument(level = "debug")]
	pub fn open(args: &EinkArgs) -> Result<Self, EinkError> {
		let font = font::load(args)?;
		let io = EinkIo::new(args)?;
		debug!(chip = ?args.chip, rotation = ?args.rotation, "opened eink display");

		Ok(Self {
			io,
			chip: args.chip,
			font,
			canvas: Pixels::new_for(args.chip, args.rotation),
			previous: None,
			partial: args.partial,
		})
	}
}

impl Display for Eink {
	fn clear(&mut self) -> Result<(), DisplayError> {
		self.canvas.fill(true);
		Ok(())
	}

	fn add_positioned_text(
		&mut self,
		text: &str,
		x: u32,
		y: f32,
		font_size: u32,
		id: FragmentId,
	) -> Result<(), DisplayError> {
		let (width, _) = self.canvas.logical_size();
		let mut layout: Layout = Layout::new(CoordinateSystem::PositiveYDown);
		layout.reset(&LayoutSettings {
			x: x as f32,
			y,
			max_width: Some((f32::from(width) - x as f32).max(1.0)),
			..LayoutSettings::default()
		});
		layout.append(
			slice::from_ref(&self.font),
			&TextStyle::new(text, font_size as f32, 0),
		);
		debug!(%id, glyphs = layout.glyphs().len(), "laid out text");

		for glyph in layout.glyphs() {
			if glyph.width == 0 || glyph.height == 0 {
				continue;
			}

			let (metrics, bitmap) = self.font.rasterize_config(glyph.key);
			for (i, coverage) in bitmap.iter().enumerate() {
				if *coverage < INK_THRESHOLD {
					continue;
				}

				let px = glyph.x as i32 + (i % metrics.width) as i32;
				let py = glyph.y as i32 + (i / metrics.width) as i32;
				self.canvas.set(px, py, false);
			}
		}

		Ok(())
	}

	fn flush(&mut self) -> Result<(), DisplayError> {
		self.io.wake();
		self.io.init(self.chip)?;

		match self.previous.as_ref().filter(|_| self.partial) {
			Some(previous) => {
				debug!("partial update");
				self.io
					.display_partial(self.canvas.as_bytes(), previous.as_bytes())?;
			}
			None => {
				debug!("full update");
				self.io.display_full(self.canvas.as_bytes())?;
			}
		}

		self.io.deep_sleep()?;
		self.previous = Some(self.canvas.clone());
		Ok(())
	}
}
