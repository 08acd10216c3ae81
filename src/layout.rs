//! Turning a quote into positioned text.
//!
//! There are no real font metrics here: heights are estimated with a fixed character width of
//! 0.6× the font size, which is close enough for the small monospace-ish fonts these screens use.
//! Keep the formula as-is, screens are laid out against it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quotes::QuoteEntry;

/// Left edge of every fragment, in pixels.
pub const MARGIN_X: u32 = 5;

/// Where the first fragment starts, in pixels from the top.
pub const START_Y: f64 = 3.0;

/// The source line sits this many pixels higher than the cursor would put it.
const SOURCE_NUDGE: f64 = 2.0;

const CHAR_WIDTH_RATIO: f64 = 0.6;
const ELLIPSIS: &str = "...";

/// Layout parameters.
#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct LayoutConfig {
	/// Display width in pixels, used to estimate line wrapping.
	///
	/// Set this to the width of the screen as seen after rotation.
	#[arg(long, env = "INKHOUR_DISPLAY_WIDTH", default_value_t = 200)]
	pub display_width: u32,

	/// Base font size.
	#[arg(long, env = "INKHOUR_FONT_SIZE", default_value_t = 12)]
	pub font_size: u32,

	/// Quotes longer than this many characters are cut short with an ellipsis.
	///
	/// The text before the time and the time itself are never cut; only the part after it.
	#[arg(long, env = "INKHOUR_QUOTE_LENGTH", default_value_t = 70)]
	pub quote_length: usize,

	/// How much bigger the time is than the rest of the quote.
	#[arg(long, env = "INKHOUR_TIME_SIZE_INCREASE", default_value_t = 1)]
	pub time_size_increase: u32,

	/// How much smaller the source line is than the quote.
	#[arg(long, env = "INKHOUR_SOURCE_SIZE_DECREASE", default_value_t = 1)]
	pub source_size_decrease: u32,

	/// Space between lines, as a multiplier of the font size.
	#[arg(long, env = "INKHOUR_LINE_SPACING", default_value_t = 1.2)]
	pub line_spacing: f64,

	/// Show the author's name after the book title.
	///
	/// Best for larger screens.
	#[arg(long, env = "INKHOUR_SHOW_AUTHOR")]
	pub show_author: bool,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			display_width: 200,
			font_size: 12,
			quote_length: 70,
			time_size_increase: 1,
			source_size_decrease: 1,
			line_spacing: 1.2,
			show_author: false,
		}
	}
}

impl LayoutConfig {
	/// Estimated height of `text` once wrapped to the display width.
	///
	/// Must stay in `f64`: with `f32` the characters-per-line count comes out one short at some
	/// panel widths.
	pub fn text_height(&self, text: &str, font_size: u32) -> f64 {
		let char_width = f64::from(font_size) * CHAR_WIDTH_RATIO;
		let chars_per_line = ((f64::from(self.display_width) / char_width) as usize).max(1);
		let lines = text.chars().count().div_ceil(chars_per_line);
		lines as f64 * (f64::from(font_size) * self.line_spacing)
	}
}

/// What part of the layout a fragment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentId {
	/// Quote text before the time.
	Prefix,
	/// The time reference itself.
	Time,
	/// Quote text after the time.
	Suffix,
	/// The whole quote, when the time reference wasn't found in it.
	Quote,
	/// The book (and maybe author) line.
	Source,
}

impl FragmentId {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Prefix => "prefix",
			Self::Time => "time",
			Self::Suffix => "suffix",
			Self::Quote => "quote",
			Self::Source => "source",
		}
	}
}

impl fmt::Display for FragmentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A piece of text to draw at a position.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
	pub text: String,
	pub x: u32,
	pub y: f32,
	pub font_size: u32,
	pub id: FragmentId,
}

/// Everything to draw for one display update, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPlan {
	pub fragments: Vec<Fragment>,
}

impl RenderPlan {
	/// Lay out a quote.
	///
	/// `current_time` stands in for the entry's time reference when it has none.
	pub fn compute(entry: &QuoteEntry, current_time: &str, config: &LayoutConfig) -> Self {
		let mut stack = Stack::new(config);
		let base = config.font_size.max(1);
		let time_alt = entry.time_alt.as_deref().unwrap_or(current_time);
		let too_long = entry.len() > config.quote_length;

		match entry
			.quote
			.split_once(time_alt)
			.filter(|_| !time_alt.is_empty())
		{
			Some((prefix, suffix)) => {
				let suffix = if too_long && !suffix.is_empty() {
					let room = config
						.quote_length
						.saturating_sub(char_len(prefix) + char_len(time_alt) + ELLIPSIS.len());
					format!("{}{ELLIPSIS}", truncate_chars(suffix, room))
				} else {
					suffix.to_owned()
				};

				if !prefix.is_empty() {
					stack.push(prefix, base, FragmentId::Prefix);
				}
				stack.push(
					time_alt,
					base.saturating_add(config.time_size_increase),
					FragmentId::Time,
				);
				if !suffix.is_empty() {
					stack.push(&suffix, base, FragmentId::Suffix);
				}
			}
			None => {
				let quote = if too_long {
					let room = config.quote_length.saturating_sub(ELLIPSIS.len());
					format!("{}{ELLIPSIS}", truncate_chars(&entry.quote, room))
				} else {
					entry.quote.clone()
				};
				stack.push(&quote, base, FragmentId::Quote);
			}
		}

		let mut source = format!("- {}", entry.book);
		if config.show_author {
			if let Some(author) = entry.author.as_deref().filter(|a| !a.is_empty()) {
				source.push_str(&format!(" ({author})"));
			}
		}

		stack.y -= SOURCE_NUDGE;
		stack.push(
			&source,
			base.saturating_sub(config.source_size_decrease).max(1),
			FragmentId::Source,
		);

		Self {
			fragments: stack.fragments,
		}
	}

	/// Look up the first fragment of a kind.
	pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
		self.fragments.iter().find(|f| f.id == id)
	}

	/// The text of each fragment, in order.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.fragments.iter().map(|f| f.text.as_str())
	}
}

struct Stack<'c> {
	config: &'c LayoutConfig,
	y: f64,
	fragments: Vec<Fragment>,
}

impl<'c> Stack<'c> {
	fn new(config: &'c LayoutConfig) -> Self {
		Self {
			config,
			y: START_Y,
			fragments: Vec::with_capacity(4),
		}
	}

	fn push(&mut self, text: &str, font_size: u32, id: FragmentId) {
		self.fragments.push(Fragment {
			text: text.to_owned(),
			x: MARGIN_X,
			y: self.y as f32,
			font_size,
			id,
		});
		self.y += self.config.text_height(text, font_size);
	}
}

fn char_len(s: &str) -> usize {
	s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> &str {
	match s.char_indices().nth(max) {
		Some((idx, _)) => &s[..idx],
		None => s,
	}
}
