use std::io::Write;

use serde::Serialize;

use super::{Display, DisplayError};
use crate::layout::{Fragment, FragmentId};

const RULE_WIDTH: usize = 40;

/// Prints each update as plain text.
///
/// Fragments are indented by their font size relative to the smallest one, so the time stands out.
#[derive(Debug)]
pub struct Console<W> {
	out: W,
	pending: Vec<Fragment>,
}

impl<W: Write> Console<W> {
	pub fn new(out: W) -> Self {
		Self {
			out,
			pending: Vec::new(),
		}
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

impl<W: Write> Display for Console<W> {
	fn clear(&mut self) -> Result<(), DisplayError> {
		self.pending.clear();
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
		self.pending.push(Fragment {
			text: text.to_owned(),
			x,
			y,
			font_size,
			id,
		});
		Ok(())
	}

	fn flush(&mut self) -> Result<(), DisplayError> {
		let smallest = self
			.pending
			.iter()
			.map(|f| f.font_size)
			.min()
			.unwrap_or_default();

		writeln!(self.out, "{}", "─".repeat(RULE_WIDTH))?;
		for fragment in self.pending.drain(..) {
			let indent = (fragment.font_size - smallest) as usize;
			if fragment.id == FragmentId::Source {
				writeln!(self.out)?;
			}
			writeln!(self.out, "{:indent$}{}", "", fragment.text)?;
		}
		self.out.flush()?;
		Ok(())
	}
}

/// Writes each update as one line of JSON.
///
/// Meant for handing updates to another process that owns the screen.
#[derive(Debug)]
pub struct JsonLines<W> {
	out: W,
	pending: Vec<Fragment>,
}

#[derive(Serialize)]
struct Update<'f> {
	fragments: &'f [Fragment],
}

impl<W: Write> JsonLines<W> {
	pub fn new(out: W) -> Self {
		Self {
			out,
			pending: Vec::new(),
		}
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

impl<W: Write> Display for JsonLines<W> {
	fn clear(&mut self) -> Result<(), DisplayError> {
		self.pending.clear();
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
		self.pending.push(Fragment {
			text: text.to_owned(),
			x,
			y,
			font_size,
			id,
		});
		Ok(())
	}

	fn flush(&mut self) -> Result<(), DisplayError> {
		serde_json::to_writer(
			&mut self.out,
			&Update {
				fragments: &self.pending,
			},
		)?;
		writeln!(self.out)?;
		self.out.flush()?;
		self.pending.clear();
		Ok(())
	}
}
