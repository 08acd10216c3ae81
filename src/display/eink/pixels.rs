use bitvec::{order::Msb0, vec::BitVec};

use super::{Rotation, chip::Chip};

/// One-bit framebuffer, in the panel's native orientation.
///
/// Bits are packed MSB-first, eight pixels to a byte, which is the layout the controller RAM
/// expects. `true` is white.
#[derive(Clone, Debug)]
pub struct Pixels {
	pub width: u16,
	pub height: u16,
	pub rotation: Rotation,
	data: BitVec<u8, Msb0>,
}

impl Pixels {
	pub fn new(width: u16, height: u16, rotation: Rotation) -> Self {
		let len = width as usize * height as usize;
		Self {
			width,
			height,
			rotation,
			data: BitVec::repeat(true, len),
		}
	}

	pub fn new_for(chip: Chip, rotation: Rotation) -> Self {
		Self::new(chip.width(), chip.height(), rotation)
	}

	/// Width and height as seen after rotation.
	pub fn logical_size(&self) -> (u16, u16) {
		if self.rotation.is_sideways() {
			(self.height, self.width)
		} else {
			(self.width, self.height)
		}
	}

	/// Set a pixel in rotated coordinates.
	///
	/// Out-of-bounds pixels are ignored; text is allowed to run off the edge.
	pub fn set(&mut self, x: i32, y: i32, white: bool) {
		let (lw, lh) = self.logical_size();
		if x < 0 || y < 0 || x >= lw as i32 || y >= lh as i32 {
			return;
		}

		let (w, h) = (self.width as i32, self.height as i32);
		let (px, py) = match self.rotation {
			Rotation::Degrees0 => (x, y),
			Rotation::Degrees90 => (w - 1 - y, x),
			Rotation::Degrees180 => (w - 1 - x, h - 1 - y),
			Rotation::Degrees270 => (y, h - 1 - x),
		};

		let idx = py as usize * self.width as usize + px as usize;
		self.data.set(idx, white);
	}

	/// Get a pixel in rotated coordinates.
	///
	/// Out-of-bounds pixels read as white.
	#[cfg(test)]
	pub fn get(&self, x: i32, y: i32) -> bool {
		let (lw, lh) = self.logical_size();
		if x < 0 || y < 0 || x >= lw as i32 || y >= lh as i32 {
			return true;
		}

		let (w, h) = (self.width as i32, self.height as i32);
		let (px, py) = match self.rotation {
			Rotation::Degrees0 => (x, y),
			Rotation::Degrees90 => (w - 1 - y, x),
			Rotation::Degrees180 => (w - 1 - x, h - 1 - y),
			Rotation::Degrees270 => (y, h - 1 - x),
		};
		self.data[py as usize * self.width as usize + px as usize]
	}

	/// Fill with a single value.
	pub fn fill(&mut self, white: bool) {
		self.data.fill(white);
	}

	/// The packed bytes, ready to load into the controller.
	pub fn as_bytes(&self) -> &[u8] {
		self.data.as_raw_slice()
	}
}
