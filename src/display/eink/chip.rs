/// Eink display chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Chip {
	SSD1680,
	SSD1681,
}

impl Chip {
	/// Get the display's width in pixels.
	///
	/// This is also called the "Source" size.
	pub const fn width(self) -> u16 {
		match self {
			Chip::SSD1680 => 176,
			Chip::SSD1681 => 200,
		}
	}

	/// Get the display's height in pixels.
	///
	/// This is also called the "Gate" size.
	pub const fn height(self) -> u16 {
		match self {
			Chip::SSD1680 => 296,
			Chip::SSD1681 => 200,
		}
	}

	/// Driver output control: gate count minus one (little-endian), then scanning order.
	pub const fn driver_output_control(self) -> [u8; 3] {
		let gates = self.height() - 1;
		[(gates & 0xFF) as u8, (gates >> 8) as u8, 0x00]
	}

	/// RAM X address range, in bytes (8 pixels each).
	pub const fn x_range(self) -> [u8; 2] {
		[0x00, (self.width() / 8 - 1) as u8]
	}

	/// RAM Y address range, in gates (little-endian start and end).
	pub const fn y_range(self) -> [u8; 4] {
		let end = self.height() - 1;
		[0x00, 0x00, (end & 0xFF) as u8, (end >> 8) as u8]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ssd1681_ranges() {
		assert_eq!(Chip::SSD1681.driver_output_control(), [0xC7, 0x00, 0x00]);
		assert_eq!(Chip::SSD1681.x_range(), [0x00, 0x18]);
		assert_eq!(Chip::SSD1681.y_range(), [0x00, 0x00, 0xC7, 0x00]);
	}

	#[test]
	fn ssd1680_ranges() {
		assert_eq!(Chip::SSD1680.driver_output_control(), [0x27, 0x01, 0x00]);
		assert_eq!(Chip::SSD1680.x_range(), [0x00, 0x15]);
		assert_eq!(Chip::SSD1680.y_range(), [0x00, 0x00, 0x27, 0x01]);
	}
}
