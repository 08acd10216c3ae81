use std::{thread::sleep, time::Duration};

use rppal::{
	gpio::{Gpio, InputPin, Level, OutputPin},
	spi::{Bus, Mode, SlaveSelect, Spi},
};
use tracing::trace;

use super::{EinkArgs, EinkError, chip::Chip};

#[derive(Debug)]
pub struct EinkIo {
	spi: Spi,
	busy: InputPin,
	dc: OutputPin,
	reset: OutputPin,
}

impl EinkIo {
	/// Connect to the display I/O.
	///
	/// This sets up the GPIO and SPI pins, but doesn't touch the display otherwise. Call `wake()`
	/// and `init()` before sending image data.
	pub fn new(args: &EinkArgs) -> Result<Self, EinkError> {
		let gpio = Gpio::new()?;
		let busy = gpio.get(args.busy)?.into_input();
		let reset = gpio.get(args.reset)?.into_output();

		let mut dc = gpio.get(args.dc)?.into_output();
		dc.set_high();

		let bus = match args.spi {
			0 => Bus::Spi0,
			1 => Bus::Spi1,
			2 => Bus::Spi2,
			3 => Bus::Spi3,
			4 => Bus::Spi4,
			5 => Bus::Spi5,
			6 => Bus::Spi6,
			_ => {
				return Err(EinkError::NoSuchSpi {
					bus: args.spi,
					ce: args.ce,
				});
			}
		};
		let ce = match args.ce {
			0 => SlaveSelect::Ss0,
			1 => SlaveSelect::Ss1,
			2 => SlaveSelect::Ss2,
			_ => {
				return Err(EinkError::NoSuchSpi {
					bus: args.spi,
					ce: args.ce,
				});
			}
		};
		let spi = Spi::new(bus, ce, args.frequency, Mode::Mode0)?;

		Ok(Self {
			spi,
			busy,
			dc,
			reset,
		})
	}

	/// Wake the display from deep sleep with a hardware reset.
	pub fn wake(&mut self) {
		self.reset.set_high();
		sleep(Duration::from_millis(50));
		self.reset.set_low();
		sleep(Duration::from_millis(50));
		self.reset.set_high();

		self.wait_for_idle();
	}

	/// Software reset, then set up panel geometry and RAM addressing.
	pub fn init(&mut self, chip: Chip) -> Result<(), EinkError> {
		self.command(Command::SoftwareReset)?;
		self.wait_for_idle();

		self.command_with_data(Command::DriverOutput, &chip.driver_output_control())?;
		self.command_with_data(Command::DataEntryMode, &[DATA_ENTRY_X_INC_Y_INC])?;
		self.command_with_data(Command::RamXRange, &chip.x_range())?;
		self.command_with_data(Command::RamYRange, &chip.y_range())?;
		self.command_with_data(Command::BorderWaveform, &[BORDER_FOLLOW_LUT])?;
		self.command_with_data(Command::TemperatureSensor, &[INTERNAL_TEMPERATURE_SENSOR])?;
		self.reset_counters()?;
		self.wait_for_idle();
		Ok(())
	}

	/// Enter deep sleep.
	///
	/// RAM is kept, but the panel needs a hardware reset (`wake()`) before it listens again.
	pub fn deep_sleep(&mut self) -> Result<(), EinkError> {
		self.command_with_data(Command::DeepSleep, &[0x01])
	}

	/// Full display update with black/white data.
	///
	/// This takes a couple of seconds, and flashes the display several times.
	pub fn display_full(&mut self, bw: &[u8]) -> Result<(), EinkError> {
		self.load(Command::LoadBlackWhite, bw)?;
		self.load(Command::LoadRed, &vec![0x00; bw.len()])?;
		self.update(DisplaySequence::FULL_UPDATE)
	}

	/// Partial display update with black/white data.
	///
	/// The controller drives only the pixels that differ between `previous` and `bw`.
	pub fn display_partial(&mut self, bw: &[u8], previous: &[u8]) -> Result<(), EinkError> {
		self.command_with_data(Command::BorderWaveform, &[BORDER_HOLD])?;
		self.load(Command::LoadBlackWhite, bw)?;
		self.load(Command::LoadRed, previous)?;
		self.update(DisplaySequence::PARTIAL_UPDATE)
	}

	fn load(&mut self, command: Command, data: &[u8]) -> Result<(), EinkError> {
		self.reset_counters()?;
		self.command_with_data(command, data)?;
		self.wait_for_idle();
		Ok(())
	}

	fn update(&mut self, sequence: DisplaySequence) -> Result<(), EinkError> {
		trace!(?sequence, "starting update");
		self.command_with_data(Command::ConfigureSequence, &[sequence.bits()])?;
		self.command(Command::Update)?;
		self.wait_for_idle();
		Ok(())
	}

	fn reset_counters(&mut self) -> Result<(), EinkError> {
		self.command_with_data(Command::RamXCounter, &[0x00])?;
		self.command_with_data(Command::RamYCounter, &[0x00, 0x00])
	}

	fn command_with_data(&mut self, command: Command, data: &[u8]) -> Result<(), EinkError> {
		self.command(command)?;
		self.spi.write(data)?;
		Ok(())
	}

	fn command(&mut self, command: Command) -> Result<(), EinkError> {
		self.dc.set_low();
		self.spi.write(&[command as u8])?;
		self.dc.set_high();
		Ok(())
	}

	/// Block until the display is idle.
	fn wait_for_idle(&self) {
		while self.busy.read() == Level::High {
			sleep(Duration::from_millis(1));
		}
	}
}

/// X then Y, both incrementing.
const DATA_ENTRY_X_INC_Y_INC: u8 = 0x03;

/// Border follows the update waveform.
const BORDER_FOLLOW_LUT: u8 = 0x05;

/// Border left alone, so partial updates don't flash the edge.
const BORDER_HOLD: u8 = 0x80;

const INTERNAL_TEMPERATURE_SENSOR: u8 = 0x80;

/// Subset of the SSD168x command set, enough to show a picture.
///
/// The WeAct SPI interface combines MOSI and MISO, which makes read commands dangerous to use, so
/// those are left out. See <https://www.pinteric.com/displays.html#ssd>.
#[derive(Debug, Copy, Clone)]
#[repr(u8)]
enum Command {
	/// Gate count and scanning order.
	DriverOutput = 0x01,

	/// Enter deep sleep mode.
	///
	/// Keeps BUSY high until the next hardware reset.
	DeepSleep = 0x10,

	/// RAM address increment direction.
	DataEntryMode = 0x11,

	SoftwareReset = 0x12,

	/// Use the internal or an external temperature sensor.
	TemperatureSensor = 0x18,

	/// Start the display update sequence.
	Update = 0x20,

	/// Set display update sequence options.
	///
	/// This must be followed by a [`DisplaySequence`] byte.
	ConfigureSequence = 0x22,

	/// Write black/white data to RAM: one bit per pixel, 0 for black, 1 for white.
	LoadBlackWhite = 0x24,

	/// Write to the second RAM.
	///
	/// On three-colour panels this is the red layer. On black/white panels in partial mode, it
	/// holds the previous picture to diff against.
	LoadRed = 0x26,

	BorderWaveform = 0x3C,
	RamXRange = 0x44,
	RamYRange = 0x45,
	RamXCounter = 0x4E,
	RamYCounter = 0x4F,
}

bitflags::bitflags! {
	/// Which operations in the update sequence should be performed.
	///
	/// The operations are always performed in the same order, but they can be skipped by setting
	/// their bit to zero. `PARTIAL_MODE` is a toggle between full and partial refresh.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	struct DisplaySequence: u8 {
		const ENABLE_CLOCK     = 0b10000000;
		const ENABLE_ANALOG    = 0b01000000;
		const LOAD_TEMPERATURE = 0b00100000;
		const LOAD_DEFAULT_LUT = 0b00010000;
		const PARTIAL_MODE     = 0b00001000;
		const DISPLAY          = 0b00000100;
		const DISABLE_ANALOG   = 0b00000010;
		const DISABLE_CLOCK    = 0b00000001;

		/// Full refresh with the built-in waveform.
		const FULL_UPDATE =
			Self::ENABLE_CLOCK.bits() |
			Self::ENABLE_ANALOG.bits() |
			Self::LOAD_TEMPERATURE.bits() |
			Self::LOAD_DEFAULT_LUT.bits() |
			Self::DISPLAY.bits() |
			Self::DISABLE_ANALOG.bits() |
			Self::DISABLE_CLOCK.bits();

		/// Partial refresh with the built-in waveform.
		const PARTIAL_UPDATE = Self::FULL_UPDATE.bits() | Self::PARTIAL_MODE.bits();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sequences() {
		assert_eq!(DisplaySequence::FULL_UPDATE.bits(), 0xF7);
		assert_eq!(DisplaySequence::PARTIAL_UPDATE.bits(), 0xFF);
	}
}
