//! The polling loop.

use std::{future::Future, time::Duration};

use rand::{Rng, rngs::ThreadRng, seq::SliceRandom};
use tracing::{error, info, instrument, trace, warn};

use crate::{
	display::{Display, render},
	layout::{LayoutConfig, RenderPlan},
	quotes::QuoteTable,
};

/// Default time between clock checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Something that tells the time, as `HH:MM`.
pub trait TimeSource {
	fn now(&mut self) -> String;
}

/// The system clock, in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
	fn now(&mut self) -> String {
		jiff::Zoned::now().strftime("%H:%M").to_string()
	}
}

impl<F> TimeSource for F
where
	F: FnMut() -> String,
{
	fn now(&mut self) -> String {
		self()
	}
}

/// What happened on a clock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
	/// Same minute as last time, nothing to do.
	Unchanged,
	/// New minute, but there's no quote for it.
	NoQuote { time: String },
	/// New minute, quote drawn.
	Rendered { time: String, book: String },
	/// New minute, but drawing failed.
	Failed { time: String },
}

/// Checks the time and redraws when the minute changes.
#[derive(Debug)]
pub struct Clock<D, T = WallClock, R = ThreadRng> {
	quotes: QuoteTable,
	layout: LayoutConfig,
	display: D,
	time: T,
	rng: R,
	last_rendered: Option<String>,
}

impl<D: Display> Clock<D> {
	pub fn new(quotes: QuoteTable, layout: LayoutConfig, display: D) -> Self {
		Self::with_parts(quotes, layout, display, WallClock, rand::thread_rng())
	}
}

impl<D, T, R> Clock<D, T, R>
where
	D: Display,
	T: TimeSource,
	R: Rng,
{
	pub fn with_parts(quotes: QuoteTable, layout: LayoutConfig, display: D, time: T, rng: R) -> Self {
		Self {
			quotes,
			layout,
			display,
			time,
			rng,
			last_rendered: None,
		}
	}

	/// The last minute that was handled, whether or not a quote was drawn for it.
	pub fn last_rendered(&self) -> Option<&str> {
		self.last_rendered.as_deref()
	}

	pub fn display(&self) -> &D {
		&self.display
	}

	/// Check the time once, and redraw if the minute changed.
	///
	/// Drawing errors are logged, not returned; the minute counts as handled either way.
	#[instrument(level = "trace", skip(self))]
	pub fn tick(&mut self) -> Tick {
		let now = self.time.now();
		if self.last_rendered.as_deref() == Some(now.as_str()) {
			trace!(time = %now, "minute unchanged");
			return Tick::Unchanged;
		}

		info!(time = %now, "time changed");
		let outcome = match self
			.quotes
			.candidates(&now)
			.and_then(|quotes| quotes.choose(&mut self.rng))
		{
			None => {
				warn!(time = %now, "no quote available");
				Tick::NoQuote { time: now.clone() }
			}
			Some(entry) => {
				let plan = RenderPlan::compute(entry, &now, &self.layout);
				trace!(?plan, "computed layout");
				match render(&mut self.display, &plan) {
					Ok(()) => {
						info!(book = %entry.book, "updated display");
						Tick::Rendered {
							time: now.clone(),
							book: entry.book.clone(),
						}
					}
					Err(err) => {
						error!("failed to update display: {:?}", miette::Report::new(err));
						Tick::Failed { time: now.clone() }
					}
				}
			}
		};

		self.last_rendered = Some(now);
		outcome
	}

	/// Check the time every `interval` until `shutdown` resolves.
	pub async fn run_until(&mut self, interval: Duration, shutdown: impl Future<Output = ()>) {
		tokio::pin!(shutdown);
		info!(?interval, "literary clock starting");

		loop {
			self.tick();

			tokio::select! {
				() = &mut shutdown => {
					info!("shutting down");
					break;
				}
				() = tokio::time::sleep(interval) => {}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use rand::{SeedableRng, rngs::StdRng};

	use super::*;
	use crate::{
		display::{DisplayError, JsonLines},
		layout::FragmentId,
		quotes::DEFAULT_MAX_STORED_LENGTH,
	};

	const QUOTES: &str = r#"{
		"07:00": [{"quote": "At 07:00, day begins.", "book": "Dawn", "timeAlt": "07:00"}],
		"07:02": [
			{"quote": "Two past seven, said one.", "book": "One", "timeAlt": "Two past seven"},
			{"quote": "Two past seven, said the other.", "book": "Other", "timeAlt": "Two past seven"}
		]
	}"#;

	fn table() -> QuoteTable {
		QuoteTable::parse(QUOTES, DEFAULT_MAX_STORED_LENGTH)
			.unwrap()
			.0
	}

	fn scripted(start: &'static str) -> (Rc<RefCell<String>>, impl FnMut() -> String) {
		let now = Rc::new(RefCell::new(start.to_string()));
		let handle = now.clone();
		(handle, move || now.borrow().clone())
	}

	struct Broken;

	impl Display for Broken {
		fn clear(&mut self) -> Result<(), DisplayError> {
			Ok(())
		}

		fn add_positioned_text(
			&mut self,
			_text: &str,
			_x: u32,
			_y: f32,
			_font_size: u32,
			_id: FragmentId,
		) -> Result<(), DisplayError> {
			Err(std::io::Error::other("panel unplugged").into())
		}

		fn flush(&mut self) -> Result<(), DisplayError> {
			Ok(())
		}
	}

	#[test]
	fn renders_once_per_minute() {
		let (now, time) = scripted("07:00");
		let mut clock = Clock::with_parts(
			table(),
			LayoutConfig::default(),
			JsonLines::new(Vec::new()),
			time,
			StdRng::seed_from_u64(1),
		);

		assert_eq!(
			clock.tick(),
			Tick::Rendered {
				time: "07:00".into(),
				book: "Dawn".into()
			}
		);
		assert_eq!(clock.tick(), Tick::Unchanged);
		assert_eq!(clock.last_rendered(), Some("07:00"));

		*now.borrow_mut() = "07:01".into();
		assert_eq!(
			clock.tick(),
			Tick::NoQuote {
				time: "07:01".into()
			}
		);
		assert_eq!(clock.last_rendered(), Some("07:01"));
		assert_eq!(clock.tick(), Tick::Unchanged);

		*now.borrow_mut() = "07:02".into();
		assert!(matches!(
			clock.tick(),
			Tick::Rendered { ref book, .. } if book == "One" || book == "Other"
		));
	}

	#[test]
	fn failed_render_still_marks_minute() {
		let (_, time) = scripted("07:00");
		let mut clock = Clock::with_parts(
			table(),
			LayoutConfig::default(),
			Broken,
			time,
			StdRng::seed_from_u64(1),
		);

		assert_eq!(
			clock.tick(),
			Tick::Failed {
				time: "07:00".into()
			}
		);
		assert_eq!(clock.last_rendered(), Some("07:00"));
		assert_eq!(clock.tick(), Tick::Unchanged);
	}

	#[test]
	fn picks_among_candidates() {
		let mut seen = std::collections::HashSet::new();
		for seed in 0..64 {
			let mut clock = Clock::with_parts(
				table(),
				LayoutConfig::default(),
				JsonLines::new(std::io::sink()),
				|| "07:02".to_string(),
				StdRng::seed_from_u64(seed),
			);
			if let Tick::Rendered { book, .. } = clock.tick() {
				seen.insert(book);
			}
		}
		assert_eq!(seen.len(), 2, "{seen:?}");
	}

	#[tokio::test]
	async fn stops_on_shutdown() {
		let mut clock = Clock::with_parts(
			table(),
			LayoutConfig::default(),
			JsonLines::new(Vec::new()),
			|| "07:00".to_string(),
			StdRng::seed_from_u64(1),
		);

		clock
			.run_until(DEFAULT_INTERVAL, std::future::ready(()))
			.await;

		assert_eq!(clock.last_rendered(), Some("07:00"));
		let written = String::from_utf8(clock.display.into_inner()).unwrap();
		assert_eq!(written.lines().count(), 1);
	}

	#[test]
	fn wall_clock_format() {
		let now = WallClock.now();
		assert!(crate::quotes::is_clock_time(&now), "{now}");
	}
}
