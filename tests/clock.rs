use std::{cell::RefCell, io::Write, rc::Rc};

use inkhour::{
	clock::{Clock, Tick},
	display::{Display, DisplayError},
	layout::{FragmentId, LayoutConfig},
	quotes::{DEFAULT_MAX_STORED_LENGTH, QuoteTable},
};
use rand::{SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, PartialEq)]
enum Call {
	Clear,
	Text {
		text: String,
		x: u32,
		font_size: u32,
		id: FragmentId,
	},
	Flush,
}

#[derive(Debug, Default)]
struct Recorder {
	calls: Vec<Call>,
}

impl Recorder {
	fn renders(&self) -> usize {
		self.calls.iter().filter(|c| **c == Call::Flush).count()
	}

	fn texts(&self) -> Vec<&str> {
		self.calls
			.iter()
			.filter_map(|c| match c {
				Call::Text { text, .. } => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}
}

impl Display for Recorder {
	fn clear(&mut self) -> Result<(), DisplayError> {
		self.calls.push(Call::Clear);
		Ok(())
	}

	fn add_positioned_text(
		&mut self,
		text: &str,
		x: u32,
		_y: f32,
		font_size: u32,
		id: FragmentId,
	) -> Result<(), DisplayError> {
		self.calls.push(Call::Text {
			text: text.into(),
			x,
			font_size,
			id,
		});
		Ok(())
	}

	fn flush(&mut self) -> Result<(), DisplayError> {
		self.calls.push(Call::Flush);
		Ok(())
	}
}

fn clock_at(
	json: &str,
	start: &str,
) -> (
	Rc<RefCell<String>>,
	Clock<Recorder, impl FnMut() -> String, StdRng>,
) {
	let (table, _) = QuoteTable::parse(json, DEFAULT_MAX_STORED_LENGTH).unwrap();
	let now = Rc::new(RefCell::new(start.to_string()));
	let source = now.clone();
	let clock = Clock::with_parts(
		table,
		LayoutConfig::default(),
		Recorder::default(),
		move || source.borrow().clone(),
		StdRng::seed_from_u64(7),
	);
	(now, clock)
}

#[test]
fn draws_the_dawn_quote() {
	let (_, mut clock) = clock_at(
		r#"{"07:00": [{"quote":"At 07:00, day begins.","book":"Dawn","timeAlt":"07:00"}]}"#,
		"07:00",
	);

	clock.tick();
	let display = clock.display();
	assert_eq!(display.renders(), 1);
	assert_eq!(display.texts(), ["At ", "07:00", ", day begins.", "- Dawn"]);
	assert_eq!(
		display.calls[0..3],
		[
			Call::Clear,
			Call::Text {
				text: "At ".into(),
				x: 5,
				font_size: 12,
				id: FragmentId::Prefix
			},
			Call::Text {
				text: "07:00".into(),
				x: 5,
				font_size: 13,
				id: FragmentId::Time
			},
		]
	);
	assert_eq!(display.calls.last(), Some(&Call::Flush));
}

#[test]
fn minute_without_quote_keeps_screen() {
	let (now, mut clock) = clock_at(
		r#"{"07:00": [{"quote":"At 07:00, day begins.","book":"Dawn","timeAlt":"07:00"}]}"#,
		"07:00",
	);

	clock.tick();
	*now.borrow_mut() = "07:01".into();
	assert_eq!(
		clock.tick(),
		Tick::NoQuote {
			time: "07:01".into()
		}
	);
	assert_eq!(clock.last_rendered(), Some("07:01"));
	assert_eq!(clock.tick(), Tick::Unchanged);
	assert_eq!(clock.display().renders(), 1);
}

#[test]
fn one_render_per_minute() {
	let (now, mut clock) = clock_at(
		r#"{
			"10:15": [{"quote":"It was quarter past ten.","book":"Late","timeAlt":"quarter past ten"}],
			"10:16": [{"quote":"Sixteen minutes past ten, exactly.","book":"Later"}]
		}"#,
		"10:15",
	);

	for _ in 0..5 {
		clock.tick();
	}
	assert_eq!(clock.display().renders(), 1);

	*now.borrow_mut() = "10:16".into();
	for _ in 0..5 {
		clock.tick();
	}
	assert_eq!(clock.display().renders(), 2);
	assert_eq!(
		clock.display().texts()[4..],
		["Sixteen minutes past ten, exactly.", "- Later"]
	);
}

#[test]
fn loads_from_disk() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(
		file,
		r#"{{"03:10": [{{"quote":"It's 10 past three","book":"Afternoon","timeAlt":"10 past three"}}]}}"#
	)
	.unwrap();

	let table = QuoteTable::load(file.path(), DEFAULT_MAX_STORED_LENGTH);
	let mut clock = Clock::with_parts(
		table,
		LayoutConfig::default(),
		Recorder::default(),
		|| "03:10".to_string(),
		StdRng::seed_from_u64(7),
	);

	clock.tick();
	assert_eq!(
		clock.display().texts(),
		["It's ", "10 past three", "- Afternoon"]
	);
}
