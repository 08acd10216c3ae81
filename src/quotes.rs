//! The time → quotes table.

use std::{
	collections::BTreeMap,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use clap::ValueHint;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Quotes longer than this many characters are dropped at load time.
pub const DEFAULT_MAX_STORED_LENGTH: usize = 250;

const MINUTES_IN_DAY: usize = 24 * 60;

/// One quotation, as found in the quotes file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuoteEntry {
	pub quote: String,

	#[serde(default = "unknown_book")]
	pub book: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,

	/// The literal time reference inside `quote`.
	///
	/// When absent, the time the quote is filed under is used instead.
	#[serde(default, rename = "timeAlt", skip_serializing_if = "Option::is_none")]
	pub time_alt: Option<String>,
}

fn unknown_book() -> String {
	"Unknown".into()
}

impl QuoteEntry {
	/// Length of the quote text, in characters.
	pub fn len(&self) -> usize {
		self.quote.chars().count()
	}

	pub fn is_empty(&self) -> bool {
		self.quote.is_empty()
	}
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum QuoteError {
	#[error("quotes file not found: {path:?}")]
	#[diagnostic(help("pass the path to the quotes file with --quotes"))]
	NotFound { path: PathBuf },

	#[error("reading quotes file {path:?}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("quotes file is not valid JSON")]
	#[diagnostic(help(
		"expected an object of \"HH:MM\" keys to arrays of {{\"quote\", \"book\", \"author\", \"timeAlt\"}}"
	))]
	Json(#[from] serde_json::Error),
}

/// Counts reported after loading a quotes file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
	/// Quotes in the file, before filtering.
	pub total: usize,
	/// Quotes kept.
	pub kept: usize,
	/// Quotes dropped for being too long.
	pub filtered: usize,
	/// Distinct times with at least one quote.
	pub times: usize,
}

/// Mapping from `HH:MM` to the quotes filed under that time.
///
/// Built once, read-only afterwards. No time maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteTable {
	entries: BTreeMap<String, Vec<QuoteEntry>>,
}

impl QuoteTable {
	/// Load a quotes file, falling back to an empty table on any error.
	///
	/// The error is logged. An empty table means there's nothing to show, and callers shouldn't
	/// start the clock with it.
	pub fn load(path: &Path, max_len: usize) -> Self {
		match Self::from_path(path, max_len) {
			Ok((table, _)) => table,
			Err(err) => {
				error!("{:?}", miette::Report::new(err));
				Self::default()
			}
		}
	}

	/// Load a quotes file.
	#[instrument(level = "debug")]
	pub fn from_path(path: &Path, max_len: usize) -> Result<(Self, LoadStats), QuoteError> {
		let json = std::fs::read_to_string(path).map_err(|source| {
			if source.kind() == ErrorKind::NotFound {
				QuoteError::NotFound {
					path: path.to_owned(),
				}
			} else {
				QuoteError::Io {
					path: path.to_owned(),
					source,
				}
			}
		})?;

		Self::parse(&json, max_len)
	}

	/// Parse a quotes document, dropping quotes longer than `max_len` characters.
	pub fn parse(json: &str, max_len: usize) -> Result<(Self, LoadStats), QuoteError> {
		let raw: BTreeMap<String, Vec<QuoteEntry>> = serde_json::from_str(json)?;
		let (table, stats) = Self::filtered(raw, max_len);

		info!(
			"loaded {} quotes for {} different times",
			stats.kept, stats.times
		);
		info!("filtered out {} quotes that were too long", stats.filtered);
		Ok((table, stats))
	}

	fn filtered(raw: BTreeMap<String, Vec<QuoteEntry>>, max_len: usize) -> (Self, LoadStats) {
		let mut stats = LoadStats::default();
		let mut entries = BTreeMap::new();

		for (time, quotes) in raw {
			stats.total += quotes.len();
			let before = quotes.len();
			let kept: Vec<_> = quotes.into_iter().filter(|q| q.len() <= max_len).collect();
			stats.filtered += before - kept.len();

			if kept.is_empty() {
				debug!(%time, "no quotes left for this time");
				continue;
			}

			if !is_clock_time(&time) {
				warn!(%time, "quotes filed under something that isn't an HH:MM time");
			}

			stats.kept += kept.len();
			entries.insert(time, kept);
		}

		stats.times = entries.len();
		(Self { entries }, stats)
	}

	/// The quotes filed under `time`, if any.
	pub fn candidates(&self, time: &str) -> Option<&[QuoteEntry]> {
		self.entries.get(time).map(Vec::as_slice)
	}

	/// Whether there's nothing to show at all.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate over times and their quotes, in time order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[QuoteEntry])> {
		self.entries
			.iter()
			.map(|(time, quotes)| (time.as_str(), quotes.as_slice()))
	}

	/// How well the table covers the day.
	pub fn coverage(&self) -> Coverage {
		let (valid, malformed): (Vec<_>, Vec<_>) =
			self.entries.keys().partition(|time| is_clock_time(time));

		Coverage {
			minutes_covered: valid.len(),
			minutes_missing: MINUTES_IN_DAY - valid.len(),
			malformed: malformed.into_iter().cloned().collect(),
		}
	}
}

/// Which minutes of the day have a quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
	pub minutes_covered: usize,
	pub minutes_missing: usize,
	/// Keys that aren't a 24-hour `HH:MM` time, and so never match the clock.
	pub malformed: Vec<String>,
}

/// Whether `time` is a zero-padded 24-hour `HH:MM` time, as produced by the clock.
pub fn is_clock_time(time: &str) -> bool {
	let Some((hh, mm)) = time.split_once(':') else {
		return false;
	};

	let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
	two_digits(hh)
		&& two_digits(mm)
		&& hh.parse::<u8>().is_ok_and(|h| h < 24)
		&& mm.parse::<u8>().is_ok_and(|m| m < 60)
}

/// Where to find quotes.
#[derive(Debug, Clone, clap::Args)]
pub struct QuotesArgs {
	/// Path to the quotes file.
	///
	/// A JSON object mapping "HH:MM" times to arrays of quotes, each with "quote" and "book", and
	/// optionally "author" and "timeAlt" (the literal time text inside the quote).
	#[arg(
		long = "quotes",
		env = "INKHOUR_QUOTES",
		default_value = "quotes.json",
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub path: PathBuf,

	/// Drop quotes longer than this many characters when loading.
	#[arg(long, env = "INKHOUR_MAX_STORED_LENGTH", default_value_t = DEFAULT_MAX_STORED_LENGTH)]
	pub max_stored_length: usize,
}

impl QuotesArgs {
	pub fn load(&self) -> QuoteTable {
		QuoteTable::load(&self.path, self.max_stored_length)
	}

	pub fn load_strict(&self) -> Result<(QuoteTable, LoadStats), QuoteError> {
		QuoteTable::from_path(&self.path, self.max_stored_length)
	}
}
