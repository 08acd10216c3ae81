use clap::Parser;
use miette::{IntoDiagnostic, Result, bail};
use serde::Serialize;

use crate::{
	actions::Context,
	quotes::{Coverage, LoadStats, QuotesArgs},
};

/// Check the quotes file and report what it covers.
///
/// Fails if the file can't be read or parsed, or if no quotes survive the length filter.
#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
	#[command(flatten)]
	pub quotes: QuotesArgs,

	/// Print the report as JSON.
	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
	#[serde(flatten)]
	stats: LoadStats,
	#[serde(flatten)]
	coverage: Coverage,
}

pub async fn run(ctx: Context<CheckArgs>) -> Result<()> {
	let args = ctx.args_top;
	let (table, stats) = args.quotes.load_strict()?;
	let report = Report {
		stats,
		coverage: table.coverage(),
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
	} else {
		print!("{}", report.text());
	}

	if table.is_empty() {
		bail!("no quotes left after filtering");
	}

	Ok(())
}

impl Report {
	fn text(&self) -> String {
		let Report { stats, coverage } = self;
		let mut out = format!(
			"{} quotes for {} times ({} of {} dropped as too long)\n\
			{} minutes covered, {} without a quote\n",
			stats.kept,
			stats.times,
			stats.filtered,
			stats.total,
			coverage.minutes_covered,
			coverage.minutes_missing,
		);

		if !coverage.malformed.is_empty() {
			out.push_str("not HH:MM, never shown:");
			for key in &coverage.malformed {
				out.push_str(&format!(" {key:?}"));
			}
			out.push('\n');
		}

		out
	}
}
