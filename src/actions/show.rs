use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::{
	actions::Context,
	clock::{TimeSource, WallClock},
	display::{DisplayArgs, render},
	layout::{LayoutConfig, RenderPlan},
	quotes::{QuotesArgs, is_clock_time},
};

/// Show the quote for a single minute, then exit.
///
/// Useful to try out layout settings, or to check how a particular quote comes out.
#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
	/// Time to show, as 24-hour HH:MM.
	///
	/// Defaults to the current local time.
	#[arg(value_parser = parse_time)]
	pub time: Option<String>,

	/// Print the computed layout as JSON instead of drawing it.
	#[arg(long)]
	pub json: bool,

	#[command(flatten)]
	pub quotes: QuotesArgs,

	#[command(flatten)]
	pub layout: LayoutConfig,

	#[command(flatten)]
	pub display: DisplayArgs,
}

fn parse_time(time: &str) -> Result<String, String> {
	if is_clock_time(time) {
		Ok(time.to_owned())
	} else {
		Err(format!("expected a 24-hour HH:MM time, got {time:?}"))
	}
}

pub async fn run(ctx: Context<ShowArgs>) -> Result<()> {
	let args = ctx.args_top;
	let time = args.time.unwrap_or_else(|| WallClock.now());

	let (table, stats) = args.quotes.load_strict()?;
	debug!(?stats, "loaded quotes");

	let entry = table
		.candidates(&time)
		.and_then(|quotes| quotes.choose(&mut rand::thread_rng()))
		.ok_or_else(|| miette!("no quote for {time}"))?;
	info!(%time, book = %entry.book, "picked quote");

	let plan = RenderPlan::compute(entry, &time, &args.layout);
	if args.json {
		println!("{}", serde_json::to_string_pretty(&plan).into_diagnostic()?);
		return Ok(());
	}

	let mut display = args.display.open()?;
	render(&mut display, &plan)?;
	Ok(())
}
