use std::future::pending;

use clap::Parser;
use miette::{Result, bail};
use tracing::{error, info};

use crate::{
	actions::Context,
	clock::{Clock, DEFAULT_INTERVAL},
	display::DisplayArgs,
	layout::LayoutConfig,
	quotes::QuotesArgs,
};

/// Show a quote for each minute, until stopped.
///
/// Checks the time every `--interval`, and redraws whenever the minute changes. Minutes without a
/// quote leave the previous one on screen. Stops on SIGINT or SIGTERM.
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
	#[command(flatten)]
	pub quotes: QuotesArgs,

	#[command(flatten)]
	pub layout: LayoutConfig,

	#[command(flatten)]
	pub display: DisplayArgs,

	/// How often to check the time.
	#[arg(long, env = "INKHOUR_INTERVAL", default_value_t = humantime::Duration::from(DEFAULT_INTERVAL))]
	pub interval: humantime::Duration,
}

pub async fn run(ctx: Context<RunArgs>) -> Result<()> {
	let RunArgs {
		quotes,
		layout,
		display,
		interval,
	} = ctx.args_top;

	let table = quotes.load();
	if table.is_empty() {
		bail!("no quotes loaded from {:?}, nothing to show", quotes.path);
	}

	let display = display.open()?;
	let mut clock = Clock::new(table, layout, display);
	clock.run_until(interval.into(), shutdown_signal()).await;
	Ok(())
}

async fn shutdown_signal() {
	let interrupt = async {
		match tokio::signal::ctrl_c().await {
			Ok(()) => info!("received SIGINT, shutting down"),
			Err(err) => {
				error!("unable to listen for SIGINT: {err}");
				pending::<()>().await;
			}
		}
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};
		match signal(SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
				info!("received SIGTERM, shutting down");
			}
			Err(err) => {
				error!("unable to listen for SIGTERM: {err}");
				pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = pending::<()>();

	tokio::select! {
		() = interrupt => {}
		() = terminate => {}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[test]
	fn interval_default() {
		let args = RunArgs::try_parse_from(["run"]).unwrap();
		assert_eq!(Duration::from(args.interval), DEFAULT_INTERVAL);
	}

	#[test]
	fn interval_from_flag() {
		let args = RunArgs::try_parse_from(["run", "--interval", "5s"]).unwrap();
		assert_eq!(Duration::from(args.interval), Duration::from_secs(5));
	}
}
