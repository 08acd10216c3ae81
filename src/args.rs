use clap::Parser;
use lloggs::{LoggingArgs, PreArgs, WorkerGuard};
use miette::{Result, miette};
use tracing::debug;

/// Literary clock
///
/// Shows a quotation that mentions the current time, picked from a curated quotes file, and
/// redraws it whenever the minute changes.
///
/// Every option can also be set through its INKHOUR_* environment variable, which is handy when
/// running under systemd.
#[derive(Debug, Clone, Parser)]
#[command(
	author,
	version,
	after_help = "Logs go to stderr. Use -v to see each minute change, -vvv to see the layout.",
	after_long_help = "Logs go to stderr, quotes to stdout unless drawn on a panel. Verbosity:\n  \
		(none)  loaded quotes, minute changes, errors\n  \
		-v      plus display and font setup\n  \
		-vv     plus dependencies' debug output\n  \
		-vvv    plus each tick and computed layout\n  \
		-vvvv   everything"
)]
pub struct Args {
	#[command(flatten)]
	pub logging: LoggingArgs,

	/// What to do
	#[command(subcommand)]
	pub action: crate::actions::Action,
}

/// Tracing filter for a `-v` count.
fn log_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "info",
		1 => "info,inkhour=debug",
		2 => "debug",
		3 => "debug,inkhour=trace",
		_ => "trace",
	}
}

/// Parse arguments and start logging.
///
/// `RUST_LOG`, when set, takes over from `-v` and `--log-file`. The guard must be held until exit,
/// or buffered log lines are lost.
pub fn get_args() -> Result<(Args, WorkerGuard)> {
	let log_guard = PreArgs::parse().setup().map_err(|err| miette!("{err}"))?;

	debug!("parsing arguments");
	let args = Args::parse();

	let log_guard = match log_guard {
		Some(guard) => guard,
		None => args
			.logging
			.setup(log_filter)
			.map_err(|err| miette!("{err}"))?,
	};

	debug!(?args, "got arguments");
	Ok((args, log_guard))
}
