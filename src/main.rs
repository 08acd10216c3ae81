use miette::IntoDiagnostic;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> miette::Result<()> {
	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.into_diagnostic()?
		.block_on(async {
			let (args, _guard) = inkhour::args()?;
			inkhour::run(args).await
		})
}
