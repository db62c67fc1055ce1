use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = legal_api::Args::parse();

	legal_api::run(args).await
}
