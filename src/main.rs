use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ambient_lib::run(ambient_lib::Config::parse()).await
}
