use tunelink::{
    config::Config,
    ui::{app::App, tui::Tui},
    util::log::initialize_logging,
};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> color_eyre::Result<()> {
    setup()?;

    let config = Config::from_env()?;
    let mut app = App::new(config).await?;
    app.run().await
}

fn setup() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    Tui::install_panic_hook();
    initialize_logging()
}
