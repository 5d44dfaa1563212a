mod app;
mod cli;
mod config;
mod logging;
mod protocol;

pub use app::App;

fn main() -> anyhow::Result<()> {
    let app = App::new()?;
    app.run()?;

    Ok(())
}
