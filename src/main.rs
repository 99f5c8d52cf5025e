mod app;
mod audio;
mod catalog;
mod clock;
mod config;
mod input;
mod logging;
mod render;
mod rng;
mod session;
mod tile;
mod view;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
