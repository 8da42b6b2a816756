use anyhow::Result;

use cellgrid_engine::ViewerConfig;
use cellgrid_engine::logging::{LoggingConfig, init_logging};
use cellgrid_engine::window::Runtime;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::default().with_title("cellgrid viewer");
    log::info!(
        "drawing a {}x{} grid on a {}x{} canvas",
        config.grid.width,
        config.grid.height,
        config.canvas_size.0,
        config.canvas_size.1
    );

    Runtime::run(config)
}
