#![warn(clippy::all, rust_2018_idioms)]

use doodlepix::DoodlePixApp;

fn main() -> eframe::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 820.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("DoodlePix"),
        ..Default::default()
    };
    eframe::run_native(
        "DoodlePix",
        options,
        Box::new(|cc| Ok(Box::new(DoodlePixApp::new(cc)))),
    )
}
