use eframe::egui;

mod app;
mod logging;

fn main() -> eframe::Result<()> {
    logging::init_logging();

    let cfg = app::Config::default();
    let title = cfg.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.as_str())
            .with_inner_size(cfg.window_size),
        ..Default::default()
    };

    tracing::info!("starting {title}");
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(app::App::new(cc, cfg)))),
    )
}
