use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result {
    let config = match neuroui::WorkbenchConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}; falling back to defaults");
            neuroui::WorkbenchConfig::default()
        }
    };

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    neuroui::run(config)
}
