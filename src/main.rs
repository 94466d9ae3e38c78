use clap::Parser;
use fence_quote::core::quote::DownloadManifest;
use fence_quote::utils::error::ErrorSeverity;
use fence_quote::utils::{logger, validation::Validate};
use fence_quote::{
    AccessGate, AppConfig, CliConfig, FenceError, FileSessionStore, GeocodeSynchronizer,
    HeadlessMap, NominatimClient, QuoteSession,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting fence-quote CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ fence-quote failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> fence_quote::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };
    config.validate()?;

    // 存取閘門
    let gate = AccessGate::new(FileSessionStore::new(&config.gate.session_file), &config.gate.pin);
    if cli.logout {
        gate.logout().await?;
        println!("Logged out.");
        return Ok(());
    }
    gate.ensure_open(cli.pin.as_deref()).await?;

    let geocoder = NominatimClient::new(&config.geocoder)?;
    let map = HeadlessMap::new(config.map.tile_url.clone());
    let locator = GeocodeSynchronizer::with_zoom(geocoder, map.clone(), config.map.zoom);
    let mut session = QuoteSession::new(locator, config.catalog());

    {
        let form = session.form_mut();
        form.project_name = cli.project_name.clone();
        form.duration = cli.duration;
        form.ground = cli.ground;
        form.height = cli.height;
        form.distance_to_sea_km = cli.distance_to_sea.clone();
        form.altitude_m_aod = cli.altitude.clone();
    }

    session.update_postcode(&cli.postcode).await;
    for at in &cli.click {
        if !map.click(*at) {
            tracing::warn!("⚠️ Map is not shown, click at {} ignored", at);
            println!("Map is not shown yet, click at {} was ignored.", at);
            continue;
        }
        session.process_map_events().await;
    }
    for at in &cli.drag {
        if !map.drag_marker(*at) {
            tracing::warn!("⚠️ No marker on the map, drag to {} ignored", at);
            println!("No marker to drag, move to {} was ignored.", at);
            continue;
        }
        session.process_map_events().await;
    }

    tracing::debug!("Site input: {:?}", session.form().site_input());
    print_location(&session).await;

    if let Err(errors) = session.submit() {
        return Err(FenceError::ValidationError {
            message: errors.to_string(),
        });
    }
    print_results(&session);

    for id in &cli.select {
        if !session.toggle(id)? {
            println!("Option {} is not applicable and was not selected.", id);
        }
    }

    let count = session.selection().len();
    println!("\n{}", fence_quote::core::quote::download_label(count));
    if cli.download {
        let manifest: DownloadManifest = session.download_manifest()?;
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        println!("Mock only – would download drawings and calcs with title blocks populated.");
    }

    Ok(())
}

async fn print_location(session: &QuoteSession<NominatimClient, HeadlessMap>) {
    let location = session.location().await;
    println!("Site location: {}", session.form().postcode());
    if let Some(geo) = &location.geo {
        println!("  {} ({})", geo.display_label, geo.position);
    }
    if let Some(error) = location.error {
        println!("  {}", error);
    }
}

fn print_results(session: &QuoteSession<NominatimClient, HeadlessMap>) {
    if let Some(wind) = session.wind() {
        println!("\nWind results (example)");
        println!("  Calculated wind speed:    {:.0} m/s", wind.speed_ms);
        println!("  Calculated wind pressure: {:.3} kPa", wind.pressure_kpa);
    }

    println!("\nFencing options (required height {})", session.form().height);
    for assessment in session.options() {
        let option = assessment.option;
        println!(
            "  [{}] {:<40} Capacity: {:.3} kPa · Max height: {:.1} m{}",
            option.id,
            option.name,
            option.capacity_kpa,
            option.max_height_m,
            if assessment.eligible { "" } else { "  (Not applicable)" }
        );
    }
}
