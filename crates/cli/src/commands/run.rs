//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::BridgeBlueprint;
use std::time::Duration;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::error::{ensure_config_exists, CliError};
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    ensure_config_exists(&args.config)?;

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args)?;

    info!(
        source = ?blueprint.source.kind,
        bind = %blueprint.source.bind_addr,
        input = %blueprint.conversion.input,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_samples: (args.max_samples > 0).then_some(args.max_samples),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting bridge...");

    let stats = Pipeline::new(pipeline_config)
        .run_until(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        publications = stats.publications(),
        samples_dropped = stats.samples_dropped,
        duration_secs = stats.duration.as_secs_f64(),
        rate_hz = format!("{:.2}", stats.rate_hz()),
        "Bridge completed"
    );
    stats.print_summary();

    info!("Unity Bridge finished");
    Ok(())
}

/// Apply command-line overrides and re-validate
fn apply_overrides(blueprint: &mut BridgeBlueprint, args: &RunArgs) -> Result<(), CliError> {
    if let Some(source) = args.source {
        info!(source = ?source, "Overriding state source from CLI");
        blueprint.source.kind = source.into();
    }
    if let Some(bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        blueprint.source.bind_addr = bind;
    }

    config_loader::ConfigLoader::validate(blueprint)
        .map_err(|e| CliError::config_validation(e.to_string()))
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &BridgeBlueprint) {
    let source = &blueprint.source;
    let conversion = &blueprint.conversion;

    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!("  Id: {}", source.id);
    println!("  Kind: {:?}", source.kind);
    match source.kind {
        contracts::SourceKind::Udp => {
            println!("  Bind: {} ({:?})", source.bind_addr, source.format)
        }
        contracts::SourceKind::Mock => println!("  Rate: {} Hz", source.rate_hz),
    }
    println!("  Drop policy: {:?}", source.drop_policy);

    println!("\nConversion:");
    println!("  Input: {}", conversion.input);
    println!("  Position map: {}", conversion.position_map);
    println!("  Angular velocity map: {}", conversion.angular_velocity_map);
    println!("  Euler readout: {:?}", conversion.euler_readout);

    let frames = &blueprint.frames;
    println!("\nFrames:");
    println!("  {} -> {}", frames.world, frames.body);
    println!("  {} -> {}", frames.rotation_anchor, frames.vehicle_rotation);

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
