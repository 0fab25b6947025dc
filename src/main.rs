mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, RenderArgs, UrlArgs};
use lifegrid::devices::{DESKTOP_PRESETS, PHONE_GROUPS};
use lifegrid::{generate_wallpaper, normalize, FontBook};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => run_render(&args),
        #[cfg(feature = "server")]
        Commands::Serve(args) => run_serve(args),
        Commands::Url(args) => run_url(&args),
        Commands::Devices => {
            print_devices();
            Ok(())
        }
    }
}

fn run_render(args: &RenderArgs) -> Result<()> {
    let now = args.now()?;
    let raw = args.raw_options(now)?;
    let config = normalize(&raw);
    let fonts = FontBook::discover(args.font.as_deref()).context("loading fonts")?;
    log::info!("rendering {}", cli::describe_target(&config));

    let wallpaper = generate_wallpaper(&config, now, Some(&fonts)).context("rendering")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| wallpaper.file_name().into());
    std::fs::write(&output, &wallpaper.png_data)
        .with_context(|| format!("writing {}", output.display()))?;

    log::info!(
        "wrote {} ({}x{} px, sha256 {})",
        output.display(),
        wallpaper.pixel_width,
        wallpaper.pixel_height,
        wallpaper.sha256_hex()
    );
    if args.data_url {
        println!("{}", wallpaper.data_url());
    }
    Ok(())
}

#[cfg(feature = "server")]
fn run_serve(args: cli::ServeArgs) -> Result<()> {
    let mut config = lifegrid::server::ServeConfig {
        addr: args.addr,
        font: args.font,
        ..Default::default()
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let server = lifegrid::server::WallpaperServer::bind(&config)?;
    server.run()?;
    Ok(())
}

fn run_url(args: &UrlArgs) -> Result<()> {
    let link = args.share_link()?;
    println!("{}", link.to_url(&args.base)?);
    Ok(())
}

fn print_devices() {
    for group in PHONE_GROUPS {
        println!("{}", group.name);
        for model in group.models {
            println!("  {:<56} {}x{}", model.label, model.width, model.height);
        }
    }
    println!("Desktop");
    for preset in DESKTOP_PRESETS {
        println!(
            "  {:<56} {}x{} (cell {}, gap {})",
            preset.label, preset.width, preset.height, preset.cell_size, preset.gap
        );
    }
}
