//! imgconv: convert and resize images from the command line.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use imgconv_cli::output::Status;
use imgconv_core::config::{AdsConsent, Config, Theme};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "imgconv")]
#[command(about = "Convert images between PNG, JPEG, WebP, GIF and BMP, optionally resizing them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: .imgconv.toml, imgconv.toml, then the user config dir)
    #[arg(long, global = true, env = "IMGCONV_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one image and save it as converted-image.<ext>
    Convert {
        /// Image file to convert
        path: PathBuf,

        /// Output format: png, jpeg, webp, gif or bmp (default from config)
        #[arg(short, long)]
        format: Option<String>,

        /// Target width in pixels
        #[arg(short = 'W', long, allow_negative_numbers = true)]
        width: Option<i64>,

        /// Target height in pixels
        #[arg(short = 'H', long, allow_negative_numbers = true)]
        height: Option<i64>,

        /// Do not derive the other edge from the aspect ratio
        #[arg(long)]
        no_aspect: bool,

        /// Declared media type, instead of the one implied by the extension
        #[arg(long = "type", value_name = "MEDIA_TYPE")]
        media_type: Option<String>,

        /// Directory to save into (default from config, else current directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Convert every image in a directory
    Batch {
        /// Directory to scan
        dir: PathBuf,

        /// Directory to write converted images into
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Output format: png, jpeg, webp, gif or bmp (default from config)
        #[arg(short, long)]
        format: Option<String>,

        /// Target width in pixels
        #[arg(short = 'W', long, allow_negative_numbers = true)]
        width: Option<i64>,

        /// Target height in pixels
        #[arg(short = 'H', long, allow_negative_numbers = true)]
        height: Option<i64>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show format and dimensions of an image
    Info {
        /// Path to image file
        path: PathBuf,
    },

    /// Show or change saved preferences
    Prefs {
        /// Interface language (en, es, fr, de, zh, ja)
        #[arg(long)]
        language: Option<String>,

        /// Color theme
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        /// Ad consent choice
        #[arg(long, value_enum)]
        consent: Option<ConsentArg>,

        /// Default output format
        #[arg(long)]
        default_format: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ConsentArg {
    Personalized,
    NonPersonalized,
}

impl From<ConsentArg> for AdsConsent {
    fn from(arg: ConsentArg) -> Self {
        match arg {
            ConsentArg::Personalized => AdsConsent::Personalized,
            ConsentArg::NonPersonalized => AdsConsent::NonPersonalized,
        }
    }
}

fn init_tracing(verbose: u8, json: bool) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "off",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.log_json) {
        Status::warning(&e);
    }

    let result = Config::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Convert { path, format, width, height, no_aspect, media_type, out_dir } => {
            commands::convert::run(
                &config,
                commands::convert::ConvertArgs {
                    path,
                    format,
                    width,
                    height,
                    no_aspect,
                    media_type,
                    out_dir,
                },
                cli.json,
            )
        }

        Commands::Batch { dir, out_dir, format, width, height, recursive } => commands::batch::run(
            &config,
            commands::batch::BatchArgs {
                dir,
                out_dir,
                format,
                width,
                height,
                recursive,
            },
            cli.json,
        ),

        Commands::Info { path } => commands::info::run(&path, cli.json),

        Commands::Prefs { language, theme, consent, default_format } => commands::prefs::run(
            config,
            commands::prefs::PrefsArgs {
                language,
                theme: theme.map(Theme::from),
                consent: consent.map(AdsConsent::from),
                default_format,
            },
            cli.json,
        ),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = %e.code, error = %e.message, "Command failed");
            if cli.json {
                match serde_json::to_string_pretty(&e.to_report()) {
                    Ok(report) => println!("{}", report),
                    Err(_) => Status::report(&e),
                }
            } else {
                Status::report(&e);
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
