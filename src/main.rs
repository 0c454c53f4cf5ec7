//! # pplb-label
//!
//! Build a delivery label job without a printer attached.
//!
//! ```bash
//! # Raw job bytes to a file
//! pplb-label build --font NanumGothic.ttf --subdomain minjewel \
//!     --product "Eternity Ring" --serial FC2024000123 \
//!     --material 18K --weight 3.5 --size 13호 -o label.prn
//!
//! # Base64, exactly as handed to the print bridge
//! pplb-label build --font NanumGothic.ttf --subdomain minjewel \
//!     --product "Eternity Ring" --serial FC2024000123 --base64
//!
//! # Look at one rasterized line
//! pplb-label preview --font NanumGothic.ttf --size 16 "Eternity Ring" -o line.png
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pplb_label_printer::{
    build_delivery_job, printer::encode_job, rasterize_text, DeliveryLabelFields, FontBook,
    LabelError, PrintSettings,
};

#[derive(Parser, Debug)]
#[command(name = "pplb-label")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file (preferredPrinter, bridgeUrl, fontFamily, fontPath)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Font file; overrides fontPath from the settings
    #[arg(long, global = true, value_name = "FILE")]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a delivery label job
    Build {
        #[arg(long)]
        subdomain: String,
        #[arg(long)]
        product: String,
        /// flowCode printed as the barcode
        #[arg(long)]
        serial: String,
        #[arg(long)]
        material: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        main_stone_memo: Option<String>,
        #[arg(long)]
        assistant_stone_name: Option<String>,
        #[arg(long)]
        assistant_stone_memo: Option<String>,

        /// Write base64 instead of raw bytes
        #[arg(long)]
        base64: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rasterize a single line to PNG
    Preview {
        text: String,
        #[arg(long, default_value = "16")]
        size: u32,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => PrintSettings::load(path)?,
        None => PrintSettings::default(),
    };
    let font_path = cli
        .font
        .clone()
        .or_else(|| settings.font_path.clone())
        .ok_or_else(|| LabelError::Config("no font given (--font or fontPath)".into()))?;

    let mut fonts = FontBook::new();
    fonts.load_file(&settings.font_family, &font_path)?;

    match cli.command {
        Commands::Build {
            subdomain,
            product,
            serial,
            material,
            color,
            weight,
            size,
            main_stone_memo,
            assistant_stone_name,
            assistant_stone_memo,
            base64,
            output,
        } => {
            let fields = DeliveryLabelFields {
                subdomain,
                product_name: product,
                serial,
                material,
                color,
                weight,
                size,
                main_stone_memo,
                assistant_stone_name,
                assistant_stone_memo,
            };
            let job = build_delivery_job(&fonts, &settings.font_family, &fields).to_bytes();
            let out = if base64 { encode_job(&job).into_bytes() } else { job };

            match output {
                Some(path) => fs::write(path, &out)?,
                None => io::stdout().write_all(&out)?,
            }
        }
        Commands::Preview { text, size, output } => {
            let bitmap = rasterize_text(&fonts, &settings.font_family, &text, size)?;
            bitmap
                .to_gray_image()
                .save(&output)
                .map_err(|e| LabelError::Config(format!("cannot write {}: {e}", output.display())))?;
            eprintln!("{}x{} px -> {}", bitmap.width_px(), bitmap.height_px(), output.display());
        }
    }
    Ok(())
}
