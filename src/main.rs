//! UEFORMAT CLI
//!
//! Command-line inspector for UEFORMAT model files: header and LOD
//! summaries, material face ranges, and morph target listings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use ueformat_parsers::{
    LodLevel, ParseOptions, Parser as ParserTrait, UeModel, UeModelParser,
};

/// ueformat - UEFORMAT model reader and inspection tool
#[derive(Parser)]
#[command(name = "ueformat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Treat declared-vs-consumed chunk size mismatches as errors
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show header and summary information for a model file
    Info(FileArgs),

    /// List LODs with their stream counts
    Lods(FileArgs),

    /// List material face ranges per LOD
    Materials(FileArgs),

    /// List morph targets per LOD
    Morphs(FileArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Path to the .uemodel file
    path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Info(args) => {
            let model = load_model(&args.path, cli.strict)?;
            print_info(&model, cli.format)
        }
        Commands::Lods(args) => {
            let model = load_model(&args.path, cli.strict)?;
            print_lods(&model, cli.format)
        }
        Commands::Materials(args) => {
            let model = load_model(&args.path, cli.strict)?;
            print_materials(&model, cli.format)
        }
        Commands::Morphs(args) => {
            let model = load_model(&args.path, cli.strict)?;
            print_morphs(&model, cli.format)
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbosity >= 2)
        .init();
}

fn load_model(path: &PathBuf, strict: bool) -> Result<UeModel> {
    let options = ParseOptions {
        strict_validation: strict,
        ..Default::default()
    };

    let parser = UeModelParser::new();
    parser
        .parse_file_with_options(path, &options, None)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_info(model: &UeModel, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(model)?);
        return Ok(());
    }

    let header = &model.header;
    println!("Object:      {}", header.object_name);
    println!("Identifier:  {}", header.identifier);
    println!(
        "Version:     {} ({:?})",
        header.file_version,
        header.version()
    );
    match &header.compression {
        Some(envelope) => println!(
            "Compression: {} ({} -> {} bytes)",
            envelope.method, envelope.compressed_size, envelope.uncompressed_size
        ),
        None => println!("Compression: none"),
    }
    println!();
    println!("LODs:        {}", model.lods.len());
    println!("Vertices:    {}", model.vertex_count());
    println!("Triangles:   {}", model.triangle_count());
    println!("Skinned:     {}", if model.is_skinned() { "yes" } else { "no" });
    println!(
        "Morphs:      {}",
        if model.has_morph_targets() { "yes" } else { "no" }
    );

    Ok(())
}

fn print_lods(model: &UeModel, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&model.lods)?);
        return Ok(());
    }

    for lod in &model.lods {
        println!("{}", lod.name);
        println!("  vertices:       {}", lod.vertex_count());
        println!("  triangles:      {}", lod.triangle_count());
        println!("  uv channels:    {}", lod.uv_channel_count());
        println!("  color channels: {}", lod.vertex_colors.len());
        println!("  materials:      {}", lod.materials.len());
        println!("  weights:        {}", lod.weights.len());
        println!("  morph targets:  {}", lod.morph_targets.len());
        if let Some(bounds) = lod.bounding_box() {
            let size = bounds.size();
            println!(
                "  bounds:         {:.3} x {:.3} x {:.3}",
                size.x, size.y, size.z
            );
        }
    }

    Ok(())
}

fn print_materials(model: &UeModel, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let per_lod: Vec<_> = model
            .lods
            .iter()
            .map(|lod| (&lod.name, &lod.materials))
            .collect();
        println!("{}", serde_json::to_string_pretty(&per_lod)?);
        return Ok(());
    }

    for lod in &model.lods {
        println!("{} ({} faces)", lod.name, lod.triangle_count());
        for (slot, range) in lod.materials.iter().enumerate() {
            let last_face = material_span_end(lod, slot);
            println!(
                "  [{}] {} faces {}..{}",
                slot, range.name, range.first_index, last_face
            );
        }
    }

    Ok(())
}

/// Exclusive end face of a material slot: the next range's start, or the
/// end of the index buffer for the last slot
fn material_span_end(lod: &LodLevel, slot: usize) -> usize {
    lod.materials
        .get(slot + 1)
        .map(|next| next.first_index as usize)
        .unwrap_or_else(|| lod.triangle_count())
}

fn print_morphs(model: &UeModel, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let per_lod: Vec<_> = model
            .lods
            .iter()
            .map(|lod| (&lod.name, &lod.morph_targets))
            .collect();
        println!("{}", serde_json::to_string_pretty(&per_lod)?);
        return Ok(());
    }

    for lod in &model.lods {
        if lod.morph_targets.is_empty() {
            continue;
        }
        println!("{}", lod.name);
        for morph in &lod.morph_targets {
            println!("  {} ({} deltas)", morph.name, morph.deltas.len());
        }
    }

    Ok(())
}
