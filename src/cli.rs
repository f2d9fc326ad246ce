use crate::config::load_config;
use crate::document::Document;
use crate::layout::layout_all;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::text_metrics::measure_for;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pkgd", version, about = "Lay out and render nested package diagrams")]
pub struct Args {
    /// Input node document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables plus layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 800.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 600.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Laid-out geometry of every node
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    execute(&args)
}

fn execute(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let document = Document::from_json(&input)?;
    let (mut diagram, roots) = document.build()?;
    if roots.is_empty() {
        return Err(anyhow::anyhow!("No nodes found in input"));
    }
    log::info!("loaded {} nodes under {} roots", diagram.len(), roots.len());

    let measure = measure_for(&config.theme.font_family, config.layout.fast_text_metrics);
    layout_all(&mut diagram, measure.as_ref(), &config.theme, &config.layout);

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&diagram, &config.theme, &config.layout, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&diagram, &config.theme, &config.layout, &config.render);
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &diagram)?,
            None => println!("{}", layout_dump_json(&diagram)?),
        },
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
