use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use artiax_io::{ArtiaxConfig, FormatRegistry, ParticleFormat, RegistryError};
use artiax_model::{AttributeRange, ParticleList, PixelSizes};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

/// Inspect, filter and rewrite cryo-ET particle lists
#[derive(Parser, Debug)]
#[command(name = "artiax")]
struct Args {
    /// TOML file with default format and pixel sizes
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// format name or nickname; defaults to the file extension
    #[arg(long, global = true)]
    format: Option<String>,

    /// print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// lists the known formats and their nicknames
    Formats,

    /// prints particle count, pixel sizes and per-attribute ranges
    Info { file: PathBuf },

    /// reads a list and writes it back, to OUTPUT or in place
    Rewrite {
        input: PathBuf,
        output: Option<PathBuf>,
    },

    /// keeps particles whose attribute lies in [min, max]
    Filter {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        attr: String,
        #[arg(long, allow_negative_numbers = true)]
        min: f64,
        #[arg(long, allow_negative_numbers = true)]
        max: f64,
    },
}

#[derive(Debug, Serialize)]
struct FormatSummary {
    name: &'static str,
    nicks: &'static [&'static str],
    extensions: &'static [&'static str],
    writable: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct AttributeSummary {
    key: &'static str,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ListSummary {
    format: &'static str,
    file: Option<PathBuf>,
    particles: usize,
    pixel_sizes: PixelSizes,
    attributes: Vec<AttributeSummary>,
}

#[derive(Debug, Serialize, PartialEq)]
struct FilterReport {
    kept: usize,
    removed: usize,
    output: PathBuf,
}

fn summarize(list: &dyn ParticleList) -> Result<ListSummary, RegistryError> {
    let attributes = list
        .data_keys()
        .iter()
        .map(|&key| -> Result<AttributeSummary, RegistryError> {
            let range = list.attribute_range(key)?;
            Ok(AttributeSummary {
                key,
                min: range.map(|(lo, _)| lo),
                max: range.map(|(_, hi)| hi),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ListSummary {
        format: list.format_name(),
        file: list.file_name().map(Path::to_path_buf),
        particles: list.len(),
        pixel_sizes: list.pixel_sizes(),
        attributes,
    })
}

/// Deletes every particle outside `range` and returns `(kept, removed)`.
fn retain_range(
    list: &mut dyn ParticleList,
    range: &AttributeRange,
) -> Result<(usize, usize), RegistryError> {
    let keep = list.select(std::slice::from_ref(range))?;
    let outside: Vec<_> = list
        .ids()
        .into_iter()
        .filter(|id| !keep.contains(id))
        .collect();
    let removed = list.delete_data(&outside);
    Ok((list.len(), removed))
}

fn print_summary(summary: &ListSummary) {
    println!("format: {}", summary.format);
    if let Some(file) = &summary.file {
        println!("file: {}", file.display());
    }
    println!("particles: {}", summary.particles);
    println!("origin_pixelsize: {}", summary.pixel_sizes.origin);
    println!("translation_pixelsize: {}", summary.pixel_sizes.translation);
    for attr in &summary.attributes {
        match (attr.min, attr.max) {
            (Some(min), Some(max)) => println!("{}: {min} .. {max}", attr.key),
            _ => println!("{}: -", attr.key),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve_format<'a>(
    registry: &'a FormatRegistry,
    args: &Args,
    config: &ArtiaxConfig,
    path: &Path,
) -> Result<&'a ParticleFormat, RegistryError> {
    match (&args.format, registry.by_extension(path)) {
        (Some(name), _) => registry.get(name),
        (None, Some(format)) => Ok(format),
        (None, None) => registry.get(&config.default_format),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => ArtiaxConfig::load(path)?,
        None => ArtiaxConfig::default(),
    };
    let registry = FormatRegistry::with_builtin();

    match &args.command {
        Command::Formats => {
            let formats: Vec<FormatSummary> = registry
                .formats()
                .iter()
                .map(|f| FormatSummary {
                    name: f.name,
                    nicks: f.nicks,
                    extensions: f.extensions,
                    writable: f.writable,
                })
                .collect();
            if args.json {
                return Ok(print_json(&formats)?);
            }
            for format in formats {
                println!("{}: {}", format.name, format.nicks.join(", "));
            }
        }
        Command::Info { file } => {
            let format = resolve_format(&registry, args, &config, file)?;
            let list = (format.open)(file, config.pixel_sizes)?;
            let summary = summarize(list.as_ref())?;
            if args.json {
                return Ok(print_json(&summary)?);
            }
            print_summary(&summary);
        }
        Command::Rewrite { input, output } => {
            let format = resolve_format(&registry, args, &config, input)?;
            let list = (format.open)(input, config.pixel_sizes)?;
            let written = registry.save(list.as_ref(), format.name, output.as_deref())?;
            info!("rewrote {} particles", list.len());
            println!("{}", written.display());
        }
        Command::Filter {
            input,
            output,
            attr,
            min,
            max,
        } => {
            let format = resolve_format(&registry, args, &config, input)?;
            let mut list = (format.open)(input, config.pixel_sizes)?;
            let (kept, removed) =
                retain_range(list.as_mut(), &AttributeRange::new(attr.as_str(), *min, *max))?;
            let written = registry.save(list.as_ref(), format.name, Some(output.as_path()))?;
            let report = FilterReport {
                kept,
                removed,
                output: written,
            };
            if args.json {
                return Ok(print_json(&report)?);
            }
            println!("kept: {}", report.kept);
            println!("removed: {}", report.removed);
            println!("output: {}", report.output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LIST: &str = "data_stopgap_motivelist\n\nloop_\n_motl_idx\n_tomo_num\n_object\n_subtomo_num\n_halfset\n_orig_x\n_orig_y\n_orig_z\n_score\n_x_shift\n_y_shift\n_z_shift\n_phi\n_psi\n_the\n_class\n\
1 1 1 1 A 11 21 31 0.5 0 0 0 0 0 0 1\n\
2 1 1 2 B 12 22 32 0.1 0 0 0 0 0 0 2\n\
3 1 1 3 A 13 23 33 0.9 0 0 0 0 0 0 1\n";

    fn open(dir: &Path) -> Box<dyn ParticleList> {
        let path = dir.join("list.star");
        fs::write(&path, LIST).expect("fixture");
        FormatRegistry::with_builtin()
            .open("stopgap", &path, PixelSizes::default())
            .expect("open")
    }

    #[test]
    fn args_parse_filter_with_negative_bounds() {
        let args = Args::try_parse_from([
            "artiax", "--json", "filter", "a.star", "b.star", "--attr", "phi", "--min", "-90",
            "--max", "90",
        ])
        .expect("valid arguments");
        assert!(args.json);
        match args.command {
            Command::Filter { attr, min, max, .. } => {
                assert_eq!(attr, "phi");
                assert_eq!((min, max), (-90.0, 90.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn summary_reports_ranges_in_schema_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let list = open(dir.path());
        let summary = summarize(list.as_ref()).expect("summary");
        assert_eq!(summary.particles, 3);
        assert_eq!(summary.attributes[0].key, "motl_idx");
        let score = summary
            .attributes
            .iter()
            .find(|a| a.key == "score")
            .expect("score column");
        assert_eq!((score.min, score.max), (Some(0.1), Some(0.9)));
    }

    #[test]
    fn retain_range_drops_the_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut list = open(dir.path());
        let (kept, removed) =
            retain_range(list.as_mut(), &AttributeRange::new("score", 0.4, 1.0)).expect("filter");
        assert_eq!((kept, removed), (2, 1));
        assert!(retain_range(list.as_mut(), &AttributeRange::new("nope", 0.0, 1.0)).is_err());
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let registry = FormatRegistry::with_builtin();
        let config = ArtiaxConfig::default();
        let args = Args::try_parse_from(["artiax", "--format", "bogus", "info", "x.star"])
            .expect("valid arguments");
        assert!(resolve_format(&registry, &args, &config, Path::new("x.star")).is_err());

        let args = Args::try_parse_from(["artiax", "info", "x.txt"]).expect("valid arguments");
        let format = resolve_format(&registry, &args, &config, Path::new("x.txt"))
            .expect("falls back to the configured default");
        assert_eq!(format.name, artiax_io::STOPGAP);
    }
}
