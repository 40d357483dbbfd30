//! lawlens CLI - legal PDF text extraction and paragraph ranking

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use lawlens::{
    to_json, Analysis, BackendPaths, DigitalExtractor, DigitalOutcome, Document, Importance,
    JsonFormat, Pipeline, PipelineOptions,
};

#[derive(Parser)]
#[command(name = "lawlens")]
#[command(version)]
#[command(about = "Extract text from legal PDFs and rank paragraphs by keyword density", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to the tesseract executable
    #[arg(long, global = true, env = "TESSERACT_PATH", value_name = "PATH")]
    tesseract: Option<PathBuf>,

    /// Directory containing pdfinfo and pdftoppm
    #[arg(long, global = true, env = "POPPLER_BIN_PATH", value_name = "DIR")]
    poppler_bin: Option<PathBuf>,

    /// OCR rasterization resolution
    #[arg(long, global = true, default_value_t = lawlens::ocr::DEFAULT_DPI)]
    dpi: u32,

    /// Pages rasterized per OCR batch
    #[arg(long, global = true, default_value_t = lawlens::ocr::DEFAULT_BATCH_SIZE)]
    batch_size: u32,

    /// Concurrent OCR workers (default: CPU count, at least 4)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Digital text shorter than this triggers OCR
    #[arg(long, global = true, default_value_t = lawlens::extract::DEFAULT_MIN_DIGITAL_CHARS)]
    min_digital_chars: usize,

    /// Fragments shorter than this are not paragraphs
    #[arg(long, global = true, default_value_t = lawlens::text::DEFAULT_MIN_PARAGRAPH_CHARS)]
    min_paragraph_chars: usize,

    /// Stop OCR after this many seconds; remaining pages are skipped
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Tesseract language
    #[arg(long, global = true, default_value = "eng")]
    lang: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized text of a PDF
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Score paragraphs against keywords
    Analyze {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Keyword (repeatable)
        #[arg(short, long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,

        /// File with one keyword per line ('#' starts a comment)
        #[arg(long, value_name = "FILE")]
        keywords_file: Option<PathBuf>,

        /// Density at which a paragraph is high importance
        #[arg(long, default_value_t = lawlens::score::DEFAULT_HIGH_THRESHOLD)]
        threshold: usize,

        /// Density at which a paragraph is medium importance
        #[arg(long)]
        medium: Option<usize>,

        /// Output pretty JSON
        #[arg(long, conflicts_with = "compact")]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show page count and whether OCR would be needed
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match cli.command {
        Commands::Text { input, output } => cmd_text(&cli.global, &input, output.as_deref()),
        Commands::Analyze {
            input,
            keywords,
            keywords_file,
            threshold,
            medium,
            json,
            compact,
            output,
        } => {
            let format = match (json, compact) {
                (_, true) => Some(JsonFormat::Compact),
                (true, false) => Some(JsonFormat::Pretty),
                (false, false) => None,
            };
            cmd_analyze(
                &cli.global,
                &input,
                keywords,
                keywords_file.as_deref(),
                threshold,
                medium,
                format,
                output.as_deref(),
            )
        }
        Commands::Info { input, json } => cmd_info(&cli.global, &input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn pipeline_options(args: &GlobalArgs) -> PipelineOptions {
    let mut options = PipelineOptions::new()
        .with_dpi(args.dpi)
        .with_batch_size(args.batch_size)
        .with_min_digital_chars(args.min_digital_chars)
        .with_min_paragraph_chars(args.min_paragraph_chars)
        .with_language(args.lang.clone())
        .with_clean_keywords(true);

    if let Some(workers) = args.workers {
        options = options.with_workers(workers);
    }
    if let Some(secs) = args.timeout {
        options = options.with_ocr_timeout(Duration::from_secs(secs));
    }
    options
}

fn build_pipeline(
    args: &GlobalArgs,
    options: PipelineOptions,
) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let paths = BackendPaths {
        tesseract: args.tesseract.clone(),
        poppler_bin: args.poppler_bin.clone(),
    };
    Ok(Pipeline::with_system_backends(options, &paths)?)
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_text(
    args: &GlobalArgs,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::open(input)?;
    let pipeline = build_pipeline(args, pipeline_options(args))?;

    let pb = spinner("Extracting text...")?;
    let extracted = pipeline.extract_text(&doc);
    pb.finish_and_clear();
    let extracted = extracted?;

    if extracted.report.failed_pages() > 0 {
        log::warn!("{} pages failed OCR", extracted.report.failed_pages());
    }

    write_output(output, &pipeline.normalize(&extracted.text))
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    args: &GlobalArgs,
    input: &Path,
    keywords: Vec<String>,
    keywords_file: Option<&Path>,
    threshold: usize,
    medium: Option<usize>,
    format: Option<JsonFormat>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let keywords = collect_keywords(keywords, keywords_file)?;

    let mut options = pipeline_options(args).with_high_threshold(threshold);
    if let Some(medium) = medium {
        options = options.with_medium_threshold(medium);
    }

    let doc = Document::open(input)?;
    let pipeline = build_pipeline(args, options)?;

    let pb = spinner("Analyzing...")?;
    let analysis = pipeline.analyze(&doc, &keywords);
    pb.finish_and_clear();
    let analysis = analysis?;

    match format {
        Some(format) => write_output(output, &to_json(&analysis, format)?),
        None => write_output(output, &render_summary(input, &analysis)),
    }
}

fn collect_keywords(
    mut keywords: Vec<String>,
    keywords_file: Option<&Path>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if let Some(path) = keywords_file {
        keywords.extend(read_keywords_file(path)?);
    }
    if keywords.is_empty() {
        log::warn!("No keywords given; every paragraph will be low importance");
    }
    Ok(keywords)
}

fn read_keywords_file(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn render_summary(input: &Path, analysis: &Analysis) -> String {
    let metrics = &analysis.metrics;
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Analysis".cyan().bold()));
    out.push_str(&format!("{}\n", "─".repeat(40).dimmed()));
    out.push_str(&format!("{}: {}\n", "File".bold(), input.display()));
    out.push_str(&format!(
        "{}: {} ({} pages)\n",
        "Extraction".bold(),
        analysis.extraction.method,
        analysis.extraction.page_count
    ));
    if let Some(reason) = &analysis.extraction.fallback_reason {
        out.push_str(&format!("{}: {}\n", "OCR reason".bold(), reason));
    }
    let failed = analysis.extraction.failed_pages();
    let skipped = analysis.extraction.skipped_pages();
    if failed + skipped > 0 {
        out.push_str(&format!(
            "{}: {} failed, {} skipped\n",
            "Page problems".yellow().bold(),
            failed,
            skipped
        ));
    }
    out.push_str(&format!("{}: {}\n", "Keywords".bold(), analysis.keywords.join(", ")));
    out.push_str(&format!(
        "{}: {} ({} high, {} medium, {} low)\n",
        "Paragraphs".bold(),
        metrics.total_paragraphs,
        metrics.high.to_string().red().bold(),
        metrics.medium.to_string().yellow(),
        metrics.low
    ));

    for record in analysis
        .records
        .iter()
        .filter(|r| r.importance != Importance::Low)
    {
        let tag = match record.importance {
            Importance::High => "HIGH".red().bold(),
            _ => "MED ".yellow(),
        };
        out.push_str(&format!(
            "\n{} {} {}",
            tag,
            format!("[{}]", record.density).dimmed(),
            truncate(&record.paragraph, 160)
        ));
    }

    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn cmd_info(args: &GlobalArgs, input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::open(input)?;
    let extractor = DigitalExtractor::new(args.min_digital_chars);
    let outcome = extractor.extract(&doc);

    let (pages, chars) = match &outcome {
        DigitalOutcome::Sufficient(extracted) => (
            Some(extracted.report.page_count),
            extracted.text.chars().count(),
        ),
        DigitalOutcome::Insufficient { chars, page_count } => (Some(*page_count), *chars),
        DigitalOutcome::Failed(_) => (None, 0),
    };
    let reason = outcome.fallback_reason(extractor.min_chars());

    if json {
        let info = serde_json::json!({
            "file": input.display().to_string(),
            "bytes": doc.len(),
            "pages": pages,
            "digital_chars": chars,
            "needs_ocr": reason.is_some(),
            "reason": reason,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Size".bold(), format_bytes(doc.len()));
    match pages {
        Some(pages) => println!("{}: {}", "Pages".bold(), pages),
        None => println!("{}: {}", "Pages".bold(), "unknown".dimmed()),
    }
    println!("{}: {}", "Digital text".bold(), chars);

    match reason {
        Some(reason) => println!("{}: {} ({})", "OCR needed".bold(), "Yes".yellow(), reason),
        None => println!("{}: {}", "OCR needed".bold(), "No".green()),
    }

    Ok(())
}

fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn cmd_version() {
    println!("{} {}", "lawlens".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Legal PDF text extraction and paragraph ranking");
    println!();
    println!("OCR backends: tesseract, poppler (pdfinfo, pdftoppm)");
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "lawlens", "analyze", "lease.pdf", "-k", "tenant", "-k", "rent", "--medium", "1",
            "--dpi", "300", "--compact",
        ])
        .unwrap();

        assert_eq!(cli.global.dpi, 300);
        match cli.command {
            Commands::Analyze {
                keywords,
                medium,
                threshold,
                compact,
                ..
            } => {
                assert_eq!(keywords, vec!["tenant", "rent"]);
                assert_eq!(medium, Some(1));
                assert_eq!(threshold, 2);
                assert!(compact);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_pipeline_options_from_args() {
        let cli = Cli::try_parse_from([
            "lawlens", "text", "a.pdf", "--workers", "6", "--timeout", "30", "--lang", "deu",
        ])
        .unwrap();
        let options = pipeline_options(&cli.global);

        assert_eq!(options.workers, 6);
        assert_eq!(options.ocr_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.language, "deu");
        assert!(options.clean_keywords);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_read_keywords_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.txt");
        fs::write(&path, "# lease terms\ntenant\n\n  security deposit  \n#rent\n").unwrap();

        assert_eq!(
            read_keywords_file(&path).unwrap(),
            vec!["tenant", "security deposit"]
        );
    }

    #[test]
    fn test_analyze_without_keywords() {
        let cli = Cli::try_parse_from(["lawlens", "analyze", "a.pdf"]).unwrap();
        match cli.command {
            Commands::Analyze {
                keywords,
                keywords_file,
                ..
            } => {
                let keywords = collect_keywords(keywords, keywords_file.as_deref()).unwrap();
                assert!(keywords.is_empty());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_collect_keywords_merges_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.txt");
        fs::write(&path, "rent\n").unwrap();

        let keywords = collect_keywords(vec!["tenant".to_string()], Some(&path)).unwrap();
        assert_eq!(keywords, vec!["tenant", "rent"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef ghij", 7), "abcdef...");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
