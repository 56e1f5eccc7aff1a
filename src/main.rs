//! glosa - align notes with a TEI passage and render it highlighted

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use glosa::notes::{Annotation, parse_notes_json, parse_notes_xml_bytes};
use glosa::passage::parse_passages_json;
use glosa::{Edition, Error, Passage, TeiHtmlRenderer};

#[derive(Parser)]
#[command(name = "glosa")]
#[command(version, about = "Align scholarly notes with TEI passages", long_about = None)]
#[command(after_help = "EXAMPLES:
    glosa play.xml --notes notas.json --start sp1 --end sp9 -o pasaje.html
    glosa play.xml --notes notas.xml --passages pasajes.json --passage p3 --json
    glosa play.xml --notes notas.json --start v10 --end v20 --ids")]
struct Cli {
    /// TEI document
    #[arg(value_name = "TEI")]
    input: String,

    /// Notes file (JSON array, or TEI/XML with <note> elements)
    #[arg(short, long, value_name = "FILE")]
    notes: Option<String>,

    /// Stable id where the passage starts
    #[arg(long, requires = "end", conflicts_with = "passage")]
    start: Option<String>,

    /// Stable id where the passage ends
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Passage catalogue (JSON array)
    #[arg(long, value_name = "FILE", requires = "passage")]
    passages: Option<String>,

    /// Passage id from the catalogue
    #[arg(long, requires = "passages")]
    passage: Option<String>,

    /// Write the highlighted HTML here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Print the stable ids of the passage instead of HTML
    #[arg(long)]
    ids: bool,

    /// Print the notes of the passage instead of HTML
    #[arg(long)]
    list_notes: bool,

    /// Print the highlight report as JSON on stderr
    #[arg(long)]
    json: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let notes = match &cli.notes {
        Some(path) => load_notes(path)?,
        None => Vec::new(),
    };
    let edition = Edition::from_file(&cli.input, notes)?;
    let passage = select_passage(cli)?;

    let mut view = edition.passage(&passage, &TeiHtmlRenderer::default())?;

    if cli.ids {
        for id in view.ids() {
            println!("{id}");
        }
        return Ok(());
    }
    if cli.list_notes {
        for note in view.notes() {
            println!("{}\t{}\t{}", note.id, note.target.join(" "), note.text);
        }
        return Ok(());
    }

    let report = view.apply_highlights();
    if !cli.quiet {
        eprintln!(
            "{}: {} notes, {} wrappers, {} unresolved targets",
            passage.id,
            report.processed.len(),
            report.wrappers_created + report.wrappers_adopted,
            report.unresolved.len()
        );
    }
    if cli.json {
        eprintln!("{}", serde_json::to_string_pretty(report)?);
    }

    let html = view.to_html();
    match &cli.output {
        Some(path) => std::fs::write(path, html)?,
        None => println!("{html}"),
    }
    Ok(())
}

fn load_notes(path: &str) -> Result<Vec<Annotation>, Error> {
    let bytes = std::fs::read(path)?;
    let is_xml = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
    if is_xml {
        parse_notes_xml_bytes(&bytes)
    } else {
        parse_notes_json(&String::from_utf8(bytes)?)
    }
}

fn select_passage(cli: &Cli) -> Result<Passage, Error> {
    if let (Some(catalogue), Some(id)) = (&cli.passages, &cli.passage) {
        let passages = parse_passages_json(&std::fs::read_to_string(catalogue)?)?;
        return passages
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::MissingElement(format!("passage {id}")));
    }
    match (&cli.start, &cli.end) {
        (Some(start), Some(end)) => Ok(Passage::new(format!("{start}-{end}"), start.as_str(), end.as_str())),
        _ => Err(Error::MissingElement(
            "passage range (use --start/--end or --passages/--passage)".to_string(),
        )),
    }
}
