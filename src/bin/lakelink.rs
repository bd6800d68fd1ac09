//! lakelink command-line entry point.
//!
//! Links a specimen export to a survey card table and writes the matched
//! table to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lakelink::{write_matched, LinkInputs, LinkagePipeline, LinkageProfile};

#[derive(Debug, Parser)]
#[command(
    name = "lakelink",
    version,
    about = "Match museum specimen lots to historical lake survey cards"
)]
struct Cli {
    /// Specimen occurrence table (GBIF export)
    #[arg(long)]
    specimens: PathBuf,

    /// Lake survey card table
    #[arg(long)]
    surveys: PathBuf,

    /// Linkage profile JSON [default: bundled profile]
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Output file [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output delimiter
    #[arg(long, default_value = ",")]
    output_delimiter: String,

    /// Specimen delimiter [default: tab for .tsv/.txt, comma otherwise]
    #[arg(long)]
    specimen_delimiter: Option<String>,

    /// Survey delimiter [default: tab for .tsv/.txt, comma otherwise]
    #[arg(long)]
    survey_delimiter: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Accepts a single ASCII character, the escape `\t` or the word `tab`.
fn parse_delimiter(value: &str) -> anyhow::Result<u8> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => bail!("delimiter must be one ASCII character, got {v:?}"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let profile = match &cli.profile {
        Some(path) => LinkageProfile::load(path)
            .with_context(|| format!("loading profile {}", path.display()))?,
        None => LinkageProfile::bundled().context("loading bundled profile")?,
    };

    let inputs = LinkInputs {
        specimens: cli.specimens.clone(),
        surveys: cli.surveys.clone(),
        specimen_delimiter: cli.specimen_delimiter.as_deref().map(parse_delimiter).transpose()?,
        survey_delimiter: cli.survey_delimiter.as_deref().map(parse_delimiter).transpose()?,
    };
    let output_delimiter = parse_delimiter(&cli.output_delimiter)?;

    let pipeline = LinkagePipeline::new(profile);
    let outcome = pipeline.run_files(&inputs)?;
    let report = &outcome.report;
    info!(
        input = report.normalize.input,
        normalized = report.normalize.output,
        unresolved_localities = report.parse.unresolved,
        joined = report.matching.joined,
        excluded = report.matching.excluded,
        "run summary"
    );

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output {}", path.display()))?;
            write_matched(&outcome.matched, BufWriter::new(file), output_delimiter)?;
        }
        None => write_matched(&outcome.matched, io::stdout().lock(), output_delimiter)?,
    }

    info!(
        matched = report.matching.matched,
        distinct_lakes = report.matching.distinct_lakes,
        "wrote matched table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
    }

    #[test]
    fn test_parse_delimiter_rejects_non_single_ascii() {
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(",;").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "lakelink",
            "--specimens",
            "occurrence.txt",
            "--surveys",
            "cards.csv",
        ])
        .unwrap();
        assert_eq!(cli.output, None);
        assert_eq!(cli.profile, None);
        assert_eq!(cli.output_delimiter, ",");
        assert_eq!(cli.specimen_delimiter, None);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_explicit_options() {
        let cli = Cli::try_parse_from([
            "lakelink",
            "--specimens",
            "occurrence.dat",
            "--surveys",
            "cards.dat",
            "-o",
            "matched.tsv",
            "--output-delimiter",
            "tab",
            "--specimen-delimiter",
            "\\t",
            "--survey-delimiter",
            ";",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("matched.tsv")));
        assert_eq!(parse_delimiter(&cli.output_delimiter).unwrap(), b'\t');
        assert_eq!(
            cli.specimen_delimiter.as_deref().map(parse_delimiter).transpose().unwrap(),
            Some(b'\t')
        );
        assert_eq!(
            cli.survey_delimiter.as_deref().map(parse_delimiter).transpose().unwrap(),
            Some(b';')
        );
    }

    #[test]
    fn test_cli_requires_both_inputs() {
        assert!(Cli::try_parse_from(["lakelink", "--specimens", "occurrence.txt"]).is_err());
    }
}
