use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::{Context, Result};
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  #[structopt(long="format", short="f", parse(try_from_str), default_value="json-summ", possible_values=&OUTPUT_FORMAT_STRINGS)]
  pub fmt: OutputFormat,
  /// Write the report here instead of stdout.
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Also write an ndjson trace log to this file.
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        match (minval, maxval) {
            (Some(y), _) if x < y => Err(format!("must be at least {}", y)),
            (_, Some(y)) if x > y => Err(format!("must be at most {}", y)),
            _ => Ok(()),
        }
    };
}

pub const OUTPUT_FORMAT_STRINGS: [&str; 3] = ["json", "json-summ", "table"];

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    Json,
    JsonSummary,
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Json),
            "json-summ" => Ok(Self::JsonSummary),
            "table" => Ok(Self::Table),
            _ => Err(format!("unknown output format: {}", s))
        };
    }
}


/// Something the binary can print in every [`OutputFormat`].
pub trait CapacityReport {
    fn to_json(&self) -> json::JsonValue;
    fn to_json_summary(&self) -> json::JsonValue;
    fn write_table(&self, buf: &mut dyn io::Write) -> io::Result<()>;

    fn write(&self, mut buf: impl io::Write, output: OutputFormat) -> Result<()> {
        match output {
            OutputFormat::Json => self.to_json().write_pretty(&mut buf, 2)?,
            OutputFormat::JsonSummary => self.to_json_summary().write_pretty(&mut buf, 2)?,
            OutputFormat::Table => self.write_table(&mut buf)?,
        };
        writeln!(buf)?;
        buf.flush()?;
        Ok(())
    }
}

pub fn output_report(options: &OutputOptions, report: &impl CapacityReport) -> Result<()> {
    match options.file.as_ref() {
        Some(path) => {
            let file = std::fs::File::create(path).with_context(|| format!("failed to create {:?}", path))?;
            report.write(io::BufWriter::new(file), options.fmt)
        }
        None => report.write(io::stdout(), options.fmt),
    }
}
