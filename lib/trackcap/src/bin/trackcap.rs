use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use clap::AppSettings;
use itertools::Itertools;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use structopt::StructOpt;
use tracing::*;

use trackcap::*;
use trackcap::data::*;

mod common;
use common::*;

#[derive(Debug, Copy, Clone)]
enum Mode {
    Required,
    Used,
    Both,
}

impl Mode {
    fn required(&self) -> bool { !matches!(self, Mode::Used) }

    fn used(&self) -> bool { !matches!(self, Mode::Required) }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "required" => Ok(Self::Required),
            "used" => Ok(Self::Used),
            "both" => Ok(Self::Both),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}


/// Daily train-pair capacity of the track sections of a route.
#[derive(Debug, StructOpt)]
#[structopt(name = "trackcap", global_settings = &[AppSettings::ColoredHelp])]
struct ClArgs {
    /// Directory holding the section files.
    #[structopt(parse(from_os_str))]
    dataset: PathBuf,
    /// Glob selecting the section files. Without it the route order comes from INDEX.txt.
    #[structopt(long)]
    pattern: Option<String>,
    /// Only evaluate the sections at these indices.
    #[structopt(long, use_delimiter=true)]
    only: Option<Vec<usize>>,
    /// `required` applies the capacity formula, `used` sums the scheduled train pairs.
    #[structopt(long, short="m", parse(try_from_str), possible_values=&["required", "used", "both"], default_value="required")]
    mode: Mode,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    #[structopt(flatten)]
    output: OutputOptions,
}


struct SectionCapacity {
    id: String,
    required: Option<TrackCapacity>,
    used: Option<TrackCapacity>,
}

impl SectionCapacity {
    fn compute(section: &SectionInstance, mode: Mode) -> Self {
        SectionCapacity {
            id: section.id.clone(),
            required: if mode.required() { Some(TrackCapacity::for_section(section)) } else { None },
            used: if mode.used() { Some(section.motion.to_track_capacity()) } else { None },
        }
    }

    fn capacities(&self) -> impl Iterator<Item=(&'static str, TrackCapacity)> {
        vec![("required", self.required), ("used", self.used)].into_iter()
            .filter_map(|(kind, cap)| cap.map(|c| (kind, c)))
    }

    fn to_json(&self) -> json::JsonValue {
        let mut record = json::JsonValue::new_object();
        record["id"] = self.id.as_str().into();
        for (kind, cap) in self.capacities() {
            record[kind] = track_record(cap);
        }
        return record
    }
}

struct RouteReport {
    sections: Vec<SectionCapacity>,
    total: SectionCapacity,
}

impl RouteReport {
    #[instrument(level="info", skip(sections))]
    fn build(sections: &[SectionInstance], mode: Mode) -> anyhow::Result<Self> {
        let sections: Vec<_> = sections.par_iter()
            .map(|s| SectionCapacity::compute(s, mode))
            .collect();

        let total_of = |kind: &str, cap: fn(&SectionCapacity) -> Option<TrackCapacity>| -> anyhow::Result<Option<TrackCapacity>> {
            let caps: Option<Vec<_>> = sections.iter().map(cap).collect();
            match caps {
                Some(caps) => TrackCapacity::par_checked_total(&caps)
                    .map(Some)
                    .ok_or_else(|| anyhow::anyhow!("{} route total overflows", kind)),
                None => Ok(None),
            }
        };
        let total = SectionCapacity {
            id: "total".to_string(),
            required: total_of("required", |s| s.required)?,
            used: total_of("used", |s| s.used)?,
        };

        let failed = sections.iter().filter(|s| s.required.map_or(false, |c| c.is_failed())).map(|s| &s.id).join(", ");
        if !failed.is_empty() {
            warn!(%failed, "route total is failed");
        }
        Ok(RouteReport { sections, total })
    }
}

fn term_record(term: CapacityTerm) -> json::JsonValue {
    match term {
        CapacityTerm::NotModeled => json::JsonValue::Null,
        CapacityTerm::Measured { primary_cargo, secondary_passenger, primary_passenger, secondary_cargo } => json::object! {
            primary_cargo: primary_cargo,
            secondary_passenger: secondary_passenger,
            primary_passenger: primary_passenger,
            secondary_cargo: secondary_cargo,
            trivial: term.is_trivial(),
        },
    }
}

fn track_record(cap: TrackCapacity) -> json::JsonValue {
    match cap {
        TrackCapacity::Failed => "failed".into(),
        TrackCapacity::Ok { odd, even } => json::object! {
            odd: term_record(odd),
            even: term_record(even),
        },
    }
}

fn term_cell(term: CapacityTerm) -> String {
    match term {
        CapacityTerm::NotModeled => "not modeled".to_string(),
        CapacityTerm::Measured { primary_cargo, secondary_passenger, primary_passenger, secondary_cargo } =>
            format!("{:>8} {:>8} {:>8} {:>8}", primary_cargo, secondary_passenger, primary_passenger, secondary_cargo),
    }
}

impl CapacityReport for RouteReport {
    fn to_json(&self) -> json::JsonValue {
        let sections: Vec<_> = self.sections.iter().map(SectionCapacity::to_json).collect();
        let mut root = json::JsonValue::new_object();
        root["sections"] = sections.into();
        root["total"] = self.total.to_json();
        return root
    }

    fn to_json_summary(&self) -> json::JsonValue {
        let mut root = self.total.to_json();
        root.remove("id");
        root["sections"] = self.sections.len().into();
        return root
    }

    fn write_table(&self, buf: &mut dyn io::Write) -> io::Result<()> {
        writeln!(buf, "{:<16} {:<8} {:<4} {:>8} {:>8} {:>8} {:>8}", "section", "kind", "dir", "cargo", "sec.pass", "pass", "sec.cargo")?;
        for row in self.sections.iter().chain(std::iter::once(&self.total)) {
            for (kind, cap) in row.capacities() {
                match cap {
                    TrackCapacity::Failed => writeln!(buf, "{:<16} {:<8} failed", row.id, kind)?,
                    TrackCapacity::Ok { odd, even } => {
                        writeln!(buf, "{:<16} {:<8} {:<4} {}", row.id, kind, "odd", term_cell(odd))?;
                        writeln!(buf, "{:<16} {:<8} {:<4} {}", row.id, kind, "even", term_cell(even))?;
                    }
                }
            }
        }
        Ok(())
    }
}


fn main() -> anyhow::Result<()> {
    let args : ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.as_ref())?;
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global()?;

    let sections = load_route(&args.dataset, args.pattern.as_deref(), args.only.clone())?;
    info!(count = sections.len(), order = %sections.iter().map(|s| s.id.as_str()).join(","), "route loaded");

    let report = RouteReport::build(&sections, args.mode)?;
    output_report(&args.output, &report)?;
    Ok(())
}
