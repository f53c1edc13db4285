// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use anyhow::{bail, Result};
use itertools::{Itertools, MinMaxResult};
use log::info;
use quadbench::logs::filter::{apply_filters, Thresholds};
use quadbench::logs::measure::read_measure_logs;
use quadbench::logs::time::{read_time_logs, QueryCatalog, TimeLogRecord};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use structopt::StructOpt;

#[derive(Default, Clone, Debug, StructOpt)]
struct QuerierLogOpt {
    // Input file path.
    #[structopt(long, short, default_value = "querier/merged_logs.log")]
    path:           String,
    // Query catalog telling which queries aggregate.
    #[structopt(long, short)]
    queries:        Option<String>,
    // Minimum highest try of a (version, step, query) group.
    #[structopt(long, short)]
    repeat:         Option<u32>,
    // Minimum number of versions per store.
    #[structopt(long)]
    min_versions:   Option<usize>,
    // Minimum number of stores per version.
    #[structopt(long)]
    min_components: Option<usize>,
    // Parses [Measure] lines instead of timing objects; no filter applies.
    #[structopt(long, short)]
    measure:        bool,
    // Output file path.
    #[structopt(short = "o", long = "output", default_value = "querier/time_logs.csv")]
    output:         String,
}

impl QuerierLogOpt {
    fn thresholds(&self) -> Result<Thresholds> {
        let defaults = Thresholds::from_settings()?;
        Ok(Thresholds {
            repeat:         self.repeat.unwrap_or(defaults.repeat),
            min_versions:   self.min_versions.unwrap_or(defaults.min_versions),
            min_components: self.min_components.unwrap_or(defaults.min_components),
        })
    }
}

fn write_csv<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// First and last run of the records.
fn time_span(records: &[TimeLogRecord]) -> Option<(SystemTime, SystemTime)> {
    let at = |secs: u64| UNIX_EPOCH + Duration::from_secs(secs);
    match records.iter().map(|r| r.time).minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(t) => Some((at(t), at(t))),
        MinMaxResult::MinMax(first, last) => Some((at(first), at(last))),
    }
}

fn report(records: &[TimeLogRecord]) -> Result<()> {
    for (store, count) in records
        .iter()
        .map(|r| r.component_name.as_str())
        .counts()
        .into_iter()
        .sorted()
    {
        info!("{}: {} runs", store, count);
    }
    if let Some((first, last)) = time_span(records) {
        info!(
            "Runs from {} to {} ({})",
            humantime::format_rfc3339_seconds(first),
            humantime::format_rfc3339_seconds(last),
            humantime::format_duration(last.duration_since(first)?)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = QuerierLogOpt::from_args();
    if !Path::new(&opt.path).exists() {
        bail!("The log file ({}) doesn't exist.", opt.path);
    }
    let output = std::fs::File::create(&opt.output)?;

    if opt.measure {
        let records = read_measure_logs(&opt.path)?;
        info!("Measures: {}", records.len());
        write_csv(output, &records)?;
    } else {
        let mut records = read_time_logs(&opt.path)?;
        info!("Runs: {}", records.len());
        if let Some(queries) = &opt.queries {
            QueryCatalog::load(queries)?.tag(&mut records);
        }
        let records = apply_filters(records, &opt.thresholds()?);
        report(&records)?;
        write_csv(output, &records)?;
    }
    info!("Written {}", opt.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadbench::logs::time::parse_time_logs;

    const LOGS: &str = concat!(
        r#"{"component":"bench-dag-7k2xq-blazegraph-1-1-0","query":"/q/converg-3.rq","try":"1","duration":"12ms","version":"1","product":"1","step":"0","time":"1650000000"}"#,
        "\n",
        r#"{"component":"bench-dag-7k2xq-blazegraph-1-1-0","query":"/q/converg-3.rq","try":"2","duration":"9ms","version":"1","product":"1","step":"0","time":"1650000060"}"#,
        "\n",
    );

    #[test]
    fn csv_output() -> Result<()> {
        let records = parse_time_logs(LOGS.as_bytes())?;
        let mut buffer = vec![];
        write_csv(&mut buffer, &records)?;
        let text = String::from_utf8(buffer)?;
        let mut lines = text.lines();
        assert_eq!(
            Some("VERSION,PRODUCT,STEP,COMPONENT,DURATION (ms),QUERY,TRY,TIME,COMPONENT_NAME,AGGREGATIVE"),
            lines.next()
        );
        assert_eq!(
            Some("1,1,0,bench-dag-7k2xq-blazegraph-1-1-0,12,query-3,1,1650000000,blazegraph,"),
            lines.next()
        );
        assert_eq!(2, text.lines().count() - 1);
        Ok(())
    }

    #[test]
    fn span() -> Result<()> {
        let records = parse_time_logs(LOGS.as_bytes())?;
        let (first, last) = time_span(&records).unwrap();
        assert_eq!(Duration::from_secs(60), last.duration_since(first)?);
        assert_eq!(None, time_span(&[]));
        Ok(())
    }

    #[test]
    fn explicit_thresholds_win() -> Result<()> {
        let opt = QuerierLogOpt {
            repeat: Some(2),
            ..Default::default()
        };
        let thresholds = opt.thresholds()?;
        assert_eq!(2, thresholds.repeat);
        assert_eq!(4, thresholds.min_versions);
        Ok(())
    }
}
