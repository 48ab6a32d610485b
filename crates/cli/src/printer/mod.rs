use std::io::{self, Write};

use serde::Serialize;
use trawl_engine::SearchMetrics;
use trawl_fs::FileRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn parse(s: &str) -> Self {
        match s {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    /// Maximum number of rows requested.
    pub limit: usize,
    pub show_timing: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorChoice::Auto,
            limit: trawl_runtime::DEFAULT_SEARCH_LIMIT,
            show_timing: true,
        }
    }
}

/// Static context about a print run.
#[derive(Debug)]
pub struct PrintContext<'a> {
    /// "search" or "list"
    pub kind: &'a str,
    pub query: Option<&'a str>,
    /// Rows about to be printed
    pub total: usize,
    /// The source may hold more rows than were fetched.
    pub truncated: bool,
    pub metrics: Option<&'a SearchMetrics>,
}

/// One row in the result stream.
#[derive(Debug)]
pub struct RecordRow<'a> {
    /// 1-based rank of this result.
    pub rank: usize,
    pub record: &'a FileRecord,
}

pub trait RecordPrinter {
    fn begin(&mut self, ctx: &PrintContext) -> io::Result<()>;

    fn print_row(&mut self, row: &RecordRow<'_>, ctx: &PrintContext) -> io::Result<()>;

    /// Footers, summaries and timing.
    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()>;
}

/// Build a printer writing to stdout/stderr.
pub fn stdout_printer(cfg: PrinterConfig) -> Box<dyn RecordPrinter> {
    match cfg.format {
        OutputFormat::Human => Box::new(HumanPrinter::<io::Stdout, io::Stderr>::stdout(cfg)),
        OutputFormat::Json => Box::new(JsonPrinter::new(io::stdout(), io::stderr(), cfg)),
    }
}

/// Byte count with a binary unit, e.g. `1.5 MiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn millis(d: Option<std::time::Duration>) -> f64 {
    d.unwrap_or_default().as_secs_f64() * 1000.0
}

pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// `Auto` means no color here; only `stdout()` can check for a TTY.
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        let use_color = cfg.color == ColorChoice::Always;
        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }

    #[inline]
    fn format_path(&self, path: &str) -> String {
        if self.use_color {
            format!("\x1b[32m{}\x1b[0m", path)
        } else {
            path.to_owned()
        }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> RecordPrinter for HumanPrinter<W, E> {
    fn begin(&mut self, _ctx: &PrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_row(&mut self, row: &RecordRow<'_>, _ctx: &PrintContext) -> io::Result<()> {
        let created = row.record.created_at.format("%Y-%m-%d %H:%M");
        let size = format_size(row.record.size);
        let path = self.format_path(&row.record.path);
        writeln!(self.out, "{created}  {size:>10}  {path}")
    }

    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()> {
        if ctx.truncated {
            writeln!(
                self.out,
                "... limited to {} results, use -n for more",
                self.cfg.limit
            )?;
        }

        if self.cfg.show_timing
            && let Some(m) = ctx.metrics
        {
            let prefix = if m.prefix_skipped() {
                "skipped".to_owned()
            } else {
                format!("{:.2}ms", millis(m.prefix_time))
            };

            writeln!(
                self.err,
                "\n[{}] {} results in {:.2}ms (suffix: {:.2}ms, full path: {}, merge: {:.2}ms)",
                ctx.kind,
                ctx.total,
                m.total().as_secs_f64() * 1000.0,
                millis(m.suffix_time),
                prefix,
                millis(m.merge_time),
            )?;
        }

        Ok(())
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    rank: usize,
    #[serde(flatten)]
    record: &'a FileRecord,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> RecordPrinter for JsonPrinter<W, E> {
    fn begin(&mut self, _ctx: &PrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_row(&mut self, row: &RecordRow<'_>, ctx: &PrintContext) -> io::Result<()> {
        let obj = JsonRow {
            kind: ctx.kind,
            query: ctx.query,
            rank: row.rank,
            record: row.record,
        };
        serde_json::to_writer(&mut self.out, &obj)?;
        writeln!(self.out)
    }

    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()> {
        if self.cfg.show_timing
            && let Some(m) = ctx.metrics
        {
            let obj = serde_json::json!({
                "type": "summary",
                "kind": ctx.kind,
                "query": ctx.query,
                "total": ctx.total,
                "truncated": ctx.truncated,
                "suffix_hits": m.suffix_hits,
                "prefix_hits": m.prefix_hits,
                "duplicates": m.duplicates,
                "timing_ms": {
                    "total": m.total().as_secs_f64() * 1000.0,
                    "suffix": millis(m.suffix_time),
                    "prefix": m.prefix_time.map(|d| d.as_secs_f64() * 1000.0),
                    "merge": millis(m.merge_time),
                }
            });
            writeln!(self.err, "{}", obj)?;
        }

        Ok(())
    }
}

/// Drive `printer` over `records`, ranking from 1.
pub fn print_records(
    printer: &mut dyn RecordPrinter,
    records: &[FileRecord],
    ctx: &PrintContext,
) -> io::Result<()> {
    printer.begin(ctx)?;
    for (i, record) in records.iter().enumerate() {
        printer.print_row(&RecordRow { rank: i + 1, record }, ctx)?;
    }
    printer.finish(ctx)
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
