use magicrank_core::RawFundamentals;

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, FetchOutput, ScreenOutput, TickersOutput};
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = match output {
                CommandOutput::Screen(screen) => to_json(screen, pretty)?,
                CommandOutput::Tickers(tickers) => to_json(tickers, pretty)?,
                CommandOutput::Fetch(fetch) => to_json(fetch, pretty)?,
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            let text = match output {
                CommandOutput::Screen(screen) => screen_table(screen),
                CommandOutput::Tickers(tickers) => tickers_table(tickers),
                CommandOutput::Fetch(fetch) => fetch_table(fetch),
            };
            print!("{text}");
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

fn screen_table(output: &ScreenOutput) -> String {
    let report = &output.report;
    let mut text = String::new();
    push_line(&mut text, format!("run_id      : {}", report.meta.run_id));
    push_line(&mut text, format!("started_at  : {}", report.meta.started_at));
    push_line(&mut text, format!("source      : {}", report.meta.source));
    push_line(&mut text, format!("elapsed_ms  : {}", report.meta.elapsed_ms));
    push_line(
        &mut text,
        format!(
            "tickers     : {} requested, {} ranked, {} missing, {} invalid",
            report.meta.counts.requested,
            report.meta.counts.ranked,
            report.meta.counts.missing,
            report.meta.counts.invalid
        ),
    );
    push_warnings(&mut text, &report.warnings);

    text.push('\n');
    push_line(
        &mut text,
        format!(
            "{:>4}  {:<12} {:>9} {:>9} {:>8} {:>8} {:>7}",
            "rank", "ticker", "rotc%", "ey%", "ev/ebit", "payback", "score"
        ),
    );
    let shown = output.top.unwrap_or(usize::MAX);
    for entry in report.ranked().iter().take(shown) {
        let record = &entry.record;
        push_line(
            &mut text,
            format!(
                "{:>4}  {:<12} {:>9.2} {:>9.2} {:>8.2} {:>8.2} {:>7.1}",
                entry.position,
                record.ticker.as_str(),
                record.rotc_pct(),
                record.earnings_yield_pct(),
                record.ev_to_ebit,
                record.payback_years,
                entry.magic_score
            ),
        );
    }
    if report.ranked().len() > shown {
        push_line(
            &mut text,
            format!("  ... {} more in {}", report.ranked().len() - shown, output.files.ranked.display()),
        );
    }

    if !report.missing().is_empty() {
        text.push('\n');
        push_line(&mut text, String::from("missing data:"));
        for entry in report.missing() {
            push_line(&mut text, format!("  - {}: {}", entry.ticker, entry.reason));
        }
    }
    if !report.invalid().is_empty() {
        text.push('\n');
        push_line(&mut text, String::from("invalid:"));
        for entry in report.invalid() {
            push_line(&mut text, format!("  - {}: {}", entry.ticker, entry.reason));
        }
    }

    text.push('\n');
    push_line(&mut text, String::from("files:"));
    for path in [&output.files.ranked, &output.files.missing, &output.files.invalid] {
        push_line(&mut text, format!("  {}", path.display()));
    }
    text
}

fn tickers_table(output: &TickersOutput) -> String {
    let mut text = String::new();
    for ticker in &output.tickers {
        push_line(&mut text, ticker.to_string());
    }
    if !output.duplicates.is_empty() {
        let duplicates = output
            .duplicates
            .iter()
            .map(|ticker| ticker.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        push_line(&mut text, format!("duplicates ignored: {duplicates}"));
    }
    text
}

fn fetch_table(output: &FetchOutput) -> String {
    let mut text = String::new();
    push_warnings(&mut text, &output.warnings);
    for result in &output.results {
        match (&result.fundamentals, &result.error) {
            (Some(raw), _) => push_fundamentals(&mut text, raw),
            (None, Some(error)) => {
                push_line(&mut text, format!("{}: {} ({})", result.ticker, error.message, error.code));
            }
            (None, None) => push_line(&mut text, format!("{}: no data", result.ticker)),
        }
    }
    text
}

fn push_fundamentals(text: &mut String, raw: &RawFundamentals) {
    push_line(
        text,
        format!("{} {}", raw.ticker, raw.name.as_deref().unwrap_or("")),
    );
    let fields = [
        ("ebit", raw.ebit),
        ("enterprise_value", raw.enterprise_value()),
        ("tangible_capital", raw.tangible_capital()),
        ("market_cap", raw.market_cap()),
        ("total_debt", raw.total_debt),
        ("cash", raw.cash),
    ];
    for (label, value) in fields {
        let value = value.map_or_else(|| String::from("-"), |value| format!("{value:.0}"));
        push_line(text, format!("  {label:<17}: {value}"));
    }
}

fn push_warnings(text: &mut String, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    push_line(text, String::from("warnings:"));
    for warning in warnings {
        push_line(text, format!("  - {warning}"));
    }
}

fn push_line(text: &mut String, line: String) {
    text.push_str(&line);
    text.push('\n');
}
