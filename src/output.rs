//! Terminal output for query results and utility reports

use crate::dataset::sort::SortReport;
use crate::server::protocol::Verdict;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Stdout handle honoring the `--color` choice
pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn verdict_color(verdict: &Verdict) -> Color {
    match verdict {
        Verdict::Exists => Color::Green,
        Verdict::NotExist => Color::Yellow,
        Verdict::ServerError | Verdict::InvalidPayload(_) => Color::Red,
    }
}

/// Print the verdict for one query
///
/// With `show_query`, the line is prefixed with the query the way ripgrep
/// prefixes a path: `query:VERDICT`.
pub fn print_verdict<W: WriteColor>(
    out: &mut W,
    query: &str,
    verdict: &Verdict,
    show_query: bool,
) -> io::Result<()> {
    if show_query {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", query)?;
        out.reset()?;
        write!(out, ":")?;
    }

    out.set_color(ColorSpec::new().set_fg(Some(verdict_color(verdict))).set_bold(true))?;
    write!(out, "{}", verdict)?;
    out.reset()?;
    writeln!(out)?;

    Ok(())
}

/// Print the outcome of a `sort` run
pub fn print_sort_report<W: WriteColor>(out: &mut W, report: &SortReport) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", report.kept)?;
    out.reset()?;
    write!(out, " records sorted")?;
    if report.skipped > 0 {
        write!(out, ", ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "{}", report.skipped)?;
        out.reset()?;
        write!(out, " skipped (non-numeric key)")?;
    }
    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn render(f: impl FnOnce(&mut NoColor<Vec<u8>>) -> io::Result<()>) -> String {
        let mut out = NoColor::new(Vec::new());
        f(&mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_print_verdict_plain() {
        let text = render(|out| print_verdict(out, "abc", &Verdict::Exists, false));
        assert_eq!(text, "STRING EXISTS\n");
    }

    #[test]
    fn test_print_verdict_with_query() {
        let text = render(|out| print_verdict(out, "abc", &Verdict::NotExist, true));
        assert_eq!(text, "abc:STRING NOT EXIST\n");
    }

    #[test]
    fn test_print_sort_report() {
        let report = SortReport { kept: 10, skipped: 2 };
        let text = render(|out| print_sort_report(out, &report));
        assert_eq!(text, "10 records sorted, 2 skipped (non-numeric key)\n");

        let report = SortReport { kept: 3, skipped: 0 };
        assert_eq!(render(|out| print_sort_report(out, &report)), "3 records sorted\n");
    }
}
