use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

pub(crate) trait TextRow {
    fn text_line(&self) -> String;
}

#[derive(Serialize)]
struct ViewResponse<'a, T: Serialize> {
    view: &'a str,
    returned: usize,
    rows: &'a [T],
}

pub(crate) fn write_rows<T: Serialize + TextRow>(view: &str, rows: &[T], json: bool) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    if json {
        let response = ViewResponse {
            view,
            returned: rows.len(),
            rows,
        };
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize view output")?;
        writeln!(output)?;
    } else {
        writeln!(output, "View: {view}")?;
        writeln!(output, "Rows: {}", rows.len())?;
        for row in rows {
            writeln!(output, "{}", row.text_line())?;
        }
    }

    output.flush()?;
    Ok(())
}
