//! Table and value renderers: CSV, TSV, Markdown, HTML, JSON and
//! properties output.

use crate::table::types::Table;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::io::Write;

static LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

static IMAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").unwrap());

/// Comma-separated rows, header first. Cells containing a comma,
/// quote, or apostrophe are quoted with internal quotes doubled;
/// embedded newlines become a single space.
pub fn write_csv<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    writeln!(out, "{}", csv_line(&table.columns)).context("writing CSV header")?;
    for row in &table.rows {
        writeln!(out, "{}", csv_line(row)).context("writing CSV row")?;
    }
    Ok(())
}

fn csv_line(cells: &[String]) -> String {
    cells.iter().map(|cell| csv_cell(cell)).collect::<Vec<_>>().join(",")
}

fn csv_cell(cell: &str) -> String {
    let flat = cell.replace("\r\n", " ").replace(['\r', '\n'], " ");
    if flat.contains(',') || flat.contains('"') || flat.contains('\'') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

/// Tab-separated rows, header first. Tabs and carriage returns inside
/// cells become spaces.
pub fn write_tsv<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    writeln!(out, "{}", tsv_line(&table.columns)).context("writing TSV header")?;
    for row in &table.rows {
        writeln!(out, "{}", tsv_line(row)).context("writing TSV row")?;
    }
    Ok(())
}

fn tsv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| cell.replace(['\t', '\r'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}

/// A Markdown pipe table with cells padded to per-column width.
pub fn write_markdown<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }
    for width in &mut widths {
        *width += 1;
    }

    write_markdown_row(out, &table.columns, &widths)?;

    let mut separator = String::new();
    for width in &widths {
        separator.push_str("|-");
        separator.push_str(&"-".repeat(*width));
    }
    separator.push('|');
    writeln!(out, "{separator}").context("writing Markdown separator")?;

    for row in &table.rows {
        write_markdown_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_markdown_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str("| ");
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
    }
    line.push('|');
    writeln!(out, "{line}").context("writing Markdown row")?;
    Ok(())
}

/// The table as a pretty-printed JSON array of `{column: value}` row
/// objects.
pub fn write_json<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let mut array = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut object = serde_json::Map::new();
        for (column, cell) in table.columns.iter().zip(row) {
            object.insert(column.clone(), Value::String(cell.clone()));
        }
        array.push(Value::Object(object));
    }
    let text =
        serde_json::to_string_pretty(&Value::Array(array)).context("serializing table to JSON")?;
    writeln!(out, "{text}").context("writing JSON table")?;
    Ok(())
}

const HTML_PROLOGUE: &str = r##"<html>
<head>
    <script type="text/javascript">
    var upTriangle = String.fromCharCode(9650);
    var downTriangle = String.fromCharCode(9660);

    function sortTable(table, col, reverse)
    {
        var headerElements = table.tHead.children[0].children;
        for(e of headerElements)
        {
            e.style.backgroundColor = "#808080";
            e.innerHTML = e.innerHTML.replaceAll(new RegExp(upTriangle, "g"), '');
            e.innerHTML = e.innerHTML.replaceAll(new RegExp(downTriangle, "g"), '');
        }
        headerElements[col].style.backgroundColor = "#04AA6D";
        headerElements[col].innerHTML += reverse == 1 ? downTriangle : upTriangle;
        var tb = table.tBodies[0],
            tr = Array.prototype.slice.call(tb.rows, 0),
            i;
        reverse = -((+reverse) || -1);
        tr = tr.sort(function (a, b) {
            return reverse
                * (a.cells[col].textContent.trim()
                    .localeCompare(b.cells[col].textContent.trim(), 'en', {numeric: true})
                );
        });
        for(i = 0; i < tr.length; ++i) tb.appendChild(tr[i]);
    }

    function makeSortable(table)
    {
        var th = table.tHead, i;
        th && (th = th.rows[0]) && (th = th.cells);
        if (th) i = th.length;
        else return;
        while (--i >= 0) (function (i) {
            var dir = 1;
            th[i].addEventListener('click', function () {sortTable(table, i, (dir = 1 - dir))});
        }(i));
    }

    function makeAllSortable()
    {
        var t = document.body.getElementsByTagName('table'), i = t.length;
        while (--i >= 0) makeSortable(t[i]);
    }
    </script>
    <style>
    table
    {
        font-family: Arial, Helvetica, sans-serif;
        border-collapse: collapse;
        width: 100%;
    }

    td, th
    {
        border: 1px solid #ddd;
        padding: 8px;
    }

    tr:nth-child(even){background-color: #f2f2f2;}

    tr:hover {background-color: #ddd;}

    th {
        padding-top: 12px;
        padding-bottom: 12px;
        text-align: left;
        cursor: pointer;
        background-color: #808080;
        color: white;
    }

    img {
        max-height: 128px;
    }
    </style>
</head>
<body onload="makeAllSortable()">"##;

/// A standalone HTML page holding a click-to-sort table. Cells that
/// look like URLs become links, image URLs render inline.
pub fn write_html<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    writeln!(out, "{HTML_PROLOGUE}").context("writing HTML prologue")?;
    writeln!(out, "<table>\n<thead><tr>").context("writing HTML table head")?;
    let headers: String = table
        .columns
        .iter()
        .map(|column| format!("<th>{}</th>", escape_html(column)))
        .collect();
    writeln!(out, "{headers}").context("writing HTML headers")?;
    writeln!(out, "</tr></thead><tbody>").context("writing HTML table body")?;
    for row in &table.rows {
        let cells: String = row.iter().map(|cell| html_cell(cell)).collect();
        writeln!(out, "<tr>{cells}</tr>").context("writing HTML row")?;
    }
    writeln!(out, "</tbody></table></body></html>").context("writing HTML epilogue")?;
    Ok(())
}

fn html_cell(cell: &str) -> String {
    if LINK_REGEX.is_match(cell) {
        let escaped = escape_html(cell);
        if IMAGE_REGEX.is_match(cell) {
            format!(
                "<td><img src=\"{cell}\" onerror=\"this.style.display = 'none';\">\
                 <br /><a target=\"_blank\" href=\"{cell}\">{escaped}</a></td>"
            )
        } else {
            format!("<td><a target=\"_blank\" href=\"{cell}\">{escaped}</a></td>")
        }
    } else {
        format!("<td>{}</td>", escape_html(cell))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `path=value` lines in traversal order, with property-file escaping
/// for keys and values.
pub fn write_properties<W: Write>(out: &mut W, entries: &[(String, String)]) -> Result<()> {
    writeln!(out, "# generated by rollmill").context("writing properties header")?;
    for (key, value) in entries {
        writeln!(
            out,
            "{}={}",
            escape_property(key, true),
            escape_property(value, false)
        )
        .context("writing properties entry")?;
    }
    Ok(())
}

fn escape_property(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' | ' ' if is_key => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table {
            columns: vec!["name".to_string(), "note".to_string()],
            rows: vec![
                vec!["bob".to_string(), "a,b".to_string()],
                vec!["tom".to_string(), "said \"hi\"\nthen left".to_string()],
            ],
        }
    }

    fn render<F>(table: &Table, write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>, &Table) -> Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer, table).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn csv_quotes_and_doubles_special_cells() {
        let output = render(&sample_table(), write_csv);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "name,note");
        assert_eq!(lines[1], "bob,\"a,b\"");
        assert_eq!(lines[2], "tom,\"said \"\"hi\"\" then left\"");
    }

    #[test]
    fn csv_quotes_apostrophes() {
        let table = Table {
            columns: vec!["c".to_string()],
            rows: vec![vec!["it's".to_string()]],
        };
        let output = render(&table, write_csv);

        assert_eq!(output.lines().nth(1), Some("\"it's\""));
    }

    #[test]
    fn tsv_replaces_tabs_and_carriage_returns() {
        let table = Table {
            columns: vec!["c".to_string()],
            rows: vec![vec!["a\tb\rc".to_string()]],
        };
        let output = render(&table, write_tsv);

        assert_eq!(output.lines().nth(1), Some("a b c"));
    }

    #[test]
    fn markdown_pads_cells_and_draws_a_separator() {
        let table = Table {
            columns: vec!["a".to_string(), "bb".to_string()],
            rows: vec![vec!["xxx".to_string(), "y".to_string()]],
        };
        let output = render(&table, write_markdown);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "| a   | bb |");
        assert_eq!(lines[1], "|-----|----|");
        assert_eq!(lines[2], "| xxx | y  |");
    }

    #[test]
    fn json_output_parses_back_into_row_objects() {
        let output = render(&sample_table(), write_json);
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["name"], "bob");
        assert_eq!(parsed[1]["note"], "said \"hi\"\nthen left");
    }

    #[test]
    fn html_escapes_cells_and_links_urls() {
        let table = Table {
            columns: vec!["c".to_string()],
            rows: vec![
                vec!["a<b".to_string()],
                vec!["https://example.com/page".to_string()],
                vec!["https://example.com/pic.png".to_string()],
            ],
        };
        let output = render(&table, write_html);

        assert!(output.contains("<td>a&lt;b</td>"));
        assert!(output.contains("<a target=\"_blank\" href=\"https://example.com/page\">"));
        assert!(output.contains("<img src=\"https://example.com/pic.png\""));
    }

    #[test]
    fn properties_escape_separators_in_keys_only() {
        let entries = vec![("a b.c=d".to_string(), "x=y z".to_string())];
        let mut buffer = Vec::new();
        write_properties(&mut buffer, &entries).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("a\\ b.c\\=d=x=y z"));
    }
}
