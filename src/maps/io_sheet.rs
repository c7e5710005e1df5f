// Readers for the raw results sheet.

use calamine::{open_workbook_auto, DataType, Range, Reader};

use crate::maps::io_common::extension;
use crate::maps::*;

/// Reads the data region of the sheet: every row after the header rows,
/// with the cells converted to the types of the tidy transform.
pub fn read_raw_table(
    path: &str,
    source: &SheetSource,
    layout: &SheetLayout,
) -> BMapsResult<RawTable> {
    let provider = match source.provider.as_ref() {
        Some(p) => p.to_lowercase(),
        None => match extension(path).as_deref() {
            Some("csv") | Some("txt") | Some("tsv") => "csv".to_string(),
            Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
                "excel".to_string()
            }
            _ => "unknown".to_string(),
        },
    };
    info!("Attempting to read sheet {:?} as {}", path, provider);
    let table = match provider.as_str() {
        "csv" => read_csv_table(path, source, layout.header_rows)?,
        "excel" => read_excel_table(path, source, layout.header_rows)?,
        x => {
            return Err(Box::new(MapsError::UnknownProvider {
                provider: x.to_string(),
                path: path.to_string(),
            }))
        }
    };
    check_width(path, &table, layout)?;
    Ok(table)
}

fn check_width(path: &str, table: &RawTable, layout: &SheetLayout) -> MapsResult<()> {
    let found = table.width();
    ensure!(
        found >= layout.min_columns,
        TooFewColumnsSnafu {
            path,
            found,
            required: layout.min_columns
        }
    );
    Ok(())
}

pub fn read_csv_table(path: &str, source: &SheetSource, header_rows: usize) -> BMapsResult<RawTable> {
    let delimiter = source.delimiter()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut rows: Vec<RawRow> = Vec::new();
    let mut next_line: usize = 1;
    for line_r in rdr.into_records() {
        let line = line_r.context(CsvLineParseSnafu { lineno: next_line })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(next_line);
        // Blank lines produce no record. They still count as rows of the sheet.
        for blank in next_line..lineno {
            if blank > header_rows {
                rows.push(Vec::new());
            }
        }
        // A quoted field may span several physical lines.
        let embedded: usize = line.iter().map(|f| f.matches('\n').count()).sum();
        next_line = lineno + embedded + 1;
        if lineno <= header_rows {
            debug!("read_csv_table: skipping header line {}: {:?}", lineno, line);
            continue;
        }
        let row: RawRow = line.iter().map(read_csv_cell).collect();
        rows.push(row);
    }
    Ok(RawTable {
        rows,
        skipped_rows: header_rows,
    })
}

fn read_csv_cell(s: &str) -> Cell {
    if s.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

pub fn read_excel_table(
    path: &str,
    source: &SheetSource,
    header_rows: usize,
) -> BMapsResult<RawTable> {
    let wrange = get_range(path, source)?;
    // The range starts at the first non-empty cell, not at A1.
    let (start_row, start_col) = wrange
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    debug!(
        "read_excel_table: range starts at row {} column {}",
        start_row + 1,
        start_col + 1
    );

    let mut rows: Vec<RawRow> = Vec::new();
    for _ in header_rows..start_row {
        rows.push(Vec::new());
    }
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = start_row + idx + 1;
        if lineno <= header_rows {
            debug!("read_excel_table: skipping header line {}: {:?}", lineno, row);
            continue;
        }
        let mut cells: RawRow = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(read_excel_cell));
        rows.push(cells);
    }
    Ok(RawTable {
        rows,
        skipped_rows: header_rows,
    })
}

fn read_excel_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::String(s) if s.trim().is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        // Dates and error cells are never vote counts: keep them readable
        // so that the coercion error shows what was found.
        other => Cell::Text(format!("#{:?}", other)),
    }
}

fn get_range(path: &str, source: &SheetSource) -> BMapsResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, source.worksheet_name
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(worksheet_name) = source.worksheet_name.as_ref() {
        workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {
                path,
                worksheet: worksheet_name.as_str(),
            })?
            .context(OpeningExcelSnafu { path })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {
                path,
                worksheet: "#0",
            })?
            .context(OpeningExcelSnafu { path })?
    };
    Ok(wrange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source(file_path: &str) -> SheetSource {
        SheetSource {
            provider: None,
            file_path: file_path.to_string(),
            delimiter: None,
            worksheet_name: None,
        }
    }

    fn small_layout(min_columns: usize) -> SheetLayout {
        SheetLayout {
            header_rows: 5,
            min_columns,
            ..SheetLayout::default_2017()
        }
    }

    fn write_lines(dir: &std::path::Path, name: &str, lines: &[&str]) -> String {
        let p = dir.join(name);
        let mut f = std::fs::File::create(&p).unwrap();
        for l in lines {
            writeln!(f, "{}", l).unwrap();
        }
        p.display().to_string()
    }

    #[test]
    fn header_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_lines(
            dir.path(),
            "kerg.csv",
            &[
                "Bundestagswahl 2017",
                "",
                "Nr;Gebiet;gehört zu",
                ";;;Erststimmen",
                ";;;Endgültig",
                "1;Flensburg;1;200",
                "2;Nordfriesland;1;-",
            ],
        );
        let table = read_raw_table(&p, &source(&p), &small_layout(4)).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped_rows, 5);
        assert_eq!(table.lineno(0), 6);
        assert_eq!(table.rows[0][1], Cell::Text("Flensburg".to_string()));
        assert_eq!(table.rows[1][3], Cell::Text("-".to_string()));
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_lines(
            dir.path(),
            "kerg.csv",
            &["a", "b", "c", "d", "e", "1;x", "2;y;;;5", ""],
        );
        let table = read_raw_table(&p, &source(&p), &small_layout(5)).unwrap();
        assert_eq!(table.width(), 5);
        assert_eq!(table.rows[1][2], Cell::Empty);
        assert_eq!(table.rows[1][4], Cell::Text("5".to_string()));
    }

    #[test]
    fn too_few_columns() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_lines(dir.path(), "kerg.csv", &["a", "b", "c", "d", "e", "1;x;3"]);
        let res = read_raw_table(&p, &source(&p), &SheetLayout::default_2017());
        match res {
            Err(e) => match *e {
                MapsError::TooFewColumns {
                    found, required, ..
                } => {
                    assert_eq!(found, 3);
                    assert_eq!(required, 190);
                }
                other => panic!("unexpected error {:?}", other),
            },
            Ok(_) => panic!("the sheet is too narrow"),
        }
    }

    #[test]
    fn quoted_field_over_two_lines() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_lines(
            dir.path(),
            "kerg.csv",
            &["a", "b", "c", "d", "e", "1;\"Flens\nburg\";3", "2;Kiel;4", "", "3;Lübeck;5"],
        );
        let table = read_raw_table(&p, &source(&p), &small_layout(3)).unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0][1], Cell::Text("Flens\nburg".to_string()));
        assert_eq!(table.rows[1][1], Cell::Text("Kiel".to_string()));
        assert!(table.rows[2].is_empty());
        assert_eq!(table.rows[3][1], Cell::Text("Lübeck".to_string()));
    }

    fn fixture(name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    // The data of the workbook starts at C4, with an empty row 6.
    #[test]
    fn excel_range_is_aligned_to_a1() {
        let p = fixture("offset_sheet.xlsx");
        let mut layout = small_layout(5);
        layout.header_rows = 2;
        let table = read_raw_table(&p, &source(&p), &layout).unwrap();
        assert_eq!(table.rows.len(), 5);
        // Row 3 sits between the header and the range.
        assert!(table.rows[0].is_empty());
        assert_eq!(table.lineno(1), 4);
        assert_eq!(table.rows[1][0], Cell::Empty);
        assert_eq!(table.rows[1][1], Cell::Empty);
        assert_eq!(table.rows[1][2], Cell::Number(1.0));
        assert_eq!(table.rows[1][3], Cell::Text("Flensburg".to_string()));
        assert_eq!(table.rows[1][4], Cell::Number(200.0));
        assert_eq!(table.rows[2][4], Cell::Text("-".to_string()));
        assert!(table.rows[3].iter().all(|c| *c == Cell::Empty));
        assert_eq!(table.rows[4][3], Cell::Text("Lübeck".to_string()));
    }

    #[test]
    fn excel_header_rows_overlap_the_range() {
        let p = fixture("offset_sheet.xlsx");
        let mut layout = small_layout(5);
        layout.header_rows = 4;
        let table = read_raw_table(&p, &source(&p), &layout).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.lineno(0), 5);
        assert_eq!(table.rows[0][2], Cell::Number(2.0));
        assert_eq!(table.rows[0][3], Cell::Text("Kiel".to_string()));

        let mut src = source(&p);
        src.worksheet_name = Some("kerg".to_string());
        assert!(read_raw_table(&p, &src, &layout).is_ok());
        src.worksheet_name = Some("missing".to_string());
        assert!(matches!(
            read_raw_table(&p, &src, &layout).map_err(|e| *e),
            Err(MapsError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn comma_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_lines(dir.path(), "kerg.txt", &["a", "b", "c", "d", "e", "1,x,3"]);
        let mut src = source(&p);
        src.delimiter = Some(",".to_string());
        let table = read_raw_table(&p, &src, &small_layout(3)).unwrap();
        assert_eq!(table.rows[0].len(), 3);
    }

    #[test]
    fn missing_file() {
        let res = read_raw_table(
            "/nonexistent/kerg.csv",
            &source("/nonexistent/kerg.csv"),
            &SheetLayout::default_2017(),
        );
        assert!(matches!(res.map_err(|e| e.kind()), Err(ErrorKind::Load)));

        let res = read_raw_table(
            "/nonexistent/kerg.xlsx",
            &source("/nonexistent/kerg.xlsx"),
            &SheetLayout::default_2017(),
        );
        assert!(matches!(res.map_err(|e| e.kind()), Err(ErrorKind::Load)));
    }

    #[test]
    fn unknown_provider() {
        let res = read_raw_table(
            "/data/kerg.parquet",
            &source("/data/kerg.parquet"),
            &SheetLayout::default_2017(),
        );
        assert!(matches!(
            res.map_err(|e| *e),
            Err(MapsError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn excel_cells() {
        assert_eq!(read_excel_cell(&DataType::Int(3)), Cell::Number(3.0));
        assert_eq!(read_excel_cell(&DataType::Float(2.5)), Cell::Number(2.5));
        assert_eq!(
            read_excel_cell(&DataType::String(" ".to_string())),
            Cell::Empty
        );
        assert_eq!(read_excel_cell(&DataType::Empty), Cell::Empty);
        assert_eq!(
            read_excel_cell(&DataType::Bool(true)),
            Cell::Text("true".to_string())
        );
    }
}
