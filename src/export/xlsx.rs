//! XLSX Workbook Writer
//! Writes a DataFrame as a single-sheet SpreadsheetML workbook.
//!
//! The package is assembled directly as ZIP entries holding the XML parts,
//! with fixed entry timestamps so identical frames give identical bytes.

use super::ExportError;
use polars::prelude::*;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use ::zip::write::FileOptions;
use ::zip::{CompressionMethod, DateTime, ZipWriter};

/// Excel's limit on sheet title length.
const MAX_SHEET_NAME: usize = 31;

/// One worksheet cell.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Workbook generator for exported accident tables.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Serialise `df` into an in-memory `.xlsx` file.
    ///
    /// Row 1 holds the column names; every following row is one frame row.
    /// Null cells are left blank.
    pub fn write_workbook(df: &DataFrame, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let sheet_name = Self::sheet_title(sheet_name);

        // 1. [Content_Types].xml
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml().as_bytes())?;

        // 2. _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        // 3. docProps
        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml(&sheet_name).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml(&sheet_name).as_bytes())?;

        // 4. Workbook and its relationships
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml(&sheet_name).as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml().as_bytes())?;

        // 5. Styles
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml().as_bytes())?;

        // 6. The data itself
        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::sheet_xml(df)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Sheet title with the characters Excel rejects replaced, cut to 31 chars.
    fn sheet_title(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| match c {
                '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
                c => c,
            })
            .take(MAX_SHEET_NAME)
            .collect();
        if cleaned.trim().is_empty() {
            "Sheet1".to_string()
        } else {
            cleaned
        }
    }

    /// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
    fn column_letter(mut index: usize) -> String {
        let mut letters = Vec::new();
        loop {
            letters.push(b'A' + (index % 26) as u8);
            if index < 26 {
                break;
            }
            index = index / 26 - 1;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Materialise one column as cells, choosing the cell kind from the dtype.
    fn column_cells(column: &Column) -> Result<Vec<Option<Cell>>, ExportError> {
        let cells = match column.dtype() {
            DataType::Boolean => column
                .bool()?
                .into_iter()
                .map(|v| v.map(Cell::Bool))
                .collect(),
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.filter(|f| f.is_finite()).map(Cell::Number))
                .collect(),
            _ => column
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|v| v.map(|s| Cell::Text(s.to_string())))
                .collect(),
        };
        Ok(cells)
    }

    fn sheet_xml(df: &DataFrame) -> Result<String, ExportError> {
        let letters: Vec<String> = (0..df.width()).map(Self::column_letter).collect();
        let columns: Vec<Vec<Option<Cell>>> = df
            .get_columns()
            .iter()
            .map(Self::column_cells)
            .collect::<Result<_, _>>()?;

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );

        xml.push_str(r#"<row r="1">"#);
        for (letter, name) in letters.iter().zip(df.get_column_names()) {
            Self::push_cell(&mut xml, letter, 1, &Cell::Text(name.to_string()));
        }
        xml.push_str("</row>");

        for row in 0..df.height() {
            let row_num = row + 2;
            let _ = write!(xml, r#"<row r="{row_num}">"#);
            for (letter, cells) in letters.iter().zip(&columns) {
                if let Some(cell) = &cells[row] {
                    Self::push_cell(&mut xml, letter, row_num, cell);
                }
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        Ok(xml)
    }

    fn push_cell(xml: &mut String, letter: &str, row_num: usize, cell: &Cell) {
        let _ = match cell {
            Cell::Text(text) => write!(
                xml,
                r#"<c r="{letter}{row_num}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                Self::escape_xml(text)
            ),
            Cell::Number(value) => write!(xml, r#"<c r="{letter}{row_num}"><v>{value}</v></c>"#),
            Cell::Bool(value) => write!(
                xml,
                r#"<c r="{letter}{row_num}" t="b"><v>{}</v></c>"#,
                u8::from(*value)
            ),
        };
    }

    /// Escape markup characters and drop control characters XML 1.0 forbids.
    fn escape_xml(s: &str) -> String {
        s.chars()
            .filter(|&c| c >= ' ' || matches!(c, '\t' | '\n' | '\r'))
            .collect::<String>()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }

    fn content_types_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#
            .to_string()
    }

    fn rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
            .to_string()
    }

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            Self::escape_xml(sheet_name)
        )
    }

    fn workbook_rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
            .to_string()
    }

    fn styles_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
            .to_string()
    }

    fn core_props_xml(title: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{}</dc:title>
<dc:creator>nyc-accidents</dc:creator>
</cp:coreProperties>"#,
            Self::escape_xml(title)
        )
    }

    fn app_props_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>nyc-accidents</Application>
<TitlesOfParts><vt:vector size="1" baseType="lpstr"><vt:lpstr>{}</vt:lpstr></vt:vector></TitlesOfParts>
</Properties>"#,
            Self::escape_xml(sheet_name)
        )
    }
}
