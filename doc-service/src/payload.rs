//! Payload shaping per format tag.
//!
//! Everything here is pure: identical inputs always produce identical payloads.

use serde::Serialize;
use serde_json::{ser::Formatter, Map, Value};
use std::io;

use crate::types::{
    Block, BlockKind, DocumentPayload, ExcelPayload, FormatTag, PptxPayload, ReportPayload, Slide,
    SlideKind, TablePayload, WordPayload, WordPlaceholders,
};

const EXCEL_TITLE: &str = "Reporte generado por AuditBrain";
const EXCEL_PLACEHOLDER_COLUMN: &str = "Resultado";

const PDF_TITLE: &str = "Informe de Resultados";
const PDF_HEADING: &str = "Resultados Analíticos";

const WORD_TITLE: &str = "Informe Corporativo";
const WORD_SUBTITLE: &str = "Resultados de Auditoría / Consultoría";
const WORD_AUTHOR: &str = "Audit Consulting IA Suite";
const WORD_DATE: &str = "2025-12-09";
const WORD_HEADING: &str = "Resultados Generales";

const PPTX_TITLE: &str = "Presentación Ejecutiva - AuditBrain";
const PPTX_SUBTITLE: &str = "Resumen de Resultados y KPIs";
const PPTX_SUMMARY_TITLE: &str = "Indicadores Clave";
const PPTX_CLOSING_TITLE: &str = "Conclusiones";
const PPTX_CLOSING_BULLET: &str = "Generado automáticamente por AuditBrain IA Suite.";

const CSV_FALLBACK_HEADERS: [&str; 2] = ["Campo", "Valor"];
const CSV_FALLBACK_LABEL: &str = "Resultado";

const GENERIC_TITLE: &str = "Reporte General";

/// Context keys read by the builders
const CONTEXT_TASK_NAME: &str = "task_name";
const CONTEXT_AUTHOR: &str = "author";
const CONTEXT_DATE: &str = "date";

/// Build the payload for `format` from a script result and the caller's execution context.
pub fn build_payload(
    format: &FormatTag,
    result: &Value,
    execution_context: &Map<String, Value>,
) -> DocumentPayload {
    match format {
        FormatTag::Excel => DocumentPayload::Excel(ExcelPayload {
            titulo: context_str(execution_context, CONTEXT_TASK_NAME, EXCEL_TITLE),
            data: single_row_table(result),
        }),
        FormatTag::Pdf => DocumentPayload::Report(ReportPayload {
            title: PDF_TITLE.to_string(),
            sections: vec![
                block(BlockKind::H1, PDF_HEADING),
                block(BlockKind::P, &pretty_json(result)),
            ],
        }),
        FormatTag::Word => DocumentPayload::Word(WordPayload {
            placeholders: WordPlaceholders {
                titulo: WORD_TITLE.to_string(),
                subtitulo: WORD_SUBTITLE.to_string(),
                autor: context_str(execution_context, CONTEXT_AUTHOR, WORD_AUTHOR),
                fecha: context_str(execution_context, CONTEXT_DATE, WORD_DATE),
            },
            content: vec![
                block(BlockKind::Heading, WORD_HEADING),
                block(BlockKind::Paragraph, &pretty_json(result)),
            ],
        }),
        FormatTag::Pptx => DocumentPayload::Pptx(PptxPayload {
            title: PPTX_TITLE.to_string(),
            subtitle: PPTX_SUBTITLE.to_string(),
            slides: vec![
                Slide {
                    kind: SlideKind::Summary,
                    title: PPTX_SUMMARY_TITLE.to_string(),
                    bullets: bullets(result),
                },
                Slide {
                    kind: SlideKind::Closing,
                    title: PPTX_CLOSING_TITLE.to_string(),
                    bullets: vec![PPTX_CLOSING_BULLET.to_string()],
                },
            ],
        }),
        FormatTag::Csv => DocumentPayload::Table(csv_table(result)),
        FormatTag::Other(_) => DocumentPayload::Report(ReportPayload {
            title: GENERIC_TITLE.to_string(),
            sections: vec![block(BlockKind::P, &spaced_json(result))],
        }),
    }
}

/// Strings are taken verbatim; every other value is rendered as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn single_row_table(result: &Value) -> TablePayload {
    match result {
        Value::Object(map) => TablePayload {
            headers: map.keys().cloned().collect(),
            rows: vec![map.values().map(stringify).collect()],
        },
        other => TablePayload {
            headers: vec![EXCEL_PLACEHOLDER_COLUMN.to_string()],
            rows: vec![vec![stringify(other)]],
        },
    }
}

fn csv_table(result: &Value) -> TablePayload {
    match result {
        Value::Object(_) => single_row_table(result),
        Value::Array(records) if is_record_list(records) => {
            let headers: Vec<String> = records
                .first()
                .and_then(Value::as_object)
                .map(|first| first.keys().cloned().collect())
                .unwrap_or_default();
            let rows = records
                .iter()
                .filter_map(Value::as_object)
                .map(|record| {
                    headers
                        .iter()
                        .map(|h| record.get(h).map(stringify).unwrap_or_default())
                        .collect()
                })
                .collect();
            TablePayload { headers, rows }
        }
        other => TablePayload {
            headers: CSV_FALLBACK_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: vec![vec![CSV_FALLBACK_LABEL.to_string(), stringify(other)]],
        },
    }
}

fn is_record_list(values: &[Value]) -> bool {
    !values.is_empty() && values.iter().all(Value::is_object)
}

fn bullets(result: &Value) -> Vec<String> {
    match result {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, stringify(value)))
            .collect(),
        other => vec![stringify(other)],
    }
}

fn block(kind: BlockKind, text: &str) -> Block {
    Block {
        kind,
        text: text.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Single-line JSON with `", "` and `": "` separators.
fn spaced_json(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn context_str(context: &Map<String, Value>, key: &str, default: &str) -> String {
    context
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
