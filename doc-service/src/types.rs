use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Target output format. Matching is exact on the lowercased tag; anything outside the
/// closed set is kept verbatim (lowercased) as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FormatTag {
    #[default]
    Excel,
    Pdf,
    Word,
    Pptx,
    Csv,
    Other(String),
}

impl FormatTag {
    pub fn as_str(&self) -> &str {
        match self {
            FormatTag::Excel => "excel",
            FormatTag::Pdf => "pdf",
            FormatTag::Word => "word",
            FormatTag::Pptx => "pptx",
            FormatTag::Csv => "csv",
            FormatTag::Other(tag) => tag,
        }
    }
}

impl FromStr for FormatTag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.to_lowercase();
        Ok(match tag.as_str() {
            "excel" => FormatTag::Excel,
            "pdf" => FormatTag::Pdf,
            "word" => FormatTag::Word,
            "pptx" => FormatTag::Pptx,
            "csv" => FormatTag::Csv,
            _ => FormatTag::Other(tag),
        })
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent to `POST {base}/generate_{format}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentPayload {
    Excel(ExcelPayload),
    Report(ReportPayload),
    Word(WordPayload),
    Pptx(PptxPayload),
    Table(TablePayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcelPayload {
    pub titulo: String,
    pub data: TablePayload,
}

/// Shared by `pdf` and the generic fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub title: String,
    pub sections: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPayload {
    pub placeholders: WordPlaceholders,
    pub content: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPlaceholders {
    pub titulo: String,
    pub subtitulo: String,
    pub autor: String,
    pub fecha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PptxPayload {
    pub title: String,
    pub subtitle: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    H1,
    P,
    Heading,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Summary,
    Closing,
}
