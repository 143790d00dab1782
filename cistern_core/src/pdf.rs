//! # PDF Report Module
//!
//! Renders a sizing result as a two-page PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Display strings come from [`crate::presentation`] and are injected by
//!   placeholder replacement before compilation
//! - Page 2 is the methodology appendix from [`crate::equations::registry`]
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use cistern_core::calculations::{calculate, SizingInput, SizingParameters};
//! use cistern_core::pdf::{render_report_pdf, ReportMetadata, SizingReport};
//! use cistern_core::regions::RegionTable;
//!
//! let regions = RegionTable::builtin();
//! let input = SizingInput::new("sul", 100.0, 300.0);
//! let result = calculate(&input, &regions).unwrap();
//!
//! let report = SizingReport::new(
//!     &input,
//!     &result,
//!     &regions,
//!     SizingParameters::default(),
//!     ReportMetadata::new(),
//! ).unwrap();
//!
//! let pdf_bytes = render_report_pdf(&report).unwrap();
//! std::fs::write("relatorio-cisterna.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;
use uuid::Uuid;

use crate::calculations::sizing::{LimitingFactor, SizingInput, SizingParameters, SizingResult};
use crate::equations::registry::{generate_methodology_typst, sizing_equations};
use crate::errors::{CalcError, CalcResult};
use crate::presentation::{FormattedSizing, InputEcho};
use crate::regions::RegionTable;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Available fonts
    fonts: Vec<Font>,
    /// Library (standard functions)
    library: LazyHash<Library>,
    /// Date reported by `datetime.today()`
    today: DateTime<Utc>,
}

impl PdfWorld {
    fn new(source: String, today: DateTime<Utc>) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
            today,
        }
    }

    /// Bundled fonts from typst-assets (Libertinus Serif, New Computer Modern, DejaVu Sans Mono)
    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();
        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }
        fonts
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(
            self.today.year(),
            u8::try_from(self.today.month()).ok()?,
            u8::try_from(self.today.day()).ok()?,
        )
    }
}

// ============================================================================
// Report Data
// ============================================================================

/// Identification printed on every page of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique id, printed in the footer
    pub report_id: Uuid,
    /// Generation timestamp; also drives the Typst `today()` date
    pub generated_at: DateTime<Utc>,
    /// Name of whoever prepared the report
    pub prepared_by: Option<String>,
    /// Client or property owner
    pub client: Option<String>,
}

impl ReportMetadata {
    pub fn new() -> Self {
        ReportMetadata {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            prepared_by: None,
            client: None,
        }
    }

    pub fn with_prepared_by(mut self, name: impl Into<String>) -> Self {
        self.prepared_by = Some(name.into());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the report prints, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingReport {
    pub meta: ReportMetadata,
    pub echo: InputEcho,
    pub formatted: FormattedSizing,
    pub parameters: SizingParameters,
    pub limiting: LimitingFactor,
}

impl SizingReport {
    /// Assemble a report for a completed calculation.
    ///
    /// Fails with `InvalidInput` if the input's region is not in `regions`.
    pub fn new(
        input: &SizingInput,
        result: &SizingResult,
        regions: &RegionTable,
        parameters: SizingParameters,
        meta: ReportMetadata,
    ) -> CalcResult<Self> {
        let region = regions.lookup(&input.region)?;

        Ok(SizingReport {
            meta,
            echo: InputEcho::new(region, input),
            formatted: FormattedSizing::from_result(result),
            parameters,
            limiting: result.limiting_factor(),
        })
    }
}

// ============================================================================
// PDF Template
// ============================================================================

/// Typst template for the summary page
const REPORT_TEMPLATE: &str = r##"
#set document(title: "Dimensionamento de Cisterna")
#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Cisterna - Dimensionamento de Reservatório de Água de Chuva]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, auto, 1fr),
      align(left)[#text(size: 8pt)[Relatório {{REPORT_ID}}]],
      align(center)[#text(size: 9pt)[Página #counter(page).display()]],
      align(right)[#text(size: 9pt)[#datetime.today().display("[day]/[month]/[year]")]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt, lang: "pt", region: "br")

// Title Block
#align(center)[
  #block(width: 100%, fill: rgb("#e8f1f8"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Dimensionamento de Cisterna]
    #v(4pt)
    #text(size: 12pt)[Método Prático Alemão (ABNT NBR 15527)]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Identificação*
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 4pt,
      [Cliente:], [{{CLIENT}}],
      [Responsável:], [{{PREPARED_BY}}],
      [Data:], [{{DATE}}],
    )
  ],
  [
    *Dados de Entrada*
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 4pt,
      [Região:], [{{REGION}}],
      [Precipitação:], [{{RAINFALL}}],
      [Área de captação:], [{{AREA}}],
      [Demanda diária:], [{{DEMAND}}],
    )
  ],
)

#v(16pt)

== Resultado

#align(center)[
  #block(width: 100%, stroke: 1pt + rgb("#2b6cb0"), inset: 14pt, radius: 4pt)[
    #text(size: 11pt)[Volume recomendado do reservatório]
    #v(2pt)
    #text(size: 22pt, weight: "bold")[{{TANK_VOLUME}}]
    #h(8pt)
    #text(size: 12pt, fill: gray)[({{TANK_VOLUME_M3}})]
  ]
]

#v(12pt)

#table(
  columns: (1fr, auto),
  inset: 8pt,
  stroke: 0.5pt,
  table.header([*Indicador*], [*Valor*]),
  [Economia mensal estimada], [{{MONTHLY_SAVINGS}}],
  [Captação média mensal], [{{MONTHLY_CAPTURE}}],
  [Demanda mensal], [{{MONTHLY_DEMAND}}],
  [Autonomia do reservatório cheio], [{{AUTONOMY}}],
)

#v(12pt)

*Fator limitante:* {{LIMITING}}

#v(8pt)

#text(size: 9pt, fill: gray)[
  Valores estimados a partir da precipitação média anual da região. Volumes
  arredondados para cima; captação, demanda e autonomia arredondadas ao inteiro
  mais próximo. A metodologia completa está no anexo.
]
"##;

/// Build the Typst source for a report (summary page plus methodology appendix).
pub fn report_typst_source(report: &SizingReport) -> String {
    let not_informed = "Não informado".to_string();
    let client = report.meta.client.as_ref().unwrap_or(&not_informed);
    let prepared_by = report.meta.prepared_by.as_ref().unwrap_or(&not_informed);

    let mut source = REPORT_TEMPLATE
        .replace("{{REPORT_ID}}", &report.meta.report_id.to_string())
        .replace("{{DATE}}", &report.meta.generated_at.format("%d/%m/%Y").to_string())
        .replace("{{CLIENT}}", &escape_typst(client))
        .replace("{{PREPARED_BY}}", &escape_typst(prepared_by))
        .replace("{{REGION}}", &escape_typst(&report.echo.region_name))
        .replace("{{RAINFALL}}", &escape_typst(&report.echo.annual_rainfall))
        .replace("{{AREA}}", &escape_typst(&report.echo.catchment_area))
        .replace("{{DEMAND}}", &escape_typst(&report.echo.daily_demand))
        .replace("{{TANK_VOLUME}}", &escape_typst(&report.formatted.tank_volume))
        .replace("{{TANK_VOLUME_M3}}", &escape_typst(&report.formatted.tank_volume_m3))
        .replace("{{MONTHLY_SAVINGS}}", &escape_typst(&report.formatted.monthly_savings))
        .replace("{{MONTHLY_CAPTURE}}", &escape_typst(&report.formatted.monthly_capture))
        .replace("{{MONTHLY_DEMAND}}", &escape_typst(&report.formatted.monthly_demand))
        .replace("{{AUTONOMY}}", &escape_typst(&report.formatted.autonomy))
        .replace("{{LIMITING}}", report.limiting.display_name());

    let equations = sizing_equations(&report.parameters);
    source.push_str(&generate_methodology_typst(&equations, &report.parameters));

    source
}

/// Render a sizing report to PDF bytes.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::ReportFailed)` - If Typst compilation or PDF export fails
pub fn render_report_pdf(report: &SizingReport) -> CalcResult<Vec<u8>> {
    let source = report_typst_source(report);
    let world = PdfWorld::new(source, report.meta.generated_at);

    let warned = typst::compile(&world);
    for warning in &warned.warnings {
        log::warn!("Typst warning: {}", warning.message);
    }

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed("compile", error_msgs.join("; "))
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed("export", error_msgs.join("; "))
    })?;

    log::info!("Rendered report {} ({} bytes)", report.meta.report_id, pdf_bytes.len());
    Ok(pdf_bytes)
}

/// Escape text for Typst markup mode.
pub fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '/' => "\\/".to_string(),
            '~' => "\\~".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
