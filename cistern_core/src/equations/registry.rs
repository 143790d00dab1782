//! # Equation Registry
//!
//! Every formula the sizing method applies, with the metadata needed to
//! print the methodology appendix of the report and to generate
//! `EQUATIONS.md`. Names and descriptions are in Portuguese because they
//! are printed verbatim in the pt-BR report.
//!
//! ## Usage
//!
//! ```rust
//! use cistern_core::equations::registry::{sizing_equations, Equation};
//! use cistern_core::calculations::SizingParameters;
//!
//! let equations = sizing_equations(&SizingParameters::default());
//! assert!(equations.contains(&Equation::TankVolume));
//!
//! let meta = Equation::TankVolume.metadata();
//! println!("Formula: {}", meta.formula_plain);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::sizing::{SizingParameters, DOCUMENTED_RUNOFF_COEFFICIENT};
use crate::errors::{CalcError, CalcResult};
use crate::pdf::escape_typst;
use crate::presentation::{format_currency, format_number, format_number_trimmed};

// ============================================================================
// Code References
// ============================================================================

/// Source of an equation, cited in the appendix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// ABNT NBR 15527 - Aproveitamento de água de chuva de coberturas
    Nbr15527 { year: u16, annex: &'static str },
    /// Basic hydrology (rain depth times area)
    Hydrology,
    /// Definition used by this calculator (no external source)
    Definition,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Nbr15527 { year, annex } => {
                format!("ABNT NBR 15527:{}, {}", year, annex)
            }
            CodeReference::Hydrology => "Hidrologia básica".to_string(),
            CodeReference::Definition => "Definição do método".to_string(),
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for grouping equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Rainwater available from the catchment
    Capture,
    /// Water consumption
    Demand,
    /// Tank volume and autonomy
    Storage,
    /// Monetary savings
    Economics,
}

impl EquationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Capture => "Captação",
            EquationCategory::Demand => "Demanda",
            EquationCategory::Storage => "Reservatório",
            EquationCategory::Economics => "Economia",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Capture => 1,
            EquationCategory::Demand => 2,
            EquationCategory::Storage => 3,
            EquationCategory::Economics => 4,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol in Typst math notation (e.g., "V_\"cap\"")
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Formula in Typst math notation
    pub formula_typst: &'static str,
    /// Formula in plain text for markdown
    pub formula_plain: &'static str,
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
    /// Function implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the sizing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equation {
    /// V_cap = P * A
    AnnualCapture,
    /// V_cap = P * A * C
    RunoffCoefficient,
    /// V_cap,m = V_cap / 12
    MonthlyCapture,
    /// D_a = d * 365
    AnnualDemand,
    /// D_m = D_a / 12
    MonthlyDemand,
    /// V = f * min(V_cap, D_a)
    TankVolume,
    /// Autonomy = V / d
    Autonomy,
    /// E = min(V_cap,m, D_m) * tariff
    MonthlySavings,
}

/// Every equation in the registry, in appendix order.
pub const ALL_EQUATIONS: &[Equation] = &[
    Equation::AnnualCapture,
    Equation::RunoffCoefficient,
    Equation::MonthlyCapture,
    Equation::AnnualDemand,
    Equation::MonthlyDemand,
    Equation::TankVolume,
    Equation::Autonomy,
    Equation::MonthlySavings,
];

impl Equation {
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::AnnualCapture => EquationMetadata {
                name: "Volume anual captável",
                description: "Volume de chuva que cai sobre a área de captação em um ano",
                formula_typst: r#"$V_"cap" = P times A$"#,
                formula_plain: "V_cap = P * A",
                reference: CodeReference::Hydrology,
                variables: vec![
                    Variable::new("V_\"cap\"", "Volume anual captável", "L"),
                    Variable::new("P", "Precipitação média anual", "mm"),
                    Variable::new("A", "Área de captação", "m²"),
                ],
                assumptions: vec!["1 mm de chuva sobre 1 m² equivale a 1 L"],
                category: EquationCategory::Capture,
                source_function: "calculations::sizing::calculate_with",
            },

            Equation::RunoffCoefficient => EquationMetadata {
                name: "Captação com coeficiente de escoamento",
                description: "Volume anual captável descontadas as perdas por escoamento",
                formula_typst: r#"$V_"cap" = P times A times C$"#,
                formula_plain: "V_cap = P * A * C",
                reference: CodeReference::Nbr15527 { year: 2019, annex: "Seção 4.2" },
                variables: vec![
                    Variable::new("C", "Coeficiente de escoamento superficial", "-"),
                ],
                assumptions: vec!["Aplicado somente quando C < 1 é configurado"],
                category: EquationCategory::Capture,
                source_function: "calculations::sizing::calculate_with",
            },

            Equation::MonthlyCapture => EquationMetadata {
                name: "Captação média mensal",
                description: "Volume anual captável distribuído igualmente entre os meses",
                formula_typst: r#"$V_("cap,m") = V_"cap" / 12$"#,
                formula_plain: "V_cap,m = V_cap / 12",
                reference: CodeReference::Definition,
                variables: vec![
                    Variable::new("V_(\"cap,m\")", "Captação média mensal", "L/mês"),
                ],
                assumptions: vec!["Chuva uniforme ao longo do ano"],
                category: EquationCategory::Capture,
                source_function: "units::Liters::per_month",
            },

            Equation::AnnualDemand => EquationMetadata {
                name: "Demanda anual",
                description: "Consumo de água não potável em um ano",
                formula_typst: r#"$D_a = d times 365$"#,
                formula_plain: "D_a = d * 365",
                reference: CodeReference::Definition,
                variables: vec![
                    Variable::new("D_a", "Demanda anual", "L"),
                    Variable::new("d", "Demanda diária", "L/dia"),
                ],
                assumptions: vec!["Consumo diário constante", "Ano de 365 dias"],
                category: EquationCategory::Demand,
                source_function: "units::LitersPerDay::over_year",
            },

            Equation::MonthlyDemand => EquationMetadata {
                name: "Demanda mensal",
                description: "Demanda anual distribuída igualmente entre os meses",
                formula_typst: r#"$D_m = D_a / 12$"#,
                formula_plain: "D_m = D_a / 12",
                reference: CodeReference::Definition,
                variables: vec![
                    Variable::new("D_m", "Demanda mensal", "L/mês"),
                ],
                assumptions: vec![],
                category: EquationCategory::Demand,
                source_function: "units::Liters::per_month",
            },

            Equation::TankVolume => EquationMetadata {
                name: "Volume do reservatório (Método Prático Alemão)",
                description: "Volume adotado igual a uma fração do menor valor entre captação anual e demanda anual",
                formula_typst: r#"$V = f times min(V_"cap", D_a)$"#,
                formula_plain: "V = f * min(V_cap, D_a)",
                reference: CodeReference::Nbr15527 { year: 2007, annex: "Anexo A.6" },
                variables: vec![
                    Variable::new("V", "Volume do reservatório", "L"),
                    Variable::new("f", "Fração de armazenamento adotada", "-"),
                ],
                assumptions: vec![
                    "Fração f configurável",
                    "Valor exibido arredondado para cima",
                ],
                category: EquationCategory::Storage,
                source_function: "calculations::sizing::calculate_with",
            },

            Equation::Autonomy => EquationMetadata {
                name: "Autonomia",
                description: "Dias que o reservatório cheio atende a demanda sem reabastecimento",
                formula_typst: r#"$T = V / d$"#,
                formula_plain: "T = V / d",
                reference: CodeReference::Definition,
                variables: vec![
                    Variable::new("T", "Autonomia", "dias"),
                ],
                assumptions: vec!["Reservatório cheio", "Consumo diário constante"],
                category: EquationCategory::Storage,
                source_function: "calculations::sizing::calculate_with",
            },

            Equation::MonthlySavings => EquationMetadata {
                name: "Economia mensal estimada",
                description: "Valor da água de chuva efetivamente utilizada por mês",
                formula_typst: r#"$E = min(V_("cap,m"), D_m) times t$"#,
                formula_plain: "E = min(V_cap,m, D_m) * t",
                reference: CodeReference::Definition,
                variables: vec![
                    Variable::new("E", "Economia mensal", "R$/mês"),
                    Variable::new("t", "Tarifa de água", "R$/L"),
                ],
                assumptions: vec!["Tarifa fixa, sem faixas de consumo"],
                category: EquationCategory::Economics,
                source_function: "calculations::sizing::calculate_with",
            },
        }
    }

    /// Equations in a category, in registry order
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .copied()
            .filter(|eq| eq.metadata().category == category)
            .collect()
    }

    /// All categories in appendix order
    pub fn all_categories() -> Vec<EquationCategory> {
        let mut categories = vec![
            EquationCategory::Capture,
            EquationCategory::Demand,
            EquationCategory::Storage,
            EquationCategory::Economics,
        ];
        categories.sort_by_key(|c| c.sort_order());
        categories
    }
}

/// The equations a sizing run applies for a parameter set.
///
/// The run-off coefficient equation only appears when a coefficient below
/// 1.0 is configured.
pub fn sizing_equations(params: &SizingParameters) -> Vec<Equation> {
    ALL_EQUATIONS
        .iter()
        .copied()
        .filter(|eq| *eq != Equation::RunoffCoefficient || params.applies_runoff())
        .collect()
}

/// Paragraph stating how the run-off coefficient was treated.
pub fn runoff_statement(params: &SizingParameters) -> String {
    if params.applies_runoff() {
        format!(
            "A captação foi reduzida pelo coeficiente de escoamento C = {}.",
            format_number_trimmed(params.runoff_coefficient, 3)
        )
    } else {
        format!(
            "A captação é o volume bruto de chuva (C = 1). A literatura técnica cita \
             C = {} para telhados; esse coeficiente não foi aplicado neste cálculo.",
            format_number_trimmed(DOCUMENTED_RUNOFF_COEFFICIENT, 3)
        )
    }
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

/// Generate Typst markup for the methodology appendix.
///
/// # Example
///
/// ```rust
/// use cistern_core::calculations::SizingParameters;
/// use cistern_core::equations::registry::{generate_methodology_typst, sizing_equations};
///
/// let params = SizingParameters::default();
/// let typst = generate_methodology_typst(&sizing_equations(&params), &params);
/// assert!(typst.contains("Método Prático Alemão"));
/// ```
pub fn generate_methodology_typst(equations: &[Equation], params: &SizingParameters) -> String {
    let mut output = String::new();

    output.push_str(r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#e8f1f8"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Anexo: Metodologia de Cálculo]
  ]
]

#v(12pt)
"##);

    output.push_str(&format!(
        "#text(size: 10pt)[\n  Parâmetros adotados: fração de armazenamento {}%, tarifa {} por m³.\n  {}\n]\n\n#v(12pt)\n",
        format_number_trimmed(params.tank_fraction * 100.0, 2),
        escape_typst(&format_currency(params.price_per_cubic_meter())),
        escape_typst(&runoff_statement(params)),
    ));

    let mut categories = Equation::all_categories();
    categories.retain(|c| equations.iter().any(|eq| eq.metadata().category == *c));

    if categories.is_empty() {
        output.push_str("#text(style: \"italic\")[Nenhuma equação registrada.]\n");
        return output;
    }

    for category in categories {
        output.push_str(&format!("\n== {}\n\n", category.display_name()));

        for equation in equations.iter().filter(|eq| eq.metadata().category == category) {
            let meta = equation.metadata();

            output.push_str(&format!("=== {}\n\n", meta.name));
            output.push_str(&format!("#text(size: 10pt)[{}]\n\n", escape_typst(meta.description)));
            output.push_str(&format!("*Fórmula:* {}\n\n", meta.formula_typst));
            output.push_str(&format!("*Referência:* {}\n\n", meta.reference.citation()));

            if !meta.variables.is_empty() {
                output.push_str("#table(\n");
                output.push_str("  columns: (auto, 1fr, auto),\n");
                output.push_str("  inset: 6pt,\n");
                output.push_str("  stroke: 0.5pt,\n");
                output.push_str("  table.header([*Símbolo*], [*Descrição*], [*Unidade*]),\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "  [${}$], [{}], [{}],\n",
                        var.symbol,
                        escape_typst(var.description),
                        escape_typst(var.units)
                    ));
                }
                output.push_str(")\n\n");
            }

            if !meta.assumptions.is_empty() {
                output.push_str("*Hipóteses:*\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", escape_typst(assumption)));
                }
                output.push('\n');
            }

            output.push_str("#v(6pt)\n#line(length: 100%, stroke: 0.25pt + gray)\n#v(6pt)\n\n");
        }
    }

    output
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate the EQUATIONS.md reference listing every registered equation.
///
/// ```rust
/// use cistern_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Referência de Equações"));
/// assert!(markdown.contains("Reservatório"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(r#"# Cisterna - Referência de Equações

> **Gerado a partir do código-fonte. Não edite manualmente.**
>
> Regenere com: `cargo run --bin gen-equations`

Unidades: precipitação em mm, área em m², volumes em L (1 mm sobre 1 m² = 1 L).

"#);

    output.push_str(&format!(
        "Parâmetros padrão: fração de armazenamento {}, tarifa {} por litro.\n\n---\n\n",
        format_number(SizingParameters::default().tank_fraction, 2),
        format_number(SizingParameters::default().price_per_liter, 3),
    ));

    for category in Equation::all_categories() {
        let equations = Equation::in_category(category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Fórmula:** `{}`\n\n", meta.formula_plain));
            output.push_str(&format!("**Referência:** {}\n\n", meta.reference.citation()));

            if !meta.variables.is_empty() {
                output.push_str("| Símbolo | Descrição | Unidade |\n");
                output.push_str("|---------|-----------|---------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| `{}` | {} | {} |\n",
                        var.symbol.replace('"', ""),
                        var.description,
                        var.units
                    ));
                }
                output.push('\n');
            }

            if !meta.assumptions.is_empty() {
                output.push_str("**Hipóteses:**\n\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str(&format!("*Implementação:* `{}`\n\n", meta.source_function));
        }
    }

    output
}

/// Outcome of [`sync_equations_markdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownSync {
    /// File already matched the registry
    Current,
    /// File was (re)written
    Written,
    /// File differs from the registry and `check_only` was set
    Stale,
}

/// Bring `path` in line with [`generate_equations_markdown`].
///
/// With `check_only` the file is compared but never written. A missing file
/// counts as stale.
pub fn sync_equations_markdown(path: &Path, check_only: bool) -> CalcResult<MarkdownSync> {
    let markdown = generate_equations_markdown();
    let existing = fs::read_to_string(path).ok();

    if existing.as_deref() == Some(markdown.as_str()) {
        return Ok(MarkdownSync::Current);
    }
    if check_only {
        return Ok(MarkdownSync::Stale);
    }

    fs::write(path, &markdown)
        .map_err(|e| CalcError::file_error("write equations", path.display().to_string(), e.to_string()))?;
    log::info!("Wrote {} bytes to {}", markdown.len(), path.display());
    Ok(MarkdownSync::Written)
}
