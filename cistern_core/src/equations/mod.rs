//! # Sizing Equations
//!
//! Metadata for every formula the German practical method applies. The
//! arithmetic itself lives in [`crate::calculations::sizing`]; this module
//! describes it for the report appendix and `EQUATIONS.md`.
//!
//! ## Modules
//!
//! - [`registry`] - Equation metadata, methodology appendix and markdown generation
//!
//! ## Units
//!
//! - **Rainfall**: millimeters per year
//! - **Area**: square meters
//! - **Volume**: liters (1 mm over 1 m² = 1 L)
//!
//! ## References
//!
//! - ABNT NBR 15527:2007, Anexo A: Métodos de cálculo para dimensionamento de reservatórios
//! - ABNT NBR 15527:2019: Aproveitamento de água de chuva de coberturas para fins não potáveis

pub mod registry;

pub use registry::{
    generate_equations_markdown, generate_methodology_typst, runoff_statement, sizing_equations,
    sync_equations_markdown, CodeReference, Equation, EquationCategory, EquationMetadata, MarkdownSync, ALL_EQUATIONS,
};
