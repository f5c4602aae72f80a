//! Command-line surface: one report file in, one formatted result out.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Language;
use crate::pipeline::preparation::Modality;

/// Preliminary, non-diagnostic AI reading of a blood test report
#[derive(Parser, Debug)]
#[command(name = "labread")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Report file: JPG/PNG image or PDF
    pub file: PathBuf,

    /// Report format (inferred from the file extension when omitted)
    #[arg(long, value_enum)]
    pub modality: Option<ModalityArg>,

    /// Output language (overrides LABREAD_LANG)
    #[arg(long, value_enum)]
    pub lang: Option<LangArg>,

    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModalityArg {
    Image,
    Pdf,
}

impl From<ModalityArg> for Modality {
    fn from(arg: ModalityArg) -> Self {
        match arg {
            ModalityArg::Image => Modality::Image,
            ModalityArg::Pdf => Modality::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LangArg {
    It,
    En,
}

impl From<LangArg> for Language {
    fn from(arg: LangArg) -> Self {
        match arg {
            LangArg::It => Language::Italian,
            LangArg::En => Language::English,
        }
    }
}
