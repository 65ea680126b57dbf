//
//  tea-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Output formatting for command results, selected with `--output`:
//!
//! - **Table format**: Human-readable tables for interactive terminal use
//! - **JSON format**: Machine-readable JSON for scripting
//! - **YAML format**: The same data as YAML
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: The available formats
//! - [`OutputWriter`]: Writes results and status lines
//! - [`TableOutput`]: Implemented by types that render as a table
//!
//! ## Example
//!
//! ```rust,no_run
//! use tea_cli::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Table);
//! writer.write_success("Login added");
//! writer.write_warning("No SSH key found");
//! ```

mod table;

pub use table::*;

use clap::ValueEnum;
use serde::Serialize;

/// Represents the available output formats for command results.
///
/// Status lines (success, warning, info) are not affected by the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format with optional color support.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// A unified output writer that handles every [`OutputFormat`].
///
/// Color is detected from the terminal on construction and disabled when
/// output is piped or `NO_COLOR` is set.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Writes a value to stdout using the configured output format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON or YAML serialization fails.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        print!("{}", self.render(value)?);
        Ok(())
    }

    /// Renders `value` as [`write`](Self::write) would print it.
    pub fn render<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Table => format!("{}\n", value.table(self.color)),
        })
    }

    /// Writes a warning message to stderr.
    ///
    /// The message is prefixed with "warning:" and styled in yellow when
    /// color output is enabled.
    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Writes an informational message to stdout, without prefix or styling.
    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Writes a success message to stdout.
    ///
    /// The message is prefixed with a green checkmark when color output
    /// is enabled.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use tea_cli::output::{OutputFormat, OutputWriter};
    ///
    /// let writer = OutputWriter::new(OutputFormat::Table);
    /// writer.write_success("Cloned gitea/tea");
    /// // Output: ✓ Cloned gitea/tea
    /// ```
    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// A trait for types that can be rendered as table output.
///
/// For JSON and YAML output, types must also implement [`Serialize`].
pub trait TableOutput {
    /// Renders the value for the terminal.
    ///
    /// # Parameters
    ///
    /// * `color` - Whether color output is enabled
    fn table(&self, color: bool) -> String;
}

/// Formats a key-value pair with optional styling.
///
/// The key is dimmed when color is enabled to set it apart from the value.
pub fn format_field(key: &str, value: &str, color: bool) -> String {
    use console::style;
    if color {
        format!("{}: {}", style(key).dim(), value)
    } else {
        format!("{}: {}", key, value)
    }
}
