//! `nbridge check`: validate the bridge declarations of a universe.

use anyhow::{bail, Context};
use nbridge_processor::diagnostic::JsonDiagnostic;
use nbridge_processor::{
    create_files, BridgeProcessor, ConfigManifest, Diagnostic, DirectionConfigs, WellKnownTypes,
};
use nbridge_types::{TypeContext, UniverseManifest};
use std::io::Write;
use std::path::PathBuf;
use termcolor::WriteColor;

use crate::output::{self, Terminal};

/// Diagnostic rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Annotated outlines for terminals
    #[default]
    Pretty,
    /// One JSON array on stdout
    Json,
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub universe: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub decl: Option<String>,
}

/// Counts for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckSummary {
    /// Declaration and direction pairs processed
    pub checked: usize,
    /// Pairs that produced errors
    pub failed: usize,
    /// Total errors reported
    pub errors: usize,
}

impl CheckSummary {
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Load, process and report.
///
/// Pretty diagnostics go to `diagnostics`; JSON diagnostics go to `stdout`.
pub fn run(
    options: &CheckOptions,
    diagnostics: &mut dyn WriteColor,
    stdout: &mut dyn Write,
) -> anyhow::Result<CheckSummary> {
    let manifest = UniverseManifest::from_file(&options.universe)
        .with_context(|| format!("failed to read universe {}", options.universe.display()))?;
    let mut ctx = TypeContext::new();
    let known =
        WellKnownTypes::install(&mut ctx).context("failed to declare the bridge annotations")?;
    let loaded = manifest
        .load_into(&mut ctx)
        .with_context(|| format!("failed to load universe {}", options.universe.display()))?;
    tracing::debug!(declarations = loaded.len(), "universe loaded");

    let configs = match &options.config {
        Some(path) => ConfigManifest::from_file(path)
            .and_then(|config| config.resolve(&ctx, &known))
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => DirectionConfigs::presets(&ctx, &known),
    };

    let processed = BridgeProcessor::new(&ctx, &known, &configs).process(options.decl.as_deref());
    if let Some(name) = &options.decl {
        if processed.is_empty() {
            bail!("no bridge declaration named `{}`", name);
        }
    }

    let mut summary = CheckSummary {
        checked: processed.len(),
        ..CheckSummary::default()
    };
    let mut json = Vec::new();
    for outcome in &processed {
        let errors = outcome.errors();
        if errors.is_empty() {
            continue;
        }
        summary.failed += 1;
        summary.errors += errors.len();

        let (files, outline) = create_files(&ctx, outcome.decl);
        for error in errors {
            let diagnostic = Diagnostic::from_bridge_error(error, &ctx, &outline);
            match options.format {
                OutputFormat::Pretty => diagnostic
                    .emit_to(diagnostics, &files)
                    .context("failed to render diagnostic")?,
                OutputFormat::Json => {
                    json.push(JsonDiagnostic::from_diagnostic(&diagnostic, &files))
                }
            }
        }
        tracing::debug!(
            decl = %ctx.qualified_name(outcome.decl),
            direction = %outcome.direction,
            errors = errors.len(),
            "declaration rejected"
        );
    }

    if options.format == OutputFormat::Json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&json)?)?;
    }
    Ok(summary)
}

/// Entry point for the `check` subcommand
pub fn execute(options: CheckOptions, color: Option<&str>) -> anyhow::Result<()> {
    let mut terminal = Terminal::new(output::resolve_color_choice(color));
    let (diagnostics, stdout) = terminal.streams();
    let summary = run(&options, diagnostics, stdout)?;
    match options.format {
        OutputFormat::Pretty => terminal.summary(&summary)?,
        OutputFormat::Json => terminal.flush()?,
    }

    if !summary.is_ok() {
        bail!("{} error(s) found", summary.errors);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    const UNIVERSE: &str = r#"{
      "packages": [{
        "name": "demo",
        "types": [
          {
            "name": "DemoConfig",
            "methods": [{"name": "getInstance", "modifiers": ["public", "static"], "returns": "nbridge.MarshallerConfig"}]
          },
          {
            "name": "Service",
            "kind": "interface",
            "methods": [{"name": "size", "modifiers": ["public", "abstract"], "returns": "int"}]
          },
          {
            "name": "Broken",
            "modifiers": ["public", "abstract"],
            "annotations": [{
              "type": "nbridge.GenerateHostToNativeBridge",
              "values": {"marshallerConfig": {"type": "demo.DemoConfig"}}
            }]
          }
        ]
      }]
    }"#;

    fn options(dir: &tempfile::TempDir, format: OutputFormat) -> CheckOptions {
        let universe = dir.path().join("universe.json");
        std::fs::write(&universe, UNIVERSE).unwrap();
        CheckOptions {
            universe,
            config: None,
            format,
            decl: None,
        }
    }

    #[test]
    fn test_pretty_reports_missing_service_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = Buffer::no_color();
        let mut stdout = Vec::new();
        let summary =
            run(&options(&dir, OutputFormat::Pretty), &mut diagnostics, &mut stdout).unwrap();

        assert_eq!(summary.checked, 1);
        assert_eq!(summary.failed, 1);
        let rendered = String::from_utf8(diagnostics.into_inner()).unwrap();
        assert!(rendered.contains("NB1003"), "{}", rendered);
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_json_goes_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = Buffer::no_color();
        let mut stdout = Vec::new();
        run(&options(&dir, OutputFormat::Json), &mut diagnostics, &mut stdout).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["code"], "NB1003");
        assert_eq!(entries[0]["severity"], "error");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&dir, OutputFormat::Pretty);
        opts.decl = Some("demo.Missing".to_string());
        let err = run(&opts, &mut Buffer::no_color(), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("demo.Missing"));
    }
}
