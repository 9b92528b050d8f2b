// cleanurls/src/commands/generate.rs
//! The `generate` command: writes a provider set as Rust source or JSON.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use clearurls_core::{compile_providers, generate_rust_source, load_providers, prepared_to_json, RunnableProvider};

use crate::cli::{GenerateCommand, OutputFormat};
use crate::commands::CommandContext;

/// Destination meaning "write to stdout".
pub const STDOUT_MARKER: &str = "-";

pub async fn run_generate(cmd: &GenerateCommand, ctx: &CommandContext) -> Result<()> {
    let source = ctx.source(cmd.source.as_deref());
    let providers = load_providers(source)
        .await
        .with_context(|| format!("Failed to load providers from '{source}'"))?;
    ctx.info(format!("Got {} providers", providers.len()));
    compile_providers(&providers).context("Couldn't compile providers")?;

    let output = render(&providers, cmd.format)?;
    ctx.info(format!("Writing {} bytes to '{}'", output.len(), cmd.destination));
    if cmd.destination == STDOUT_MARKER {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    } else {
        write_output(Path::new(&cmd.destination), &output)?;
    }
    Ok(())
}

/// Renders `providers` in the requested format.
pub fn render<P: RunnableProvider>(providers: &[P], format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Rust => generate_rust_source(providers)?,
        OutputFormat::Json => prepared_to_json(providers)?,
    };
    Ok(output)
}

fn write_output(path: &Path, output: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, output).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearurls_core::bundled_providers;

    #[test]
    fn test_render_formats() {
        let providers = bundled_providers().unwrap();
        let rust = render(&providers, OutputFormat::Rust).unwrap();
        assert!(rust.contains("pub fn bundled_prepared_providers()"));
        let json = render(&providers, OutputFormat::Json).unwrap();
        assert!(json.trim_start().starts_with('['));
    }

    #[test]
    fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen").join("providers.rs");
        write_output(&path, "// generated\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "// generated\n");
    }
}
