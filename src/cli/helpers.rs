use super::errors::CrxCliError;
use crate::Cli;
use clap::CommandFactory;
use crxtool::crx::CrxMetadata;
use std::path::{Path, PathBuf};

pub fn exit_with_error(error: CrxCliError) -> ! {
    let mut cmd = Cli::command();
    cmd.error(error.clone().into(), error.to_string()).exit()
}

/// Resolves `filename` against the working directory and checks it is an
/// existing `.crx` file.
pub fn resolve_crx_file(current_dir: &Path, filename: &str) -> PathBuf {
    if !filename.ends_with(".crx") {
        exit_with_error(CrxCliError::UnsupportedFileType);
    }

    let crx_file_path = current_dir.join(filename);
    if !crx_file_path.exists() {
        exit_with_error(CrxCliError::NotFound(
            crx_file_path.display().to_string(),
        ));
    }

    crx_file_path
}

/// Human-readable description of a parsed header, one line per item.
pub fn describe_metadata(metadata: &CrxMetadata) -> Vec<String> {
    let header = metadata.file_header();
    let mut lines = vec![
        format!("magic number:   {}", metadata.magic_number()),
        format!("version:        {}", metadata.version()),
        format!("id:             {}", metadata.id()),
        format!("header length:  {} bytes", header.header_byte_length()),
        format!("payload offset: {}", metadata.payload_offset()),
    ];

    if let Some(declared_id) = header.declared_id() {
        let note = if declared_id == metadata.id() {
            ""
        } else {
            " (differs from derived id)"
        };
        lines.push(format!("declared id:    {}{}", declared_id, note));
    }

    for (algorithm, proof) in header.all_asymmetric_key_proofs() {
        lines.push(format!(
            "proof {}: public key {} bytes, signature {} bytes",
            algorithm,
            proof.public_key_length(),
            proof.signature_length()
        ));
        lines.push(format!("  public key: {}", proof.public_key_base64()));
    }

    lines
}
