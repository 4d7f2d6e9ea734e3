//! huffpack: command-line Huffman multi-file archiver.
//!
//! Thin collaborator layer around `huffpack-core`: reads input files,
//! drives compress/decompress, writes outputs, and reports sizes and
//! timing. All validation happens in the core before the first write, so
//! a failed run leaves no partial archive and no partial files.

mod config;

use config::Command;
use huffpack_core::{compress, decompress, CompressionStats, Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match Command::from_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {message}");
            println!();
            config::print_help();
            std::process::exit(1);
        }
    };

    if let Err(err) = run(command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Compress { inputs, output } => run_compress(&inputs, output),
        Command::Decompress {
            archive,
            output_dir,
        } => run_decompress(&archive, &output_dir),
    }
}

fn run_compress(inputs: &[PathBuf], output: Option<PathBuf>) -> Result<()> {
    let start = Instant::now();
    println!("compressing {} file(s)...", inputs.len());

    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        let data = fs::read(path).map_err(|source| Error::MissingSource {
            name: path.display().to_string(),
            source,
        })?;
        sources.push((path.display().to_string(), data));
    }

    let input_bytes: u64 = sources.iter().map(|(_, data)| data.len() as u64).sum();
    let archive = compress(&sources)?;

    let output = output.unwrap_or_else(|| default_archive_path(&inputs[0]));
    fs::write(&output, &archive)?;

    let stats = CompressionStats {
        input_bytes,
        archive_bytes: archive.len() as u64,
    };
    println!("wrote {}", output.display());
    println!("original size:   {} bytes", stats.input_bytes);
    println!("archive size:    {} bytes", stats.archive_bytes);
    println!("space saved:     {:.2}%", stats.saved_percent());
    println!("elapsed:         {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn run_decompress(archive_path: &Path, output_dir: &Path) -> Result<()> {
    let start = Instant::now();
    println!("decompressing {}...", archive_path.display());

    let bytes = fs::read(archive_path).map_err(|source| Error::MissingSource {
        name: archive_path.display().to_string(),
        source,
    })?;

    // Fully decoded and validated before anything is written
    let members = decompress(&bytes)?;

    fs::create_dir_all(output_dir)?;
    for (id, data) in &members {
        let target = output_dir.join(sanitize_member_path(id));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        println!("extracted: {}", target.display());
    }

    println!("{} file(s) extracted", members.len());
    println!("elapsed: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Archive path derived from the first input: its extension replaced
/// with `.hpk`.
fn default_archive_path(first_input: &Path) -> PathBuf {
    first_input.with_extension("hpk")
}

/// Reduce a stored identifier to a safe relative path.
///
/// Keeps only normal components, so absolute prefixes and `..` segments in
/// a hostile archive cannot escape the output directory. Falls back to
/// `member` for an identifier with no usable components.
fn sanitize_member_path(id: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for component in Path::new(id).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    if path.as_os_str().is_empty() {
        PathBuf::from("member")
    } else {
        path
    }
}
