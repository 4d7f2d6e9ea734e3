//! Command-line parsing for the huffpack tool.
//!
//! Two commands, both thin glue around the core:
//! - `compress <FILE>... [--out <PATH>]`
//! - `decompress <ARCHIVE> [<OUT_DIR>]`

use std::path::PathBuf;

/// A fully parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compress one or more files into a single archive.
    Compress {
        /// Input files, in archive order
        inputs: Vec<PathBuf>,
        /// Archive path; defaults to the first input with an `.hpk` extension
        output: Option<PathBuf>,
    },
    /// Extract every member of an archive.
    Decompress {
        /// Archive to read
        archive: PathBuf,
        /// Directory to extract into (created if needed)
        output_dir: PathBuf,
    },
}

impl Command {
    /// Parse command-line arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut iter = args.iter();

        let command = match iter.next() {
            Some(c) => c.as_str(),
            None => return Err("no command given".to_string()),
        };

        match command {
            "compress" => {
                let mut inputs = Vec::new();
                let mut output = None;

                let rest: Vec<&String> = iter.collect();
                let mut i = 0;
                while i < rest.len() {
                    match rest[i].as_str() {
                        "--out" => {
                            i += 1;
                            if i >= rest.len() {
                                return Err("--out requires a path".to_string());
                            }
                            output = Some(PathBuf::from(rest[i]));
                        }
                        "--help" | "-h" => {
                            print_help();
                            std::process::exit(0);
                        }
                        arg if arg.starts_with('-') => {
                            return Err(format!("unknown argument: {arg}"));
                        }
                        path => inputs.push(PathBuf::from(path)),
                    }
                    i += 1;
                }

                if inputs.is_empty() {
                    return Err("compress requires at least one input file".to_string());
                }

                Ok(Command::Compress { inputs, output })
            }
            "decompress" => {
                let archive = match iter.next() {
                    Some(path) => PathBuf::from(path),
                    None => return Err("decompress requires an archive path".to_string()),
                };
                let output_dir = iter
                    .next()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));

                if let Some(extra) = iter.next() {
                    return Err(format!("unexpected argument: {extra}"));
                }

                Ok(Command::Decompress {
                    archive,
                    output_dir,
                })
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Print usage information.
pub fn print_help() {
    println!("huffpack: Huffman multi-file compressor");
    println!();
    println!("USAGE:");
    println!("    huffpack compress <FILE>... [--out <PATH>]");
    println!("    huffpack decompress <ARCHIVE> [<OUT_DIR>]");
    println!();
    println!("OPTIONS:");
    println!("    --out <PATH>    Archive path (default: first input with .hpk extension)");
    println!("    --help, -h      Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    huffpack compress document.txt image.jpg");
    println!("    huffpack compress logs/*.log --out logs.hpk");
    println!("    huffpack decompress document.hpk ./extracted/");
    println!();
    println!("NOTES:");
    println!("    - Multiple inputs are packed into a single archive");
    println!("    - Extraction restores every member under its original name");
}
