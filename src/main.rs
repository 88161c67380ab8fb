//! Main entry point for the zipread CLI application.
//!
//! This binary provides a command-line interface for listing and extracting
//! ZIP archives, including archives split over several disks.

use anyhow::{Result, bail};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use zipread::{Cli, ExtractOptions, LocalFileReader, ZipArchive, ZipError, ZipFileEntry};

/// Writes log records to stderr, keeping stdout free for listings and `-p`.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Application entry point.
///
/// Parses command-line arguments, opens the archive from its disks and
/// dispatches to the requested mode.
fn main() -> Result<()> {
    let cli = Cli::parse();

    log::set_logger(&LOGGER)?;
    log::set_max_level(cli.log_level());

    let archive = match ZipArchive::open(&cli.disks) {
        Ok(archive) => archive,
        Err(ZipError::NeedAdditionalDisk) => bail!(
            "No end of central directory found in {} disk(s); is the last disk missing?",
            cli.disks.len()
        ),
        Err(e) => return Err(e.into()),
    };

    let mut options = ExtractOptions::default();
    if let Some(max) = cli.max_size {
        options.max_entry_size = max;
    }
    options.verify_crc = !cli.no_crc;
    let archive = archive.with_options(options);

    if let Some(n) = cli.raw {
        return dump_raw(&archive, n);
    }

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_files(&archive, cli.verbose);
    }

    process_zip(&archive, &cli)
}

/// Extract the entries selected by the CLI filters.
///
/// # Arguments
///
/// * `archive` - The opened archive
/// * `cli` - Parsed command-line arguments
fn process_zip(archive: &ZipArchive<LocalFileReader>, cli: &Cli) -> Result<()> {
    // Apply filters to determine which files to extract:
    // 1. Skip directories (they are created automatically during extraction)
    // 2. If specific files are requested, only include matching entries
    // 3. Exclude files matching the exclusion patterns
    let files_to_extract: Vec<usize> = archive
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            if e.is_directory {
                return false;
            }

            if !cli.include.is_empty() && !cli.include.iter().any(|f| matches_name(f, e)) {
                return false;
            }

            !cli.exclude
                .iter()
                .any(|x| e.file_name.contains(x.as_str()) || glob_match(x, &e.file_name))
        })
        .map(|(n, _)| n)
        .collect();

    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for n in files_to_extract {
        extract_file(archive, n, cli, multiple_files)?;
    }

    Ok(())
}

/// Whether an include argument selects `entry`: a glob pattern, the full
/// path inside the archive, or just the base name.
fn matches_name(pattern: &str, entry: &ZipFileEntry) -> bool {
    if has_glob_chars(pattern) {
        return glob_match(pattern, &entry.file_name);
    }
    let basename = Path::new(&entry.file_name)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    entry.file_name == pattern || basename == pattern
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(archive: &ZipArchive<LocalFileReader>, verbose: bool) -> Result<()> {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>7}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Method", "Date", "Time"
        );
        println!("{}", "-".repeat(79));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries() {
        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        let method = match entry.compression_method {
            zipread::CompressionMethod::Stored => "Stored".to_string(),
            zipread::CompressionMethod::Deflate => "Defl".to_string(),
            zipread::CompressionMethod::Unknown(m) => format!("M{m}"),
        };

        println!(
            "{:>10}  {:>10}  {}  {:>7}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            method,
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(79));
        println!(
            "{:>10}  {:>10}  {}  {:>30}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
        if !archive.comment().is_empty() {
            println!("{}", String::from_utf8_lossy(archive.comment()));
        }
    }

    Ok(())
}

/// Compression ratio as percentage saved.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 {
        let saved = 100 - (compressed.min(uncompressed) * 100 / uncompressed) as i64;
        format!("{:>4}%", saved)
    } else {
        "  0%".to_string()
    }
}

/// Print the compressed bytes of entry `n`: index, value and bits
/// (most significant first), one byte per line.
fn dump_raw(archive: &ZipArchive<LocalFileReader>, n: usize) -> Result<()> {
    let entry = archive.entry(n)?;
    let raw = archive.extract_raw(n)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{}: {} raw bytes, {} uncompressed",
        entry.file_name,
        raw.len(),
        archive.uncompressed_length(n)?
    )?;
    for (i, byte) in raw.iter().enumerate() {
        writeln!(out, "{i}\t{byte}\t{byte:08b}")?;
    }
    Ok(())
}

/// Extract a single file from the archive.
///
/// Handles various extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
fn extract_file(
    archive: &ZipArchive<LocalFileReader>,
    n: usize,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    let entry = archive.entry(n)?;

    if cli.pipe {
        let data = archive.extract(n)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if show_filename {
            writeln!(out, "--- {} ---", entry.file_name)?;
        }
        out.write_all(&data)?;
        return Ok(());
    }

    let Some(output_path) =
        output_path(&entry.file_name, cli.extract_dir.as_deref(), cli.junk_paths)
    else {
        log::warn!(
            "skipping {}: path leaves the extraction directory",
            entry.file_name
        );
        return Ok(());
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.file_name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.file_name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.file_name);
    }

    let data = archive.extract(n)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output_path, data)?;

    Ok(())
}

/// Where an entry lands on disk, honouring `-d` and `-j`.
///
/// Only plain components of the stored name are kept. Names that are
/// absolute or climb out with `..` give `None`, as do names with nothing
/// left to write to.
fn output_path(name: &str, extract_dir: Option<&Path>, junk_paths: bool) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if junk_paths {
        relative = PathBuf::from(relative.file_name()?);
    }
    if relative.as_os_str().is_empty() {
        return None;
    }

    Some(match extract_dir {
        Some(dir) => dir.join(relative),
        None => relative,
    })
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}
