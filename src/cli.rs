use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zipread")]
#[command(version)]
#[command(about = "A Rust unzip utility for single and multi-disk archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipread data1.zip -x joe               extract all files except joe from data1.zip\n  \
  zipread -p foo.zip | more              send contents of foo.zip via pipe into more\n  \
  zipread -l backup.z01 backup.zip       list files of a two-disk archive\n  \
  zipread -r 3 spreadsheet.ods           dump the compressed bits of entry 3")]
pub struct Cli {
    /// Archive disks, in volume order (the last one holds the central directory)
    #[arg(value_name = "DISKS", required = true)]
    pub disks: Vec<PathBuf>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Dump the raw compressed bytes of entry N, one line per byte
    #[arg(short = 'r', long = "raw", value_name = "N")]
    pub raw: Option<usize>,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// Only extract files matching these names or patterns
    #[arg(short = 'i', value_name = "PATTERN", num_args = 1..)]
    pub include: Vec<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "PATTERN", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Refuse entries larger than this many bytes
    #[arg(long = "max-size", value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Skip CRC-32 verification of extracted data
    #[arg(long = "no-crc")]
    pub no_crc: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Debug logging on stderr (-DD => trace)
    #[arg(short = 'D', long = "debug", action = clap::ArgAction::Count)]
    pub debug: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.debug {
            0 if self.is_very_quiet() => log::LevelFilter::Error,
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
