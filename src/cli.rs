// Command-line front end for oxiqoi.
//
// Explicit subcommands with long-form options: raw <-> QOI conversion plus
// a couple of inspection commands for existing QOI files.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::image::{Channels, Colorspace, Image};
use crate::io::{self as qio, DecodeStats, EncodeStats, RawLayout};
use crate::qoi::chunk::{ChunkKind, MAX_RUN};
use crate::qoi::color_index::INDEX_SIZE;
use crate::qoi::decoder::{
    ChunkIter, DEFAULT_MAX_PIXELS, DecodeOptions, split_header, strip_end_marker,
};
use crate::qoi::header::{HEADER_SIZE, Header};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Quite OK Image (QOI) encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "oxiqoi",
    version,
    about = "QOI lossless image encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode interleaved raw pixels into a QOI file.
    Encode(EncodeArgs),
    /// Decode a QOI file into interleaved raw pixels.
    Decode(DecodeArgs),
    /// Print the header of a QOI file.
    Header(PrintArgs),
    /// Print a histogram of the chunk kinds in a QOI file.
    Chunks(PrintArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelsArg {
    #[value(name = "3", alias = "rgb")]
    Rgb,
    #[value(name = "4", alias = "rgba")]
    Rgba,
}

impl From<ChannelsArg> for Channels {
    fn from(arg: ChannelsArg) -> Self {
        match arg {
            ChannelsArg::Rgb => Channels::Rgb,
            ChannelsArg::Rgba => Channels::Rgba,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorspaceArg {
    Linear,
    Srgb,
}

impl From<ColorspaceArg> for Colorspace {
    fn from(arg: ColorspaceArg) -> Self {
        match arg {
            ColorspaceArg::Linear => Colorspace::Linear,
            ColorspaceArg::Srgb => Colorspace::Srgb,
        }
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Image width in pixels.
    #[arg(long, short = 'W')]
    width: u32,

    /// Image height in pixels.
    #[arg(long, short = 'H')]
    height: u32,

    /// Channels per raw pixel.
    #[arg(long, value_enum, default_value_t = ChannelsArg::Rgba)]
    channels: ChannelsArg,

    /// Colorspace tag stored in the header.
    #[arg(long, value_enum, default_value_t = ColorspaceArg::Srgb)]
    colorspace: ColorspaceArg,

    /// Raw input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// QOI output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Refuse images with more pixels than this.
    #[arg(long = "max-pixels", default_value_t = DEFAULT_MAX_PIXELS)]
    max_pixels: u64,

    /// QOI input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Raw output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// QOI input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Header,
    Chunks,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    layout: RawLayout,
    decode: DecodeOptions,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        input_file: None,
        output_file: None,
        layout: RawLayout {
            width: 0,
            height: 0,
            channels: Channels::Rgba,
            colorspace: Colorspace::default(),
        },
        decode: DecodeOptions::default(),
    };

    match cli.command {
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.use_stdout = args.stdout;
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
            opts.layout = RawLayout {
                width: args.width,
                height: args.height,
                channels: args.channels.into(),
                colorspace: args.colorspace.into(),
            };
        }
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.use_stdout = args.stdout;
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
            opts.decode.max_pixels = args.max_pixels;
        }
        Cmd::Header(args) => {
            opts.command = Command::Header;
            opts.input_file = Some(args.input);
        }
        Cmd::Chunks(args) => {
            opts.command = Command::Chunks;
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }

    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxiqoi".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn emit_json(json: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(json) {
        eprintln!("{s}");
    }
}

fn colorspace_name(c: Colorspace) -> &'static str {
    match c {
        Colorspace::Linear => "linear",
        Colorspace::Srgb => "srgb",
    }
}

/// Read all of `path`, or stdin when `None`.
fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    match path {
        Some(p) => BufReader::with_capacity(BUF_SIZE, File::open(p)?).read_to_end(&mut data)?,
        None => io::stdin().lock().read_to_end(&mut data)?,
    };
    Ok(data)
}

/// Create `path` for writing.  Without `-f` the file must not exist; the
/// existence check and the create are a single `open`.
fn create_output(path: &Path, force: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path)
}

fn open_output(opts: &Options) -> Option<Box<dyn Write>> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Some(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => match create_output(path, opts.force) {
            Ok(f) => Some(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                eprintln!(
                    "oxiqoi: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                None
            }
            Err(e) => {
                eprintln!("oxiqoi: output file: {}: {e}", path.display());
                None
            }
        },
    }
}

/// SHA-256 of the raw pixel bytes (if `file-io` feature is enabled).
fn raw_digest(raw: &[u8]) -> Option<[u8; 32]> {
    #[cfg(feature = "file-io")]
    {
        use sha2::Digest;
        Some(sha2::Sha256::digest(raw).into())
    }
    #[cfg(not(feature = "file-io"))]
    {
        let _ = raw;
        None
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxiqoi version {version} (Rust), Copyright (C) oxiqoi contributors");
    eprintln!("Licensed under the MIT License");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("DEFAULT_MAX_PIXELS={DEFAULT_MAX_PIXELS}");
    eprintln!("INDEX_SIZE={INDEX_SIZE}");
    eprintln!("MAX_RUN={MAX_RUN}");
    eprintln!("HEADER_SIZE={HEADER_SIZE}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let raw = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("oxiqoi: read error: {e}");
            return 1;
        }
    };
    let l = &opts.layout;
    let image = match Image::from_raw(l.width, l.height, l.channels, l.colorspace, &raw) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("oxiqoi: encode error: {e}");
            return 1;
        }
    };
    let Some(mut writer) = open_output(opts) else {
        return 1;
    };
    let qoi_size = match qio::encode_to(&image, &mut writer) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("oxiqoi: encode error: {e}");
            return 1;
        }
    };
    if let Err(e) = writer.flush() {
        eprintln!("oxiqoi: write flush error: {e}");
        return 1;
    }
    let stats = EncodeStats {
        width: l.width,
        height: l.height,
        channels: l.channels,
        raw_size: raw.len() as u64,
        qoi_size,
        raw_sha256: raw_digest(&raw),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxiqoi: encoder: {}x{}x{}, raw size: {}, qoi size: {}",
            stats.width,
            stats.height,
            stats.channels.count(),
            stats.raw_size,
            stats.qoi_size
        );
    }

    if opts.json_output {
        emit_json(&serde_json::json!({
            "command": "encode",
            "width": stats.width,
            "height": stats.height,
            "channels": stats.channels.count(),
            "colorspace": colorspace_name(opts.layout.colorspace),
            "raw_size": stats.raw_size,
            "qoi_size": stats.qoi_size,
            "raw_sha256": stats.raw_sha256.as_ref().map(hex),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let bytes = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("oxiqoi: read error: {e}");
            return 1;
        }
    };
    let image = match qio::decode_from(&mut bytes.as_slice(), &opts.decode) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("oxiqoi: decode error: {e}");
            return 1;
        }
    };
    let raw = image.to_raw();
    let Some(mut writer) = open_output(opts) else {
        return 1;
    };
    if let Err(e) = writer.write_all(&raw).and_then(|()| writer.flush()) {
        eprintln!("oxiqoi: write error: {e}");
        return 1;
    }
    let stats = DecodeStats {
        width: image.width,
        height: image.height,
        channels: image.channels,
        raw_size: raw.len() as u64,
        qoi_size: bytes.len() as u64,
        raw_sha256: raw_digest(&raw),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxiqoi: decoder: {}x{}x{}, qoi size: {}, raw size: {}",
            stats.width,
            stats.height,
            stats.channels.count(),
            stats.qoi_size,
            stats.raw_size
        );
    }

    if opts.json_output {
        emit_json(&serde_json::json!({
            "command": "decode",
            "width": stats.width,
            "height": stats.height,
            "channels": stats.channels.count(),
            "qoi_size": stats.qoi_size,
            "raw_size": stats.raw_size,
            "raw_sha256": stats.raw_sha256.as_ref().map(hex),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Print commands (header, chunks)
// ---------------------------------------------------------------------------

fn cmd_header(opts: &Options) -> i32 {
    let Some(path) = opts.input_file.as_deref() else {
        eprintln!("oxiqoi: print commands require an input file");
        return 1;
    };

    let mut head = Vec::with_capacity(HEADER_SIZE);
    let read = File::open(path)
        .and_then(|f| f.take(HEADER_SIZE as u64).read_to_end(&mut head));
    if let Err(e) = read {
        eprintln!("oxiqoi: {}: {e}", path.display());
        return 1;
    }

    let hdr = match Header::decode(&head) {
        Ok(hdr) => hdr,
        Err(e) => {
            eprintln!("oxiqoi: invalid QOI header: {e}");
            return 1;
        }
    };

    if opts.json_output {
        emit_json(&serde_json::json!({
            "command": "header",
            "width": hdr.width,
            "height": hdr.height,
            "channels": hdr.channels.count(),
            "colorspace": colorspace_name(hdr.colorspace),
            "pixels": hdr.pixel_count(),
        }));
    }

    if !opts.quiet {
        println!("QOI width:       {}", hdr.width);
        println!("QOI height:      {}", hdr.height);
        println!("QOI channels:    {}", hdr.channels.count());
        println!(
            "QOI colorspace:  {} ({})",
            u8::from(hdr.colorspace),
            colorspace_name(hdr.colorspace)
        );
        println!("QOI pixels:      {}", hdr.pixel_count());
    }

    0
}

#[derive(Default)]
struct KindStats {
    chunks: u64,
    bytes: u64,
    pixels: u64,
}

fn cmd_chunks(opts: &Options) -> i32 {
    let Some(path) = opts.input_file.as_deref() else {
        eprintln!("oxiqoi: print commands require an input file");
        return 1;
    };

    let bytes = match read_input(Some(path)) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("oxiqoi: {}: {e}", path.display());
            return 1;
        }
    };

    let (hdr, data) = match split_header(&bytes).and_then(|(hdr, body)| {
        let data = strip_end_marker(body)?;
        Ok((hdr, data))
    }) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("oxiqoi: {}: {e}", path.display());
            return 1;
        }
    };

    let mut histogram: BTreeMap<ChunkKind, KindStats> = BTreeMap::new();
    let mut chunks = ChunkIter::new(data);
    while let Some(next) = chunks.next() {
        match next {
            Ok(chunk) => {
                let entry = histogram.entry(chunk.kind()).or_default();
                entry.chunks += 1;
                entry.bytes += chunk.encoded_len() as u64;
                entry.pixels += chunk.pixel_count() as u64;
            }
            Err(e) => {
                eprintln!(
                    "oxiqoi: chunk at offset {}: {e}",
                    HEADER_SIZE + chunks.position()
                );
                return 1;
            }
        }
    }

    let expected = hdr.pixel_count();
    if chunks.pixels() != expected {
        log::warn!(
            "chunk stream covers {} pixels, header declares {expected}",
            chunks.pixels()
        );
    }

    if opts.json_output {
        let kinds: serde_json::Map<String, serde_json::Value> = histogram
            .iter()
            .map(|(kind, s)| {
                (
                    kind.name().to_string(),
                    serde_json::json!({
                        "chunks": s.chunks,
                        "bytes": s.bytes,
                        "pixels": s.pixels,
                    }),
                )
            })
            .collect();
        emit_json(&serde_json::json!({
            "command": "chunks",
            "pixels": chunks.pixels(),
            "expected_pixels": expected,
            "kinds": kinds,
        }));
    }

    if !opts.quiet {
        println!("{:<8}{:>12}{:>12}{:>12}", "kind", "chunks", "bytes", "pixels");
        for kind in ChunkKind::ALL {
            let s = histogram.get(&kind);
            println!(
                "{:<8}{:>12}{:>12}{:>12}",
                kind.name(),
                s.map_or(0, |s| s.chunks),
                s.map_or(0, |s| s.bytes),
                s.map_or(0, |s| s.pixels)
            );
        }
        println!("total pixels: {} of {expected}", chunks.pixels());
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
    {
        log::warn!("-c option overrides output filename: {}", path.display());
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Header => cmd_header(&opts),
        Command::Chunks => cmd_chunks(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
