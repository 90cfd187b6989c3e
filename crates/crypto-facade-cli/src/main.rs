//! Crypto facade CLI: the `cfx` command.
//!
//! Converts between PEM and DER, re-encodes keys between raw, DER and PEM
//! layouts, converts ECDSA signatures between DER and `R ‖ S`, runs the
//! KDFs and generates software keys.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crypto_facade::kdf::{HmacSha256, HmacSha384, HmacSha512, KeyedHash};
use crypto_facade::provider::{Ed25519Provider, P384Provider, X25519Provider};
use crypto_facade::{
    der_to_fixed, der_to_pem, fixed_to_der, hkdf, identify_der, is_valid_label, marshaler_for,
    pbkdf2, pem_to_der, pem_to_der_labeled, Curve, KeyAgreementFacade, KeyAlgorithm, KeyEncoding,
    KeyKind, KeyMaterial, KeyPair, SignatureFacade,
};

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Crypto facade CLI: key, signature and KDF format conversions.
#[derive(Parser, Debug)]
#[command(
    name = "cfx",
    about = "Crypto facade CLI",
    version,
    long_about = "cfx: crypto facade CLI\n\nConvert PEM and DER, re-encode RSA/EC/Ed25519 keys between raw, DER\nand PEM layouts, convert ECDSA signatures, and run HKDF and PBKDF2."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode PEM text to DER bytes
    PemToDer {
        /// PEM file
        #[arg(long, short)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write lowercase hex instead of binary
        #[arg(long)]
        hex: bool,
    },

    /// Wrap DER bytes in PEM text
    DerToPem {
        /// DER file
        #[arg(long, short)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// PEM label, e.g. "PUBLIC KEY" or "EC PRIVATE KEY"
        #[arg(long, default_value = "PUBLIC KEY")]
        label: String,
    },

    /// Re-encode a key between raw, DER and PEM
    ConvertKey {
        /// Key algorithm (rsa-4096, p-256, p-256k, p-384, p-521, ed25519)
        #[arg(long, value_parser = parse_algorithm)]
        algorithm: KeyAlgorithm,

        #[arg(long, value_enum)]
        kind: KindArg,

        /// Encoding of the input file
        #[arg(long, value_enum)]
        from: EncodingArg,

        /// Encoding to produce
        #[arg(long, value_enum)]
        to: EncodingArg,

        #[arg(long, short)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write binary output as lowercase hex
        #[arg(long)]
        hex: bool,
    },

    /// Identify a DER or PEM key and print a JSON summary
    Inspect {
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Convert a DER ECDSA signature to fixed-width R || S
    SigToFixed {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Field width in bytes (default: inferred from DER length)
        #[arg(long)]
        width: Option<usize>,

        #[arg(long)]
        hex: bool,
    },

    /// Convert a fixed-width R || S signature to DER
    SigToDer {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long)]
        hex: bool,
    },

    /// Expand a secret with HKDF and print the output as hex
    Hkdf {
        /// Input keying material, hex
        #[arg(long)]
        secret: String,

        /// Output length in bytes
        #[arg(long)]
        length: usize,

        /// Salt, hex
        #[arg(long, default_value = "")]
        salt: String,

        /// Context info, hex
        #[arg(long, default_value = "")]
        info: String,

        #[arg(long, value_enum, default_value_t = HashArg::Sha256)]
        hash: HashArg,
    },

    /// Derive bytes from a password with PBKDF2 and print them as hex
    Pbkdf2 {
        #[arg(long)]
        password: String,

        #[arg(long)]
        salt: String,

        #[arg(long, default_value_t = 600_000)]
        iterations: u32,

        /// Output length in bytes
        #[arg(long, default_value_t = 32)]
        length: usize,

        #[arg(long, value_enum, default_value_t = HashArg::Sha256)]
        hash: HashArg,
    },

    /// Generate a key pair with a bundled software provider
    Keygen {
        #[arg(long, value_enum)]
        algorithm: KeygenAlgorithm,

        #[arg(long, value_enum, default_value_t = EncodingArg::Pem)]
        encoding: EncodingArg,

        /// Also write `<algorithm>_private.*` and `<algorithm>_public.*` here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Private,
    Public,
}

impl From<KindArg> for KeyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Private => KeyKind::Private,
            KindArg::Public => KeyKind::Public,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EncodingArg {
    Raw,
    Der,
    Pem,
}

impl From<EncodingArg> for KeyEncoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Raw => KeyEncoding::Raw,
            EncodingArg::Der => KeyEncoding::Der,
            EncodingArg::Pem => KeyEncoding::Pem,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HashArg {
    Sha256,
    Sha384,
    Sha512,
}

impl HashArg {
    fn keyed_hash(self) -> Box<dyn KeyedHash> {
        match self {
            HashArg::Sha256 => Box::new(HmacSha256),
            HashArg::Sha384 => Box::new(HmacSha384),
            HashArg::Sha512 => Box::new(HmacSha512),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeygenAlgorithm {
    Ed25519,
    P384,
    X25519,
}

fn parse_algorithm(name: &str) -> std::result::Result<KeyAlgorithm, String> {
    KeyAlgorithm::from_name(name).ok_or_else(|| format!("unknown key algorithm '{name}'"))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::PemToDer { input, output, hex } => {
            cmd_pem_to_der(&input, output.as_deref(), hex, verbose)
        }
        Commands::DerToPem {
            input,
            output,
            label,
        } => cmd_der_to_pem(&input, output.as_deref(), &label, verbose),
        Commands::ConvertKey {
            algorithm,
            kind,
            from,
            to,
            input,
            output,
            hex,
        } => cmd_convert_key(
            algorithm,
            kind.into(),
            from.into(),
            to.into(),
            &input,
            output.as_deref(),
            hex,
            verbose,
        ),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::SigToFixed {
            input,
            output,
            width,
            hex,
        } => cmd_sig_to_fixed(&input, output.as_deref(), width, hex, verbose),
        Commands::SigToDer { input, output, hex } => {
            cmd_sig_to_der(&input, output.as_deref(), hex, verbose)
        }
        Commands::Hkdf {
            secret,
            length,
            salt,
            info,
            hash,
        } => cmd_hkdf(&secret, length, &salt, &info, hash),
        Commands::Pbkdf2 {
            password,
            salt,
            iterations,
            length,
            hash,
        } => cmd_pbkdf2(&password, &salt, iterations, length, hash, verbose),
        Commands::Keygen {
            algorithm,
            encoding,
            out_dir,
        } => cmd_keygen(algorithm, encoding.into(), out_dir.as_deref(), verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_out(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}

/// Binary output, or lowercase hex plus newline with `--hex`.
fn emit_binary(bytes: &[u8], output: Option<&Path>, as_hex: bool) -> Result<()> {
    if as_hex {
        write_out(format!("{}\n", hex::encode(bytes)).as_bytes(), output)
    } else {
        write_out(bytes, output)
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|text| text.trim_start().starts_with("-----BEGIN"))
        .unwrap_or(false)
}

fn key_text(material: &KeyMaterial) -> String {
    match material {
        KeyMaterial::Pem(text) => text.clone(),
        other => hex::encode(other.as_bytes()),
    }
}

fn extension(encoding: KeyEncoding) -> &'static str {
    match encoding {
        KeyEncoding::Raw => "bin",
        KeyEncoding::Der => "der",
        KeyEncoding::Pem => "pem",
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `cfx pem-to-der --input FILE`
fn cmd_pem_to_der(input: &Path, output: Option<&Path>, as_hex: bool, verbose: bool) -> Result<()> {
    let text = read_text(input)?;
    let der = pem_to_der(&text).context("invalid PEM")?;
    if verbose {
        eprintln!("decoded {} DER bytes", der.len());
    }
    emit_binary(&der, output, as_hex)
}

/// `cfx der-to-pem --input FILE --label LABEL`
fn cmd_der_to_pem(input: &Path, output: Option<&Path>, label: &str, verbose: bool) -> Result<()> {
    if !is_valid_label(label) {
        return Err(anyhow!("invalid PEM label '{label}'"));
    }
    let der = read_bytes(input)?;
    let pem = der_to_pem(&der, label);
    if verbose {
        eprintln!("encoded {} DER bytes as {label}", der.len());
    }
    write_out(pem.as_bytes(), output)
}

/// `cfx convert-key --algorithm ALG --kind KIND --from ENC --to ENC --input FILE`
#[allow(clippy::too_many_arguments)]
fn cmd_convert_key(
    algorithm: KeyAlgorithm,
    kind: KeyKind,
    from: KeyEncoding,
    to: KeyEncoding,
    input: &Path,
    output: Option<&Path>,
    as_hex: bool,
    verbose: bool,
) -> Result<()> {
    let marshaler = marshaler_for(algorithm, kind);
    log::debug!("converting {algorithm} {kind} key from {from:?} to {to:?}");
    let source = match from {
        KeyEncoding::Raw => KeyMaterial::Raw(read_bytes(input)?),
        KeyEncoding::Der => KeyMaterial::Der(read_bytes(input)?),
        KeyEncoding::Pem => KeyMaterial::Pem(read_text(input)?),
    };
    let converted = source
        .convert(&*marshaler, to)
        .with_context(|| format!("failed to convert {algorithm} {kind} key"))?;
    if verbose {
        eprintln!(
            "{algorithm} {kind} key: {:?} ({} bytes) -> {:?} ({} bytes)",
            from,
            source.as_bytes().len(),
            to,
            converted.as_bytes().len()
        );
    }
    match &converted {
        KeyMaterial::Pem(text) => write_out(text.as_bytes(), output),
        binary => emit_binary(binary.as_bytes(), output, as_hex),
    }
}

#[derive(Serialize)]
struct KeyReport {
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<Curve>,
    kind: KeyKind,
    der_len: usize,
    raw_len: usize,
}

/// `cfx inspect --input FILE`
fn cmd_inspect(input: &Path) -> Result<()> {
    let bytes = read_bytes(input)?;
    let (format, label, der) = if looks_like_pem(&bytes) {
        let text = String::from_utf8(bytes).context("PEM file is not UTF-8")?;
        let (label, der) = pem_to_der_labeled(&text).context("invalid PEM")?;
        ("pem", Some(label), der)
    } else {
        ("der", None, bytes)
    };
    let (algorithm, kind) = identify_der(&der).context("unrecognized DER key")?;
    log::debug!("{} input identified as {algorithm} {kind} key", format.to_uppercase());

    let report = KeyReport {
        format,
        label,
        algorithm: algorithm.to_string(),
        curve: match algorithm {
            KeyAlgorithm::Ec(curve) => Some(curve),
            _ => None,
        },
        kind,
        der_len: der.len(),
        raw_len: marshaler_for(algorithm, kind).raw_len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// `cfx sig-to-fixed --input FILE [--width N]`
fn cmd_sig_to_fixed(
    input: &Path,
    output: Option<&Path>,
    width: Option<usize>,
    as_hex: bool,
    verbose: bool,
) -> Result<()> {
    let der = read_bytes(input)?;
    let fixed = der_to_fixed(&der, width).context("invalid DER signature")?;
    if verbose {
        eprintln!("{}-byte DER -> {}-byte R || S", der.len(), fixed.len());
    }
    emit_binary(&fixed, output, as_hex)
}

/// `cfx sig-to-der --input FILE`
fn cmd_sig_to_der(input: &Path, output: Option<&Path>, as_hex: bool, verbose: bool) -> Result<()> {
    let fixed = read_bytes(input)?;
    let der = fixed_to_der(&fixed).context("invalid R || S signature")?;
    if verbose {
        eprintln!("{}-byte R || S -> {}-byte DER", fixed.len(), der.len());
    }
    emit_binary(&der, output, as_hex)
}

/// `cfx hkdf --secret HEX --length N [--salt HEX] [--info HEX]`
fn cmd_hkdf(secret: &str, length: usize, salt: &str, info: &str, hash: HashArg) -> Result<()> {
    let secret = hex::decode(secret).context("--secret is not valid hex")?;
    let salt = hex::decode(salt).context("--salt is not valid hex")?;
    let info = hex::decode(info).context("--info is not valid hex")?;
    let okm = hkdf(&*hash.keyed_hash(), &secret, length, &salt, &info)?;
    println!("{}", hex::encode(okm));
    Ok(())
}

/// `cfx pbkdf2 --password TEXT --salt TEXT [--iterations N] [--length N]`
fn cmd_pbkdf2(
    password: &str,
    salt: &str,
    iterations: u32,
    length: usize,
    hash: HashArg,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("PBKDF2-HMAC-{hash:?}: {iterations} iterations, {length} bytes");
    }
    let dk = pbkdf2(
        &*hash.keyed_hash(),
        password.as_bytes(),
        length,
        iterations,
        salt.as_bytes(),
    )?;
    println!("{}", hex::encode(dk));
    Ok(())
}

#[derive(Serialize)]
struct KeygenReport {
    algorithm: String,
    encoding: KeyEncoding,
    private: String,
    public: String,
}

/// `cfx keygen --algorithm ALG [--encoding ENC] [--out-dir DIR]`
fn cmd_keygen(
    algorithm: KeygenAlgorithm,
    encoding: KeyEncoding,
    out_dir: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let (name, stem, pair): (String, &str, KeyPair) = match algorithm {
        KeygenAlgorithm::Ed25519 => {
            let facade = SignatureFacade::new(Box::new(Ed25519Provider));
            (facade.algorithm().to_string(), "ed25519", facade.generate(encoding)?)
        }
        KeygenAlgorithm::P384 => {
            let facade = SignatureFacade::new(Box::new(P384Provider));
            (facade.algorithm().to_string(), "p384", facade.generate(encoding)?)
        }
        KeygenAlgorithm::X25519 => {
            let facade = KeyAgreementFacade::new(Box::new(X25519Provider));
            let pair = facade
                .generate(encoding)
                .context("X25519 keys are only available with --encoding raw")?;
            (facade.name().to_string(), "x25519", pair)
        }
    };

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let ext = extension(encoding);
        for (half, material) in [("private", &pair.private), ("public", &pair.public)] {
            let path = dir.join(format!("{stem}_{half}.{ext}"));
            std::fs::write(&path, material.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            if verbose {
                eprintln!("wrote {}", path.display());
            }
        }
    }

    let report = KeygenReport {
        algorithm: name,
        encoding,
        private: key_text(&pair.private),
        public: key_text(&pair.public),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
